use std::path::PathBuf;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zline_config::{AppConfig, ConfigError};
use zline_core::document::Document;
use zline_io::{DocumentLoader, JsonDocumentLoader};
use zline_render::{BulgeArcTessellator, DrawerOptions, EntityDrawer, LineGroup};

mod demo;

fn main() {
    let mut args = std::env::args().skip(1);
    let mut config_override: Option<PathBuf> = None;
    let mut document_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("`--config` 需要提供配置文件路径");
                    std::process::exit(1);
                };
                config_override = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => {
                eprintln!("未知参数：{other}");
                std::process::exit(1);
            }
            other => {
                if document_path.is_some() {
                    eprintln!("只能指定一个文档：{other}");
                    std::process::exit(1);
                }
                document_path = Some(PathBuf::from(other));
            }
        }
    }

    let config = load_configuration(config_override);
    init_logging(&config);
    info!("启动 zline");

    let document = match &document_path {
        Some(path) => match JsonDocumentLoader::new().load(path) {
            Ok(document) => {
                info!(path = %path.display(), "加载文档成功");
                document
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "加载文档失败");
                std::process::exit(1);
            }
        },
        None => {
            info!("未指定文档，使用内置示例");
            demo::demo_document()
        }
    };

    let mut drawer = build_drawer(&config);
    match drawer.draw(&document) {
        Ok(Some(group)) => print_summary(&document, &group),
        Ok(None) => println!("文档中没有可绘制的 LINE / POLYLINE / LWPOLYLINE 实体"),
        Err(err) => {
            error!(error = %err, "绘制实体失败");
            std::process::exit(1);
        }
    }
}

fn build_drawer(config: &AppConfig) -> EntityDrawer {
    let options = DrawerOptions {
        dash_size: config.render.dash_size,
        gap_size: config.render.gap_size,
    };
    let tessellator =
        BulgeArcTessellator::with_resolution_degrees(config.tessellation.arc_resolution_degrees);
    EntityDrawer::new(options).with_tessellator(tessellator)
}

fn print_summary(document: &Document, group: &LineGroup) {
    println!("== 分组 {} ==", group.name);
    for line in group.iter() {
        let kind = document
            .entity(line.entity)
            .map(|entity| entity.kind.type_name())
            .unwrap_or("?");
        let position = line.position.as_vec3();
        let scale = line.scale.as_vec3();
        println!(
            "  #{:<4} {:<10} {:<6} 点数={:<4} 线段={:<4} 位置=({:.3}, {:.3}, {:.3}) 缩放={:.3}",
            line.entity.get(),
            kind,
            line.style().as_str(),
            line.geometry.positions().len(),
            line.geometry.segment_count(),
            position.x,
            position.y,
            position.z,
            scale.x,
        );
    }
    println!("共 {} 条线", group.len());
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
