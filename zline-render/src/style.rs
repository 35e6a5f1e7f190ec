use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;
use zline_core::document::{Entity, Tables};

/// 线条样式：实线或虚线。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStyle::Solid => "line",
            LineStyle::Dashed => "dashed",
        }
    }
}

/// 按实体的线型名查表决定样式；未命名、未知或空图案均为实线。
pub fn resolve_line_style(line_type_name: Option<&str>, tables: &Tables) -> LineStyle {
    let Some(name) = line_type_name else {
        return LineStyle::Solid;
    };
    match tables.line_type(name) {
        Some(line_type) if line_type.is_dashed() => LineStyle::Dashed,
        Some(_) => LineStyle::Solid,
        None => {
            trace!(line_type = name, "未知线型，按实线处理");
            LineStyle::Solid
        }
    }
}

const DEFAULT_COLOR: u32 = 0xFF_FF_FF;

/// 渲染材质。对绘制核心而言只有 `style` 有意义，其余字段交给渲染端。
#[derive(Debug, Clone, PartialEq)]
pub struct LineMaterial {
    pub style: LineStyle,
    pub color: u32,
    pub dash_size: f64,
    pub gap_size: f64,
}

pub trait MaterialResolver {
    fn material(
        &mut self,
        entity: &Entity,
        style: LineStyle,
        tables: &Tables,
    ) -> Arc<LineMaterial>;
}

/// 默认材质解析：颜色取实体颜色，其次图层颜色，最后白色；
/// 同一 (样式, 颜色) 共享同一个材质实例。
#[derive(Debug, Clone)]
pub struct StyleMaterialResolver {
    dash_size: f64,
    gap_size: f64,
    materials: HashMap<(LineStyle, u32), Arc<LineMaterial>>,
}

impl StyleMaterialResolver {
    pub fn new(dash_size: f64, gap_size: f64) -> Self {
        Self {
            dash_size,
            gap_size,
            materials: HashMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    fn entity_color(entity: &Entity, tables: &Tables) -> u32 {
        entity
            .color
            .or_else(|| tables.layer(&entity.layer).and_then(|layer| layer.color))
            .unwrap_or(DEFAULT_COLOR)
    }
}

impl MaterialResolver for StyleMaterialResolver {
    fn material(
        &mut self,
        entity: &Entity,
        style: LineStyle,
        tables: &Tables,
    ) -> Arc<LineMaterial> {
        let color = Self::entity_color(entity, tables);
        let (dash_size, gap_size) = (self.dash_size, self.gap_size);
        self.materials
            .entry((style, color))
            .or_insert_with(|| {
                Arc::new(LineMaterial {
                    style,
                    color,
                    dash_size,
                    gap_size,
                })
            })
            .clone()
    }
}
