use glam::DVec3;
use tracing::{debug, trace};
use zline_core::document::{Document, Entity, EntityKind, Line, Polyline, Tables};

use crate::cache::{CacheStatus, DrawResult, EntityCache};
use crate::errors::DrawError;
use crate::geometry::{
    LineGeometry, fix_mesh_to_draw_dashed_lines, generate_point_index, offset_by_bounding_box,
};
use crate::polyline::build_polyline_points;
use crate::scene::{LINES_GROUP_NAME, LineGroup, RenderableLine};
use crate::style::{LineStyle, MaterialResolver, StyleMaterialResolver, resolve_line_style};
use crate::tessellate::{ArcTessellator, BulgeArcTessellator};
use crate::visibility::{LayerVisibility, VisibilityFilter};

/// 默认材质解析器使用的虚线参数（归一化局部坐标下的长度）。
#[derive(Debug, Clone, Copy)]
pub struct DrawerOptions {
    pub dash_size: f64,
    pub gap_size: f64,
}

impl Default for DrawerOptions {
    fn default() -> Self {
        Self {
            dash_size: 0.05,
            gap_size: 0.025,
        }
    }
}

/// 负责单个实体的几何构建，与缓存分离以便在缓存回调中借用。
struct GeometryBuilder {
    tessellator: Box<dyn ArcTessellator>,
    materials: Box<dyn MaterialResolver>,
}

impl GeometryBuilder {
    fn build(&mut self, entity: &Entity, tables: &Tables) -> Result<DrawResult, DrawError> {
        match &entity.kind {
            EntityKind::Line(line) => self.draw_line(entity, line, tables),
            EntityKind::Polyline(polyline) | EntityKind::LwPolyline(polyline) => {
                self.draw_polyline(entity, polyline, tables)
            }
            EntityKind::Unsupported(kind) => Err(DrawError::UnsupportedEntity {
                entity: entity.id.get(),
                kind: kind.clone(),
            }),
        }
    }

    fn draw_line(
        &mut self,
        entity: &Entity,
        line: &Line,
        tables: &Tables,
    ) -> Result<DrawResult, DrawError> {
        let start = line.start.ok_or(DrawError::MissingField {
            entity: entity.id.get(),
            field: "start",
        })?;
        let end = line.end.ok_or(DrawError::MissingField {
            entity: entity.id.get(),
            field: "end",
        })?;
        self.finish(entity, vec![start.as_vec3(), end.as_vec3()], tables)
    }

    fn draw_polyline(
        &mut self,
        entity: &Entity,
        polyline: &Polyline,
        tables: &Tables,
    ) -> Result<DrawResult, DrawError> {
        let vertices = polyline
            .vertices
            .as_deref()
            .ok_or(DrawError::MissingField {
                entity: entity.id.get(),
                field: "vertices",
            })?;
        let points = build_polyline_points(vertices, polyline.is_closed, self.tessellator.as_ref());
        self.finish(entity, points, tables)
    }

    fn finish(
        &mut self,
        entity: &Entity,
        points: Vec<DVec3>,
        tables: &Tables,
    ) -> Result<DrawResult, DrawError> {
        if u32::try_from(points.len()).is_err() {
            return Err(DrawError::IndexOverflow {
                entity: entity.id.get(),
                points: points.len(),
            });
        }

        let style = resolve_line_style(entity.line_type_name.as_deref(), tables);
        let material = self.materials.material(entity, style, tables);

        let index = generate_point_index(&points);
        let mut geometry = LineGeometry::from_points(points).with_index(index);
        let transform = offset_by_bounding_box(&mut geometry);

        debug!(
            entity = entity.id.get(),
            kind = entity.kind.type_name(),
            style = style.as_str(),
            points = geometry.positions().len(),
            segments = geometry.segment_count(),
            "已生成实体几何"
        );

        Ok(DrawResult::new(geometry, material, transform))
    }
}

/// 将文档中的直线/多段线实体转换为可渲染线对象，并按实体缓存计算结果。
///
/// 所有操作同步执行；`&mut self` 保证同一缓存上的查找与写入串行。
pub struct EntityDrawer {
    builder: GeometryBuilder,
    visibility: Box<dyn VisibilityFilter>,
    cache: EntityCache,
}

impl EntityDrawer {
    pub fn new(options: DrawerOptions) -> Self {
        Self {
            builder: GeometryBuilder {
                tessellator: Box::new(BulgeArcTessellator::new()),
                materials: Box::new(StyleMaterialResolver::new(
                    options.dash_size,
                    options.gap_size,
                )),
            },
            visibility: Box::new(LayerVisibility),
            cache: EntityCache::new(),
        }
    }

    pub fn with_tessellator(mut self, tessellator: impl ArcTessellator + 'static) -> Self {
        self.builder.tessellator = Box::new(tessellator);
        self
    }

    pub fn with_material_resolver(mut self, resolver: impl MaterialResolver + 'static) -> Self {
        self.builder.materials = Box::new(resolver);
        self
    }

    pub fn with_visibility(mut self, filter: impl VisibilityFilter + 'static) -> Self {
        self.visibility = Box::new(filter);
        self
    }

    pub fn with_cache(mut self, cache: EntityCache) -> Self {
        self.cache = cache;
        self
    }

    #[inline]
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// 绘制文档中所有受支持的实体。
    ///
    /// 没有任何受支持实体时返回 `Ok(None)`；隐藏实体被跳过，但分组照常返回。
    /// 实体缺少必需的几何字段时整体失败。
    pub fn draw(&mut self, document: &Document) -> Result<Option<LineGroup>, DrawError> {
        let tables = document.tables();
        let entities: Vec<&Entity> = document
            .entities()
            .filter(|entity| entity.kind.is_line_like())
            .collect();
        if entities.is_empty() {
            debug!("文档中没有可绘制的直线/多段线实体");
            return Ok(None);
        }

        let mut group = LineGroup::new(LINES_GROUP_NAME);
        let mut hidden = 0usize;
        let mut hits = 0usize;
        for entity in entities {
            if self.visibility.is_hidden(entity, tables) {
                trace!(entity = entity.id.get(), layer = %entity.layer, "跳过隐藏实体");
                hidden += 1;
                continue;
            }

            let builder = &mut self.builder;
            let (result, status) = self
                .cache
                .get_or_try_insert_with(entity, || builder.build(entity, tables))?;
            if status == CacheStatus::Hit {
                trace!(entity = entity.id.get(), "命中实体缓存");
                hits += 1;
            }

            let mut line = RenderableLine::new(entity.id, result);
            if line.style() == LineStyle::Dashed {
                fix_mesh_to_draw_dashed_lines(&mut line);
            }
            group.push(line);
        }

        debug!(
            drawn = group.len(),
            hidden,
            cache_hits = hits,
            cached = self.cache.len(),
            "实体绘制完成"
        );
        Ok(Some(group))
    }

    /// 绘制单个 LINE 实体，不经过缓存。
    pub fn draw_line(&mut self, entity: &Entity, tables: &Tables) -> Result<DrawResult, DrawError> {
        match &entity.kind {
            EntityKind::Line(line) => self.builder.draw_line(entity, line, tables),
            other => Err(DrawError::UnsupportedEntity {
                entity: entity.id.get(),
                kind: other.type_name().to_string(),
            }),
        }
    }

    /// 绘制单个 POLYLINE / LWPOLYLINE 实体，不经过缓存。
    pub fn draw_polyline(
        &mut self,
        entity: &Entity,
        tables: &Tables,
    ) -> Result<DrawResult, DrawError> {
        match &entity.kind {
            EntityKind::Polyline(polyline) | EntityKind::LwPolyline(polyline) => {
                self.builder.draw_polyline(entity, polyline, tables)
            }
            other => Err(DrawError::UnsupportedEntity {
                entity: entity.id.get(),
                kind: other.type_name().to_string(),
            }),
        }
    }
}

impl Default for EntityDrawer {
    fn default() -> Self {
        Self::new(DrawerOptions::default())
    }
}
