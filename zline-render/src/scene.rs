use std::sync::Arc;

use glam::DVec3;
use zline_core::document::EntityId;
use zline_core::geometry::{Point3, Vector3};

use crate::cache::DrawResult;
use crate::geometry::{LineGeometry, NormalizationTransform};
use crate::style::{LineMaterial, LineStyle};

/// 输出分组的名称。
pub const LINES_GROUP_NAME: &str = "LINES";

/// 一个实体对应的可渲染线对象。位置与缩放作用在对象上，而非几何。
#[derive(Debug, Clone)]
pub struct RenderableLine {
    pub entity: EntityId,
    pub geometry: Arc<LineGeometry>,
    pub material: Arc<LineMaterial>,
    pub position: Point3,
    pub scale: Vector3,
}

impl RenderableLine {
    pub fn new(entity: EntityId, result: &DrawResult) -> Self {
        Self {
            entity,
            geometry: Arc::clone(&result.geometry),
            material: Arc::clone(&result.material),
            position: result.position,
            scale: result.scale,
        }
    }

    #[inline]
    pub fn style(&self) -> LineStyle {
        self.material.style
    }

    #[inline]
    pub fn transform(&self) -> NormalizationTransform {
        NormalizationTransform {
            position: self.position,
            scale: self.scale,
        }
    }

    /// 几何顶点经对象变换后的世界坐标。
    pub fn world_positions(&self) -> Vec<DVec3> {
        let transform = self.transform();
        self.geometry
            .positions()
            .iter()
            .map(|local| transform.apply_inverse(*local))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct LineGroup {
    pub name: String,
    lines: Vec<RenderableLine>,
}

impl LineGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: RenderableLine) {
        self.lines.push(line);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &RenderableLine> {
        self.lines.iter()
    }

    #[inline]
    pub fn lines(&self) -> &[RenderableLine] {
        &self.lines
    }
}
