use std::sync::Arc;

use glam::DVec3;
use zline_core::geometry::{Bounds3D, Point3, Vector3};

use crate::scene::RenderableLine;

/// 线框几何：顶点序列 + 可选索引。索引按两两成对解释为线段；
/// 未索引时顶点序列本身即为线段列表（每两个顶点一段）。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    positions: Vec<DVec3>,
    index: Option<Vec<u32>>,
    line_distances: Option<Vec<f64>>,
}

impl LineGeometry {
    pub fn from_points(points: Vec<DVec3>) -> Self {
        Self {
            positions: points,
            index: None,
            line_distances: None,
        }
    }

    /// 索引只由 [`generate_point_index`] 产生，因此不对外开放。
    pub(crate) fn with_index(mut self, index: Vec<u32>) -> Self {
        debug_assert!(index.len() % 2 == 0);
        debug_assert!(index.iter().all(|&i| (i as usize) < self.positions.len()));
        self.index = Some(index);
        self
    }

    #[inline]
    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    #[inline]
    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// 虚线着色所需的逐顶点累计长度，仅在 [`compute_line_distances`] 之后存在。
    ///
    /// [`compute_line_distances`]: LineGeometry::compute_line_distances
    #[inline]
    pub fn line_distances(&self) -> Option<&[f64]> {
        self.line_distances.as_deref()
    }

    pub fn segment_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len() / 2,
            None => self.positions.len() / 2,
        }
    }

    pub fn bounding_box(&self) -> Bounds3D {
        Bounds3D::from_points(self.positions.iter().copied())
    }

    pub fn translate(&mut self, offset: DVec3) {
        for position in &mut self.positions {
            *position += offset;
        }
    }

    pub fn scale_uniform(&mut self, factor: f64) {
        for position in &mut self.positions {
            *position *= factor;
        }
    }

    /// 展开索引，生成每段两个独立端点的非索引几何。
    pub fn to_non_indexed(&self) -> LineGeometry {
        let Some(index) = &self.index else {
            return self.clone();
        };
        let positions = index
            .iter()
            .map(|&i| self.positions[i as usize])
            .collect();
        LineGeometry::from_points(positions)
    }

    /// 按路径方向计算逐顶点累计长度。索引几何会先按段展开再计算。
    pub fn compute_line_distances(&mut self) {
        if self.is_indexed() {
            *self = self.to_non_indexed();
        }
        let mut distances = Vec::with_capacity(self.positions.len());
        let mut travelled = 0.0;
        for segment in self.positions.chunks(2) {
            match segment {
                [start, end] => {
                    distances.push(travelled);
                    travelled += start.distance(*end);
                    distances.push(travelled);
                }
                [_] => distances.push(travelled),
                _ => {}
            }
        }
        self.line_distances = Some(distances);
    }
}

/// 归一化的逆变换：渲染对象以 `position`/`scale` 还原到世界坐标。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationTransform {
    pub position: Point3,
    pub scale: Vector3,
}

impl NormalizationTransform {
    pub fn identity() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            scale: Vector3::splat(1.0),
        }
    }

    /// 局部（归一化后）坐标映射回世界坐标。
    #[inline]
    pub fn apply_inverse(&self, local: DVec3) -> DVec3 {
        local * self.scale.as_vec3() + self.position.as_vec3()
    }
}

impl Default for NormalizationTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// 为有序点列生成相邻点对索引：`[0,1, 1,2, ..., n-2,n-1]`。
///
/// 不做首尾相接，闭合路径由调用方在点列末尾重复首点。
/// 调用方需保证点数不超过 `u32` 索引范围。
pub fn generate_point_index<T>(points: &[T]) -> Vec<u32> {
    debug_assert!(points.len() <= u32::MAX as usize + 1);
    let mut index = Vec::with_capacity(points.len().saturating_sub(1) * 2);
    for i in 1..points.len() {
        index.push((i - 1) as u32);
        index.push(i as u32);
    }
    index
}

/// 将几何平移到包围盒中心并按最大边长等比缩放到单位尺寸，返回逆变换。
///
/// 只应作用于尚未共享的新建几何。空几何返回单位变换；
/// 最大边长为 0（单点或重合点）时只平移不缩放。
pub fn offset_by_bounding_box(geometry: &mut LineGeometry) -> NormalizationTransform {
    let bounds = geometry.bounding_box();
    if bounds.is_empty() {
        return NormalizationTransform::identity();
    }

    let center = bounds.center();
    geometry.translate(-center.as_vec3());

    let max_extent = bounds.max_extent();
    let extent = if max_extent.is_finite() && max_extent > f64::EPSILON {
        max_extent
    } else {
        1.0
    };
    geometry.scale_uniform(1.0 / extent);

    NormalizationTransform {
        position: center,
        scale: Vector3::splat(extent),
    }
}

/// 虚线渲染需要非索引顶点流与逐顶点累计长度。
/// 替换渲染对象自己的几何句柄，缓存中的共享几何保持不变。
pub fn fix_mesh_to_draw_dashed_lines(line: &mut RenderableLine) {
    let mut geometry = line.geometry.to_non_indexed();
    geometry.compute_line_distances();
    line.geometry = Arc::new(geometry);
}
