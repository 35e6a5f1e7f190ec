use glam::{DVec2, DVec3};

/// 默认弧线细分角步长（度）。
pub const DEFAULT_ARC_RESOLUTION_DEGREES: f64 = 5.0;

/// 步长下限。整圆最多 36000 段，避免分配失控。
pub const MIN_ARC_RESOLUTION_DEGREES: f64 = 0.01;

/// 将带 bulge 的多段线段离散为中间点。
///
/// 返回值不含 `from` 与 `to`，调用方负责写入端点。
/// bulge 为 0 时不应调用。
pub trait ArcTessellator {
    fn tessellate(&self, from: DVec3, to: DVec3, bulge: f64) -> Vec<DVec3>;
}

/// bulge = tan(θ/4)，正值为逆时针。圆弧在 XY 平面内求解，Z 沿弦线性插值。
#[derive(Debug, Clone, Copy)]
pub struct BulgeArcTessellator {
    resolution: f64,
}

impl BulgeArcTessellator {
    pub fn new() -> Self {
        Self::with_resolution_degrees(DEFAULT_ARC_RESOLUTION_DEGREES)
    }

    /// 非正数或非有限值回退到默认步长；过小的步长收紧到 [`MIN_ARC_RESOLUTION_DEGREES`]。
    pub fn with_resolution_degrees(degrees: f64) -> Self {
        let degrees = if degrees.is_finite() && degrees > 0.0 {
            degrees.max(MIN_ARC_RESOLUTION_DEGREES)
        } else {
            DEFAULT_ARC_RESOLUTION_DEGREES
        };
        Self {
            resolution: degrees.to_radians(),
        }
    }

    #[inline]
    pub fn resolution_degrees(&self) -> f64 {
        self.resolution.to_degrees()
    }
}

impl Default for BulgeArcTessellator {
    fn default() -> Self {
        Self::new()
    }
}

impl ArcTessellator for BulgeArcTessellator {
    fn tessellate(&self, from: DVec3, to: DVec3, bulge: f64) -> Vec<DVec3> {
        if !bulge.is_finite() || bulge.abs() <= 1e-12 {
            return Vec::new();
        }
        let start = from.truncate();
        let end = to.truncate();
        let chord = end - start;
        let chord_len = chord.length();
        if chord_len <= f64::EPSILON {
            return Vec::new();
        }

        let sweep = 4.0 * bulge.atan();
        let segments = (sweep.abs() / self.resolution - 1e-9).ceil() as usize;
        if segments < 2 {
            return Vec::new();
        }

        // 圆心在弦中垂线上，距中点 (c/2)·(1-b²)/(2b)，符号随 bulge 决定左右侧。
        let left = DVec2::new(-chord.y, chord.x) / chord_len;
        let offset = chord_len * 0.5 * (1.0 - bulge * bulge) / (2.0 * bulge);
        let center = (start + end) * 0.5 + left * offset;
        let radius = start.distance(center);
        let radial = start - center;
        let start_angle = radial.y.atan2(radial.x);

        (1..segments)
            .map(|i| {
                let t = i as f64 / segments as f64;
                let angle = start_angle + sweep * t;
                DVec3::new(
                    center.x + radius * angle.cos(),
                    center.y + radius * angle.sin(),
                    from.z + (to.z - from.z) * t,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semicircle_points_lie_on_circle_below_chord() {
        let tessellator = BulgeArcTessellator::new();
        let from = DVec3::new(0.0, 0.0, 0.0);
        let to = DVec3::new(10.0, 0.0, 0.0);
        let points = tessellator.tessellate(from, to, 1.0);

        // 180° / 5° = 36 段，35 个中间点
        assert_eq!(points.len(), 35);
        let center = DVec3::new(5.0, 0.0, 0.0);
        for point in &points {
            assert!((point.distance(center) - 5.0).abs() < 1e-9);
            assert!(point.y < 0.0, "ccw arc from west to east passes below");
        }
        let mid = points[17];
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.y + 5.0).abs() < 1e-9);
    }

    #[test]
    fn negative_bulge_mirrors_across_chord() {
        let tessellator = BulgeArcTessellator::new();
        let from = DVec3::new(0.0, 0.0, 0.0);
        let to = DVec3::new(10.0, 0.0, 0.0);
        let ccw = tessellator.tessellate(from, to, 0.5);
        let cw = tessellator.tessellate(from, to, -0.5);

        assert_eq!(ccw.len(), cw.len());
        for (a, b) in ccw.iter().zip(&cw) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y + b.y).abs() < 1e-9);
        }
    }

    #[test]
    fn quarter_arc_center_and_ordering() {
        // bulge = tan(90°/4)
        let bulge = (std::f64::consts::FRAC_PI_2 / 4.0).tan();
        let tessellator = BulgeArcTessellator::with_resolution_degrees(10.0);
        let from = DVec3::new(1.0, 0.0, 0.0);
        let to = DVec3::new(0.0, 1.0, 0.0);
        let points = tessellator.tessellate(from, to, bulge);

        assert_eq!(points.len(), 8);
        let mut previous_angle = 0.0;
        for point in &points {
            assert!((point.length() - 1.0).abs() < 1e-9);
            let angle = point.y.atan2(point.x);
            assert!(angle > previous_angle);
            previous_angle = angle;
        }
    }

    #[test]
    fn z_is_interpolated_between_endpoints() {
        let tessellator = BulgeArcTessellator::new();
        let points = tessellator.tessellate(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 4.0),
            1.0,
        );
        assert!(!points.is_empty());
        let mut previous = 0.0;
        for point in &points {
            assert!(point.z > previous && point.z < 4.0);
            previous = point.z;
        }
    }

    #[test]
    fn degenerate_inputs_yield_no_points() {
        let tessellator = BulgeArcTessellator::new();
        let p = DVec3::new(1.0, 1.0, 0.0);
        assert!(tessellator.tessellate(p, p, 1.0).is_empty());
        assert!(tessellator.tessellate(p, DVec3::ZERO, 0.0).is_empty());
        assert!(tessellator.tessellate(p, DVec3::ZERO, f64::NAN).is_empty());
        // 扫角小于一个步长时没有中间点
        assert!(tessellator.tessellate(p, DVec3::ZERO, 1e-4).is_empty());
    }

    #[test]
    fn invalid_resolution_falls_back_to_default() {
        let tessellator = BulgeArcTessellator::with_resolution_degrees(-3.0);
        assert!((tessellator.resolution_degrees() - DEFAULT_ARC_RESOLUTION_DEGREES).abs() < 1e-9);
        let tessellator = BulgeArcTessellator::with_resolution_degrees(f64::NAN);
        assert!((tessellator.resolution_degrees() - DEFAULT_ARC_RESOLUTION_DEGREES).abs() < 1e-9);
    }

    #[test]
    fn tiny_resolution_is_clamped_to_floor() {
        for degrees in [1e-300, 1e-9, 0.001] {
            let tessellator = BulgeArcTessellator::with_resolution_degrees(degrees);
            assert!((tessellator.resolution_degrees() - MIN_ARC_RESOLUTION_DEGREES).abs() < 1e-12);
        }

        let tessellator = BulgeArcTessellator::with_resolution_degrees(1e-300);
        let points = tessellator.tessellate(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), 1.0);
        // 180° / 0.01° = 18000 段
        assert_eq!(points.len(), 17_999);
    }
}
