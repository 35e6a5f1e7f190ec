use glam::DVec3;
use zline_core::document::PolylineVertex;

use crate::tessellate::ArcTessellator;

/// 按顶点顺序生成多段线点列，带 bulge 的段插入圆弧离散点。
///
/// 每段只写入起点和弧上中间点，终点由下一段的起点写入；最后一段额外写入末顶点。
/// `closed` 时在末尾重复首点，末顶点带 bulge 则闭合段同样按圆弧离散。
/// 少于两个顶点时返回空点列。
pub fn build_polyline_points(
    vertices: &[PolylineVertex],
    closed: bool,
    tessellator: &dyn ArcTessellator,
) -> Vec<DVec3> {
    let mut points = Vec::with_capacity(vertices.len() + usize::from(closed));
    if vertices.len() < 2 {
        return points;
    }

    let last_pair = vertices.len() - 2;
    for (i, pair) in vertices.windows(2).enumerate() {
        let [from, to] = pair else { continue };
        let start = from.position.as_vec3();
        let end = to.position.as_vec3();

        points.push(start);
        if has_bulge(from) {
            points.extend(tessellator.tessellate(start, end, from.bulge));
        }
        if i == last_pair {
            points.push(end);
        }
    }

    if closed {
        let first = points[0];
        if let Some(last) = vertices.last() {
            if has_bulge(last) {
                points.extend(tessellator.tessellate(last.position.as_vec3(), first, last.bulge));
            }
        }
        points.push(first);
    }

    points
}

#[inline]
fn has_bulge(vertex: &PolylineVertex) -> bool {
    vertex.bulge != 0.0 && !vertex.bulge.is_nan()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use zline_core::geometry::Point3;

    use super::*;
    use crate::tessellate::BulgeArcTessellator;

    /// 固定返回两个标记点的离散器，便于核对插入位置。
    struct MarkerTessellator {
        calls: Cell<usize>,
    }

    impl MarkerTessellator {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl ArcTessellator for MarkerTessellator {
        fn tessellate(&self, from: DVec3, to: DVec3, bulge: f64) -> Vec<DVec3> {
            self.calls.set(self.calls.get() + 1);
            let mid = (from + to) * 0.5;
            vec![mid + DVec3::new(0.0, bulge, 0.0), mid + DVec3::new(0.0, 2.0 * bulge, 0.0)]
        }
    }

    fn vertex(x: f64, y: f64, bulge: f64) -> PolylineVertex {
        PolylineVertex::with_bulge(Point3::planar(x, y), bulge)
    }

    #[test]
    fn straight_open_polyline_keeps_original_points() {
        let vertices = [vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(1.0, 1.0, 0.0)];
        let tessellator = MarkerTessellator::new();
        let points = build_polyline_points(&vertices, false, &tessellator);

        assert_eq!(
            points,
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 0.0, 0.0),
                DVec3::new(1.0, 1.0, 0.0)
            ]
        );
        assert_eq!(tessellator.calls.get(), 0);
    }

    #[test]
    fn bulged_segment_inserts_arc_points_between_endpoints() {
        let vertices = [vertex(0.0, 0.0, 1.0), vertex(10.0, 0.0, 0.0)];
        let tessellator = BulgeArcTessellator::new();
        let arc = tessellator.tessellate(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), 1.0);
        let points = build_polyline_points(&vertices, false, &tessellator);

        assert_eq!(points.len(), arc.len() + 2);
        assert_eq!(points[0], DVec3::ZERO);
        assert_eq!(&points[1..points.len() - 1], arc.as_slice());
        assert_eq!(points[points.len() - 1], DVec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn closed_polyline_repeats_first_point() {
        let vertices = [vertex(0.0, 0.0, 0.0), vertex(4.0, 0.0, 0.0), vertex(4.0, 3.0, 0.0)];
        let tessellator = MarkerTessellator::new();
        let points = build_polyline_points(&vertices, true, &tessellator);

        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn alternating_bulges_produce_no_duplicate_or_missing_vertices() {
        let vertices = [
            vertex(0.0, 0.0, 0.5),
            vertex(2.0, 0.0, 0.0),
            vertex(4.0, 0.0, -0.5),
            vertex(6.0, 0.0, 0.0),
            vertex(8.0, 0.0, 0.0),
        ];
        let tessellator = MarkerTessellator::new();
        let points = build_polyline_points(&vertices, false, &tessellator);

        let expected = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.5, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(4.0, 0.0, 0.0),
            DVec3::new(5.0, -0.5, 0.0),
            DVec3::new(5.0, -1.0, 0.0),
            DVec3::new(6.0, 0.0, 0.0),
            DVec3::new(8.0, 0.0, 0.0),
        ];
        assert_eq!(points, expected);
        assert_eq!(tessellator.calls.get(), 2);

        for window in points.windows(2) {
            assert_ne!(window[0], window[1], "consecutive points must differ");
        }
    }

    #[test]
    fn closing_segment_with_bulge_is_tessellated() {
        let vertices = [vertex(0.0, 0.0, 0.0), vertex(4.0, 0.0, 0.0), vertex(4.0, 4.0, 1.0)];
        let tessellator = MarkerTessellator::new();
        let points = build_polyline_points(&vertices, true, &tessellator);

        assert_eq!(points.len(), 6);
        assert_eq!(points[3], DVec3::new(2.0, 3.0, 0.0));
        assert_eq!(points[4], DVec3::new(2.0, 4.0, 0.0));
        assert_eq!(points[5], DVec3::ZERO);
        assert_eq!(tessellator.calls.get(), 1);
    }

    #[test]
    fn fewer_than_two_vertices_yield_empty_point_list() {
        let tessellator = MarkerTessellator::new();
        assert!(build_polyline_points(&[], false, &tessellator).is_empty());
        assert!(build_polyline_points(&[vertex(1.0, 1.0, 0.5)], true, &tessellator).is_empty());
        assert_eq!(tessellator.calls.get(), 0);
    }
}
