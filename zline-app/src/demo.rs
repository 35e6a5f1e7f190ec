use tracing::debug;
use zline_core::document::{Document, EntityAttributes, EntityKind, LineType, PolylineVertex};
use zline_core::geometry::Point3;

/// 未指定文档时使用的内置示例：直线、带圆弧的闭合多段线、虚线与一个不支持的实体。
pub fn demo_document() -> Document {
    let mut doc = Document::new();
    doc.add_line_type(LineType::new("DASHED", vec![0.5, -0.25]));
    doc.add_line_type(LineType::new("CONTINUOUS", Vec::new()));

    let baseline = doc.add_line(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(100.0, 0.0, 0.0),
        EntityAttributes::on_layer("0"),
    );
    let outline = doc.add_lwpolyline(
        [
            PolylineVertex::new(Point3::planar(0.0, 10.0)),
            PolylineVertex::new(Point3::planar(40.0, 10.0)),
            PolylineVertex::with_bulge(Point3::planar(40.0, 30.0), 1.0),
            PolylineVertex::new(Point3::planar(0.0, 30.0)),
        ],
        true,
        EntityAttributes::on_layer("SKETCH"),
    );
    let axis = doc.add_polyline(
        [
            PolylineVertex::new(Point3::new(50.0, -5.0, 0.0)),
            PolylineVertex::new(Point3::new(50.0, 45.0, 0.0)),
        ],
        false,
        EntityAttributes::on_layer("ANNOT").with_line_type("DASHED"),
    );
    let label = doc.add_kind(
        EntityKind::Unsupported("TEXT".to_string()),
        EntityAttributes::on_layer("ANNOT"),
    );

    debug!(
        baseline = baseline.get(),
        outline = outline.get(),
        axis = axis.get(),
        label = label.get(),
        "已创建演示实体"
    );
    doc
}
