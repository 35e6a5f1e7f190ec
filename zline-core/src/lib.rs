pub mod geometry {
    use glam::DVec3;
    use serde::{Deserialize, Serialize};

    /// 三维点，内部以 `glam::DVec3` 表示，保持与解析结果一致的双精度。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point3(pub DVec3);

    impl Point3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        /// 二维输入（LWPOLYLINE 顶点等）统一补零 Z。
        #[inline]
        pub fn planar(x: f64, y: f64) -> Self {
            Self(DVec3::new(x, y, 0.0))
        }

        #[inline]
        pub fn from_vec(vec: DVec3) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn z(self) -> f64 {
            self.0.z
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Point3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 三维向量。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector3(pub DVec3);

    impl Vector3 {
        #[inline]
        pub fn new(x: f64, y: f64, z: f64) -> Self {
            Self(DVec3::new(x, y, z))
        }

        /// 三个分量相同的向量，用于等比缩放。
        #[inline]
        pub fn splat(value: f64) -> Self {
            Self(DVec3::splat(value))
        }

        #[inline]
        pub fn as_vec3(self) -> DVec3 {
            self.0
        }
    }

    impl From<DVec3> for Vector3 {
        fn from(value: DVec3) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于几何归一化与范围估算。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds3D {
        min: Point3,
        max: Point3,
    }

    impl Bounds3D {
        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point3::from_vec(DVec3::INFINITY),
                max: Point3::from_vec(DVec3::NEG_INFINITY),
            }
        }

        /// 由点集构造边界框，点集为空时返回空框。
        pub fn from_points<I>(points: I) -> Self
        where
            I: IntoIterator<Item = DVec3>,
        {
            let mut bounds = Self::empty();
            for point in points {
                bounds.include_point(Point3::from_vec(point));
            }
            bounds
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y() || self.min.z() > self.max.z()
        }

        #[inline]
        pub fn min(&self) -> Point3 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point3 {
            self.max
        }

        pub fn include_point(&mut self, point: Point3) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            self.min = Point3::from_vec(self.min.as_vec3().min(point.as_vec3()));
            self.max = Point3::from_vec(self.max.as_vec3().max(point.as_vec3()));
        }

        #[inline]
        pub fn center(&self) -> Point3 {
            debug_assert!(!self.is_empty());
            Point3::from_vec((self.min.as_vec3() + self.max.as_vec3()) * 0.5)
        }

        #[inline]
        pub fn size(&self) -> Vector3 {
            if self.is_empty() {
                return Vector3::splat(0.0);
            }
            Vector3(self.max.as_vec3() - self.min.as_vec3())
        }

        /// 三个轴向尺寸中的最大值，空框为 0。
        #[inline]
        pub fn max_extent(&self) -> f64 {
            self.size().as_vec3().max_element()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn bounds_track_min_max_and_extent() {
            let bounds = Bounds3D::from_points([
                DVec3::new(-2.0, 1.0, 0.0),
                DVec3::new(4.0, 3.0, 1.0),
                DVec3::new(0.0, -1.0, 0.5),
            ]);
            assert!(!bounds.is_empty());
            assert_eq!(bounds.min(), Point3::new(-2.0, -1.0, 0.0));
            assert_eq!(bounds.max(), Point3::new(4.0, 3.0, 1.0));
            assert_eq!(bounds.center(), Point3::new(1.0, 1.0, 0.5));
            assert!((bounds.max_extent() - 6.0).abs() < 1e-12);
        }

        #[test]
        fn empty_bounds_have_zero_size() {
            let bounds = Bounds3D::from_points(std::iter::empty());
            assert!(bounds.is_empty());
            assert_eq!(bounds.max_extent(), 0.0);
        }

        #[test]
        fn single_point_bounds_are_degenerate_but_not_empty() {
            let mut bounds = Bounds3D::empty();
            bounds.include_point(Point3::new(3.0, 3.0, 3.0));
            assert!(!bounds.is_empty());
            assert_eq!(bounds.max_extent(), 0.0);
            assert_eq!(bounds.center(), Point3::new(3.0, 3.0, 3.0));
        }
    }
}

pub mod document {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use crate::geometry::Point3;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        pub is_visible: bool,
        #[serde(default)]
        pub is_frozen: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<u32>,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                is_visible: true,
                is_frozen: false,
                color: None,
            }
        }
    }

    /// 线型表记录。`pattern` 为空表示实线（CONTINUOUS 等）。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LineType {
        pub name: String,
        #[serde(default)]
        pub description: String,
        #[serde(default)]
        pub pattern: Vec<f64>,
    }

    impl LineType {
        pub fn new(name: impl Into<String>, pattern: Vec<f64>) -> Self {
            Self {
                name: name.into(),
                description: String::new(),
                pattern,
            }
        }

        #[inline]
        pub fn is_dashed(&self) -> bool {
            !self.pattern.is_empty()
        }
    }

    /// 文档符号表：线型与图层。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Tables {
        #[serde(default)]
        pub line_types: HashMap<String, LineType>,
        #[serde(default)]
        pub layers: HashMap<String, Layer>,
    }

    impl Tables {
        /// 按名称查找线型；DXF 名称不区分大小写，精确匹配失败时再做忽略大小写匹配。
        pub fn line_type(&self, name: &str) -> Option<&LineType> {
            self.line_types.get(name).or_else(|| {
                self.line_types
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, line_type)| line_type)
            })
        }

        #[inline]
        pub fn layer(&self, name: &str) -> Option<&Layer> {
            self.layers.get(name)
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PolylineVertex {
        pub position: Point3,
        pub bulge: f64,
    }

    impl PolylineVertex {
        #[inline]
        pub fn new(position: Point3) -> Self {
            Self {
                position,
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(position: Point3, bulge: f64) -> Self {
            Self { position, bulge }
        }
    }

    /// 直线实体。端点来自解析结果，可能缺失，由绘制层校验。
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Line {
        pub start: Option<Point3>,
        pub end: Option<Point3>,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Option<Vec<PolylineVertex>>,
        pub is_closed: bool,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub enum EntityKind {
        Line(Line),
        Polyline(Polyline),
        LwPolyline(Polyline),
        /// 其它类型（CIRCLE、TEXT 等），仅保留类型名。
        Unsupported(String),
    }

    impl EntityKind {
        /// DXF 中的实体类型名。
        pub fn type_name(&self) -> &str {
            match self {
                EntityKind::Line(_) => "LINE",
                EntityKind::Polyline(_) => "POLYLINE",
                EntityKind::LwPolyline(_) => "LWPOLYLINE",
                EntityKind::Unsupported(name) => name,
            }
        }

        #[inline]
        pub fn is_line_like(&self) -> bool {
            !matches!(self, EntityKind::Unsupported(_))
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Entity {
        pub id: EntityId,
        pub kind: EntityKind,
        pub layer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub line_type_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub color: Option<u32>,
        pub visible: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub handle: Option<String>,
    }

    /// 新增实体时除几何外的公共属性。
    #[derive(Debug, Clone, Default)]
    pub struct EntityAttributes {
        pub layer: String,
        pub line_type_name: Option<String>,
        pub color: Option<u32>,
        pub hidden: bool,
        pub handle: Option<String>,
    }

    impl EntityAttributes {
        pub fn on_layer(layer: impl Into<String>) -> Self {
            Self {
                layer: layer.into(),
                ..Self::default()
            }
        }

        pub fn with_line_type(mut self, name: impl Into<String>) -> Self {
            self.line_type_name = Some(name.into());
            self
        }

        pub fn with_color(mut self, color: u32) -> Self {
            self.color = Some(color);
            self
        }

        pub fn hidden(mut self) -> Self {
            self.hidden = true;
            self
        }
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Document {
        entities: Vec<Entity>,
        tables: Tables,
        next_entity_id: u64,
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer("0");
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.tables
                .layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        /// 替换或新增图层定义。
        pub fn set_layer(&mut self, layer: Layer) {
            self.tables.layers.insert(layer.name.clone(), layer);
        }

        pub fn add_line_type(&mut self, line_type: LineType) {
            self.tables
                .line_types
                .insert(line_type.name.clone(), line_type);
        }

        pub fn add_line(
            &mut self,
            start: Point3,
            end: Point3,
            attributes: EntityAttributes,
        ) -> EntityId {
            self.add_kind(
                EntityKind::Line(Line {
                    start: Some(start),
                    end: Some(end),
                }),
                attributes,
            )
        }

        pub fn add_polyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            attributes: EntityAttributes,
        ) -> EntityId
        where
            I: IntoIterator<Item = PolylineVertex>,
        {
            let polyline = Polyline {
                vertices: Some(vertices.into_iter().collect()),
                is_closed,
            };
            self.add_kind(EntityKind::Polyline(polyline), attributes)
        }

        pub fn add_lwpolyline<I>(
            &mut self,
            vertices: I,
            is_closed: bool,
            attributes: EntityAttributes,
        ) -> EntityId
        where
            I: IntoIterator<Item = PolylineVertex>,
        {
            let polyline = Polyline {
                vertices: Some(vertices.into_iter().collect()),
                is_closed,
            };
            self.add_kind(EntityKind::LwPolyline(polyline), attributes)
        }

        /// 按解析结果原样加入实体（几何字段可能缺失）。
        pub fn add_kind(&mut self, kind: EntityKind, attributes: EntityAttributes) -> EntityId {
            let EntityAttributes {
                layer,
                line_type_name,
                color,
                hidden,
                handle,
            } = attributes;
            let layer = if layer.is_empty() {
                "0".to_string()
            } else {
                layer
            };
            self.ensure_layer(&layer);
            let id = self.next_id();
            self.entities.push(Entity {
                id,
                kind,
                layer,
                line_type_name,
                color,
                visible: !hidden,
                handle,
            });
            id
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &Entity> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities.iter().find(|entity| entity.id == id)
        }

        #[inline]
        pub fn tables(&self) -> &Tables {
            &self.tables
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.tables.layers.values()
        }

        #[inline]
        fn next_id(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn document_assigns_sequential_ids_and_layers() {
            let mut doc = Document::new();
            let line = doc.add_line(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                EntityAttributes::on_layer("GEOM"),
            );
            let poly = doc.add_lwpolyline(
                [
                    PolylineVertex::new(Point3::planar(0.0, 0.0)),
                    PolylineVertex::with_bulge(Point3::planar(5.0, 0.0), 1.0),
                    PolylineVertex::new(Point3::planar(5.0, 5.0)),
                ],
                true,
                EntityAttributes::default().with_line_type("DASHED"),
            );
            let circle = doc.add_kind(
                EntityKind::Unsupported("CIRCLE".to_string()),
                EntityAttributes::on_layer("ANNOT").hidden(),
            );

            assert_eq!(line.get(), 0);
            assert_eq!(poly.get(), 1);
            assert_eq!(circle.get(), 2);
            assert_eq!(doc.entities().count(), 3);

            let layers: Vec<_> = doc.layers().map(|layer| layer.name.clone()).collect();
            assert!(layers.contains(&"0".to_string()));
            assert!(layers.contains(&"GEOM".to_string()));
            assert!(layers.contains(&"ANNOT".to_string()));

            let stored = doc.entity(poly).expect("polyline should exist");
            assert_eq!(stored.layer, "0");
            assert_eq!(stored.kind.type_name(), "LWPOLYLINE");
            assert_eq!(stored.line_type_name.as_deref(), Some("DASHED"));
            match &stored.kind {
                EntityKind::LwPolyline(polyline) => {
                    assert!(polyline.is_closed);
                    let vertices = polyline.vertices.as_ref().expect("vertices");
                    assert!((vertices[1].bulge - 1.0).abs() < f64::EPSILON);
                }
                other => panic!("unexpected entity kind: {other:?}"),
            }

            let hidden = doc.entity(circle).expect("circle should exist");
            assert!(!hidden.visible);
            assert!(!hidden.kind.is_line_like());
        }

        #[test]
        fn line_type_lookup_falls_back_to_case_insensitive() {
            let mut doc = Document::new();
            doc.add_line_type(LineType::new("Dashed", vec![0.5, -0.25]));
            doc.add_line_type(LineType::new("CONTINUOUS", Vec::new()));

            let tables = doc.tables();
            assert!(tables.line_type("Dashed").expect("exact").is_dashed());
            assert!(tables.line_type("DASHED").expect("case-insensitive").is_dashed());
            assert!(!tables.line_type("continuous").expect("solid").is_dashed());
            assert!(tables.line_type("HIDDEN").is_none());
        }
    }
}
