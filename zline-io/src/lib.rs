use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use zline_core::{
    document::{
        Document, EntityAttributes, EntityKind, Layer, Line, LineType, Polyline, PolylineVertex,
    },
    geometry::Point3,
};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse drawing data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

/// 读取 DXF 解析器输出的 JSON（`entities` + `tables`），转换为内部文档。
pub struct JsonDocumentLoader;

impl JsonDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load_str(&self, source: &str) -> Result<Document, IoError> {
        let parsed: ParsedDocument = serde_json::from_str(source)?;
        parsed.into_document()
    }
}

impl Default for JsonDocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentLoader for JsonDocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&data)
    }
}

#[derive(Debug, Deserialize)]
struct ParsedDocument {
    #[serde(default)]
    entities: Vec<ParsedEntity>,
    #[serde(default)]
    tables: ParsedTables,
}

#[derive(Debug, Default, Deserialize)]
struct ParsedTables {
    #[serde(default)]
    ltypes: HashMap<String, ParsedLineType>,
    #[serde(default)]
    layers: HashMap<String, ParsedLayer>,
}

#[derive(Debug, Deserialize)]
struct ParsedLineType {
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pattern: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct ParsedLayer {
    name: Option<String>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    frozen: bool,
    #[serde(default)]
    color: Option<u32>,
    #[serde(default, rename = "trueColor")]
    true_color: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedEntity {
    #[serde(rename = "type")]
    kind: String,
    handle: Option<String>,
    #[serde(default)]
    layer: String,
    line_type_name: Option<String>,
    #[serde(default)]
    color: Option<u32>,
    #[serde(default)]
    true_color: Option<u32>,
    #[serde(default = "default_true")]
    visible: bool,
    start: Option<ParsedPoint>,
    end: Option<ParsedPoint>,
    vertices: Option<Vec<ParsedVertex>>,
    #[serde(default)]
    closed: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ParsedPoint {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
}

impl From<ParsedPoint> for Point3 {
    fn from(value: ParsedPoint) -> Self {
        Point3::new(value.x, value.y, value.z)
    }
}

#[derive(Debug, Deserialize)]
struct ParsedVertex {
    x: f64,
    y: f64,
    #[serde(default)]
    z: f64,
    #[serde(default)]
    bulge: f64,
}

fn default_true() -> bool {
    true
}

impl ParsedDocument {
    fn into_document(self) -> Result<Document, IoError> {
        let mut document = Document::new();

        for (key, layer) in self.tables.layers {
            let name = layer.name.unwrap_or(key);
            if name.is_empty() {
                return Err(IoError::InvalidDocument("图层名称为空".to_string()));
            }
            document.set_layer(Layer {
                name,
                is_visible: layer.visible,
                is_frozen: layer.frozen,
                color: layer.true_color.or(layer.color),
            });
        }

        for (key, ltype) in self.tables.ltypes {
            let name = ltype.name.unwrap_or(key);
            if name.is_empty() {
                return Err(IoError::InvalidDocument("线型名称为空".to_string()));
            }
            document.add_line_type(LineType {
                name,
                description: ltype.description,
                pattern: ltype.pattern,
            });
        }

        for entity in self.entities {
            let kind = match entity.kind.to_ascii_uppercase().as_str() {
                "LINE" => EntityKind::Line(convert_line(
                    entity.start,
                    entity.end,
                    entity.vertices.as_deref(),
                )),
                "POLYLINE" => {
                    EntityKind::Polyline(convert_polyline(entity.vertices, entity.closed))
                }
                "LWPOLYLINE" => {
                    EntityKind::LwPolyline(convert_polyline(entity.vertices, entity.closed))
                }
                _ => EntityKind::Unsupported(entity.kind),
            };
            let attributes = EntityAttributes {
                layer: entity.layer,
                line_type_name: entity.line_type_name,
                color: entity.true_color.or(entity.color),
                hidden: !entity.visible,
                handle: entity.handle,
            };
            document.add_kind(kind, attributes);
        }

        Ok(document)
    }
}

/// 部分解析器把 LINE 端点写成两个顶点的 `vertices`。
fn convert_line(
    start: Option<ParsedPoint>,
    end: Option<ParsedPoint>,
    vertices: Option<&[ParsedVertex]>,
) -> Line {
    let vertex_point = |index: usize| {
        vertices
            .and_then(|vertices| vertices.get(index))
            .map(|vertex| Point3::new(vertex.x, vertex.y, vertex.z))
    };
    Line {
        start: start.map(Point3::from).or_else(|| vertex_point(0)),
        end: end.map(Point3::from).or_else(|| vertex_point(1)),
    }
}

fn convert_polyline(vertices: Option<Vec<ParsedVertex>>, is_closed: bool) -> Polyline {
    Polyline {
        vertices: vertices.map(|vertices| {
            vertices
                .into_iter()
                .map(|vertex| {
                    let position = Point3::new(vertex.x, vertex.y, vertex.z);
                    PolylineVertex::with_bulge(position, vertex.bulge)
                })
                .collect()
        }),
        is_closed,
    }
}
