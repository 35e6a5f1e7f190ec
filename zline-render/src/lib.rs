pub mod cache;
pub mod drawer;
pub mod geometry;
pub mod polyline;
pub mod scene;
pub mod style;
pub mod tessellate;
pub mod visibility;

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DrawError {
        #[error("entity {entity} is missing required field `{field}`")]
        MissingField { entity: u64, field: &'static str },
        #[error("entity {entity} has {points} points, exceeding the u32 index range")]
        IndexOverflow { entity: u64, points: usize },
        #[error("entity {entity} of type {kind} cannot be drawn as lines")]
        UnsupportedEntity { entity: u64, kind: String },
    }
}

pub use cache::{CacheStatus, DrawResult, EntityCache};
pub use drawer::{DrawerOptions, EntityDrawer};
pub use errors::DrawError;
pub use geometry::{LineGeometry, NormalizationTransform};
pub use scene::{LineGroup, RenderableLine};
pub use style::{LineMaterial, LineStyle, MaterialResolver, StyleMaterialResolver};
pub use tessellate::{ArcTessellator, BulgeArcTessellator};
pub use visibility::{LayerVisibility, VisibilityFilter};
