use zline_core::document::{Entity, Tables};

pub trait VisibilityFilter {
    fn is_hidden(&self, entity: &Entity, tables: &Tables) -> bool;
}

/// 实体自身不可见，或所在图层关闭/冻结时隐藏。
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerVisibility;

impl VisibilityFilter for LayerVisibility {
    fn is_hidden(&self, entity: &Entity, tables: &Tables) -> bool {
        if !entity.visible {
            return true;
        }
        tables
            .layer(&entity.layer)
            .is_some_and(|layer| !layer.is_visible || layer.is_frozen)
    }
}
