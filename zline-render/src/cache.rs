use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use zline_core::document::{Entity, EntityId};
use zline_core::geometry::{Point3, Vector3};

use crate::geometry::{LineGeometry, NormalizationTransform};
use crate::style::LineMaterial;

/// 单个实体的绘制结果，也是缓存单元。几何为归一化后的局部坐标。
#[derive(Debug, Clone)]
pub struct DrawResult {
    pub geometry: Arc<LineGeometry>,
    pub material: Arc<LineMaterial>,
    pub position: Point3,
    pub scale: Vector3,
}

impl DrawResult {
    pub fn new(
        geometry: LineGeometry,
        material: Arc<LineMaterial>,
        transform: NormalizationTransform,
    ) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material,
            position: transform.position,
            scale: transform.scale,
        }
    }

    #[inline]
    pub fn transform(&self) -> NormalizationTransform {
        NormalizationTransform {
            position: self.position,
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// 从实体推导缓存键。
pub type CacheKeyFn = fn(&Entity) -> EntityId;

fn entity_id_key(entity: &Entity) -> EntityId {
    entity.id
}

/// 实体 → 绘制结果缓存。条目只增不减，生命周期与所属绘制器一致。
#[derive(Debug, Clone)]
pub struct EntityCache {
    entries: HashMap<EntityId, DrawResult>,
    key: CacheKeyFn,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::with_key(entity_id_key)
    }

    /// 使用自定义键函数，例如按 DXF 句柄区分实体。
    pub fn with_key(key: CacheKeyFn) -> Self {
        Self {
            entries: HashMap::new(),
            key,
        }
    }

    #[inline]
    pub fn key_of(&self, entity: &Entity) -> EntityId {
        (self.key)(entity)
    }

    #[inline]
    pub fn get(&self, entity: &Entity) -> Option<&DrawResult> {
        self.entries.get(&self.key_of(entity))
    }

    #[inline]
    pub fn contains(&self, entity: &Entity) -> bool {
        self.entries.contains_key(&self.key_of(entity))
    }

    /// 写入结果，返回同键的旧值。
    pub fn insert(&mut self, entity: &Entity, result: DrawResult) -> Option<DrawResult> {
        let key = self.key_of(entity);
        self.entries.insert(key, result)
    }

    /// 命中时直接返回已有结果；未命中时调用 `build` 并写入。
    /// 每个键至多构建一次，构建失败不写入缓存。
    pub fn get_or_try_insert_with<F, E>(
        &mut self,
        entity: &Entity,
        build: F,
    ) -> Result<(&DrawResult, CacheStatus), E>
    where
        F: FnOnce() -> Result<DrawResult, E>,
    {
        let key = self.key_of(entity);
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok((entry.into_mut(), CacheStatus::Hit)),
            Entry::Vacant(entry) => {
                let result = build()?;
                Ok((entry.insert(result), CacheStatus::Miss))
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}
