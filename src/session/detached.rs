//! In-process store used when no session is available.

use crate::error::StoreError;
use crate::session::bag::InstanceBag;
use crate::session::store::{InstanceStore, StoreStrategy};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Owns its map outright, so every operation is atomic and every
/// enumeration is answerable
#[derive(Debug, Default)]
pub struct DetachedMap {
    bags: RwLock<HashMap<String, Arc<InstanceBag>>>,
}

impl DetachedMap {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InstanceStore for DetachedMap {
    fn strategy(&self) -> StoreStrategy {
        StoreStrategy::Detached
    }

    fn get(&self, key: &str) -> Option<Arc<InstanceBag>> {
        self.bags.read().get(key).cloned()
    }

    fn put(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        self.bags.write().insert(key.to_string(), bag)
    }

    fn remove(&self, key: &str) -> Option<Arc<InstanceBag>> {
        self.bags.write().remove(key)
    }

    fn remove_if(&self, key: &str, expected: &Arc<InstanceBag>) -> bool {
        let mut bags = self.bags.write();
        let hit = bags
            .get(key)
            .is_some_and(|current| InstanceBag::same(current, expected));
        if hit {
            bags.remove(key);
        }
        hit
    }

    fn put_if_absent(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        let mut bags = self.bags.write();
        if let Some(existing) = bags.get(key) {
            return Some(existing.clone());
        }
        bags.insert(key.to_string(), bag);
        None
    }

    fn replace_if(
        &self,
        key: &str,
        old: &Arc<InstanceBag>,
        new: Arc<InstanceBag>,
    ) -> Result<bool, StoreError> {
        let mut bags = self.bags.write();
        match bags.get_mut(key) {
            Some(current) if InstanceBag::same(current, old) => {
                *current = new;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn replace(
        &self,
        key: &str,
        bag: Arc<InstanceBag>,
    ) -> Result<Option<Arc<InstanceBag>>, StoreError> {
        Ok(self
            .bags
            .write()
            .get_mut(key)
            .map(|current| std::mem::replace(current, bag)))
    }

    fn clear(&self) {
        let mut bags = self.bags.write();
        debug!(removed = bags.len(), "cleared detached instance store");
        bags.clear();
    }

    fn contains_key(&self, key: &str) -> bool {
        self.bags.read().contains_key(key)
    }

    fn key_set(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.bags.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn values(&self) -> Result<Vec<Arc<InstanceBag>>, StoreError> {
        Ok(self.bags.read().values().cloned().collect())
    }

    fn size(&self) -> Result<usize, StoreError> {
        Ok(self.bags.read().len())
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.bags.read().is_empty())
    }

    fn contains_value(&self, bag: &Arc<InstanceBag>) -> Result<bool, StoreError> {
        Ok(self
            .bags
            .read()
            .values()
            .any(|current| InstanceBag::same(current, bag)))
    }
}
