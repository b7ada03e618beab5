//! The instance store capability set and its key-normalizing front.
//!
//! Support matrix (`-` means [`StoreError::Unsupported`]):
//!
//! | operation                         | direct | generic | detached |
//! |-----------------------------------|--------|---------|----------|
//! | get / put / remove / put_if_absent| yes    | yes     | yes      |
//! | remove_if                         | atomic | racy    | atomic   |
//! | replace / replace_if              | atomic | -       | atomic   |
//! | clear                             | bags   | no-op   | all      |
//! | contains_key                      | yes    | yes     | yes      |
//! | entry_set                         | empty  | empty   | empty    |
//! | key_set / values / size / is_empty / contains_value | - | - | yes |
//!
//! `entry_set` returning nothing is a known limitation kept for every
//! strategy: the store is not meant to be iterated.

use crate::error::StoreError;
use crate::session::bag::InstanceBag;
use crate::session::contextual::{key_of, KeyRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Backing strategy of an instance store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStrategy {
    /// The session's native attribute map
    Direct,
    /// The session's public attribute accessors
    Generic,
    /// No session: an in-process map
    Detached,
}

impl StoreStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreStrategy::Direct => "direct",
            StoreStrategy::Generic => "generic",
            StoreStrategy::Detached => "detached",
        }
    }

    /// Strategy requested by a wrapper setting: `"direct"` selects the
    /// direct strategy, any other value the generic one
    pub fn from_wrapper_setting(setting: &str) -> Self {
        if setting == StoreStrategy::Direct.as_str() {
            StoreStrategy::Direct
        } else {
            StoreStrategy::Generic
        }
    }
}

impl fmt::Display for StoreStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map operations over normalized string keys.
///
/// Iteration-shaped operations default to failing loudly; only strategies
/// that can answer them truthfully override the defaults.
pub trait InstanceStore: Send + Sync + fmt::Debug {
    fn strategy(&self) -> StoreStrategy;

    fn get(&self, key: &str) -> Option<Arc<InstanceBag>>;

    /// Store `bag`, returning the bag previously stored under `key`
    fn put(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>>;

    fn remove(&self, key: &str) -> Option<Arc<InstanceBag>>;

    /// Remove `key` only while it still maps to `expected`
    fn remove_if(&self, key: &str, expected: &Arc<InstanceBag>) -> bool;

    /// Store `bag` unless `key` already holds one; returns the existing bag
    fn put_if_absent(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>>;

    /// Swap `old` for `new` only while `key` maps to `old`
    fn replace_if(
        &self,
        key: &str,
        old: &Arc<InstanceBag>,
        new: Arc<InstanceBag>,
    ) -> Result<bool, StoreError>;

    /// Store `bag` only if `key` is present; returns the replaced bag
    fn replace(&self, key: &str, bag: Arc<InstanceBag>)
        -> Result<Option<Arc<InstanceBag>>, StoreError>;

    fn clear(&self);

    fn contains_key(&self, key: &str) -> bool;

    fn entry_set(&self) -> Vec<(String, Arc<InstanceBag>)> {
        Vec::new()
    }

    fn key_set(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "key_set"))
    }

    fn values(&self) -> Result<Vec<Arc<InstanceBag>>, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "values"))
    }

    fn size(&self) -> Result<usize, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "size"))
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "is_empty"))
    }

    fn contains_value(&self, _bag: &Arc<InstanceBag>) -> Result<bool, StoreError> {
        Err(StoreError::unsupported(
            self.strategy().as_str(),
            "contains_value",
        ))
    }
}

/// Map front used by the session context: accepts contextuals or tokens as
/// keys and normalizes them with [`key_of`] before reaching the store
#[derive(Debug)]
pub struct ComponentInstanceMap {
    store: Box<dyn InstanceStore>,
}

impl ComponentInstanceMap {
    pub fn new(store: Box<dyn InstanceStore>) -> Self {
        Self { store }
    }

    pub fn strategy(&self) -> StoreStrategy {
        self.store.strategy()
    }

    pub fn get<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<Arc<InstanceBag>> {
        self.store.get(&key_of(key))
    }

    pub fn put<'k>(&self, key: impl Into<KeyRef<'k>>, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        self.store.put(&key_of(key), bag)
    }

    pub fn remove<'k>(&self, key: impl Into<KeyRef<'k>>) -> Option<Arc<InstanceBag>> {
        self.store.remove(&key_of(key))
    }

    pub fn remove_if<'k>(&self, key: impl Into<KeyRef<'k>>, expected: &Arc<InstanceBag>) -> bool {
        self.store.remove_if(&key_of(key), expected)
    }

    pub fn put_if_absent<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
        bag: Arc<InstanceBag>,
    ) -> Option<Arc<InstanceBag>> {
        self.store.put_if_absent(&key_of(key), bag)
    }

    pub fn replace_if<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
        old: &Arc<InstanceBag>,
        new: Arc<InstanceBag>,
    ) -> Result<bool, StoreError> {
        self.store.replace_if(&key_of(key), old, new)
    }

    pub fn replace<'k>(
        &self,
        key: impl Into<KeyRef<'k>>,
        bag: Arc<InstanceBag>,
    ) -> Result<Option<Arc<InstanceBag>>, StoreError> {
        self.store.replace(&key_of(key), bag)
    }

    pub fn put_all<'k, K, I>(&self, entries: I)
    where
        K: Into<KeyRef<'k>>,
        I: IntoIterator<Item = (K, Arc<InstanceBag>)>,
    {
        for (key, bag) in entries {
            self.put(key, bag);
        }
    }

    pub fn clear(&self) {
        self.store.clear()
    }

    pub fn contains_key<'k>(&self, key: impl Into<KeyRef<'k>>) -> bool {
        self.store.contains_key(&key_of(key))
    }

    pub fn entry_set(&self) -> Vec<(String, Arc<InstanceBag>)> {
        self.store.entry_set()
    }

    pub fn key_set(&self) -> Result<Vec<String>, StoreError> {
        self.store.key_set()
    }

    pub fn values(&self) -> Result<Vec<Arc<InstanceBag>>, StoreError> {
        self.store.values()
    }

    pub fn size(&self) -> Result<usize, StoreError> {
        self.store.size()
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.store.is_empty()
    }

    pub fn contains_value(&self, bag: &Arc<InstanceBag>) -> Result<bool, StoreError> {
        self.store.contains_value(bag)
    }
}
