//! Store over the session's public attribute accessors.
//!
//! The session exposes no compare-and-set, so compound operations are
//! read-then-write sequences and may interleave with concurrent writers.

use crate::error::StoreError;
use crate::session::bag::{as_bag, is_bag, is_same_bag, to_attribute, InstanceBag};
use crate::session::provider::HttpSession;
use crate::session::store::{InstanceStore, StoreStrategy};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct HttpSessionMap {
    session: Arc<dyn HttpSession>,
}

impl HttpSessionMap {
    pub fn new(session: Arc<dyn HttpSession>) -> Self {
        Self { session }
    }

    fn accepts_writes(&self, key: &str, operation: &'static str) -> bool {
        if self.session.is_valid() {
            return true;
        }
        warn!(
            session = %self.session.id(),
            key = %key,
            operation,
            "session invalidated; instance store write dropped"
        );
        false
    }
}

impl InstanceStore for HttpSessionMap {
    fn strategy(&self) -> StoreStrategy {
        StoreStrategy::Generic
    }

    fn get(&self, key: &str) -> Option<Arc<InstanceBag>> {
        self.session.get_attribute(key).as_ref().and_then(as_bag)
    }

    fn put(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        if !self.accepts_writes(key, "put") {
            return None;
        }
        let previous = self.get(key);
        self.session.set_attribute(key, to_attribute(bag));
        previous
    }

    fn remove(&self, key: &str) -> Option<Arc<InstanceBag>> {
        let previous = self.get(key)?;
        self.session.remove_attribute(key);
        Some(previous)
    }

    fn remove_if(&self, key: &str, expected: &Arc<InstanceBag>) -> bool {
        let current = self.session.get_attribute(key);
        if !current.as_ref().is_some_and(|value| is_same_bag(value, expected)) {
            return false;
        }
        self.session.remove_attribute(key);
        true
    }

    fn put_if_absent(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        let current = self.session.get_attribute(key);
        if let Some(existing) = current.as_ref().and_then(as_bag) {
            return Some(existing);
        }
        if !self.accepts_writes(key, "put_if_absent") {
            return None;
        }
        if current.is_some() {
            warn!(key = %key, "overwriting foreign session attribute with instance bag");
        }
        self.session.set_attribute(key, to_attribute(bag));
        None
    }

    fn replace_if(
        &self,
        _key: &str,
        _old: &Arc<InstanceBag>,
        _new: Arc<InstanceBag>,
    ) -> Result<bool, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "replace_if"))
    }

    fn replace(
        &self,
        _key: &str,
        _bag: Arc<InstanceBag>,
    ) -> Result<Option<Arc<InstanceBag>>, StoreError> {
        Err(StoreError::unsupported(self.strategy().as_str(), "replace"))
    }

    /// The accessors cannot enumerate attributes, so there is nothing to clear
    fn clear(&self) {
        debug!(session = %self.session.id(), "generic session store cannot enumerate; clear skipped");
    }

    fn contains_key(&self, key: &str) -> bool {
        self.session.get_attribute(key).as_ref().is_some_and(is_bag)
    }
}
