//! Store over the session's native attribute map.
//!
//! Compound operations hold the map's write lock for their whole duration,
//! so they are atomic with respect to every other writer of that map,
//! including the session's own accessors.

use crate::error::StoreError;
use crate::session::bag::{as_bag, is_bag, is_same_bag, to_attribute, AttributeValue, InstanceBag};
use crate::session::provider::{HttpSession, NativeAttributes};
use crate::session::store::{InstanceStore, StoreStrategy};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct DirectSessionMap {
    attributes: NativeAttributes,
    session: Option<Arc<dyn HttpSession>>,
}

impl DirectSessionMap {
    pub fn new(attributes: NativeAttributes) -> Self {
        Self {
            attributes,
            session: None,
        }
    }

    /// Tie the map to the session that owns it; writes stop once it is invalidated
    pub fn bound_to(mut self, session: Arc<dyn HttpSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// Checked while the write lock is held, so a write either lands before
    /// invalidation clears the map or is refused.
    fn accepts_writes(&self, key: &str, operation: &'static str) -> bool {
        match &self.session {
            Some(session) if !session.is_valid() => {
                warn!(
                    session = %session.id(),
                    key = %key,
                    operation,
                    "session invalidated; instance store write dropped"
                );
                false
            }
            _ => true,
        }
    }
}

fn warn_if_foreign(attributes: &HashMap<String, AttributeValue>, key: &str) {
    if attributes.get(key).is_some_and(|value| !is_bag(value)) {
        warn!(key = %key, "overwriting foreign session attribute with instance bag");
    }
}

impl fmt::Debug for DirectSessionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectSessionMap")
            .field("attributes", &self.attributes.read().len())
            .field("session", &self.session.as_ref().map(|session| session.id()))
            .finish()
    }
}

impl InstanceStore for DirectSessionMap {
    fn strategy(&self) -> StoreStrategy {
        StoreStrategy::Direct
    }

    fn get(&self, key: &str) -> Option<Arc<InstanceBag>> {
        self.attributes.read().get(key).and_then(as_bag)
    }

    fn put(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        let mut attributes = self.attributes.write();
        if !self.accepts_writes(key, "put") {
            return None;
        }
        warn_if_foreign(&attributes, key);
        attributes
            .insert(key.to_string(), to_attribute(bag))
            .as_ref()
            .and_then(as_bag)
    }

    fn remove(&self, key: &str) -> Option<Arc<InstanceBag>> {
        let mut attributes = self.attributes.write();
        if !attributes.get(key).is_some_and(is_bag) {
            return None;
        }
        attributes.remove(key).as_ref().and_then(as_bag)
    }

    fn remove_if(&self, key: &str, expected: &Arc<InstanceBag>) -> bool {
        let mut attributes = self.attributes.write();
        let matches = attributes
            .get(key)
            .is_some_and(|value| is_same_bag(value, expected));
        if matches {
            attributes.remove(key);
        }
        matches
    }

    fn put_if_absent(&self, key: &str, bag: Arc<InstanceBag>) -> Option<Arc<InstanceBag>> {
        let mut attributes = self.attributes.write();
        if let Some(existing) = attributes.get(key).and_then(as_bag) {
            return Some(existing);
        }
        if !self.accepts_writes(key, "put_if_absent") {
            return None;
        }
        warn_if_foreign(&attributes, key);
        attributes.insert(key.to_string(), to_attribute(bag));
        None
    }

    fn replace_if(
        &self,
        key: &str,
        old: &Arc<InstanceBag>,
        new: Arc<InstanceBag>,
    ) -> Result<bool, StoreError> {
        let mut attributes = self.attributes.write();
        if !self.accepts_writes(key, "replace_if") {
            return Ok(false);
        }
        match attributes.get_mut(key) {
            Some(value) if is_same_bag(value, old) => {
                *value = to_attribute(new);
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
        let mut attributes = self.attributes.write();
        if !self.accepts_writes(key, "replace") {
            return Ok(None);
        }
        match attributes.get_mut(key) {
            Some(value) => {
                let previous = as_bag(value);
                if previous.is_none() {
                    warn!(key = %key, "overwriting foreign session attribute with instance bag");
                }
                *value = to_attribute(bag);
                Ok(previous)
            }
            None => Ok(None),
        }
    }

    /// Drop every instance bag; other session attributes stay
    fn clear(&self) {
        let mut attributes = self.attributes.write();
        let before = attributes.len();
        attributes.retain(|_, value| !is_bag(value));
        debug!(removed = before - attributes.len(), "cleared instance bags from session");
    }

    fn contains_key(&self, key: &str) -> bool {
        self.attributes.read().get(key).is_some_and(is_bag)
    }
}
