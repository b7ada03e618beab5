//! Session-scoped context: resolves contextual instances through the store.

use crate::session::bag::InstanceBag;
use crate::session::contextual::{key_of, KeyRef};
use crate::session::detached::DetachedMap;
use crate::session::direct::DirectSessionMap;
use crate::session::generic::HttpSessionMap;
use crate::session::provider::HttpSession;
use crate::error::StoreError;
use crate::session::store::{ComponentInstanceMap, InstanceStore, StoreStrategy};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, warn};

fn default_wrapper() -> String {
    StoreStrategy::Direct.as_str().to_string()
}

/// `[session_context]` configuration table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContextConfig {
    /// `"direct"` to use the session's native map when it is exposed; any
    /// other value selects the generic accessors
    #[serde(default = "default_wrapper")]
    pub wrapper: String,
}

impl Default for SessionContextConfig {
    fn default() -> Self {
        Self {
            wrapper: default_wrapper(),
        }
    }
}

impl SessionContextConfig {
    pub fn strategy(&self) -> StoreStrategy {
        StoreStrategy::from_wrapper_setting(&self.wrapper)
    }
}

#[derive(Debug)]
pub struct SessionContext {
    session: Option<Arc<dyn HttpSession>>,
    instances: ComponentInstanceMap,
}

impl SessionContext {
    /// Build the context for `session`, or a detached one if there is none
    pub fn new(session: Option<Arc<dyn HttpSession>>, config: &SessionContextConfig) -> Self {
        let store: Box<dyn InstanceStore> = match &session {
            None => Box::new(DetachedMap::new()),
            Some(session) => match config.strategy() {
                StoreStrategy::Direct => match session.native_attributes() {
                    Some(native) => {
                        Box::new(DirectSessionMap::new(native).bound_to(session.clone()))
                    }
                    None => {
                        debug!(
                            session = %session.id(),
                            "session exposes no native attribute map; using generic store"
                        );
                        Box::new(HttpSessionMap::new(session.clone()))
                    }
                },
                _ => Box::new(HttpSessionMap::new(session.clone())),
            },
        };
        debug!(strategy = %store.strategy(), "session context created");
        Self {
            session,
            instances: ComponentInstanceMap::new(store),
        }
    }

    pub fn detached() -> Self {
        Self::new(None, &SessionContextConfig::default())
    }

    pub fn strategy(&self) -> StoreStrategy {
        self.instances.strategy()
    }

    pub fn instances(&self) -> &ComponentInstanceMap {
        &self.instances
    }

    pub fn get<'k>(&self, contextual: impl Into<KeyRef<'k>>) -> Option<Arc<InstanceBag>> {
        self.instances.get(contextual)
    }

    /// False once the backing session has been invalidated
    pub fn is_active(&self) -> bool {
        self.session.as_ref().map_or(true, |session| session.is_valid())
    }

    /// The stored bag for `contextual`, creating it if absent.
    ///
    /// Concurrent callers may each run `create`, but all of them receive the
    /// bag that won the insert. Fails without running `create` once the
    /// session is invalidated.
    pub fn get_or_create<'k, T, F>(
        &self,
        contextual: impl Into<KeyRef<'k>>,
        create: F,
    ) -> Result<Arc<InstanceBag>, StoreError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let key = key_of(contextual);
        if let Some(existing) = self.instances.get(&*key) {
            return Ok(existing);
        }
        self.ensure_active(&key)?;
        let bag = InstanceBag::shared(&*key, create());
        match self.instances.put_if_absent(&*key, bag.clone()) {
            Some(winner) => Ok(winner),
            None => {
                // The session may have been invalidated between the check and the insert
                self.ensure_active(&key)?;
                debug!(key = %key, "created contextual instance");
                Ok(bag)
            }
        }
    }

    fn ensure_active(&self, key: &str) -> Result<(), StoreError> {
        match &self.session {
            Some(session) if !session.is_valid() => {
                warn!(session = %session.id(), key = %key, "contextual requested from invalidated session");
                Err(StoreError::SessionInvalidated {
                    session: session.id().to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn destroy<'k>(&self, contextual: impl Into<KeyRef<'k>>) -> Option<Arc<InstanceBag>> {
        self.instances.remove(contextual)
    }

    pub fn destroy_all(&self) {
        self.instances.clear()
    }
}
