//! Session provider surface consumed by the instance store.

use crate::session::bag::AttributeValue;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The session's own attribute map, shared with whoever is granted it
pub type NativeAttributes = Arc<RwLock<HashMap<String, AttributeValue>>>;

/// An HTTP-session-like attribute holder.
///
/// `native_attributes` is the optional fast path: a provider that keeps its
/// attributes in a concurrent map may hand that map out. Returning `None` is
/// the ordinary case and selects the generic store strategy.
pub trait HttpSession: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
    fn get_attribute(&self, name: &str) -> Option<AttributeValue>;
    fn set_attribute(&self, name: &str, value: AttributeValue);
    fn remove_attribute(&self, name: &str);

    /// False once the session has been invalidated; stores stop writing then
    fn is_valid(&self) -> bool {
        true
    }

    fn native_attributes(&self) -> Option<NativeAttributes> {
        None
    }
}

/// In-memory session that owns a native attribute map
pub struct StandardSession {
    id: String,
    attributes: NativeAttributes,
    valid: AtomicBool,
}

impl StandardSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Arc::new(RwLock::new(HashMap::new())),
            valid: AtomicBool::new(true),
        }
    }

    pub fn shared(id: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(id))
    }

    /// End the session and drop every attribute, store-owned or not
    pub fn invalidate(&self) {
        if self.valid.swap(false, Ordering::AcqRel) {
            let dropped = {
                let mut attributes = self.attributes.write();
                let count = attributes.len();
                attributes.clear();
                count
            };
            debug!(session = %self.id, attributes = dropped, "session invalidated");
        }
    }

    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attributes.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl HttpSession for StandardSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: AttributeValue) {
        if !self.is_valid() {
            warn!(session = %self.id, attribute = %name, "ignoring write to invalidated session");
            return;
        }
        self.attributes.write().insert(name.to_string(), value);
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.write().remove(name);
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    fn native_attributes(&self) -> Option<NativeAttributes> {
        Some(self.attributes.clone())
    }
}

impl fmt::Debug for StandardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardSession")
            .field("id", &self.id)
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Client-facing wrapper that forwards everything to the session it wraps,
/// including access to the native attribute map
#[derive(Debug, Clone)]
pub struct SessionFacade {
    inner: Arc<dyn HttpSession>,
}

impl SessionFacade {
    pub fn new(inner: Arc<dyn HttpSession>) -> Self {
        Self { inner }
    }
}

impl HttpSession for SessionFacade {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.inner.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: AttributeValue) {
        self.inner.set_attribute(name, value)
    }

    fn remove_attribute(&self, name: &str) {
        self.inner.remove_attribute(name)
    }

    fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }

    fn native_attributes(&self) -> Option<NativeAttributes> {
        self.inner.native_attributes()
    }
}
