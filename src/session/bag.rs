//! Instance bags: the unit of state the instance store holds per contextual.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A session attribute value; sessions hold heterogeneous values
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// A contextual instance together with the key it is stored under.
///
/// Bags compare by identity: two bags are the same only if they are the
/// same allocation.
pub struct InstanceBag {
    key: String,
    instance: AttributeValue,
}

impl InstanceBag {
    pub fn new<T: Any + Send + Sync>(key: impl Into<String>, instance: T) -> Self {
        Self {
            key: key.into(),
            instance: Arc::new(instance),
        }
    }

    pub fn shared<T: Any + Send + Sync>(key: impl Into<String>, instance: T) -> Arc<Self> {
        Arc::new(Self::new(key, instance))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn instance(&self) -> &AttributeValue {
        &self.instance
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.instance).downcast_ref::<T>()
    }

    pub fn same(a: &Arc<InstanceBag>, b: &Arc<InstanceBag>) -> bool {
        Arc::ptr_eq(a, b)
    }
}

impl fmt::Debug for InstanceBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceBag")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Wrap a bag as a session attribute value
pub fn to_attribute(bag: Arc<InstanceBag>) -> AttributeValue {
    bag
}

/// The bag stored in `value`, if it is one
pub fn as_bag(value: &AttributeValue) -> Option<Arc<InstanceBag>> {
    Arc::clone(value).downcast::<InstanceBag>().ok()
}

pub fn is_bag(value: &AttributeValue) -> bool {
    (**value).is::<InstanceBag>()
}

/// Whether `value` is exactly the allocation behind `bag`
pub fn is_same_bag(value: &AttributeValue, bag: &Arc<InstanceBag>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(value).cast::<()>(),
        Arc::as_ptr(bag).cast::<()>(),
    )
}
