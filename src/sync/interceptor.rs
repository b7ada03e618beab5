//! Lifecycle interceptors and the invocation chain they run in.

use crate::error::SyncError;
use crate::sync::resolve::ResolvedCallback;
use crate::sync::{CallbackSlot, SyncEvent};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub(crate) type InterceptorFn =
    Arc<dyn Fn(&mut InvocationContext<'_>) -> Result<(), SyncError> + Send + Sync>;

/// An interceptor class with at most one handler per slot.
///
/// Every handler must call [`InvocationContext::proceed`] to continue the
/// chain; a handler that returns without proceeding keeps later interceptors
/// and the bean's own callback from firing.
#[derive(Clone)]
pub struct InterceptorClass {
    name: String,
    handlers: BTreeMap<CallbackSlot, InterceptorFn>,
}

impl InterceptorClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: BTreeMap::new(),
        }
    }

    /// Register the handler for `slot`, replacing any previous one
    pub fn on<F>(mut self, slot: CallbackSlot, handler: F) -> Self
    where
        F: Fn(&mut InvocationContext<'_>) -> Result<(), SyncError> + Send + Sync + 'static,
    {
        self.handlers.insert(slot, Arc::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handles(&self, slot: CallbackSlot) -> bool {
        self.handlers.contains_key(&slot)
    }

    pub(crate) fn handler(&self, slot: CallbackSlot) -> Option<&InterceptorFn> {
        self.handlers.get(&slot)
    }
}

impl fmt::Debug for InterceptorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorClass")
            .field("name", &self.name)
            .field("slots", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// State of one slot firing as it moves through the interceptor chain
pub struct InvocationContext<'a> {
    bean: &'a str,
    event: &'a SyncEvent,
    interceptors: &'a [Arc<InterceptorClass>],
    target: Option<&'a ResolvedCallback>,
    instance: &'a mut (dyn Any + Send),
}

impl<'a> InvocationContext<'a> {
    pub(crate) fn new(
        bean: &'a str,
        event: &'a SyncEvent,
        interceptors: &'a [Arc<InterceptorClass>],
        target: Option<&'a ResolvedCallback>,
        instance: &'a mut (dyn Any + Send),
    ) -> Self {
        Self {
            bean,
            event,
            interceptors,
            target,
            instance,
        }
    }

    pub fn bean_name(&self) -> &str {
        self.bean
    }

    pub fn slot(&self) -> CallbackSlot {
        self.event.slot
    }

    pub fn event(&self) -> &SyncEvent {
        self.event
    }

    /// Bean method the chain ends in, if it has not run yet
    pub fn target_method(&self) -> Option<&str> {
        self.target.map(|t| t.method.as_str())
    }

    /// Invoke the next interceptor handling this slot, or the bean callback
    /// once the interceptors are exhausted
    pub fn proceed(&mut self) -> Result<(), SyncError> {
        let slot = self.event.slot;
        let mut remaining = self.interceptors;
        while let Some((next, rest)) = remaining.split_first() {
            remaining = rest;
            if let Some(handler) = next.handler(slot) {
                self.interceptors = remaining;
                return handler(self);
            }
        }
        self.interceptors = remaining;

        match self.target.take() {
            Some(target) => (target.call)(&mut *self.instance, self.event),
            None => Ok(()),
        }
    }

    pub(crate) fn target_reached(&self) -> bool {
        self.target.is_none()
    }
}
