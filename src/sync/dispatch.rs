//! Synchronization dispatch: route each slot event through the interceptor
//! chain and then to the bean.

use crate::error::SyncError;
use crate::sync::interceptor::{InterceptorClass, InvocationContext};
use crate::sync::resolve::CallbackTable;
use crate::sync::{CallbackSlot, SyncEvent};
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, trace};

/// Precomputed dispatch state for one deployed bean
#[derive(Debug, Clone)]
pub struct SynchronizationDispatcher {
    bean: String,
    callbacks: CallbackTable,
    interceptors: Vec<Arc<InterceptorClass>>,
}

impl SynchronizationDispatcher {
    pub fn new(
        bean: impl Into<String>,
        callbacks: CallbackTable,
        interceptors: Vec<Arc<InterceptorClass>>,
    ) -> Self {
        Self {
            bean: bean.into(),
            callbacks,
            interceptors,
        }
    }

    pub fn bean_name(&self) -> &str {
        &self.bean
    }

    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    pub fn interceptors(&self) -> &[Arc<InterceptorClass>] {
        &self.interceptors
    }

    /// Whether anything at all observes `slot` for this bean
    pub fn observes(&self, slot: CallbackSlot) -> bool {
        self.callbacks.get(slot).is_some() || self.interceptors.iter().any(|i| i.handles(slot))
    }

    /// Fire `event` against `instance`: interceptors in binding order, then
    /// the bean callback for the slot if the chain proceeds that far
    pub fn fire(&self, event: &SyncEvent, instance: &mut (dyn Any + Send)) -> Result<(), SyncError> {
        if !self.observes(event.slot) {
            return Ok(());
        }
        trace!(bean = %self.bean, slot = %event.slot, "firing synchronization event");

        let target = self.callbacks.get(event.slot);
        let mut ctx = InvocationContext::new(&self.bean, event, &self.interceptors, target, instance);
        let result = ctx.proceed();

        if result.is_ok() && !ctx.target_reached() {
            debug!(
                bean = %self.bean,
                slot = %event.slot,
                method = ctx.target_method().unwrap_or_default(),
                "interceptor chain did not proceed; bean callback skipped"
            );
        }
        result
    }
}
