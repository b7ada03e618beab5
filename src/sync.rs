//! Transaction Synchronization
//!
//! Stateful beans observe three transaction boundaries: after-begin,
//! before-completion and after-completion. Callbacks come from one of three
//! registration sources (lifecycle interface, annotation markers, deployment
//! descriptor) and are resolved once per bean class into a [`CallbackTable`].
//! At runtime the [`SynchronizationDispatcher`] walks the bound interceptors
//! for a slot and then the bean's own callback.

pub mod bean;
pub mod dispatch;
pub mod interceptor;
pub mod resolve;
pub mod transaction;

pub use bean::{
    BeanClass, BeanClassBuilder, BeanInstance, BusinessResult, SessionSynchronization,
    TransactionAttribute, SESSION_SYNCHRONIZATION_METHODS,
};
pub use dispatch::SynchronizationDispatcher;
pub use interceptor::{InterceptorClass, InvocationContext};
pub use resolve::{
    resolve_callbacks, CallbackTable, NamedMethod, RegistrationSource, ResolvedCallback,
    SyncDescriptor,
};
pub use transaction::{Transaction, TransactionScope, TransactionStatus};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three transaction-boundary callback points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackSlot {
    AfterBegin,
    BeforeCompletion,
    AfterCompletion,
}

impl CallbackSlot {
    /// Slots in firing order
    pub const ALL: [CallbackSlot; 3] = [
        CallbackSlot::AfterBegin,
        CallbackSlot::BeforeCompletion,
        CallbackSlot::AfterCompletion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CallbackSlot::AfterBegin => "after_begin",
            CallbackSlot::BeforeCompletion => "before_completion",
            CallbackSlot::AfterCompletion => "after_completion",
        }
    }
}

impl fmt::Display for CallbackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A slot being fired, with the transaction outcome for after-completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEvent {
    pub slot: CallbackSlot,
    /// Only meaningful for [`CallbackSlot::AfterCompletion`]
    pub committed: bool,
}

impl SyncEvent {
    pub fn after_begin() -> Self {
        Self {
            slot: CallbackSlot::AfterBegin,
            committed: false,
        }
    }

    pub fn before_completion() -> Self {
        Self {
            slot: CallbackSlot::BeforeCompletion,
            committed: false,
        }
    }

    pub fn after_completion(committed: bool) -> Self {
        Self {
            slot: CallbackSlot::AfterCompletion,
            committed,
        }
    }
}
