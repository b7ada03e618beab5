//! Callback resolution: merge the three registration sources into one table.
//!
//! Precedence per slot: deployment descriptor, then annotation marker, then
//! the [`SessionSynchronization`](crate::sync::SessionSynchronization)
//! interface. Resolution happens once at deployment; dispatch never looks at
//! the sources again.

use crate::error::AssemblyError;
use crate::sync::bean::{interface_method, BeanClass, CallbackFn};
use crate::sync::CallbackSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Where a resolved callback came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationSource {
    Interface,
    Annotation,
    Descriptor,
}

/// Method reference in a deployment descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedMethod {
    pub method_name: String,
}

impl NamedMethod {
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
        }
    }
}

/// Deployment-plan synchronization settings for one bean
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncDescriptor {
    #[serde(default)]
    pub after_begin_method: Option<NamedMethod>,
    #[serde(default)]
    pub before_completion_method: Option<NamedMethod>,
    #[serde(default)]
    pub after_completion_method: Option<NamedMethod>,
}

impl SyncDescriptor {
    pub fn method(&self, slot: CallbackSlot) -> Option<&NamedMethod> {
        match slot {
            CallbackSlot::AfterBegin => self.after_begin_method.as_ref(),
            CallbackSlot::BeforeCompletion => self.before_completion_method.as_ref(),
            CallbackSlot::AfterCompletion => self.after_completion_method.as_ref(),
        }
    }

    pub fn set_method(&mut self, slot: CallbackSlot, method: NamedMethod) {
        let target = match slot {
            CallbackSlot::AfterBegin => &mut self.after_begin_method,
            CallbackSlot::BeforeCompletion => &mut self.before_completion_method,
            CallbackSlot::AfterCompletion => &mut self.after_completion_method,
        };
        *target = Some(method);
    }

    pub fn is_empty(&self) -> bool {
        CallbackSlot::ALL.iter().all(|slot| self.method(*slot).is_none())
    }
}

/// A bean callback bound to a slot
#[derive(Clone)]
pub struct ResolvedCallback {
    pub method: String,
    pub source: RegistrationSource,
    pub(crate) call: CallbackFn,
}

impl fmt::Debug for ResolvedCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedCallback")
            .field("method", &self.method)
            .field("source", &self.source)
            .finish()
    }
}

/// Fixed `(slot, callable)` table for one bean class
#[derive(Debug, Clone, Default)]
pub struct CallbackTable {
    entries: BTreeMap<CallbackSlot, ResolvedCallback>,
}

impl CallbackTable {
    pub fn get(&self, slot: CallbackSlot) -> Option<&ResolvedCallback> {
        self.entries.get(&slot)
    }

    pub fn method_name(&self, slot: CallbackSlot) -> Option<&str> {
        self.get(slot).map(|c| c.method.as_str())
    }

    pub fn source(&self, slot: CallbackSlot) -> Option<RegistrationSource> {
        self.get(slot).map(|c| c.source)
    }

    pub fn slots(&self) -> impl Iterator<Item = CallbackSlot> + '_ {
        self.entries.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the callback table of `class` under `descriptor`
pub fn resolve_callbacks(
    class: &BeanClass,
    descriptor: &SyncDescriptor,
) -> Result<CallbackTable, AssemblyError> {
    let mut entries = BTreeMap::new();

    for slot in CallbackSlot::ALL {
        let candidate = if let Some(named) = descriptor.method(slot) {
            if class.has_business_method(&named.method_name) && !class.has_method(&named.method_name)
            {
                return Err(AssemblyError::BusinessMethodAsCallback {
                    bean: class.name().to_string(),
                    method: named.method_name.clone(),
                    slot,
                });
            }
            Some((named.method_name.as_str(), RegistrationSource::Descriptor))
        } else if let Some(method) = class.annotation(slot) {
            Some((method, RegistrationSource::Annotation))
        } else if class.implements_synchronization() {
            Some((interface_method(slot), RegistrationSource::Interface))
        } else {
            None
        };

        let Some((method, source)) = candidate else {
            continue;
        };
        let call = class
            .method(method)
            .ok_or_else(|| AssemblyError::UnknownMethod {
                bean: class.name().to_string(),
                method: method.to_string(),
                slot,
            })?
            .clone();

        debug!(
            bean = %class.name(),
            slot = %slot,
            method = %method,
            source = ?source,
            "resolved synchronization callback"
        );
        entries.insert(
            slot,
            ResolvedCallback {
                method: method.to_string(),
                source,
                call,
            },
        );
    }

    Ok(CallbackTable { entries })
}
