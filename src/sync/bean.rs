//! Bean classes: the registration-time description of a stateful bean type.
//!
//! Rust has no runtime annotation discovery, so a bean class declares its
//! methods by name up front. Callback methods can then be bound to slots by
//! annotation markers, by the [`SessionSynchronization`] interface, or by a
//! deployment descriptor naming them.

use crate::error::SyncError;
use crate::sync::{CallbackSlot, SyncEvent};
use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Type-erased bean instance owned by the container
pub type BeanInstance = Box<dyn Any + Send>;

/// Result of a business method
pub type BusinessResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub(crate) type CallbackFn =
    Arc<dyn Fn(&mut (dyn Any + Send), &SyncEvent) -> Result<(), SyncError> + Send + Sync>;

pub(crate) type BusinessFn = Arc<dyn Fn(&mut (dyn Any + Send)) -> BusinessResult + Send + Sync>;

type FactoryFn = Arc<dyn Fn() -> BeanInstance + Send + Sync>;

/// Method names contributed by [`SessionSynchronization`], in slot order
pub const SESSION_SYNCHRONIZATION_METHODS: [(CallbackSlot, &str); 3] = [
    (CallbackSlot::AfterBegin, "after_begin"),
    (CallbackSlot::BeforeCompletion, "before_completion"),
    (CallbackSlot::AfterCompletion, "after_completion"),
];

/// Name of the interface method bound to `slot`
pub fn interface_method(slot: CallbackSlot) -> &'static str {
    match slot {
        CallbackSlot::AfterBegin => SESSION_SYNCHRONIZATION_METHODS[0].1,
        CallbackSlot::BeforeCompletion => SESSION_SYNCHRONIZATION_METHODS[1].1,
        CallbackSlot::AfterCompletion => SESSION_SYNCHRONIZATION_METHODS[2].1,
    }
}

/// The three-method lifecycle interface.
///
/// Implementing it is the lowest-precedence registration source: annotation
/// markers and descriptor references on the same slot replace it.
pub trait SessionSynchronization {
    fn after_begin(&mut self) -> Result<(), SyncError>;
    fn before_completion(&mut self) -> Result<(), SyncError>;
    fn after_completion(&mut self, committed: bool) -> Result<(), SyncError>;
}

/// Container-managed transaction demarcation for a business method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionAttribute {
    /// Runs inside a transaction; one is started since there is never a
    /// caller transaction at this layer.
    #[default]
    Required,
    /// Runs in the caller's transaction if any, so here without one
    Supports,
    /// Never runs in a transaction
    NotSupported,
}

impl TransactionAttribute {
    pub fn starts_transaction(self) -> bool {
        matches!(self, TransactionAttribute::Required)
    }
}

#[derive(Clone)]
pub(crate) struct BusinessMethod {
    pub(crate) attribute: TransactionAttribute,
    pub(crate) call: BusinessFn,
}

/// Registration-time description of a bean type
#[derive(Clone)]
pub struct BeanClass {
    name: String,
    type_name: &'static str,
    factory: FactoryFn,
    methods: HashMap<String, CallbackFn>,
    business: HashMap<String, BusinessMethod>,
    annotations: BTreeMap<CallbackSlot, String>,
    implements_synchronization: bool,
}

impl BeanClass {
    /// Start describing a bean class named `name` whose instances come from `factory`
    pub fn builder<B, F>(name: impl Into<String>, factory: F) -> BeanClassBuilder<B>
    where
        B: Any + Send,
        F: Fn() -> B + Send + Sync + 'static,
    {
        BeanClassBuilder {
            class: BeanClass {
                name: name.into(),
                type_name: type_name::<B>(),
                factory: Arc::new(move || Box::new(factory()) as BeanInstance),
                methods: HashMap::new(),
                business: HashMap::new(),
                annotations: BTreeMap::new(),
                implements_synchronization: false,
            },
            _bean: std::marker::PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn new_instance(&self) -> BeanInstance {
        (self.factory)()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn has_business_method(&self, name: &str) -> bool {
        self.business.contains_key(name)
    }

    /// Method marked for `slot`, if any
    pub fn annotation(&self, slot: CallbackSlot) -> Option<&str> {
        self.annotations.get(&slot).map(String::as_str)
    }

    pub fn implements_synchronization(&self) -> bool {
        self.implements_synchronization
    }

    pub(crate) fn method(&self, name: &str) -> Option<&CallbackFn> {
        self.methods.get(name)
    }

    pub(crate) fn business_method(&self, name: &str) -> Option<&BusinessMethod> {
        self.business.get(name)
    }
}

impl fmt::Debug for BeanClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.methods.keys().collect();
        methods.sort();
        let mut business: Vec<&String> = self.business.keys().collect();
        business.sort();
        f.debug_struct("BeanClass")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("methods", &methods)
            .field("business", &business)
            .field("annotations", &self.annotations)
            .field("implements_synchronization", &self.implements_synchronization)
            .finish()
    }
}

/// Builder for [`BeanClass`], typed over the bean so methods need no casts
pub struct BeanClassBuilder<B> {
    class: BeanClass,
    _bean: std::marker::PhantomData<fn() -> B>,
}

impl<B: Any + Send> BeanClassBuilder<B> {
    /// Declare a callback-capable method under `name`
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut B, &SyncEvent) -> Result<(), SyncError> + Send + Sync + 'static,
    {
        self.class.methods.insert(name.into(), erase_callback::<B, F>(f));
        self
    }

    /// Mark a declared method as the callback for `slot`
    pub fn annotate(mut self, slot: CallbackSlot, method: impl Into<String>) -> Self {
        self.class.annotations.insert(slot, method.into());
        self
    }

    /// Declare a method and mark it for `slot` in one step
    pub fn annotated<F>(self, slot: CallbackSlot, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut B, &SyncEvent) -> Result<(), SyncError> + Send + Sync + 'static,
    {
        let name = name.into();
        self.method(name.clone(), f).annotate(slot, name)
    }

    /// Declare a business method with its transaction attribute
    pub fn business<F>(mut self, name: impl Into<String>, attribute: TransactionAttribute, f: F) -> Self
    where
        F: Fn(&mut B) -> BusinessResult + Send + Sync + 'static,
    {
        let call: BusinessFn = Arc::new(move |instance: &mut (dyn Any + Send)| {
            let bean = instance
                .downcast_mut::<B>()
                .ok_or_else(|| Box::new(SyncError::InstanceMismatch {
                    expected: type_name::<B>(),
                }) as Box<dyn std::error::Error + Send + Sync>)?;
            f(bean)
        });
        self.class
            .business
            .insert(name.into(), BusinessMethod { attribute, call });
        self
    }

    pub fn build(self) -> BeanClass {
        self.class
    }
}

impl<B: Any + Send + SessionSynchronization> BeanClassBuilder<B> {
    /// Register the bean as implementing [`SessionSynchronization`]
    pub fn session_synchronization(mut self) -> Self {
        for (slot, name) in SESSION_SYNCHRONIZATION_METHODS {
            let callback = match slot {
                CallbackSlot::AfterBegin => {
                    erase_callback::<B, _>(|bean: &mut B, _: &SyncEvent| bean.after_begin())
                }
                CallbackSlot::BeforeCompletion => {
                    erase_callback::<B, _>(|bean: &mut B, _: &SyncEvent| bean.before_completion())
                }
                CallbackSlot::AfterCompletion => {
                    erase_callback::<B, _>(|bean: &mut B, event: &SyncEvent| {
                        bean.after_completion(event.committed)
                    })
                }
            };
            self.class.methods.insert(name.to_string(), callback);
        }
        self.class.implements_synchronization = true;
        self
    }
}

fn erase_callback<B, F>(f: F) -> CallbackFn
where
    B: Any + Send,
    F: Fn(&mut B, &SyncEvent) -> Result<(), SyncError> + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut (dyn Any + Send), event: &SyncEvent| {
        let bean = instance
            .downcast_mut::<B>()
            .ok_or(SyncError::InstanceMismatch {
                expected: type_name::<B>(),
            })?;
        f(bean, event)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        begins: u32,
        completed: Option<bool>,
    }

    impl SessionSynchronization for Counter {
        fn after_begin(&mut self) -> Result<(), SyncError> {
            self.begins += 1;
            Ok(())
        }

        fn before_completion(&mut self) -> Result<(), SyncError> {
            Ok(())
        }

        fn after_completion(&mut self, committed: bool) -> Result<(), SyncError> {
            self.completed = Some(committed);
            Ok(())
        }
    }

    #[test]
    fn test_interface_registers_three_methods() {
        let class = BeanClass::builder("Counter", Counter::default)
            .session_synchronization()
            .build();
        assert!(class.implements_synchronization());
        for (_, name) in SESSION_SYNCHRONIZATION_METHODS {
            assert!(class.has_method(name), "missing {}", name);
        }
        assert_eq!(class.annotation(CallbackSlot::AfterBegin), None);
    }

    #[test]
    fn test_erased_callback_reaches_bean() {
        let class = BeanClass::builder("Counter", Counter::default)
            .session_synchronization()
            .build();
        let mut instance = class.new_instance();
        let callback = class.method("after_completion").unwrap().clone();
        callback(instance.as_mut(), &SyncEvent::after_completion(true)).unwrap();
        let counter = instance.downcast_ref::<Counter>().unwrap();
        assert_eq!(counter.completed, Some(true));
    }

    #[test]
    fn test_erased_callback_rejects_foreign_instance() {
        let class = BeanClass::builder("Counter", Counter::default)
            .session_synchronization()
            .build();
        let mut foreign: BeanInstance = Box::new(42u8);
        let callback = class.method("after_begin").unwrap().clone();
        let err = callback(foreign.as_mut(), &SyncEvent::after_begin()).unwrap_err();
        assert!(matches!(err, SyncError::InstanceMismatch { .. }));
    }

    #[test]
    fn test_annotated_declares_and_marks() {
        let class = BeanClass::builder("Counter", Counter::default)
            .annotated(CallbackSlot::BeforeCompletion, "flush", |_: &mut Counter, _| Ok(()))
            .business("work", TransactionAttribute::Required, |_| Ok(()))
            .build();
        assert!(class.has_method("flush"));
        assert_eq!(class.annotation(CallbackSlot::BeforeCompletion), Some("flush"));
        assert!(class.has_business_method("work"));
        assert!(!class.implements_synchronization());
    }
}
