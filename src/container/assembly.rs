//! Deployment units: stateful beans, interceptors and their bindings.

use crate::sync::{BeanClass, CallbackSlot, InterceptorClass, NamedMethod, SyncDescriptor};
use std::sync::Arc;

/// A stateful bean entry in the deployment plan
#[derive(Debug, Clone)]
pub struct StatefulBean {
    ejb_name: String,
    class: Arc<BeanClass>,
    descriptor: SyncDescriptor,
}

impl StatefulBean {
    /// Bean named after its class
    pub fn new(class: BeanClass) -> Self {
        Self {
            ejb_name: class.name().to_string(),
            class: Arc::new(class),
            descriptor: SyncDescriptor::default(),
        }
    }

    pub fn with_name(mut self, ejb_name: impl Into<String>) -> Self {
        self.ejb_name = ejb_name.into();
        self
    }

    pub fn with_descriptor(mut self, descriptor: SyncDescriptor) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub fn set_after_begin_method(&mut self, method: NamedMethod) {
        self.descriptor.set_method(CallbackSlot::AfterBegin, method);
    }

    pub fn set_before_completion_method(&mut self, method: NamedMethod) {
        self.descriptor.set_method(CallbackSlot::BeforeCompletion, method);
    }

    pub fn set_after_completion_method(&mut self, method: NamedMethod) {
        self.descriptor.set_method(CallbackSlot::AfterCompletion, method);
    }

    pub fn ejb_name(&self) -> &str {
        &self.ejb_name
    }

    pub fn class(&self) -> &Arc<BeanClass> {
        &self.class
    }

    pub fn descriptor(&self) -> &SyncDescriptor {
        &self.descriptor
    }
}

/// Binds interceptors, in order, to one bean
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptorBinding {
    pub ejb_name: String,
    pub interceptors: Vec<String>,
}

impl InterceptorBinding {
    pub fn new(ejb_name: impl Into<String>, interceptor: impl Into<String>) -> Self {
        Self {
            ejb_name: ejb_name.into(),
            interceptors: vec![interceptor.into()],
        }
    }

    pub fn then(mut self, interceptor: impl Into<String>) -> Self {
        self.interceptors.push(interceptor.into());
        self
    }
}

/// Everything deployed together
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub(crate) beans: Vec<StatefulBean>,
    pub(crate) interceptors: Vec<Arc<InterceptorClass>>,
    pub(crate) bindings: Vec<InterceptorBinding>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_enterprise_bean(&mut self, bean: StatefulBean) -> &mut Self {
        self.beans.push(bean);
        self
    }

    pub fn add_interceptor(&mut self, interceptor: InterceptorClass) -> &mut Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn add_interceptor_binding(&mut self, binding: InterceptorBinding) -> &mut Self {
        self.bindings.push(binding);
        self
    }

    pub fn beans(&self) -> &[StatefulBean] {
        &self.beans
    }
}
