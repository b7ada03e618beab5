//! Stateful Bean Container
//!
//! Deploys an [`Assembly`], resolves each bean's synchronization callbacks
//! once, and hands out [`BeanHandle`]s whose business calls run inside
//! container-managed transactions.

mod assembly;

pub use assembly::{Assembly, InterceptorBinding, StatefulBean};

use crate::error::{AssemblyError, InvocationError};
use crate::sync::{
    resolve_callbacks, BeanClass, BeanInstance, InterceptorClass, SynchronizationDispatcher,
    TransactionScope,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Suffix of the local lookup name of every deployed bean
pub const LOCAL_NAME_SUFFIX: &str = "Local";

#[derive(Debug)]
struct Deployment {
    class: Arc<BeanClass>,
    dispatcher: SynchronizationDispatcher,
}

/// Deployed beans, addressable by their local lookup name
#[derive(Debug, Default)]
pub struct Container {
    deployments: HashMap<String, Arc<Deployment>>,
}

impl Container {
    /// Deploy every bean of `assembly`
    pub fn deploy(assembly: Assembly) -> Result<Self, AssemblyError> {
        let mut interceptors: HashMap<&str, Arc<InterceptorClass>> = HashMap::new();
        for interceptor in &assembly.interceptors {
            if interceptors
                .insert(interceptor.name(), interceptor.clone())
                .is_some()
            {
                return Err(AssemblyError::DuplicateInterceptor(
                    interceptor.name().to_string(),
                ));
            }
        }

        let mut bound: HashMap<&str, Vec<Arc<InterceptorClass>>> = HashMap::new();
        for binding in &assembly.bindings {
            if !assembly
                .beans
                .iter()
                .any(|b| b.ejb_name() == binding.ejb_name)
            {
                return Err(AssemblyError::UnknownBean(binding.ejb_name.clone()));
            }
            let chain = bound.entry(binding.ejb_name.as_str()).or_default();
            for name in &binding.interceptors {
                let interceptor = interceptors
                    .get(name.as_str())
                    .ok_or_else(|| AssemblyError::UnknownInterceptor(name.clone()))?;
                if !chain.iter().any(|i| Arc::ptr_eq(i, interceptor)) {
                    chain.push(interceptor.clone());
                }
            }
        }

        let mut deployments = HashMap::new();
        for bean in &assembly.beans {
            let local_name = format!("{}{}", bean.ejb_name(), LOCAL_NAME_SUFFIX);
            if deployments.contains_key(&local_name) {
                return Err(AssemblyError::DuplicateBean(bean.ejb_name().to_string()));
            }
            let callbacks = resolve_callbacks(bean.class(), bean.descriptor())?;
            let chain = bound.remove(bean.ejb_name()).unwrap_or_default();
            debug!(
                bean = %bean.ejb_name(),
                interceptors = chain.len(),
                callbacks = callbacks.slots().count(),
                "bean deployed"
            );
            let dispatcher = SynchronizationDispatcher::new(bean.ejb_name(), callbacks, chain);
            deployments.insert(
                local_name,
                Arc::new(Deployment {
                    class: bean.class().clone(),
                    dispatcher,
                }),
            );
        }

        info!(beans = deployments.len(), "assembly deployed");
        Ok(Self { deployments })
    }

    /// Local lookup names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.deployments.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Look up a bean by local name; every lookup yields a new stateful instance
    pub fn lookup(&self, name: &str) -> Result<BeanHandle, AssemblyError> {
        let deployment = self
            .deployments
            .get(name)
            .ok_or_else(|| AssemblyError::NameNotFound(name.to_string()))?;
        Ok(BeanHandle {
            deployment: deployment.clone(),
            instance: Mutex::new(deployment.class.new_instance()),
        })
    }

    /// Dispatcher of a deployed bean by local name, for inspection
    pub fn dispatcher(&self, name: &str) -> Option<&SynchronizationDispatcher> {
        self.deployments.get(name).map(|d| &d.dispatcher)
    }
}

/// Client view of one stateful bean instance
pub struct BeanHandle {
    deployment: Arc<Deployment>,
    instance: Mutex<BeanInstance>,
}

impl BeanHandle {
    pub fn bean_name(&self) -> &str {
        self.deployment.dispatcher.bean_name()
    }

    /// Invoke business method `method`; calls on one handle are serialized
    pub fn invoke(&self, method: &str) -> Result<(), InvocationError> {
        let business = self
            .deployment
            .class
            .business_method(method)
            .ok_or_else(|| InvocationError::NoSuchMethod {
                bean: self.bean_name().to_string(),
                method: method.to_string(),
            })?;
        let mut instance = self.instance.lock();
        let call = |target: &mut BeanInstance| {
            (business.call)(&mut **target).map_err(|e| InvocationError::BusinessFailed {
                method: method.to_string(),
                reason: e.to_string(),
            })
        };

        if !business.attribute.starts_transaction() {
            debug!(bean = %self.bean_name(), method, "invoking outside a transaction");
            return call(&mut *instance);
        }

        let dispatcher = &self.deployment.dispatcher;
        TransactionScope
            .run(
                &mut *instance,
                |event, target: &mut BeanInstance| dispatcher.fire(event, &mut **target),
                call,
            )
            .map(|_| ())
    }

    /// Borrow the instance as its concrete type
    pub fn with_instance<B: 'static, R>(&self, f: impl FnOnce(&B) -> R) -> Option<R> {
        let instance = self.instance.lock();
        instance.downcast_ref::<B>().map(f)
    }
}

impl std::fmt::Debug for BeanHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanHandle")
            .field("bean", &self.bean_name())
            .finish()
    }
}
