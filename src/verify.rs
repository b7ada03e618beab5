//! Synchronization order verification.
//!
//! Deploys seven bean variants that register their callbacks in different
//! ways, binds one recording interceptor to all of them, invokes each once
//! inside a transaction and compares the recorded call sequence against the
//! expected one. Comparison is exact: no subset or superset matches.

use crate::container::{Assembly, Container, InterceptorBinding, StatefulBean};
use crate::error::{ApiError, SyncError};
use crate::sync::{
    BeanClass, CallbackSlot, InterceptorClass, NamedMethod, SessionSynchronization, SyncEvent,
    TransactionAttribute,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Name of the business method every variant exposes
pub const BUSINESS_METHOD: &str = "simple_method";

/// Name of the interceptor bound to every variant
pub const INTERCEPTOR_NAME: &str = "SimpleInterceptor";

/// One recorded callback firing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Call {
    BeanAfterBegin,
    BeanBeforeCompletion,
    BeanAfterCompletion,
    /// Fired only by callbacks that should have been overridden
    BadValue,
    InterceptorAfterBegin,
    InterceptorBeforeCompletion,
    InterceptorAfterCompletion,
}

impl Call {
    pub fn bean(slot: CallbackSlot) -> Self {
        match slot {
            CallbackSlot::AfterBegin => Call::BeanAfterBegin,
            CallbackSlot::BeforeCompletion => Call::BeanBeforeCompletion,
            CallbackSlot::AfterCompletion => Call::BeanAfterCompletion,
        }
    }

    pub fn interceptor(slot: CallbackSlot) -> Self {
        match slot {
            CallbackSlot::AfterBegin => Call::InterceptorAfterBegin,
            CallbackSlot::BeforeCompletion => Call::InterceptorBeforeCompletion,
            CallbackSlot::AfterCompletion => Call::InterceptorAfterCompletion,
        }
    }

    /// Name as it appears in recorded sequences
    pub fn as_str(self) -> &'static str {
        match self {
            Call::BeanAfterBegin => "BEAN_AFTER_BEGIN",
            Call::BeanBeforeCompletion => "BEAN_BEFORE_COMPLETION",
            Call::BeanAfterCompletion => "BEAN_AFTER_COMPLETION",
            Call::BadValue => "BAD_VALUE",
            Call::InterceptorAfterBegin => "INTERCEPTOR_AFTER_BEGIN",
            Call::InterceptorBeforeCompletion => "INTERCEPTOR_BEFORE_COMPLETION",
            Call::InterceptorAfterCompletion => "INTERCEPTOR_AFTER_COMPLETION",
        }
    }
}

/// Shared, append-only record of callback firings
#[derive(Debug, Default)]
pub struct CallLog {
    calls: Mutex<Vec<Call>>,
}

impl CallLog {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    /// Current sequence, leaving the log empty
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn snapshot(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

/// The full sequence for a bean observing all three slots
pub fn full_sequence() -> Vec<Call> {
    vec![
        Call::InterceptorAfterBegin,
        Call::BeanAfterBegin,
        Call::InterceptorBeforeCompletion,
        Call::BeanBeforeCompletion,
        Call::InterceptorAfterCompletion,
        Call::BeanAfterCompletion,
    ]
}

/// Expected sequence when the bean observes only `bean_slots`
pub fn expected_sequence(bean_slots: &[CallbackSlot]) -> Vec<Call> {
    let mut calls = Vec::with_capacity(6);
    for slot in CallbackSlot::ALL {
        calls.push(Call::interceptor(slot));
        if bean_slots.contains(&slot) {
            calls.push(Call::bean(slot));
        }
    }
    calls
}

/// How a variant registers its callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStyle {
    Interface,
    Descriptor,
    Annotation,
    AnnotationOverriddenByDescriptor,
    PartialAnnotation,
}

impl RegistrationStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStyle::Interface => "interface",
            RegistrationStyle::Descriptor => "descriptor",
            RegistrationStyle::Annotation => "annotation",
            RegistrationStyle::AnnotationOverriddenByDescriptor => {
                "annotation_overridden_by_descriptor"
            }
            RegistrationStyle::PartialAnnotation => "partial_annotation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub bean: String,
    pub style: RegistrationStyle,
    pub expected: Vec<Call>,
    pub recorded: Vec<Call>,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationReport {
    pub scenarios: Vec<ScenarioResult>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.scenarios.iter().filter(|s| !s.passed)
    }
}

/// Bean whose callbacks append to a shared log
#[derive(Debug)]
pub struct RecordingBean {
    log: Arc<CallLog>,
}

impl RecordingBean {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self { log }
    }

    fn push(&mut self, call: Call) -> Result<(), SyncError> {
        self.log.record(call);
        Ok(())
    }
}

impl SessionSynchronization for RecordingBean {
    fn after_begin(&mut self) -> Result<(), SyncError> {
        self.push(Call::BeanAfterBegin)
    }

    fn before_completion(&mut self) -> Result<(), SyncError> {
        self.push(Call::BeanBeforeCompletion)
    }

    fn after_completion(&mut self, _committed: bool) -> Result<(), SyncError> {
        self.push(Call::BeanAfterCompletion)
    }
}

fn recorder(
    call: Call,
) -> impl Fn(&mut RecordingBean, &SyncEvent) -> Result<(), SyncError> + Send + Sync + 'static {
    move |bean: &mut RecordingBean, _: &SyncEvent| bean.push(call)
}

fn base_class(name: &str, log: &Arc<CallLog>) -> crate::sync::BeanClassBuilder<RecordingBean> {
    let log = log.clone();
    BeanClass::builder(name, move || RecordingBean::new(log.clone())).business(
        BUSINESS_METHOD,
        TransactionAttribute::Required,
        |_| Ok(()),
    )
}

/// Interceptor recording each slot before proceeding
pub fn recording_interceptor(log: &Arc<CallLog>) -> InterceptorClass {
    CallbackSlot::ALL
        .into_iter()
        .fold(InterceptorClass::new(INTERCEPTOR_NAME), |interceptor, slot| {
            let log = log.clone();
            interceptor.on(slot, move |ctx| {
                log.record(Call::interceptor(slot));
                ctx.proceed()
            })
        })
}

struct Variant {
    bean: StatefulBean,
    style: RegistrationStyle,
    expected: Vec<Call>,
}

fn variants(log: &Arc<CallLog>) -> Vec<Variant> {
    use CallbackSlot::*;

    // Lifecycle interface
    let bean_a = StatefulBean::new(base_class("SubBeanA", log).session_synchronization().build());

    // Plain methods named by the deployment plan
    let mut bean_b = StatefulBean::new(
        base_class("SubBeanB", log)
            .method("after_begin", recorder(Call::BeanAfterBegin))
            .method("before_completion", recorder(Call::BeanBeforeCompletion))
            .method("after_completion", recorder(Call::BeanAfterCompletion))
            .build(),
    );
    bean_b.set_after_begin_method(NamedMethod::new("after_begin"));
    bean_b.set_before_completion_method(NamedMethod::new("before_completion"));
    bean_b.set_after_completion_method(NamedMethod::new("after_completion"));

    // Annotation markers
    let bean_c = StatefulBean::new(
        base_class("SubBeanC", log)
            .annotated(AfterBegin, "after_begin", recorder(Call::BeanAfterBegin))
            .annotated(AfterCompletion, "after_completion", recorder(Call::BeanAfterCompletion))
            .annotated(BeforeCompletion, "before_completion", recorder(Call::BeanBeforeCompletion))
            .build(),
    );

    // Annotations overridden by the deployment plan
    let mut bean_d = StatefulBean::new(
        base_class("SubBeanD", log)
            .annotated(AfterBegin, "after_begin", recorder(Call::BadValue))
            .annotated(AfterCompletion, "after_completion", recorder(Call::BadValue))
            .annotated(BeforeCompletion, "before_completion", recorder(Call::BadValue))
            .method("after_begin_new", recorder(Call::BeanAfterBegin))
            .method("after_completion_new", recorder(Call::BeanAfterCompletion))
            .method("before_completion_new", recorder(Call::BeanBeforeCompletion))
            .build(),
    );
    bean_d.set_after_begin_method(NamedMethod::new("after_begin_new"));
    bean_d.set_before_completion_method(NamedMethod::new("before_completion_new"));
    bean_d.set_after_completion_method(NamedMethod::new("after_completion_new"));

    let partial = |name: &str, slot: CallbackSlot| {
        StatefulBean::new(
            base_class(name, log)
                .annotated(slot, slot.as_str(), recorder(Call::bean(slot)))
                .build(),
        )
    };

    vec![
        Variant {
            bean: bean_a,
            style: RegistrationStyle::Interface,
            expected: full_sequence(),
        },
        Variant {
            bean: bean_b,
            style: RegistrationStyle::Descriptor,
            expected: full_sequence(),
        },
        Variant {
            bean: bean_c,
            style: RegistrationStyle::Annotation,
            expected: full_sequence(),
        },
        Variant {
            bean: bean_d,
            style: RegistrationStyle::AnnotationOverriddenByDescriptor,
            expected: full_sequence(),
        },
        Variant {
            bean: partial("SubBeanE", AfterBegin),
            style: RegistrationStyle::PartialAnnotation,
            expected: expected_sequence(&[AfterBegin]),
        },
        Variant {
            bean: partial("SubBeanF", AfterCompletion),
            style: RegistrationStyle::PartialAnnotation,
            expected: expected_sequence(&[AfterCompletion]),
        },
        Variant {
            bean: partial("SubBeanG", BeforeCompletion),
            style: RegistrationStyle::PartialAnnotation,
            expected: expected_sequence(&[BeforeCompletion]),
        },
    ]
}

/// Deploy all variants against `log` and run each scenario once, in order
pub fn run_with_log(log: &Arc<CallLog>) -> Result<VerificationReport, ApiError> {
    let variants = variants(log);

    let mut assembly = Assembly::new();
    assembly.add_interceptor(recording_interceptor(log));
    for variant in &variants {
        assembly
            .add_enterprise_bean(variant.bean.clone())
            .add_interceptor_binding(InterceptorBinding::new(
                variant.bean.ejb_name(),
                INTERCEPTOR_NAME,
            ));
    }
    let container = Container::deploy(assembly)?;

    let mut report = VerificationReport::default();
    for variant in variants {
        let name = variant.bean.ejb_name().to_string();
        log.take();
        let error = container
            .lookup(&format!("{}{}", name, crate::container::LOCAL_NAME_SUFFIX))
            .map_err(ApiError::from)
            .and_then(|bean| bean.invoke(BUSINESS_METHOD).map_err(ApiError::from))
            .err()
            .map(|e| e.to_string());
        let recorded = log.take();
        let passed = error.is_none() && recorded == variant.expected;
        if passed {
            info!(bean = %name, "synchronization order verified");
        } else {
            warn!(
                bean = %name,
                expected = ?variant.expected,
                recorded = ?recorded,
                "synchronization order mismatch"
            );
        }
        report.scenarios.push(ScenarioResult {
            bean: name,
            style: variant.style,
            expected: variant.expected,
            recorded,
            passed,
            error,
        });
    }
    Ok(report)
}

/// Run every scenario with a fresh log
pub fn run_all() -> Result<VerificationReport, ApiError> {
    run_with_log(&CallLog::shared())
}
