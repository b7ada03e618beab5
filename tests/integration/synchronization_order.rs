//! Callback ordering across registration styles, recorded in a process-wide list

use beanctx::container::{Assembly, Container, InterceptorBinding, StatefulBean};
use beanctx::error::{InvocationError, SyncError};
use beanctx::sync::{
    BeanClass, BeanClassBuilder, CallbackSlot, InterceptorClass, NamedMethod, RegistrationSource,
    SessionSynchronization, SyncDescriptor, SyncEvent, TransactionAttribute,
};
use parking_lot::Mutex;
use serial_test::serial;

static RECORDED: Mutex<Vec<&'static str>> = parking_lot::const_mutex(Vec::new());

const INTERCEPTOR: &str = "SimpleInterceptor";
const BUSINESS: &str = "simple_method";
const RECORDED_BUSINESS: &str = "recorded_method";

fn record(entry: &'static str) {
    RECORDED.lock().push(entry);
}

fn drain() -> Vec<&'static str> {
    std::mem::take(&mut *RECORDED.lock())
}

#[derive(Debug, Default)]
struct SubBean;

impl SessionSynchronization for SubBean {
    fn after_begin(&mut self) -> Result<(), SyncError> {
        record("BEAN_AFTER_BEGIN");
        Ok(())
    }

    fn before_completion(&mut self) -> Result<(), SyncError> {
        record("BEAN_BEFORE_COMPLETION");
        Ok(())
    }

    fn after_completion(&mut self, _committed: bool) -> Result<(), SyncError> {
        record("BEAN_AFTER_COMPLETION");
        Ok(())
    }
}

fn push(
    entry: &'static str,
) -> impl Fn(&mut SubBean, &SyncEvent) -> Result<(), SyncError> + Send + Sync + 'static {
    move |_: &mut SubBean, _: &SyncEvent| {
        record(entry);
        Ok(())
    }
}

fn class(name: &str) -> BeanClassBuilder<SubBean> {
    BeanClass::builder(name, SubBean::default)
        .business(BUSINESS, TransactionAttribute::Required, |_| Ok(()))
        .business(RECORDED_BUSINESS, TransactionAttribute::Required, |_| {
            record("BUSINESS_METHOD");
            Ok(())
        })
}

fn interceptor() -> InterceptorClass {
    let entries = [
        (CallbackSlot::AfterBegin, "INTERCEPTOR_AFTER_BEGIN"),
        (CallbackSlot::BeforeCompletion, "INTERCEPTOR_BEFORE_COMPLETION"),
        (CallbackSlot::AfterCompletion, "INTERCEPTOR_AFTER_COMPLETION"),
    ];
    entries
        .into_iter()
        .fold(InterceptorClass::new(INTERCEPTOR), |interceptor, (slot, entry)| {
            interceptor.on(slot, move |ctx| {
                record(entry);
                ctx.proceed()
            })
        })
}

fn descriptor(toml_text: &str) -> SyncDescriptor {
    toml::from_str(toml_text).unwrap()
}

fn beans() -> Vec<StatefulBean> {
    use CallbackSlot::*;

    let bean_a = StatefulBean::new(class("SubBeanA").session_synchronization().build());

    let bean_b = StatefulBean::new(
        class("SubBeanB")
            .method("after_begin", push("BEAN_AFTER_BEGIN"))
            .method("before_completion", push("BEAN_BEFORE_COMPLETION"))
            .method("after_completion", push("BEAN_AFTER_COMPLETION"))
            .build(),
    )
    .with_descriptor(descriptor(
        r#"
[after_begin_method]
method_name = "after_begin"

[before_completion_method]
method_name = "before_completion"

[after_completion_method]
method_name = "after_completion"
"#,
    ));

    let bean_c = StatefulBean::new(
        class("SubBeanC")
            .annotated(AfterBegin, "after_begin", push("BEAN_AFTER_BEGIN"))
            .annotated(AfterCompletion, "after_completion", push("BEAN_AFTER_COMPLETION"))
            .annotated(BeforeCompletion, "before_completion", push("BEAN_BEFORE_COMPLETION"))
            .build(),
    );

    let mut bean_d = StatefulBean::new(
        class("SubBeanD")
            .annotated(AfterBegin, "after_begin", push("BAD_VALUE"))
            .annotated(AfterCompletion, "after_completion", push("BAD_VALUE"))
            .annotated(BeforeCompletion, "before_completion", push("BAD_VALUE"))
            .method("after_begin_new", push("BEAN_AFTER_BEGIN"))
            .method("after_completion_new", push("BEAN_AFTER_COMPLETION"))
            .method("before_completion_new", push("BEAN_BEFORE_COMPLETION"))
            .build(),
    );
    bean_d.set_after_begin_method(NamedMethod::new("after_begin_new"));
    bean_d.set_before_completion_method(NamedMethod::new("before_completion_new"));
    bean_d.set_after_completion_method(NamedMethod::new("after_completion_new"));

    let bean_e = StatefulBean::new(
        class("SubBeanE")
            .annotated(AfterBegin, "after_begin", push("BEAN_AFTER_BEGIN"))
            .build(),
    );
    let bean_f = StatefulBean::new(
        class("SubBeanF")
            .annotated(AfterCompletion, "after_completion", push("BEAN_AFTER_COMPLETION"))
            .build(),
    );
    let bean_g = StatefulBean::new(
        class("SubBeanG")
            .annotated(BeforeCompletion, "before_completion", push("BEAN_BEFORE_COMPLETION"))
            .build(),
    );

    vec![bean_a, bean_b, bean_c, bean_d, bean_e, bean_f, bean_g]
}

fn deploy() -> Container {
    let mut assembly = Assembly::new();
    assembly.add_interceptor(interceptor());
    for bean in beans() {
        let binding = InterceptorBinding::new(bean.ejb_name(), INTERCEPTOR);
        assembly.add_enterprise_bean(bean).add_interceptor_binding(binding);
    }
    Container::deploy(assembly).unwrap()
}

fn run(container: &Container, bean: &str) -> Vec<&'static str> {
    run_method(container, bean, BUSINESS)
}

fn run_method(container: &Container, bean: &str, method: &str) -> Vec<&'static str> {
    drain();
    container
        .lookup(&format!("{}Local", bean))
        .unwrap()
        .invoke(method)
        .unwrap();
    drain()
}

const FULL: [&str; 6] = [
    "INTERCEPTOR_AFTER_BEGIN",
    "BEAN_AFTER_BEGIN",
    "INTERCEPTOR_BEFORE_COMPLETION",
    "BEAN_BEFORE_COMPLETION",
    "INTERCEPTOR_AFTER_COMPLETION",
    "BEAN_AFTER_COMPLETION",
];

#[test]
#[serial]
fn test_full_sequence_for_every_complete_registration_style() {
    let container = deploy();
    for bean in ["SubBeanA", "SubBeanB", "SubBeanC", "SubBeanD"] {
        assert_eq!(run(&container, bean), FULL, "sequence for {}", bean);
    }
}

#[test]
#[serial]
fn test_business_method_runs_between_after_begin_and_before_completion() {
    let container = deploy();
    for bean in ["SubBeanA", "SubBeanD"] {
        assert_eq!(
            run_method(&container, bean, RECORDED_BUSINESS),
            [
                "INTERCEPTOR_AFTER_BEGIN",
                "BEAN_AFTER_BEGIN",
                "BUSINESS_METHOD",
                "INTERCEPTOR_BEFORE_COMPLETION",
                "BEAN_BEFORE_COMPLETION",
                "INTERCEPTOR_AFTER_COMPLETION",
                "BEAN_AFTER_COMPLETION",
            ],
            "sequence for {}",
            bean
        );
    }
    assert_eq!(
        run_method(&container, "SubBeanF", RECORDED_BUSINESS),
        [
            "INTERCEPTOR_AFTER_BEGIN",
            "BUSINESS_METHOD",
            "INTERCEPTOR_BEFORE_COMPLETION",
            "INTERCEPTOR_AFTER_COMPLETION",
            "BEAN_AFTER_COMPLETION",
        ]
    );
}

#[test]
#[serial]
fn test_descriptor_override_never_fires_annotated_methods() {
    let container = deploy();
    let recorded = run(&container, "SubBeanD");
    assert!(!recorded.contains(&"BAD_VALUE"));

    let dispatcher = container.dispatcher("SubBeanDLocal").unwrap();
    for slot in CallbackSlot::ALL {
        assert_eq!(
            dispatcher.callbacks().source(slot),
            Some(RegistrationSource::Descriptor)
        );
    }
}

#[test]
#[serial]
fn test_partial_registration_fires_only_registered_slot() {
    let container = deploy();
    assert_eq!(
        run(&container, "SubBeanE"),
        [
            "INTERCEPTOR_AFTER_BEGIN",
            "BEAN_AFTER_BEGIN",
            "INTERCEPTOR_BEFORE_COMPLETION",
            "INTERCEPTOR_AFTER_COMPLETION",
        ]
    );
    assert_eq!(
        run(&container, "SubBeanF"),
        [
            "INTERCEPTOR_AFTER_BEGIN",
            "INTERCEPTOR_BEFORE_COMPLETION",
            "INTERCEPTOR_AFTER_COMPLETION",
            "BEAN_AFTER_COMPLETION",
        ]
    );
    assert_eq!(
        run(&container, "SubBeanG"),
        [
            "INTERCEPTOR_AFTER_BEGIN",
            "INTERCEPTOR_BEFORE_COMPLETION",
            "BEAN_BEFORE_COMPLETION",
            "INTERCEPTOR_AFTER_COMPLETION",
        ]
    );
}

#[test]
#[serial]
fn test_rollback_skips_before_completion() {
    let bean = StatefulBean::new(
        BeanClass::builder("Failing", SubBean::default)
            .session_synchronization()
            .business("explode", TransactionAttribute::Required, |_| {
                Err("boom".into())
            })
            .build(),
    );
    let mut assembly = Assembly::new();
    assembly
        .add_interceptor(interceptor())
        .add_enterprise_bean(bean)
        .add_interceptor_binding(InterceptorBinding::new("Failing", INTERCEPTOR));
    let container = Container::deploy(assembly).unwrap();

    drain();
    let err = container
        .lookup("FailingLocal")
        .unwrap()
        .invoke("explode")
        .unwrap_err();
    assert!(matches!(err, InvocationError::BusinessFailed { .. }));
    assert_eq!(
        drain(),
        [
            "INTERCEPTOR_AFTER_BEGIN",
            "BEAN_AFTER_BEGIN",
            "INTERCEPTOR_AFTER_COMPLETION",
            "BEAN_AFTER_COMPLETION",
        ]
    );
}

#[test]
#[serial]
fn test_verifier_reports_all_scenarios_passing() {
    let report = beanctx::verify::run_all().unwrap();
    assert_eq!(report.scenarios.len(), 7);
    assert!(report.passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
}
