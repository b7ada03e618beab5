//! Integration tests for the session instance store

use beanctx::error::StoreError;
use beanctx::session::{
    AttributeValue, HttpSession, InstanceBag, ManagedBean, NativeAttributes, SessionContext,
    SessionContextConfig, SessionFacade, StandardSession, StoreStrategy,
};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Provider that never exposes its attribute map
#[derive(Debug, Default)]
struct ContainerSession {
    attributes: RwLock<HashMap<String, AttributeValue>>,
}

impl HttpSession for ContainerSession {
    fn id(&self) -> &str {
        "container-session"
    }

    fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: AttributeValue) {
        self.attributes.write().insert(name.to_string(), value);
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.write().remove(name);
    }
}

/// Provider whose reads are followed by a write from another client
#[derive(Debug, Default)]
struct ContendedSession {
    attributes: RwLock<HashMap<String, AttributeValue>>,
    rival_write: Mutex<Option<(String, AttributeValue)>>,
}

impl HttpSession for ContendedSession {
    fn id(&self) -> &str {
        "contended-session"
    }

    fn get_attribute(&self, name: &str) -> Option<AttributeValue> {
        let seen = self.attributes.read().get(name).cloned();
        if let Some((key, value)) = self.rival_write.lock().take() {
            self.attributes.write().insert(key, value);
        }
        seen
    }

    fn set_attribute(&self, name: &str, value: AttributeValue) {
        self.attributes.write().insert(name.to_string(), value);
    }

    fn remove_attribute(&self, name: &str) {
        self.attributes.write().remove(name);
    }
}

fn direct() -> SessionContextConfig {
    SessionContextConfig::default()
}

fn generic() -> SessionContextConfig {
    SessionContextConfig {
        wrapper: "generic".to_string(),
    }
}

#[test]
fn test_direct_round_trip_through_session() {
    let session = StandardSession::shared("s1");
    let context = SessionContext::new(Some(session.clone()), &direct());
    let bean = ManagedBean::new("ShoppingCart");

    let bag = InstanceBag::shared("cart", vec!["book".to_string()]);
    assert!(context.instances().put(&bean, bag.clone()).is_none());

    let stored = context.get(&bean).unwrap();
    assert!(InstanceBag::same(&stored, &bag));
    assert_eq!(
        stored.downcast_ref::<Vec<String>>(),
        Some(&vec!["book".to_string()])
    );

    let removed = context.destroy(&bean).unwrap();
    assert!(InstanceBag::same(&removed, &bag));
    assert!(session.attribute_names().is_empty());
}

#[test]
fn test_generic_round_trip_through_session() {
    let session = Arc::new(ContainerSession::default());
    let context = SessionContext::new(Some(session.clone()), &direct());
    assert_eq!(context.strategy(), StoreStrategy::Generic);

    let bean = ManagedBean::new("ShoppingCart");
    let bag = context.get_or_create(&bean, || 42u64).unwrap();
    assert_eq!(bag.downcast_ref::<u64>(), Some(&42));
    assert!(session.get_attribute(bag.key()).is_some());

    assert!(context.destroy(&bean).is_some());
    assert!(session.get_attribute(bag.key()).is_none());
}

#[test]
fn test_direct_clear_leaves_foreign_attributes() {
    let session = StandardSession::shared("s1");
    let lang: AttributeValue = Arc::new(String::from("en"));
    session.set_attribute("lang", lang);
    let context = SessionContext::new(Some(session.clone()), &direct());
    context.instances().put("beanA", InstanceBag::shared("beanA", 1u8));

    context.destroy_all();

    assert_eq!(session.attribute_names(), vec!["lang".to_string()]);
    let lang = session.get_attribute("lang").unwrap();
    assert_eq!(lang.downcast_ref::<String>().map(String::as_str), Some("en"));
}

#[test]
fn test_generic_clear_removes_nothing() {
    let session = StandardSession::shared("s1");
    let context = SessionContext::new(Some(session.clone()), &generic());
    assert_eq!(context.strategy(), StoreStrategy::Generic);
    context.instances().put("beanA", InstanceBag::shared("beanA", 1u8));

    context.destroy_all();

    assert!(context.instances().contains_key("beanA"));
    assert_eq!(session.attribute_names(), vec!["beanA".to_string()]);
}

#[test]
fn test_unsupported_operations_per_strategy() {
    let session = StandardSession::shared("s1");
    let bag = InstanceBag::shared("k", 1u8);

    let direct_context = SessionContext::new(Some(session.clone()), &direct());
    let map = direct_context.instances();
    assert!(matches!(
        map.size(),
        Err(StoreError::Unsupported { strategy: "direct", .. })
    ));
    assert!(map.key_set().is_err());
    assert!(map.values().is_err());
    assert!(map.is_empty().is_err());
    assert!(map.contains_value(&bag).is_err());
    assert!(map.replace("k", bag.clone()).is_ok());
    assert!(map.replace_if("k", &bag, bag.clone()).is_ok());

    let generic_context = SessionContext::new(Some(session), &generic());
    let map = generic_context.instances();
    assert!(matches!(
        map.replace("k", bag.clone()),
        Err(StoreError::Unsupported { strategy: "generic", operation: "replace" })
    ));
    assert!(matches!(
        map.replace_if("k", &bag, bag.clone()),
        Err(StoreError::Unsupported { strategy: "generic", operation: "replace_if" })
    ));
    assert!(map.size().is_err());
    assert!(map.entry_set().is_empty());
}

#[test]
fn test_facade_over_standard_session_keeps_direct_strategy() {
    let session = StandardSession::shared("s1");
    let facade: Arc<dyn HttpSession> = Arc::new(SessionFacade::new(session.clone()));
    let native: Option<NativeAttributes> = facade.native_attributes();
    assert!(native.is_some());

    let context = SessionContext::new(Some(facade), &direct());
    assert_eq!(context.strategy(), StoreStrategy::Direct);
    context.get_or_create(&ManagedBean::new("Cart"), || 0u8).unwrap();
    assert_eq!(session.attribute_names().len(), 1);
}

#[test]
fn test_detached_context_supports_enumeration() {
    let context = SessionContext::detached();
    let map = context.instances();
    map.put_all([
        ("a", InstanceBag::shared("a", 1u8)),
        ("b", InstanceBag::shared("b", 2u8)),
    ]);
    assert_eq!(map.size(), Ok(2));
    assert_eq!(map.key_set(), Ok(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(map.is_empty(), Ok(false));
    context.destroy_all();
    assert_eq!(map.is_empty(), Ok(true));
}

#[test]
fn test_invalidated_session_drops_instances() {
    let session = StandardSession::shared("s1");
    let context = SessionContext::new(Some(session.clone()), &direct());
    let bean = ManagedBean::new("Cart");
    context.get_or_create(&bean, || 0u8).unwrap();

    session.invalidate();

    assert!(context.get(&bean).is_none());
}

fn put_all_round_trip(context: &SessionContext) {
    let map = context.instances();
    let a = InstanceBag::shared("a", 1u8);
    let b = InstanceBag::shared("b", 2u8);
    map.put_all([("a", a.clone()), ("b", b.clone())]);

    assert!(InstanceBag::same(&map.get("a").unwrap(), &a));
    assert!(InstanceBag::same(&map.get("b").unwrap(), &b));
    assert!(map.remove_if("a", &a));
    assert!(!map.contains_key("a"));
    assert!(map.contains_key("b"));
}

#[test]
fn test_direct_put_all_round_trip() {
    let session = StandardSession::shared("s1");
    let context = SessionContext::new(Some(session.clone()), &direct());
    assert_eq!(context.strategy(), StoreStrategy::Direct);
    put_all_round_trip(&context);
    assert_eq!(session.attribute_names(), vec!["b".to_string()]);
}

#[test]
fn test_generic_put_all_round_trip() {
    let session = Arc::new(ContainerSession::default());
    let context = SessionContext::new(Some(session.clone()), &generic());
    assert_eq!(context.strategy(), StoreStrategy::Generic);
    put_all_round_trip(&context);
    assert!(session.get_attribute("b").is_some());
}

#[test]
fn test_generic_put_if_absent_can_overwrite_concurrent_insert() {
    let session = Arc::new(ContendedSession::default());
    let rival = InstanceBag::shared("cart", 1u8);
    *session.rival_write.lock() = Some(("cart".to_string(), Arc::clone(&rival) as AttributeValue));
    let context = SessionContext::new(Some(session.clone()), &generic());

    let ours = InstanceBag::shared("cart", 2u8);
    // The read misses the rival's insert, so both writers believe they won
    assert!(context.instances().put_if_absent("cart", ours.clone()).is_none());

    let stored = context.instances().get("cart").unwrap();
    assert!(InstanceBag::same(&stored, &ours));
    assert!(!InstanceBag::same(&stored, &rival));
}

#[test]
fn test_direct_put_if_absent_sees_concurrent_insert() {
    let session = StandardSession::shared("s1");
    let context = SessionContext::new(Some(session.clone()), &direct());
    let rival = InstanceBag::shared("cart", 1u8);
    session
        .native_attributes()
        .unwrap()
        .write()
        .insert("cart".to_string(), rival.clone());

    let existing = context
        .instances()
        .put_if_absent("cart", InstanceBag::shared("cart", 2u8))
        .unwrap();
    assert!(InstanceBag::same(&existing, &rival));
}

#[test]
fn test_invalidated_session_stores_nothing_for_either_strategy() {
    for config in [direct(), generic()] {
        let session = StandardSession::shared("s1");
        let context = SessionContext::new(Some(session.clone()), &config);
        let bean = ManagedBean::new("Cart");
        session.invalidate();

        assert!(matches!(
            context.get_or_create(&bean, || 1u8),
            Err(StoreError::SessionInvalidated { .. })
        ));
        assert!(context
            .instances()
            .put(&bean, InstanceBag::shared("cart", 2u8))
            .is_none());
        assert!(context.get(&bean).is_none());
        assert!(session.attribute_names().is_empty(), "{}", context.strategy());
    }
}
