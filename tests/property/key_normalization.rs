//! Property-based tests for store key normalization

use beanctx::session::{key_of, InstanceBag, ManagedBean, SessionContext, PASSIVATION_ID_PREFIX};
use proptest::prelude::*;

fn class_name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9_.]{0,24}"
}

fn qualifiers() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("@[A-Z][a-z]{1,8}", 0..4)
}

proptest! {
    /// Tokens are already keys and pass through unchanged
    #[test]
    fn test_token_keys_are_identity(token in ".*") {
        prop_assert_eq!(key_of(token.as_str()), token.as_str());
    }

    /// Qualifier order never changes the derived key
    #[test]
    fn test_key_ignores_qualifier_order(class in class_name(), mut quals in qualifiers()) {
        let forward = quals
            .iter()
            .fold(ManagedBean::new(class.clone()), |bean, q| bean.with_qualifier(q.clone()));
        quals.reverse();
        let backward = quals
            .iter()
            .fold(ManagedBean::new(class.clone()), |bean, q| bean.with_qualifier(q.clone()));
        prop_assert_eq!(key_of(&forward), key_of(&backward));
    }

    /// Derived keys carry the prefix and stay distinct per class
    #[test]
    fn test_distinct_classes_get_distinct_keys(a in class_name(), b in class_name()) {
        let key_a = key_of(&ManagedBean::new(a.clone())).into_owned();
        let key_b = key_of(&ManagedBean::new(b.clone())).into_owned();
        prop_assert!(key_a.starts_with(PASSIVATION_ID_PREFIX));
        prop_assert_eq!(key_a == key_b, a == b);
    }

    /// A contextual and its derived key address the same stored bag
    #[test]
    fn test_contextual_and_key_address_same_entry(class in class_name()) {
        let context = SessionContext::detached();
        let bean = ManagedBean::new(class);
        let bag = context.get_or_create(&bean, || 0u8).unwrap();
        let key = key_of(&bean).into_owned();
        let by_key = context.get(key.as_str()).unwrap();
        prop_assert!(InstanceBag::same(&bag, &by_key));
    }
}
