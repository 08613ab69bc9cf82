//! Integration tests for value-equality identity keys
//!
//! Tests parsing, display, nesting, and ordering of declaration keys.

use std::collections::BTreeSet;

use mixin_foundation::{DeclKey, NamespaceName, TypeParamKey, TypeSegment};
use proptest::prelude::*;

// =============================================================================
// NamespaceName
// =============================================================================

#[test]
fn namespace_child_and_parent() {
    let ns = NamespaceName::parse("Demo").child("Collections");
    assert_eq!(ns.full_name(), "Demo.Collections");
    assert_eq!(ns.parent(), Some(NamespaceName::parse("Demo")));
    assert_eq!(NamespaceName::global().parent(), None);
}

#[test]
fn namespace_global_prefix_is_ignored() {
    assert_eq!(NamespaceName::parse("global::Demo"), NamespaceName::parse("Demo"));
    assert!(NamespaceName::parse("global::").is_global());
}

// =============================================================================
// DeclKey
// =============================================================================

#[test]
fn generic_key_metadata_name() {
    let key = DeclKey::new(NamespaceName::parse("Demo"), "Box", 1);
    assert_eq!(key.metadata_name(), "Demo.Box`1");
    assert_eq!(key.name(), "Box");
    assert_eq!(key.arity(), 1);
}

#[test]
fn nested_key_round_trips_through_metadata() {
    let outer = DeclKey::new(NamespaceName::parse("Demo"), "Outer", 1);
    let inner = outer.nested("Inner", 0);
    assert_eq!(inner.to_string(), "Demo.Outer`1+Inner");
    assert_eq!(DeclKey::parse_metadata("Demo.Outer`1+Inner"), inner);
    assert_eq!(inner.containing_type(), Some(outer.clone()));
    assert!(inner.is_nested_in(&outer));
    assert!(!outer.is_nested_in(&inner));
}

#[test]
fn arity_distinguishes_keys() {
    let plain = DeclKey::parse_metadata("Demo.Box");
    let generic = DeclKey::parse_metadata("Demo.Box`1");
    assert_ne!(plain, generic);
    let set: BTreeSet<_> = [plain, generic].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn global_keys_have_no_namespace_prefix() {
    let key = DeclKey::parse_metadata("global::Plain");
    assert!(key.namespace.is_global());
    assert_eq!(key.to_string(), "Plain");
    assert_eq!(key.source_path(), vec!["Plain"]);
}

#[test]
fn type_param_keys_compare_by_value() {
    let declaring = DeclKey::parse_metadata("Demo.Box`1");
    let a = TypeParamKey::new(declaring.clone(), "T");
    let b = TypeParamKey::new(DeclKey::parse_metadata("Demo.Box`1"), "T");
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "Demo.Box`1.T");
    assert_ne!(a, TypeParamKey::new(declaring, "U"));
}

#[test]
fn segment_metadata_name() {
    assert_eq!(TypeSegment::new("Pair", 2).metadata_name(), "Pair`2");
    assert_eq!(TypeSegment::new("Plain", 0).metadata_name(), "Plain");
}

// =============================================================================
// Properties
// =============================================================================

fn ident() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,6}"
}

proptest! {
    #[test]
    fn metadata_names_parse_back(
        namespace in prop::collection::vec(ident(), 0..3),
        path in prop::collection::vec((ident(), 0usize..4), 1..3),
    ) {
        let mut key = DeclKey::new(NamespaceName::new(namespace), path[0].0.clone(), path[0].1);
        for (name, arity) in &path[1..] {
            key = key.nested(name.clone(), *arity);
        }
        prop_assert_eq!(DeclKey::parse_metadata(&key.metadata_name()), key);
    }

    #[test]
    fn ancestors_shrink_to_global(namespace in prop::collection::vec(ident(), 0..5)) {
        let ns = NamespaceName::new(namespace.clone());
        let ancestors: Vec<_> = ns.ancestors().collect();
        prop_assert_eq!(ancestors.len(), namespace.len() + 1);
        prop_assert_eq!(ancestors.first(), Some(&ns));
        prop_assert!(ancestors.last().is_some_and(NamespaceName::is_global));
    }
}
