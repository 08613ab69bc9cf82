//! Integration tests for the symbol universe and name lookup
//!
//! Tests registration, snapshots, and the lookup order for simple,
//! qualified, attribute, and keyword names.

use mixin_engine::{LookupContext, Resolved, Universe};
use mixin_foundation::{DeclKey, NamespaceName, TypeParamKey};
use mixin_syntax::parse_type_ref;
use mixin_syntax::TypeName;

const SOURCE: &str = r"
    using System;
    using Mixin;
    using Gen = System.Collections.Generic;
    namespace Outer
    {
        class Shared { }
        namespace Inner
        {
            class Shared { }
            class Holder<T>
            {
                class Shared { }
                class Node { }
            }
        }
    }
    class Shared { }
    class Exception { }
";

fn universe() -> Universe {
    let mut u = Universe::with_reference("Mixin").unwrap();
    u.add_source(SOURCE, "App").unwrap();
    u
}

fn name(text: &str) -> TypeName {
    match parse_type_ref(text).unwrap() {
        mixin_syntax::TypeRef::Named(name) => name,
        other => panic!("expected a name, got {other:?}"),
    }
}

fn context_of(u: &Universe, key: &str) -> LookupContext {
    u.parts(&DeclKey::parse_metadata(key)).next().unwrap().member_context()
}

fn resolve(u: &Universe, context: &LookupContext, text: &str) -> Option<String> {
    u.resolve_type(context, &name(text)).map(|k| k.to_string())
}

// =============================================================================
// Universe
// =============================================================================

#[test]
fn nested_declarations_are_registered() {
    let u = universe();
    assert!(u.contains(&DeclKey::parse_metadata("Outer.Inner.Holder`1+Node")));
    assert!(u.has_namespace(&NamespaceName::parse("Outer.Inner")));
    assert_eq!(u.module_of(&DeclKey::parse_metadata("Outer.Shared")), Some("App"));
    assert_eq!(u.module_of(&DeclKey::parse_metadata("System.Int32")), Some("System.Runtime"));
}

#[test]
fn snapshots_are_unaffected_by_later_registration() {
    let mut u = universe();
    let snapshot = u.clone();
    u.add_source("namespace Later { class Added { } }", "App").unwrap();
    assert!(u.contains(&DeclKey::parse_metadata("Later.Added")));
    assert!(!snapshot.contains(&DeclKey::parse_metadata("Later.Added")));
    assert_eq!(snapshot.len() + 1, u.len());
}

#[test]
fn partial_declarations_accumulate_parts() {
    let mut u = universe();
    u.add_source("namespace Outer { partial class Split { int a; } partial class Split { int b; } }", "App")
        .unwrap();
    let key = DeclKey::parse_metadata("Outer.Split");
    assert_eq!(u.parts(&key).count(), 2);
    assert_eq!(u.member_names_of(&key), vec!["a", "b"]);
}

// =============================================================================
// Lookup order
// =============================================================================

#[test]
fn innermost_declaration_wins() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(resolve(&u, &holder, "Shared").as_deref(), Some("Outer.Inner.Holder`1+Shared"));

    let inner = context_of(&u, "Outer.Inner.Shared");
    assert_eq!(resolve(&u, &inner, "Shared").as_deref(), Some("Outer.Inner.Shared"));

    let outer = context_of(&u, "Outer.Shared");
    assert_eq!(resolve(&u, &outer, "Shared").as_deref(), Some("Outer.Shared"));
}

#[test]
fn type_parameters_come_first() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(
        u.resolve_name(&holder, &name("T")),
        Some(Resolved::TypeParam(TypeParamKey::new(
            DeclKey::parse_metadata("Outer.Inner.Holder`1"),
            "T"
        )))
    );
}

#[test]
fn imports_come_before_the_global_namespace() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(resolve(&u, &holder, "Exception").as_deref(), Some("System.Exception"));
    assert_eq!(resolve(&u, &LookupContext::global(), "Exception").as_deref(), Some("Exception"));
}

#[test]
fn nested_namespace_usings_come_before_outer_namespace_members() {
    let mut u = Universe::with_reference("Mixin").unwrap();
    u.add_source(
        r"
        using Lib;
        namespace Lib { class Widget { } }
        namespace Outer
        {
            class Widget { }
            class Plain { }
            namespace Inner
            {
                using Lib;
                class User { }
            }
        }
        ",
        "App",
    )
    .unwrap();
    let user = context_of(&u, "Outer.Inner.User");
    assert_eq!(resolve(&u, &user, "Widget").as_deref(), Some("Lib.Widget"));
    let plain = context_of(&u, "Outer.Plain");
    assert_eq!(resolve(&u, &plain, "Widget").as_deref(), Some("Outer.Widget"));
}

#[test]
fn aliases_name_namespaces() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(
        resolve(&u, &holder, "Gen.List<int>").as_deref(),
        Some("System.Collections.Generic.List`1")
    );
}

#[test]
fn global_qualified_names_skip_scopes() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(resolve(&u, &holder, "global::Shared").as_deref(), Some("Shared"));
    assert_eq!(resolve(&u, &holder, "global::Outer.Shared").as_deref(), Some("Outer.Shared"));
}

#[test]
fn arity_selects_the_declaration() {
    let u = universe();
    let context = LookupContext::global();
    assert_eq!(resolve(&u, &context, "System.Collections.Generic.List<int>").as_deref(), Some("System.Collections.Generic.List`1"));
    assert_eq!(resolve(&u, &context, "System.Collections.Generic.List"), None);
    assert_eq!(
        u.resolve_type_any_arity(&context, &name("System.Collections.Generic.List"))
            .map(|k| k.to_string())
            .as_deref(),
        Some("System.Collections.Generic.List`1")
    );
}

#[test]
fn attributes_prefer_the_suffixed_name() {
    let u = universe();
    let holder = context_of(&u, "Outer.Inner.Holder`1");
    assert_eq!(
        u.resolve_attribute(&holder, &name("Mixin")).map(|k| k.to_string()).as_deref(),
        Some("Mixin.MixinAttribute")
    );
    assert_eq!(
        u.resolve_attribute(&holder, &name("MixinAttribute")).map(|k| k.to_string()).as_deref(),
        Some("Mixin.MixinAttribute")
    );
    assert_eq!(
        u.resolve_attribute(&holder, &name("Obsolete")).map(|k| k.to_string()).as_deref(),
        Some("System.ObsoleteAttribute")
    );
}

#[test]
fn keywords_map_to_system_types() {
    let u = universe();
    assert!(u.contains(&mixin_engine::lookup::predefined_key("int", 0).unwrap()));
    assert_eq!(mixin_engine::lookup::predefined_key("int", 1), None);
    assert_eq!(
        mixin_engine::lookup::predefined_key("int", 0).map(|k| k.to_string()).as_deref(),
        Some("System.Int32")
    );
    assert_eq!(
        mixin_engine::lookup::predefined_key("string", 0).map(|k| k.to_string()).as_deref(),
        Some("System.String")
    );
}
