//! Integration tests for reference rewriting
//!
//! Tests that rewritten references mean the same thing from any target
//! namespace, and that rewriting settles after one application.

use mixin_engine::{Binding, LookupContext, Rewriter, Universe};
use mixin_foundation::{DeclKey, TypeParamKey};
use mixin_syntax::pretty::pretty_print_type_ref;
use mixin_syntax::parse_type_ref;
use proptest::prelude::*;

const SOURCE: &str = r"
    using System.Collections.Generic;
    namespace Foo
    {
        class Bar { }
    }
    namespace Lib
    {
        using Foo;
        class Item { }
        class Tpl<T>
        {
            public Bar Shared;
        }
    }
    namespace Elsewhere
    {
        class Bar { }
        class Item { }
    }
";

fn universe() -> Universe {
    let mut u = Universe::with_reference("Mixin").unwrap();
    u.add_source(SOURCE, "App").unwrap();
    u
}

fn tpl() -> DeclKey {
    DeclKey::parse_metadata("Lib.Tpl`1")
}

fn tpl_context(u: &Universe) -> LookupContext {
    u.parts(&tpl()).next().unwrap().member_context()
}

fn binding(arg: &str) -> Binding {
    let mut binding = Binding::empty();
    binding.insert(TypeParamKey::new(tpl(), "T"), parse_type_ref(arg).unwrap());
    binding
}

fn rewrite(u: &Universe, binding: &Binding, text: &str) -> String {
    let mut rewriter = Rewriter::new(u, binding, tpl_context(u));
    pretty_print_type_ref(&rewriter.rewrite_type_ref(parse_type_ref(text).unwrap()))
}

#[test]
fn already_qualified_references_are_unchanged() {
    let u = universe();
    let b = binding("global::System.Int32");
    assert_eq!(rewrite(&u, &b, "global::Foo.Bar"), "global::Foo.Bar");
    assert_eq!(
        rewrite(&u, &b, "global::System.Collections.Generic.List<global::Foo.Bar>"),
        "global::System.Collections.Generic.List<global::Foo.Bar>"
    );
}

#[test]
fn template_imports_decide_meaning() {
    let u = universe();
    let b = binding("global::System.Int32");
    assert_eq!(rewrite(&u, &b, "Bar"), "global::Foo.Bar");
    assert_eq!(rewrite(&u, &b, "Item"), "global::Lib.Item");
}

#[test]
fn bound_arguments_are_inserted_verbatim() {
    let u = universe();
    let b = binding("global::Elsewhere.Item");
    assert_eq!(
        rewrite(&u, &b, "Dictionary<T, Item>"),
        "global::System.Collections.Generic.Dictionary<global::Elsewhere.Item, global::Lib.Item>"
    );
}

#[test]
fn keyword_expansion_is_opt_in() {
    let u = universe();
    let b = Binding::empty();
    let mut plain = Rewriter::new(&u, &b, LookupContext::global());
    let mut expanding = Rewriter::new(&u, &b, LookupContext::global()).with_keyword_expansion();
    let ty = parse_type_ref("List<int>").unwrap();
    assert_eq!(pretty_print_type_ref(&plain.rewrite_type_ref(ty.clone())), "List<int>");
    assert_eq!(pretty_print_type_ref(&expanding.rewrite_type_ref(ty)), "List<global::System.Int32>");
}

fn type_text() -> impl Strategy<Value = String> {
    let leaf = prop::sample::select(vec!["T", "Item", "Bar", "int", "string", "global::Foo.Bar"]).prop_map(String::from);
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|t| format!("List<{t}>")),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| format!("Dictionary<{k}, {v}>")),
            inner.prop_map(|t| format!("{t}[]")),
        ]
    })
}

proptest! {
    #[test]
    fn rewriting_is_idempotent(text in type_text()) {
        let u = universe();
        let b = binding("global::System.Int32");
        let once = rewrite(&u, &b, &text);
        let twice = rewrite(&u, &b, &once);
        prop_assert_eq!(twice, once.clone());
        prop_assert!(!once.contains("List<") || once.contains("global::System.Collections.Generic.List<"));
    }
}
