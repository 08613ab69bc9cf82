//! Integration tests for generic binding
//!
//! Tests that every template parameter is bound exactly once, in the
//! target's naming context.

use mixin_engine::{Binding, ComposeConfig, SymbolGraph, Universe, bind, validate_annotations};
use mixin_foundation::{DeclKey, ErrorKind, Result, TypeParamKey};
use mixin_syntax::pretty::pretty_print_type_ref;
use proptest::prelude::*;

fn bind_first(source: &str) -> Result<Binding> {
    let mut u = Universe::with_reference("Mixin").unwrap();
    u.add_source(source, "App").unwrap();
    let keys = validate_annotations(&u, &ComposeConfig::default()).unwrap();
    let graph = SymbolGraph::build(&u, &keys);
    let annotated = &graph.annotated()[0];
    let params = u.type_params_of(&annotated.key);
    bind(&u, &annotated.directives[0], &params)
}

fn template_source(arity: usize, args: &[&str]) -> String {
    let params: Vec<String> = (0..arity).map(|i| format!("T{i}")).collect();
    format!(
        "using Mixin; namespace Lib {{ class Item {{ }} class Tpl<{}> {{ }} }} namespace App {{ using Lib; [Mixin(typeof(Tpl<{}>))] partial class Target {{ }} }}",
        params.join(", "),
        args.join(", ")
    )
}

#[test]
fn arguments_resolve_in_the_targets_imports() {
    let binding = bind_first(&template_source(2, &["Item", "Item[]"])).unwrap();
    let rendered: Vec<_> = binding.iter().map(|(_, ty)| pretty_print_type_ref(ty)).collect();
    assert_eq!(rendered, vec!["global::Lib.Item", "global::Lib.Item[]"]);
}

#[test]
fn nullable_keyword_arguments_are_expanded() {
    let binding = bind_first(&template_source(1, &["int?"])).unwrap();
    let key = TypeParamKey::new(DeclKey::parse_metadata("Lib.Tpl`1"), "T0");
    assert_eq!(
        binding.get(&key).map(pretty_print_type_ref).as_deref(),
        Some("global::System.Int32?")
    );
}

fn arg() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["int", "string", "Item", "bool", "Item[]", "double?"])
}

proptest! {
    #[test]
    fn every_parameter_is_bound_once(args in prop::collection::vec(arg(), 1..6)) {
        let binding = bind_first(&template_source(args.len(), &args)).unwrap();
        prop_assert_eq!(binding.len(), args.len());
        let template = DeclKey::parse_metadata(&format!("Lib.Tpl`{}", args.len()));
        for i in 0..args.len() {
            let key = TypeParamKey::new(template.clone(), format!("T{i}"));
            prop_assert!(binding.get(&key).is_some());
        }
    }

    #[test]
    fn argument_count_must_match(arity in 1usize..5, supplied in 1usize..5) {
        prop_assume!(arity != supplied);
        let args = vec!["int"; supplied];
        let source = template_source(arity, &args);
        let err = bind_first(&source).unwrap_err();
        prop_assert_eq!(
            err.kind,
            ErrorKind::BindingArity {
                template: DeclKey::parse_metadata(&format!("Lib.Tpl`{arity}")),
                expected: arity,
                actual: supplied,
            }
        );
    }
}
