//! Composition failure tests
//!
//! Tests which failures stay with one target and which abort the pass.

use mixin::engine::{ComposeConfig, Composer, CompositionOutput, Severity, Universe, compose_sources};
use mixin::foundation::{DeclKey, ErrorKind};

fn compose(source: &str) -> CompositionOutput {
    compose_sources(&[(source, "App")], ComposeConfig::default()).unwrap()
}

fn key(name: &str) -> DeclKey {
    DeclKey::parse_metadata(name)
}

// =============================================================================
// Per-target failures
// =============================================================================

#[test]
fn unresolved_template_fails_only_its_target() {
    let out = compose(
        r"
        using Mixin;
        class Good { public int G; }
        [Mixin(typeof(Nowhere))] partial class Broken { }
        [Mixin(typeof(Good))] partial class Fine { }
        ",
    );
    assert!(!out.is_success());
    assert!(out.get(&key("Fine")).is_some());
    let err = out.failure(&key("Broken")).unwrap();
    assert_eq!(err.kind, ErrorKind::UnresolvedTemplate("Nowhere".to_string()));
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.declaration.as_deref(), Some("Broken"));
    assert_eq!(context.line, Some(4));
}

#[test]
fn dependents_of_a_failed_target_are_skipped() {
    let out = compose(
        r"
        using Mixin;
        [Mixin(typeof(Nowhere))] partial class Broken { }
        [Mixin(typeof(Broken))] partial class Child { }
        ",
    );
    assert!(out.declarations.is_empty());
    assert_eq!(
        out.failure(&key("Child")).map(|e| e.kind.clone()),
        Some(ErrorKind::DependencyFailed {
            target: key("Child"),
            dependency: key("Broken"),
        })
    );
    assert_eq!(out.diagnostics.errors().count(), 2);
}

#[test]
fn arity_mismatch_fails_the_target() {
    let out = compose(
        r"
        using Mixin;
        class Pair<A, B> { }
        [Mixin(typeof(Pair<int>))] partial class Half { }
        ",
    );
    assert!(matches!(
        out.failure(&key("Half")).map(|e| &e.kind),
        Some(ErrorKind::BindingArity { expected: 2, actual: 1, .. })
    ));
}

#[test]
fn unresolved_member_references_are_warnings() {
    let out = compose(
        r"
        using Mixin;
        class Loose { public Mystery Thing; }
        [Mixin(typeof(Loose))] partial class Target { }
        ",
    );
    assert!(out.is_success());
    let text = out.render_target(&key("Target")).unwrap();
    assert!(text.contains("public Mystery Thing;"));
    let warnings: Vec<_> = out.diagnostics.for_target(&key("Target")).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert!(warnings[0].message.contains("Mystery"));
}

// =============================================================================
// Pass-fatal failures
// =============================================================================

#[test]
fn cycles_abort_the_pass() {
    let err = compose_sources(
        &[(
            r"
            using Mixin;
            [Mixin(typeof(B))] partial class A { }
            [Mixin(typeof(A))] partial class B { }
            ",
            "App",
        )],
        ComposeConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_pass_fatal());
    let ErrorKind::CircularDependency { cycle, .. } = err.kind else {
        panic!("expected a cycle");
    };
    assert!(cycle.contains(&key("A")));
    assert!(cycle.contains(&key("B")));
}

#[test]
fn self_composition_is_a_cycle() {
    let err = compose_sources(
        &[("using Mixin; [Mixin(typeof(Loop))] partial class Loop { }", "App")],
        ComposeConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CircularDependency { .. }));
}

#[test]
fn annotations_from_another_module_abort_the_pass() {
    let mut composer = Composer::new(ComposeConfig::default()).unwrap();
    composer
        .add_source("namespace Mixin { public sealed class MixinAttribute : System.Attribute { } }", "Impostor")
        .unwrap();
    composer
        .add_source("using Mixin; class T { } [Mixin(typeof(T))] partial class X { }", "App")
        .unwrap();
    let err = composer.compose().unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::ForeignAnnotation {
            annotation: key("Mixin.MixinAttribute"),
            expected_module: "Mixin".to_string(),
            actual_module: "Impostor".to_string(),
        }
    );
}

#[test]
fn a_universe_without_the_directive_annotation_is_rejected() {
    let mut universe = Universe::new();
    universe
        .add_source("using Mixin; class T { } [Mixin(typeof(T))] partial class X { }", "App")
        .unwrap();
    let err = Composer::with_universe(ComposeConfig::default(), universe)
        .compose()
        .unwrap_err();
    assert!(err.is_pass_fatal());
    assert_eq!(
        err.kind,
        ErrorKind::MissingAnnotation {
            annotation: key("Mixin.MixinAttribute"),
            expected_module: "Mixin".to_string(),
        }
    );
}

#[test]
fn sources_that_do_not_parse_are_rejected() {
    let err = compose_sources(&[("class Broken {", "Broken.cs")], ComposeConfig::default()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
    assert_eq!(err.context.and_then(|c| c.source).as_deref(), Some("Broken.cs"));
}
