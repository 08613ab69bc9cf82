//! Integration tests for Error types
//!
//! Tests error construction, display, context, and pass-fatality.

use mixin_foundation::{DeclKey, Error, ErrorContext, ErrorKind};

fn key(name: &str) -> DeclKey {
    DeclKey::parse_metadata(name)
}

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn unresolved_template() {
    let err = Error::unresolved_template("Missing");
    assert!(matches!(err.kind, ErrorKind::UnresolvedTemplate(_)));
    assert_eq!(err.to_string(), "unresolved template: Missing");
    assert!(!err.is_pass_fatal());
}

#[test]
fn member_conflict_names_member_and_target() {
    let err = Error::member_conflict(&key("Demo.Target"), "Count");
    let msg = err.to_string();
    assert!(msg.contains("Count"));
    assert!(msg.contains("Demo.Target"));
    assert!(!err.is_pass_fatal());
}

#[test]
fn dependency_failed_names_both_sides() {
    let err = Error::dependency_failed(&key("Demo.Child"), &key("Demo.Parent"));
    assert_eq!(err.to_string(), "Demo.Child skipped: dependency Demo.Parent failed");
}

#[test]
fn foreign_annotation_is_pass_fatal() {
    let err = Error::foreign_annotation(&key("Mixin.MixinAttribute"), "Mixin", "App");
    assert!(matches!(err.kind, ErrorKind::ForeignAnnotation { .. }));
    assert!(err.to_string().contains("'App'"));
    assert!(err.is_pass_fatal());
}

#[test]
fn circular_dependency_is_pass_fatal() {
    let err = Error::circular_dependency(&key("A"), vec![key("A"), key("B"), key("A")]);
    assert!(err.is_pass_fatal());
    assert!(err.to_string().contains("A -> B -> A"));
}

#[test]
fn binding_arity_reports_counts() {
    let err = Error::binding_arity(&key("Demo.Pair`2"), 2, 1);
    assert_eq!(
        err.kind,
        ErrorKind::BindingArity {
            template: key("Demo.Pair`2"),
            expected: 2,
            actual: 1,
        }
    );
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_attached() {
    let err = Error::unresolved_template("Missing").with_context(
        ErrorContext::new()
            .with_declaration("Demo.Target")
            .with_directive("Missing")
            .with_source("App.cs")
            .with_position(3, 5),
    );
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.declaration.as_deref(), Some("Demo.Target"));
    assert_eq!(context.line, Some(3));
    assert_eq!(context.to_string(), "in Demo.Target [Missing] at App.cs:3:5");
}

#[test]
fn context_frames_are_listed() {
    let context = ErrorContext::new()
        .with_declaration("Demo.Target")
        .with_frame("binding Box`1")
        .with_frame("rewriting Value");
    assert_eq!(
        context.to_string(),
        "in Demo.Target\n  in binding Box`1\n  in rewriting Value"
    );
}
