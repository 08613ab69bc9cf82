//! Integration tests for the declaration parser
//!
//! Tests the shapes composition relies on: directives, nesting, and usings.

use mixin_foundation::ErrorKind;
use mixin_syntax::ast::{Expr, Modifier, TypeArgs, TypeKind, UsingDirective};
use mixin_syntax::{Member, NamespaceMember, TypeDecl, TypeRef, parse, parse_expr};

fn types(source: &str) -> Vec<TypeDecl> {
    fn collect(members: &[NamespaceMember], out: &mut Vec<TypeDecl>) {
        for member in members {
            match member {
                NamespaceMember::Type(decl) => out.push(decl.clone()),
                NamespaceMember::Namespace(ns) => collect(&ns.members, out),
            }
        }
    }
    let unit = parse(source).unwrap();
    let mut out = Vec::new();
    collect(&unit.members, &mut out);
    out
}

// =============================================================================
// Directives
// =============================================================================

#[test]
fn multiple_directives_on_one_target() {
    let decl = &types("[Mixin(typeof(A)), Mixin(typeof(B<int>))] partial class T { }")[0];
    let written: Vec<_> = decl
        .all_attributes()
        .map(|a| match &a.args[0].value {
            Expr::Typeof(TypeRef::Named(name), _) => name.segments[0].ident.clone(),
            other => panic!("expected typeof, got {other:?}"),
        })
        .collect();
    assert_eq!(written, vec!["A", "B"]);
    assert!(decl.has_modifier(Modifier::Partial));
}

#[test]
fn open_generic_directive() {
    let decl = &types("[Mixin(typeof(Pair<,>))] partial class P<A, B> { }")[0];
    let attr = decl.all_attributes().next().unwrap();
    let Expr::Typeof(TypeRef::Named(name), _) = &attr.args[0].value else {
        panic!("expected typeof");
    };
    assert_eq!(name.segments[0].args, TypeArgs::Open(2));
    assert_eq!(decl.arity(), 2);
}

#[test]
fn qualified_directive_annotation() {
    let decl = &types("[global::Mixin.MixinAttribute(typeof(A))] partial class T { }")[0];
    let attr = decl.all_attributes().next().unwrap();
    assert!(attr.name.global);
    assert_eq!(attr.name.dotted(), "global::Mixin.MixinAttribute");
    assert_eq!(attr.name.segments.len(), 2);
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn nested_namespaces_and_types() {
    let all = types("namespace A { namespace B { public struct S { internal interface I { } } } }");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].kind, TypeKind::Struct);
    let Member::Type(inner) = &all[0].members[0] else {
        panic!("expected nested type");
    };
    assert_eq!(inner.kind, TypeKind::Interface);
}

#[test]
fn usings_with_alias_and_static() {
    let unit = parse("using System; using static System.Math; using Col = System.Collections.Generic; class A { }")
        .unwrap();
    let UsingDirective { alias, is_static, .. } = &unit.usings[1];
    assert!(alias.is_none());
    assert!(*is_static);
    assert_eq!(unit.usings[2].alias.as_deref(), Some("Col"));
    assert_eq!(unit.usings[2].target.dotted(), "System.Collections.Generic");
}

#[test]
fn type_kinds_keep_their_keyword() {
    let all = types("interface IShape { } struct Point : IShape { } static class Helpers { }");
    let kinds: Vec<_> = all.iter().map(|d| d.kind.keyword()).collect();
    assert_eq!(kinds, vec!["interface", "struct", "class"]);
    assert!(all[2].has_modifier(Modifier::Static));
}

// =============================================================================
// Shift operators
// =============================================================================

#[test]
fn right_shift_binds_like_left_shift() {
    let Expr::Binary(op, left, _, _) = parse_expr("a >> 2 + b").unwrap() else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, ">>");
    assert!(matches!(*left, Expr::Name(_)));

    let Expr::Binary(op, left, _, _) = parse_expr("x >> 1 < y").unwrap() else {
        panic!("expected a binary expression");
    };
    assert_eq!(op, "<");
    assert!(matches!(*left, Expr::Binary(ref inner, ..) if inner == ">>"));
}

#[test]
fn right_shift_assignment() {
    let Expr::Assign(op, ..) = parse_expr("bits >>= 3").unwrap() else {
        panic!("expected an assignment");
    };
    assert_eq!(op, ">>=");
}

#[test]
fn right_shift_in_members_and_nested_generics() {
    let decl = &types(
        "class A { int x = 1 >> 2; List<List<int>> rows; static A operator >>(A a, int n) => a; void M() { x >>= 1; } }",
    )[0];
    assert_eq!(decl.members.len(), 4);
    let Member::Operator(operator) = &decl.members[2] else {
        panic!("expected an operator");
    };
    assert_eq!(operator.operator, ">>");
}

#[test]
fn separated_angle_brackets_are_not_a_shift() {
    assert!(parse_expr("a > > b").is_err());
    assert!(parse_expr("a >> b").is_ok());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn missing_brace_is_a_parse_error() {
    let err = parse("namespace Demo { class A { }").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ParseError { .. }));
    assert!(err.is_pass_fatal());
}
