//! Integration tests for tree traversal
//!
//! Tests read-only visitors and consuming transforms over parsed declarations.

use mixin_syntax::ast::{NameSegment, TypeName};
use mixin_syntax::pretty::pretty_print_unit;
use mixin_syntax::visitor::{SyntaxTransform, SyntaxVisitor, collect_locals, fold_type_ref, walk_unit};
use mixin_syntax::{NamespaceMember, TypeDecl, TypeRef, parse};

fn first_type(source: &str) -> TypeDecl {
    match parse(source).unwrap().members.into_iter().next() {
        Some(NamespaceMember::Type(decl)) => decl,
        other => panic!("expected type, got {other:?}"),
    }
}

#[derive(Default)]
struct NameCollector(Vec<String>);

impl SyntaxVisitor for NameCollector {
    fn visit_type_name(&mut self, name: &TypeName) {
        self.0.push(name.dotted());
        mixin_syntax::visitor::walk_type_name(self, name);
    }
}

#[test]
fn visitor_reaches_attributes_and_bases() {
    let unit = parse("[Mixin(typeof(Box<Item>))] partial class T : IThing { }").unwrap();
    let mut names = NameCollector::default();
    walk_unit(&mut names, &unit);
    assert!(names.0.contains(&"Mixin".to_string()));
    assert!(names.0.contains(&"Box".to_string()));
    assert!(names.0.contains(&"Item".to_string()));
    assert!(names.0.contains(&"IThing".to_string()));
}

#[test]
fn locals_include_parameters_but_not_fields() {
    let decl = first_type("class A { int field; int M(int p) { var q = p; return q + field; } }");
    let locals = collect_locals(&decl.members[1]);
    assert!(locals.contains("p"));
    assert!(locals.contains("q"));
    assert!(!locals.contains("field"));
}

#[test]
fn transform_can_qualify_every_named_type() {
    struct Qualify;
    impl SyntaxTransform for Qualify {
        fn transform_type_ref(&mut self, ty: TypeRef) -> TypeRef {
            match ty {
                TypeRef::Named(name) if name.is_simple() => {
                    TypeRef::Named(TypeName::global(vec![NameSegment::new("Demo"), name.segments[0].clone()]))
                }
                other => fold_type_ref(self, other),
            }
        }
    }

    let decl = Qualify.transform_type_decl(first_type("class A { Item item; Item Get(Item other) => other; }"));
    let unit = mixin_syntax::CompilationUnit {
        usings: Vec::new(),
        members: vec![NamespaceMember::Type(decl)],
    };
    let printed = pretty_print_unit(&unit);
    assert!(printed.contains("global::Demo.Item item;"));
    assert!(printed.contains("global::Demo.Item Get(global::Demo.Item other)"));
}
