//! Integration tests for the source printer
//!
//! Tests that printed output is stable and reparses to the same tree.

use mixin_syntax::parse;
use mixin_syntax::pretty::{PrettyConfig, pretty_print_member, pretty_print_unit, pretty_print_unit_with_config};
use proptest::prelude::*;

fn reprint(source: &str) -> String {
    pretty_print_unit(&parse(source).unwrap())
}

#[test]
fn printing_is_a_fixed_point() {
    let source = r"
        using System;
        namespace Demo.Shapes
        {
            public interface IShape { double Area(); }
            public struct Square : IShape
            {
                private readonly double side;
                public Square(double side) { this.side = side; }
                public double Area() => side * side;
            }
        }";
    let once = reprint(source);
    let twice = pretty_print_unit(&parse(&once).unwrap());
    assert_eq!(once, twice);
}

#[test]
fn global_qualified_names_survive_printing() {
    let printed = reprint("class A { private global::System.Collections.Generic.List<global::System.Int32> items; }");
    assert!(printed.contains("private global::System.Collections.Generic.List<global::System.Int32> items;"));
}

#[test]
fn members_print_without_their_declaring_type() {
    let unit = parse("class A { [Obsolete] public int Count => 0; }").unwrap();
    let mixin_syntax::NamespaceMember::Type(decl) = &unit.members[0] else {
        panic!("expected a type");
    };
    let printed = pretty_print_member(&decl.members[0]);
    assert!(printed.starts_with("[Obsolete]"));
    assert!(printed.contains("public int Count => 0;"));
    assert!(!printed.contains("class A"));
}

#[test]
fn compact_layout_drops_blank_lines() {
    let unit = parse("class A { int x; int y; }").unwrap();
    let printed = pretty_print_unit_with_config(
        &unit,
        PrettyConfig {
            blank_line_between_members: false,
            ..PrettyConfig::default()
        },
    );
    assert_eq!(printed, "class A\n{\n    int x;\n    int y;\n}\n");
}

#[test]
fn shift_operators_reprint() {
    let once = reprint(
        "class Bits { int x = 1 >> 2; List<List<int>> rows; void M() { x >>= 1; x <<= 2; x = x << 3 >> 1; } }",
    );
    assert!(once.contains("int x = 1 >> 2;"));
    assert!(once.contains("List<List<int>> rows;"));
    assert!(once.contains("x >>= 1;"));
    assert!(once.contains("x = x << 3 >> 1;"));
    assert_eq!(pretty_print_unit(&parse(&once).unwrap()), once);
}

proptest! {
    #[test]
    fn generated_members_reparse(
        name in "[A-Z][a-z]{1,6}",
        fields in prop::collection::vec("[a-z][a-z0-9]{1,6}", 1..5),
    ) {
        let mut fields = fields;
        fields.sort();
        fields.dedup();
        let body: String = fields
            .iter()
            .map(|f| format!("public global::System.String {f}; "))
            .collect();
        let source = format!("namespace Gen {{ public partial class {name} {{ {body}}} }}");
        let printed = reprint(&source);
        prop_assert_eq!(pretty_print_unit(&parse(&printed).unwrap()), printed.clone());
        for field in &fields {
            let expected = format!("public global::System.String {field};");
            prop_assert!(printed.contains(&expected));
        }
    }
}
