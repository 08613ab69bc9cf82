//! End-to-end composition tests
//!
//! Tests generic binding, qualification, nested types, chained templates,
//! and provenance in rendered output.

use mixin::engine::{ComposeConfig, CompositionOutput, compose_sources};
use mixin::foundation::DeclKey;

fn compose(source: &str) -> CompositionOutput {
    compose_sources(&[(source, "App")], ComposeConfig::default()).unwrap()
}

fn rendered(out: &CompositionOutput, key: &str) -> String {
    out.render_target(&DeclKey::parse_metadata(key))
        .unwrap_or_else(|| panic!("{key} was not composed: {:?}", out.failures))
}

// =============================================================================
// Generic templates
// =============================================================================

#[test]
fn type_parameters_and_self_references_are_replaced() {
    let out = compose(
        r"
        using Mixin;
        namespace Lib
        {
            public class Box<T>
            {
                public T Value;
                [return: Substitute]
                public Box<T> With(T value) { Value = value; return this; }
            }
        }
        namespace App
        {
            using Lib;
            [Mixin(typeof(Box<int>))]
            public partial class IntBox { }
        }
        ",
    );
    let text = rendered(&out, "App.IntBox");
    assert!(text.contains("namespace App"));
    assert!(text.contains("public partial class IntBox"));
    assert!(text.contains("public global::System.Int32 Value;"));
    assert!(text.contains("public global::App.IntBox With(global::System.Int32 value)"));
    assert!(!text.contains("Substitute"));
    assert!(!text.contains("Box<"));
    assert!(!text.contains(" T ") && !text.contains("(T "));
}

#[test]
fn open_templates_bind_to_target_parameters() {
    let out = compose(
        r"
        using Mixin;
        using System.Collections.Generic;
        class Pair<A, B>
        {
            public A First;
            public Dictionary<A, B> Lookup;
        }
        [Mixin(typeof(Pair<,>))]
        partial class Both<X, Y> { }
        ",
    );
    let text = rendered(&out, "Both`2");
    assert!(text.contains("partial class Both<X, Y>"));
    assert!(text.contains("public X First;"));
    assert!(text.contains("public global::System.Collections.Generic.Dictionary<X, Y> Lookup;"));
}

#[test]
fn references_keep_the_templates_meaning() {
    let out = compose(
        r"
        using Mixin;
        namespace Lib
        {
            using System.Collections.Generic;
            class Item { }
            class Store
            {
                public List<Item> Items = new List<Item>();
                public global::Lib.Item First() => Items[0];
            }
        }
        namespace App
        {
            class Item { }
            [Mixin(typeof(Lib.Store))]
            partial class Shop { }
        }
        ",
    );
    let text = rendered(&out, "App.Shop");
    assert!(text.contains(
        "public global::System.Collections.Generic.List<global::Lib.Item> Items = new global::System.Collections.Generic.List<global::Lib.Item>();"
    ));
    assert!(text.contains("public global::Lib.Item First() => Items[0];"));
}

// =============================================================================
// Declarations
// =============================================================================

#[test]
fn nested_types_are_copied_and_redirected() {
    let out = compose(
        r"
        using Mixin;
        namespace Demo
        {
            class LinkedBox<T>
            {
                public class Node { public T Data; public Node Next; }
                public Node Head;
            }
            [Mixin(typeof(LinkedBox<string>))]
            partial class Names { }
        }
        ",
    );
    let text = rendered(&out, "Demo.Names");
    assert!(text.contains("public class Node"));
    assert!(text.contains("public global::System.String Data;"));
    assert!(text.contains("public global::Demo.Names.Node Next;"));
    assert!(text.contains("public global::Demo.Names.Node Head;"));
}

#[test]
fn constructors_take_the_target_name() {
    let out = compose(
        r"
        using Mixin;
        class Counter { private int count; public Counter(int start) { count = start; } }
        [Mixin(typeof(Counter))] partial class Clicks { }
        ",
    );
    let text = rendered(&out, "Clicks");
    assert!(text.contains("public Clicks(int start)"));
    assert!(!text.contains("Counter("));
}

#[test]
fn nested_targets_are_wrapped_in_their_containers() {
    let out = compose(
        r"
        using Mixin;
        namespace Demo
        {
            class Flag { public bool Enabled; }
            public partial class Outer
            {
                [Mixin(typeof(Flag))]
                internal partial class Inner { }
            }
        }
        ",
    );
    let text = rendered(&out, "Demo.Outer+Inner");
    assert!(text.contains("public partial class Outer"));
    assert!(text.contains("internal partial class Inner"));
    assert!(text.contains("public bool Enabled;"));
}

#[test]
fn interface_bases_are_carried_over() {
    let out = compose(
        r"
        using Mixin;
        namespace Demo
        {
            interface IShape { double Area(); }
            class Base { }
            class Square : Base, IShape { public double Side; public double Area() => Side * Side; }
            [Mixin(typeof(Square))] partial class Tile { }
        }
        ",
    );
    let text = rendered(&out, "Demo.Tile");
    assert!(text.contains("partial class Tile : global::Demo.IShape"));
    assert!(!text.contains("Base"));
}

#[test]
fn abstract_methods_become_partial() {
    let out = compose(
        r"
        using Mixin;
        abstract class Hooks { protected abstract void OnChange(); public void Touch() { OnChange(); } }
        [Mixin(typeof(Hooks))] partial class Model { }
        ",
    );
    let text = rendered(&out, "Model");
    assert!(text.contains("protected partial void OnChange();"));
    assert!(!text.contains("abstract"));
}

#[test]
fn chained_templates_see_composed_members() {
    let out = compose(
        r"
        using Mixin;
        namespace Demo
        {
            class A { public int FromA; }
            [Mixin(typeof(A))] partial class B { public int OwnB; }
            [Mixin(typeof(B))] partial class C { }
        }
        ",
    );
    assert!(out.is_success());
    let b = DeclKey::parse_metadata("Demo.B");
    let c = DeclKey::parse_metadata("Demo.C");
    let order = &out.order;
    assert!(order.iter().position(|k| k == &b) < order.iter().position(|k| k == &c));

    let text = rendered(&out, "Demo.C");
    assert!(text.contains("public int FromA;"));
    assert!(text.contains("public int OwnB;"));
    assert_eq!(text.matches("GeneratedCodeAttribute").count(), 2);
}

#[test]
fn substituted_members_follow_each_target_in_a_chain() {
    let out = compose(
        r"
        using Mixin;
        namespace D
        {
            class Z
            {
                [return: Substitute] public Z Self() { return this; }
                public void Take([Substitute] Z other) { }
            }
            [Mixin(typeof(Z))] partial class Y { }
            [Mixin(typeof(Y))] partial class X { }
        }
        ",
    );
    assert!(out.is_success(), "{:?}", out.failures);

    let y = rendered(&out, "D.Y");
    assert!(y.contains("public global::D.Y Self()"));
    assert!(y.contains("Take(global::D.Y other)"));
    assert!(!y.contains("Substitute"));

    let x = rendered(&out, "D.X");
    assert!(x.contains("public global::D.X Self()"), "{x}");
    assert!(x.contains("Take(global::D.X other)"), "{x}");
    assert!(!x.contains("global::D.Y"));
    assert!(!x.contains("Substitute"));
}

#[test]
fn constructors_are_renamed_at_every_level_of_a_chain() {
    let out = compose(
        r"
        using Mixin;
        namespace D
        {
            class Z { public int N; public Z(int n) { N = n; } }
            [Mixin(typeof(Z))] partial class Y { }
            [Mixin(typeof(Y))] partial class X { }
        }
        ",
    );
    assert!(out.is_success(), "{:?}", out.failures);
    assert!(rendered(&out, "D.Y").contains("public Y(int n)"));
    let x = rendered(&out, "D.X");
    assert!(x.contains("public X(int n)"), "{x}");
    assert!(!x.contains(" Y("));
}

#[test]
fn every_member_carries_a_provenance_tag() {
    let out = compose_sources(
        &[(
            "using Mixin; class T { public int A; public void M() { } } [Mixin(typeof(T))] partial class X { }",
            "App",
        )],
        ComposeConfig::default().with_generator("Test Gen", "9.9"),
    )
    .unwrap();
    let text = rendered(&out, "X");
    assert_eq!(
        text.matches("[global::System.CodeDom.Compiler.GeneratedCodeAttribute(\"Test Gen\", \"9.9\")]")
            .count(),
        2
    );
}

#[test]
fn independent_targets_each_follow_their_dependencies() {
    let out = compose(
        r"
        using Mixin;
        class Leaf { public int L; }
        [Mixin(typeof(Leaf))] partial class Q { }
        [Mixin(typeof(Q))] partial class P { }
        [Mixin(typeof(Leaf))] partial class R { }
        ",
    );
    assert!(out.is_success());
    let position = |name: &str| out.order.iter().position(|k| k == &DeclKey::parse_metadata(name));
    assert!(position("Q") < position("P"));
    assert!(position("R").is_some());
    assert_eq!(out.declarations.len(), 3);
}

// =============================================================================
// Output
// =============================================================================

#[test]
fn rendered_output_reparses() {
    let out = compose(
        r"
        using Mixin;
        namespace Demo
        {
            class Box<T> { public T Value; public T Get() => Value; }
            [Mixin(typeof(Box<int>))] partial class IntBox { }
            [Mixin(typeof(Box<string>))] partial class StrBox { }
        }
        ",
    );
    let text = out.render();
    let unit = mixin::syntax::parse(&text).unwrap();
    assert_eq!(unit.members.len(), 2);
}

#[test]
fn composition_is_deterministic() {
    let source = r"
        using Mixin;
        namespace Demo
        {
            class Box<T> { public T Value; }
            [Mixin(typeof(Box<int>))] partial class IntBox { }
        }
    ";
    assert_eq!(compose(source).render(), compose(source).render());
}
