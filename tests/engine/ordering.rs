//! Integration tests for dependency ordering
//!
//! Tests the generic topological sort and the order it produces over
//! annotated declarations.

use std::collections::BTreeMap;

use mixin_engine::{ComposeConfig, SymbolGraph, Universe, order_topological, validate_annotations};
use mixin_foundation::DeclKey;
use proptest::prelude::*;

fn graph_order(source: &str) -> Result<Vec<String>, Vec<String>> {
    let mut universe = Universe::with_reference("Mixin").unwrap();
    universe.add_source(source, "App").unwrap();
    let keys = validate_annotations(&universe, &ComposeConfig::default()).unwrap();
    let graph = SymbolGraph::build(&universe, &keys);
    order_topological(&graph.keys(), |key| graph.dependencies(key))
        .map(|order| order.iter().map(DeclKey::to_string).collect())
        .map_err(|cycle| cycle.path.iter().map(DeclKey::to_string).collect())
}

// =============================================================================
// Over declarations
// =============================================================================

#[test]
fn chain_orders_dependencies_first() {
    let order = graph_order(
        r"
        using Mixin;
        [Mixin(typeof(Y))] partial class X { }
        [Mixin(typeof(Z))] partial class Y { }
        [Mixin(typeof(Base))] partial class Z { }
        class Base { }
        ",
    )
    .unwrap();
    assert_eq!(order, vec!["Z", "Y", "X"]);
}

#[test]
fn mutual_directives_are_a_cycle() {
    let cycle = graph_order(
        r"
        using Mixin;
        [Mixin(typeof(B))] partial class A { }
        [Mixin(typeof(A))] partial class B { }
        ",
    )
    .unwrap_err();
    assert!(cycle.contains(&"A".to_string()));
    assert!(cycle.contains(&"B".to_string()));
    assert_eq!(cycle.first(), cycle.last());
}

#[test]
fn unannotated_templates_are_not_ordered() {
    let order = graph_order(
        r"
        using Mixin;
        class T1 { }
        class T2 { }
        [Mixin(typeof(T1)), Mixin(typeof(T2))] partial class Target { }
        ",
    )
    .unwrap();
    assert_eq!(order, vec!["Target"]);
}

// =============================================================================
// Properties
// =============================================================================

fn acyclic_graph() -> impl Strategy<Value = BTreeMap<u32, Vec<u32>>> {
    (1u32..24).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..4), n as usize).prop_map(
            move |edges| {
                edges
                    .into_iter()
                    .enumerate()
                    .map(|(node, targets)| {
                        let node = u32::try_from(node).unwrap();
                        let deps = if node == 0 {
                            Vec::new()
                        } else {
                            targets.iter().map(|i| u32::try_from(i.index(node as usize)).unwrap()).collect()
                        };
                        (node, deps)
                    })
                    .collect()
            },
        )
    })
}

proptest! {
    #[test]
    fn every_dependency_precedes_its_dependent(graph in acyclic_graph()) {
        let nodes: Vec<u32> = graph.keys().copied().collect();
        let order = order_topological(&nodes, |n| graph.get(n).cloned().unwrap_or_default()).unwrap();
        prop_assert_eq!(order.len(), nodes.len());
        let position: BTreeMap<u32, usize> = order.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        for (node, deps) in &graph {
            for dep in deps {
                prop_assert!(position[dep] < position[node]);
            }
        }
    }

    #[test]
    fn rings_are_reported_as_cycles(len in 1u32..12) {
        let nodes: Vec<u32> = (0..len).collect();
        let cycle = order_topological(&nodes, |n| vec![(n + 1) % len]).unwrap_err();
        prop_assert_eq!(cycle.path.first(), cycle.path.last());
        prop_assert_eq!(cycle.path.len(), len as usize + 1);
    }

    #[test]
    fn independent_nodes_keep_input_order(len in 0u32..20) {
        let nodes: Vec<u32> = (0..len).rev().collect();
        let order = order_topological(&nodes, |_| Vec::<u32>::new()).unwrap();
        prop_assert_eq!(order, nodes);
    }
}
