// crates/studioruntime/tests/order_test.rs

use studiocore::{Edge, NodeKind, WorkflowError, WorkflowNode};
use studioruntime::order;

fn node(id: &str) -> WorkflowNode {
    WorkflowNode::new(id, NodeKind::TextGeneration)
}

fn edge(source: &str, target: &str) -> Edge {
    Edge {
        id: format!("{}-{}", source, target),
        source: source.to_string(),
        target: target.to_string(),
        edge_type: None,
    }
}

fn position(sorted: &[&WorkflowNode], id: &str) -> usize {
    sorted
        .iter()
        .position(|n| n.id == id)
        .unwrap_or_else(|| panic!("{} missing from ordering", id))
}

/// Every node appears exactly once and every edge points forward
fn assert_topological(nodes: &[WorkflowNode], edges: &[Edge]) {
    let ordering = order(nodes, edges).expect("valid graph");
    assert!(ordering.is_complete());
    assert_eq!(ordering.sorted.len(), nodes.len());

    for n in nodes {
        assert_eq!(ordering.sorted.iter().filter(|s| s.id == n.id).count(), 1);
    }
    for e in edges {
        assert!(
            position(&ordering.sorted, &e.source) < position(&ordering.sorted, &e.target),
            "{} should run before {}",
            e.source,
            e.target
        );
    }
}

#[test]
fn test_dag_orderings_respect_edges() {
    // Declared in reverse so declaration order alone would be wrong
    let chain = vec![node("c"), node("b"), node("a")];
    assert_topological(&chain, &[edge("a", "b"), edge("b", "c")]);

    let diamond = vec![node("join"), node("left"), node("right"), node("root")];
    assert_topological(
        &diamond,
        &[
            edge("root", "left"),
            edge("root", "right"),
            edge("left", "join"),
            edge("right", "join"),
        ],
    );

    let forest = vec![node("x"), node("y"), node("z"), node("w")];
    assert_topological(&forest, &[edge("w", "x"), edge("z", "y")]);

    assert_topological(&[], &[]);
}

#[test]
fn test_ready_nodes_keep_declaration_order() {
    let nodes = vec![node("zeta"), node("alpha"), node("mid"), node("out")];
    let edges = vec![edge("zeta", "out"), edge("alpha", "out")];

    let ordering = order(&nodes, &edges).unwrap();
    let ids: Vec<&str> = ordering.sorted.iter().map(|n| n.id.as_str()).collect();

    assert_eq!(ids, vec!["zeta", "alpha", "mid", "out"]);
}

#[test]
fn test_cycle_members_are_left_out_of_sorted() {
    let nodes = vec![node("start"), node("a"), node("b"), node("after")];
    let edges = vec![
        edge("start", "a"),
        edge("a", "b"),
        edge("b", "a"),
        edge("b", "after"),
    ];

    let ordering = order(&nodes, &edges).unwrap();
    let ids: Vec<&str> = ordering.sorted.iter().map(|n| n.id.as_str()).collect();

    assert_eq!(ids, vec!["start"]);
    assert_eq!(ordering.unresolved, vec!["a", "b", "after"]);
}

#[test]
fn test_checked_ordering_rejects_cycles() {
    let nodes = vec![node("a"), node("b")];
    let edges = vec![edge("a", "b"), edge("b", "a")];

    let err = order(&nodes, &edges).unwrap().into_checked().unwrap_err();

    assert_eq!(
        err,
        WorkflowError::CycleDetected {
            unresolved: vec!["a".to_string(), "b".to_string()],
        }
    );
}

#[test]
fn test_unknown_edge_endpoint_is_rejected() {
    let nodes = vec![node("a")];

    let err = order(&nodes, &[edge("a", "ghost")]).unwrap_err();
    assert_eq!(
        err,
        WorkflowError::UnknownEdgeEndpoint {
            edge: "a-ghost".to_string(),
            node: "ghost".to_string(),
        }
    );

    let err = order(&nodes, &[edge("ghost", "a")]).unwrap_err();
    assert!(matches!(err, WorkflowError::UnknownEdgeEndpoint { node, .. } if node == "ghost"));
}
