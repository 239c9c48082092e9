use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, VecDeque};
use studiocore::{Edge, NodeId, WorkflowError, WorkflowNode};

/// Execution order computed for a workflow.
#[derive(Debug)]
pub struct Ordering<'a> {
    /// Nodes in topological order
    pub sorted: Vec<&'a WorkflowNode>,
    /// Nodes that never reached in-degree zero, in declaration order
    pub unresolved: Vec<NodeId>,
}

impl<'a> Ordering<'a> {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Rejects the ordering if any node was left out by a cycle.
    pub fn into_checked(self) -> Result<Vec<&'a WorkflowNode>, WorkflowError> {
        if self.unresolved.is_empty() {
            Ok(self.sorted)
        } else {
            Err(WorkflowError::CycleDetected {
                unresolved: self.unresolved,
            })
        }
    }
}

/// Orders `nodes` so that every edge source precedes its target.
///
/// Kahn's algorithm: ready nodes are taken FIFO, seeded in declaration order,
/// and targets are released in declared edge order. Nodes on or behind a
/// cycle are reported in [`Ordering::unresolved`] rather than sorted.
pub fn order<'a>(
    nodes: &'a [WorkflowNode],
    edges: &[Edge],
) -> Result<Ordering<'a>, WorkflowError> {
    let graph = build_graph(nodes, edges)?;

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|idx| graph.edges_directed(idx, Direction::Incoming).count())
        .collect();

    // Graph::edges() yields newest first; edge indices follow insertion.
    let mut adjacency: Vec<Vec<NodeIndex>> = vec![Vec::new(); nodes.len()];
    for edge in graph.raw_edges() {
        adjacency[edge.source().index()].push(edge.target());
    }

    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(nodes.len());
    while let Some(idx) = queue.pop_front() {
        sorted.push(&nodes[graph[idx]]);
        for target in &adjacency[idx.index()] {
            let degree = &mut in_degree[target.index()];
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(*target);
            }
        }
    }

    let unresolved: Vec<NodeId> = graph
        .node_indices()
        .filter(|idx| in_degree[idx.index()] > 0)
        .map(|idx| nodes[graph[idx]].id.clone())
        .collect();

    if !unresolved.is_empty() {
        tracing::warn!("{} node(s) unresolved by ordering: {:?}", unresolved.len(), unresolved);
    }

    Ok(Ordering { sorted, unresolved })
}

/// Build a dependency graph whose weights are positions in `nodes`
fn build_graph(
    nodes: &[WorkflowNode],
    edges: &[Edge],
) -> Result<DiGraph<usize, ()>, WorkflowError> {
    let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut node_to_index: HashMap<&str, NodeIndex> = HashMap::new();

    for (position, node) in nodes.iter().enumerate() {
        let idx = graph.add_node(position);
        if node_to_index.insert(node.id.as_str(), idx).is_some() {
            return Err(WorkflowError::DuplicateNode(node.id.clone()));
        }
    }

    for edge in edges {
        let lookup = |id: &str| {
            node_to_index
                .get(id)
                .copied()
                .ok_or_else(|| WorkflowError::UnknownEdgeEndpoint {
                    edge: edge.id.clone(),
                    node: id.to_string(),
                })
        };
        let from_idx = lookup(&edge.source)?;
        let to_idx = lookup(&edge.target)?;

        graph.add_edge(from_idx, to_idx, ());
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use studiocore::NodeKind;

    fn node(id: &str) -> WorkflowNode {
        WorkflowNode::new(id, NodeKind::TextGeneration)
    }

    fn edge(source: &str, target: &str) -> Edge {
        Edge {
            id: format!("{}->{}", source, target),
            source: source.to_string(),
            target: target.to_string(),
            edge_type: None,
        }
    }

    fn ids(ordering: &Ordering<'_>) -> Vec<String> {
        ordering.sorted.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn releases_targets_in_edge_order() {
        let nodes = vec![node("root"), node("b"), node("a")];
        let edges = vec![edge("root", "b"), edge("root", "a")];

        let ordering = order(&nodes, &edges).unwrap();
        assert_eq!(ids(&ordering), vec!["root", "b", "a"]);
    }

    #[test]
    fn duplicate_edges_count_towards_in_degree() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![edge("a", "b"), edge("a", "b")];

        let ordering = order(&nodes, &edges).unwrap();
        assert_eq!(ids(&ordering), vec!["a", "b"]);
        assert!(ordering.is_complete());
    }

    #[test]
    fn self_loop_is_unresolved() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![edge("a", "a")];

        let ordering = order(&nodes, &edges).unwrap();
        assert_eq!(ids(&ordering), vec!["b"]);
        assert_eq!(ordering.unresolved, vec!["a"]);
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let nodes = vec![node("a"), node("a")];
        let err = order(&nodes, &[]).unwrap_err();
        assert_eq!(err, WorkflowError::DuplicateNode("a".to_string()));
    }
}
