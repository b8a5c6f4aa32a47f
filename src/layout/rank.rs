//! Cycle removal and rank assignment.

use petgraph::algo::{greedy_feedback_arc_set, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeSet, HashSet};

fn build_graph(node_count: usize, edges: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(node_count, edges.len());
    for _ in 0..node_count {
        graph.add_node(());
    }
    for &(source, target) in edges {
        graph.add_edge(NodeIndex::new(source), NodeIndex::new(target), ());
    }
    graph
}

/// Reverse a greedy feedback arc set so every cycle is broken.
///
/// Reversal can turn two opposite edges into duplicates; those collapse.
pub(super) fn make_acyclic(node_count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let graph = build_graph(node_count, edges);
    let reversed: HashSet<usize> = greedy_feedback_arc_set(&graph)
        .map(|edge| edge.id().index())
        .collect();

    let acyclic: BTreeSet<(usize, usize)> = edges
        .iter()
        .enumerate()
        .map(|(i, &(source, target))| {
            if reversed.contains(&i) {
                (target, source)
            } else {
                (source, target)
            }
        })
        .collect();
    acyclic.into_iter().collect()
}

/// Longest-path ranks over an acyclic edge set, smallest rank 0.
///
/// Sources are then pulled down to sit directly above their nearest
/// successor so short chains do not stretch back to rank 0.
pub(super) fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let graph = build_graph(node_count, edges);
    let order: Vec<usize> = match toposort(&graph, None) {
        Ok(order) => order.into_iter().map(|n| n.index()).collect(),
        Err(cycle) => {
            log::debug!("rank assignment hit a cycle at node {}", cycle.node_id().index());
            (0..node_count).collect()
        }
    };

    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut succs: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for &(source, target) in edges {
        preds[target].push(source);
        succs[source].push(target);
    }

    let mut ranks = vec![0usize; node_count];
    for &node in &order {
        ranks[node] = preds[node]
            .iter()
            .map(|&p| ranks[p] + 1)
            .max()
            .unwrap_or(0);
    }

    for node in 0..node_count {
        if preds[node].is_empty() {
            if let Some(nearest) = succs[node].iter().map(|&s| ranks[s]).min() {
                ranks[node] = nearest.saturating_sub(1);
            }
        }
    }

    let min = ranks.iter().copied().min().unwrap_or(0);
    for rank in &mut ranks {
        *rank -= min;
    }
    ranks
}
