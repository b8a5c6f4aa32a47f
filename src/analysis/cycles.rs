//! Circular foreign-key dependencies between tables.

use super::{AnalyzerConfig, Rule};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::SchemaModel;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub struct CircularDependencies;

impl Rule for CircularDependencies {
    fn name(&self) -> &'static str {
        "circular_dependencies"
    }

    fn description(&self) -> &'static str {
        "Detects cycles in the table -> referenced table graph"
    }

    fn check(&self, model: &SchemaModel, _config: &AnalyzerConfig) -> Vec<Diagnostic> {
        find_cycles(model)
            .into_iter()
            .map(|cycle| {
                let mut path = cycle.clone();
                path.push(cycle[0].clone());
                Diagnostic::warning(
                    Category::CircularDependency,
                    format!("circular dependency: {}", path.join(" -> ")),
                )
                .with_table(&cycle[0])
                .with_hint("make one of the foreign keys nullable or deferrable")
            })
            .collect()
    }
}

/// Every distinct cycle, each starting at its smallest member.
pub fn find_cycles(model: &SchemaModel) -> Vec<Vec<String>> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for table in &model.tables {
        graph.entry(table.name.as_str()).or_default();
    }
    for (table, fk) in model.foreign_keys() {
        graph
            .entry(table.name.as_str())
            .or_default()
            .insert(fk.referenced_table.as_str());
    }

    let mut search = CycleSearch {
        graph: &graph,
        visited: HashSet::new(),
        stack: Vec::new(),
        seen: HashSet::new(),
        cycles: Vec::new(),
    };
    for &node in graph.keys() {
        if !search.visited.contains(node) {
            search.visit(node);
        }
    }
    search.cycles
}

struct CycleSearch<'g> {
    graph: &'g BTreeMap<&'g str, BTreeSet<&'g str>>,
    visited: HashSet<&'g str>,
    stack: Vec<&'g str>,
    seen: HashSet<Vec<String>>,
    cycles: Vec<Vec<String>>,
}

impl<'g> CycleSearch<'g> {
    fn visit(&mut self, node: &'g str) {
        self.visited.insert(node);
        self.stack.push(node);

        let graph = self.graph;
        if let Some(targets) = graph.get(node) {
            for &target in targets {
                if let Some(pos) = self.stack.iter().position(|&n| n == target) {
                    self.record(pos);
                } else if !self.visited.contains(target) {
                    self.visit(target);
                }
            }
        }

        self.stack.pop();
    }

    fn record(&mut self, from: usize) {
        let mut cycle: Vec<String> = self.stack[from..].iter().map(|s| s.to_string()).collect();
        let min = cycle
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        cycle.rotate_left(min);
        if self.seen.insert(cycle.clone()) {
            self.cycles.push(cycle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_utils::model;

    #[test]
    fn test_three_table_cycle_reported_once() {
        let m = model(
            "CREATE TABLE c (id INT PRIMARY KEY, a_id INT REFERENCES a (id));
             CREATE TABLE b (id INT PRIMARY KEY, c_id INT REFERENCES c (id));
             CREATE TABLE a (id INT PRIMARY KEY, b_id INT REFERENCES b (id));",
        );
        assert_eq!(find_cycles(&m), vec![vec!["a", "b", "c"]]);

        let diags = CircularDependencies.check(&m, &AnalyzerConfig::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "circular dependency: a -> b -> c -> a");
    }

    #[test]
    fn test_canonical_start_is_smallest_member() {
        let m = model(
            "CREATE TABLE b (id INT PRIMARY KEY, x_id INT REFERENCES x (id));
             CREATE TABLE x (id INT PRIMARY KEY, m_id INT REFERENCES m (id));
             CREATE TABLE m (id INT PRIMARY KEY, b_id INT REFERENCES b (id));",
        );
        assert_eq!(find_cycles(&m), vec![vec!["b", "x", "m"]]);
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let m = model("CREATE TABLE nodes (id INT PRIMARY KEY, parent_id INT REFERENCES nodes (id));");
        assert_eq!(find_cycles(&m), vec![vec!["nodes"]]);
    }

    #[test]
    fn test_acyclic_graph() {
        let m = model(
            "CREATE TABLE a (id INT PRIMARY KEY);
             CREATE TABLE b (id INT PRIMARY KEY, a_id INT REFERENCES a (id));
             CREATE TABLE c (id INT PRIMARY KEY, a_id INT REFERENCES a (id), b_id INT REFERENCES b (id));",
        );
        assert!(find_cycles(&m).is_empty());
    }
}
