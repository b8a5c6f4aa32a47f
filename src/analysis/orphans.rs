//! Tables that take part in no foreign-key relationship.

use super::{AnalyzerConfig, Rule};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::SchemaModel;
use std::collections::HashSet;

pub struct OrphanTables;

impl Rule for OrphanTables {
    fn name(&self) -> &'static str {
        "orphan_tables"
    }

    fn description(&self) -> &'static str {
        "Reports tables with no foreign keys that no other table references"
    }

    fn check(&self, model: &SchemaModel, _config: &AnalyzerConfig) -> Vec<Diagnostic> {
        let referenced: HashSet<&str> = model
            .foreign_keys()
            .map(|(_, fk)| fk.referenced_table.as_str())
            .collect();

        model
            .tables
            .iter()
            .filter(|t| t.foreign_keys.is_empty() && !referenced.contains(t.name.as_str()))
            .map(|t| {
                Diagnostic::info(
                    Category::OrphanTable,
                    format!("table `{}` has no relationships", t.name),
                )
                .with_table(&t.name)
                .with_file(&t.source_file)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_utils::model;

    #[test]
    fn test_only_unconnected_tables_reported() {
        let m = model(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
             CREATE TABLE settings (key TEXT PRIMARY KEY);",
        );
        let diags = OrphanTables.check(&m, &AnalyzerConfig::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].table.as_deref(), Some("settings"));
    }

    #[test]
    fn test_self_reference_is_not_orphan() {
        let m = model("CREATE TABLE nodes (id INT PRIMARY KEY, parent_id INT REFERENCES nodes (id));");
        assert!(OrphanTables.check(&m, &AnalyzerConfig::default()).is_empty());
    }
}
