//! Foreign-key columns with no index that could serve lookups on them.

use super::{AnalyzerConfig, Rule};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::{SchemaModel, Table};
use std::collections::HashSet;

pub struct MissingForeignKeyIndex;

impl Rule for MissingForeignKeyIndex {
    fn name(&self) -> &'static str {
        "missing_fk_index"
    }

    fn description(&self) -> &'static str {
        "Reports foreign-key columns not covered by a key, unique constraint or index"
    }

    fn check(&self, model: &SchemaModel, _config: &AnalyzerConfig) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for table in &model.tables {
            let covered = covered_columns(table);
            let leading = compound_leading_columns(table);
            let mut reported: HashSet<&str> = HashSet::new();

            for fk in &table.foreign_keys {
                for column in &fk.columns {
                    let column = column.as_str();
                    if covered.contains(column) || leading.contains(column) {
                        continue;
                    }
                    if !reported.insert(column) {
                        continue;
                    }
                    diagnostics.push(
                        Diagnostic::warning(
                            Category::MissingFkIndex,
                            format!(
                                "foreign key column `{}.{}` has no index",
                                table.name, column
                            ),
                        )
                        .with_table(&table.name)
                        .with_column(column)
                        .with_file(&table.source_file)
                        .with_hint(format!(
                            "CREATE INDEX ON {} ({});",
                            table.name, column
                        )),
                    );
                }
            }
        }

        diagnostics
    }
}

/// Primary-key columns, single-column unique constraints and indexes, unique columns.
fn covered_columns(table: &Table) -> HashSet<&str> {
    let mut covered: HashSet<&str> = table.primary_key.iter().map(String::as_str).collect();
    for unique in &table.unique_constraints {
        if let [column] = unique.as_slice() {
            covered.insert(column);
        }
    }
    for index in &table.indexes {
        if let [column] = index.columns.as_slice() {
            covered.insert(column);
        }
    }
    for column in &table.columns {
        if column.is_unique {
            covered.insert(&column.name);
        }
    }
    covered
}

/// First column of every multi-column key, unique constraint or index.
fn compound_leading_columns(table: &Table) -> HashSet<&str> {
    let mut leading = HashSet::new();
    if table.primary_key.len() > 1 {
        leading.insert(table.primary_key[0].as_str());
    }
    let compound = table
        .unique_constraints
        .iter()
        .chain(table.indexes.iter().map(|i| &i.columns))
        .filter(|cols| cols.len() > 1);
    for cols in compound {
        leading.insert(cols[0].as_str());
    }
    leading
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_utils::model;

    fn flagged(sql: &str) -> Vec<String> {
        MissingForeignKeyIndex
            .check(&model(sql), &AnalyzerConfig::default())
            .into_iter()
            .filter_map(|d| d.column)
            .collect()
    }

    const USERS: &str = "CREATE TABLE users (id INT PRIMARY KEY);";

    #[test]
    fn test_unindexed_fk_column_flagged() {
        let sql = format!(
            "{USERS} CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));"
        );
        assert_eq!(flagged(&sql), vec!["user_id"]);
    }

    #[test]
    fn test_fk_that_is_the_primary_key_not_flagged() {
        let sql = format!(
            "{USERS} CREATE TABLE profiles (user_id INT PRIMARY KEY REFERENCES users (id));"
        );
        assert!(flagged(&sql).is_empty());
    }

    #[test]
    fn test_covering_index_and_unique() {
        let sql = format!(
            "{USERS}
             CREATE TABLE a (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
             CREATE INDEX ON a (user_id);
             CREATE TABLE b (id INT PRIMARY KEY, user_id INT UNIQUE REFERENCES users (id));"
        );
        assert!(flagged(&sql).is_empty());
    }

    #[test]
    fn test_compound_prefix_counts_only_for_first_column() {
        let sql = format!(
            "{USERS}
             CREATE TABLE memberships (
                 user_id INT REFERENCES users (id),
                 group_id INT REFERENCES users (id),
                 PRIMARY KEY (user_id, group_id)
             );"
        );
        // Both are primary-key columns, so both are covered.
        assert!(flagged(&sql).is_empty());

        let sql = format!(
            "{USERS}
             CREATE TABLE follows (
                 id INT PRIMARY KEY,
                 follower_id INT REFERENCES users (id),
                 followee_id INT REFERENCES users (id),
                 UNIQUE (follower_id, followee_id)
             );"
        );
        assert_eq!(flagged(&sql), vec!["followee_id"]);
    }

    #[test]
    fn test_column_reported_once() {
        let sql = format!(
            "{USERS}
             CREATE TABLE t (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
             ALTER TABLE t ADD FOREIGN KEY (user_id) REFERENCES users (id);"
        );
        assert_eq!(flagged(&sql), vec!["user_id"]);
    }
}
