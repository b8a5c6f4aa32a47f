//! Merging per-file partial models and validating foreign keys.

use crate::builder::{Deferred, PartialModel};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::{ForeignKey, SchemaModel, Table};
use std::collections::{HashMap, HashSet};

/// A merged model with the diagnostics merging produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub model: SchemaModel,
    pub diagnostics: Vec<Diagnostic>,
}

/// Combine partial models in the given (file) order, apply deferred
/// alterations, then resolve references.
pub fn merge(partials: Vec<PartialModel>) -> Resolution {
    let mut model = SchemaModel::default();
    let mut diagnostics = Vec::new();
    let mut deferred = Vec::new();
    let mut first_seen: HashMap<String, String> = HashMap::new();

    for partial in partials {
        for table in partial.tables {
            match first_seen.get(&table.name) {
                Some(first_file) => diagnostics.push(
                    Diagnostic::warning(
                        Category::DuplicateTable,
                        format!(
                            "table `{}` is already declared in {}",
                            table.name, first_file
                        ),
                    )
                    .with_table(&table.name)
                    .with_file(&table.source_file)
                    .with_hint("alterations apply to the first declaration only"),
                ),
                None => {
                    first_seen.insert(table.name.clone(), table.source_file.clone());
                }
            }
            model.tables.push(table);
        }
        model.enums.extend(partial.enums);
        model.sequences.extend(partial.sequences);
        deferred.extend(
            partial
                .deferred
                .into_iter()
                .map(|d| (partial.source_file.clone(), d)),
        );
    }

    for (file, alteration) in deferred {
        let Some(table) = model.tables.iter_mut().find(|t| t.name == alteration.table()) else {
            log::debug!(
                "{}: dropping alteration of unknown table `{}`",
                file,
                alteration.table()
            );
            continue;
        };
        match alteration {
            Deferred::ForeignKey { foreign_key, .. } => table.foreign_keys.push(foreign_key),
            Deferred::Index { index, .. } => table.indexes.push(index),
        }
    }

    diagnostics.extend(resolve_references(&mut model));
    diagnostics.extend(unverified_references(&model));

    log::info!(
        "merged {} tables, {} enums, {} sequences ({} diagnostics)",
        model.tables.len(),
        model.enums.len(),
        model.sequences.len(),
        diagnostics.len()
    );

    Resolution { model, diagnostics }
}

/// Drop foreign keys that point at missing tables or whose column counts
/// disagree, one warning per dropped key.
///
/// Running this on an already resolved model changes nothing.
pub fn resolve_references(model: &mut SchemaModel) -> Vec<Diagnostic> {
    let names: HashSet<String> = model.tables.iter().map(|t| t.name.clone()).collect();
    let mut diagnostics = Vec::new();

    for table in &mut model.tables {
        let mut kept = Vec::with_capacity(table.foreign_keys.len());
        for fk in std::mem::take(&mut table.foreign_keys) {
            if !names.contains(&fk.referenced_table) {
                log::warn!(
                    "{}: dropping foreign key {}({}) to unknown table `{}`",
                    table.source_file,
                    table.name,
                    fk.columns.join(", "),
                    fk.referenced_table
                );
                diagnostics.push(
                    fk_diagnostic(
                        table,
                        &fk,
                        Category::UnresolvedReference,
                        format!("references unknown table `{}`", fk.referenced_table),
                    )
                    .with_hint(format!(
                        "declare table `{}` or remove the reference",
                        fk.referenced_table
                    )),
                );
                clear_column_references(table, &fk);
            } else if fk.columns.is_empty() || fk.columns.len() != fk.referenced_columns.len() {
                log::warn!(
                    "{}: dropping foreign key {}({}) with mismatched column count",
                    table.source_file,
                    table.name,
                    fk.columns.join(", ")
                );
                diagnostics.push(fk_diagnostic(
                    table,
                    &fk,
                    Category::InvalidForeignKey,
                    format!(
                        "has {} columns but references {} columns of `{}`",
                        fk.columns.len(),
                        fk.referenced_columns.len(),
                        fk.referenced_table
                    ),
                ));
                clear_column_references(table, &fk);
            } else {
                kept.push(fk);
            }
        }
        table.foreign_keys = kept;

        for column in &mut table.columns {
            let dangling = column
                .references
                .as_ref()
                .is_some_and(|r| !names.contains(&r.table));
            if dangling {
                column.references = None;
            }
        }
    }

    diagnostics
}

fn fk_diagnostic(table: &Table, fk: &ForeignKey, category: Category, what: String) -> Diagnostic {
    let mut diagnostic = Diagnostic::warning(
        category,
        format!(
            "foreign key {}({}) {}; dropped",
            table.name,
            fk.columns.join(", "),
            what
        ),
    )
    .with_table(&table.name)
    .with_file(&table.source_file);
    if let [column] = fk.columns.as_slice() {
        diagnostic = diagnostic.with_column(column);
    }
    diagnostic
}

fn clear_column_references(table: &mut Table, fk: &ForeignKey) {
    for column in &mut table.columns {
        let matches = fk.columns.contains(&column.name)
            && column
                .references
                .as_ref()
                .is_some_and(|r| r.table == fk.referenced_table);
        if matches {
            column.references = None;
        }
    }
}

/// Foreign keys whose referenced columns are not all declared on the target.
fn unverified_references(model: &SchemaModel) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for (table, fk) in model.foreign_keys() {
        let Some(target) = model.table(&fk.referenced_table) else {
            continue;
        };
        let missing: Vec<&str> = fk
            .referenced_columns
            .iter()
            .filter(|c| target.column(c).is_none())
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            continue;
        }
        let mut diagnostic = Diagnostic::info(
            Category::UnverifiedReference,
            format!(
                "foreign key {}({}) references {}({}), which has no column {}",
                table.name,
                fk.columns.join(", "),
                target.name,
                fk.referenced_columns.join(", "),
                missing.join(", ")
            ),
        )
        .with_table(&table.name)
        .with_file(&table.source_file);
        if let [column] = fk.columns.as_slice() {
            diagnostic = diagnostic.with_column(column);
        }
        diagnostics.push(diagnostic);
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_partial;
    use crate::diagnostics::Severity;
    use crate::sql::{StatementParser, TolerantParser};

    fn partial(file: &str, sql: &str) -> PartialModel {
        build_partial(file, TolerantParser.parse(sql).unwrap())
    }

    #[test]
    fn test_cross_file_foreign_key() {
        let res = merge(vec![
            partial("orders.sql", "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users(id));"),
            partial("users.sql", "CREATE TABLE users (id INT PRIMARY KEY);"),
        ]);
        assert!(res.diagnostics.is_empty());
        let orders = res.model.table("orders").unwrap();
        assert_eq!(orders.foreign_keys.len(), 1);
        assert_eq!(orders.foreign_keys[0].referenced_table, "users");
    }

    #[test]
    fn test_unknown_target_dropped_with_one_warning() {
        let res = merge(vec![partial(
            "orders.sql",
            "CREATE TABLE orders (
                id INT PRIMARY KEY,
                user_id INT REFERENCES users(id),
                FOREIGN KEY (user_id) REFERENCES accounts
            );",
        )]);
        let orders = res.model.table("orders").unwrap();
        assert!(orders.foreign_keys.is_empty());
        assert_eq!(orders.column("user_id").unwrap().references, None);
        assert_eq!(res.diagnostics.len(), 2);
        assert!(res.diagnostics.iter().all(|d| {
            d.category == Category::UnresolvedReference && d.severity == Severity::Warning
        }));
        assert_eq!(res.diagnostics[0].column.as_deref(), Some("user_id"));
        assert_eq!(res.diagnostics[0].file.as_deref(), Some("orders.sql"));
    }

    #[test]
    fn test_alteration_of_missing_table_is_silent() {
        let res = merge(vec![partial(
            "alter.sql",
            "ALTER TABLE ghosts ADD FOREIGN KEY (id) REFERENCES nowhere(id);
             CREATE INDEX ON ghosts (id);",
        )]);
        assert!(res.model.tables.is_empty());
        assert!(res.diagnostics.is_empty());
    }

    #[test]
    fn test_alteration_applies_to_first_duplicate() {
        let res = merge(vec![
            partial("a.sql", "CREATE TABLE t (id INT PRIMARY KEY, p INT);"),
            partial("b.sql", "CREATE TABLE t (id INT PRIMARY KEY, p INT); CREATE INDEX ON t (p);"),
        ]);
        assert_eq!(res.model.tables.len(), 2);
        assert_eq!(res.model.tables[0].indexes.len(), 1);
        assert!(res.model.tables[1].indexes.is_empty());
        assert_eq!(res.diagnostics.len(), 1);
        assert_eq!(res.diagnostics[0].category, Category::DuplicateTable);
        assert_eq!(res.diagnostics[0].file.as_deref(), Some("b.sql"));
    }

    #[test]
    fn test_mismatched_arity_dropped() {
        let res = merge(vec![partial(
            "t.sql",
            "CREATE TABLE a (x INT, y INT, PRIMARY KEY (x, y));
             CREATE TABLE b (x INT, FOREIGN KEY (x) REFERENCES a (x, y));",
        )]);
        assert!(res.model.table("b").unwrap().foreign_keys.is_empty());
        assert_eq!(res.diagnostics.len(), 1);
        assert_eq!(res.diagnostics[0].category, Category::InvalidForeignKey);
    }

    #[test]
    fn test_unverified_reference_is_info_and_kept() {
        let res = merge(vec![partial(
            "t.sql",
            "CREATE TABLE a (id INT PRIMARY KEY);
             CREATE TABLE b (a_id INT REFERENCES a (uuid));",
        )]);
        assert_eq!(res.model.table("b").unwrap().foreign_keys.len(), 1);
        assert_eq!(res.diagnostics.len(), 1);
        assert_eq!(res.diagnostics[0].severity, Severity::Info);
        assert_eq!(res.diagnostics[0].category, Category::UnverifiedReference);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut res = merge(vec![partial(
            "t.sql",
            "CREATE TABLE a (id INT PRIMARY KEY, b_id INT REFERENCES b (id), c_id INT REFERENCES c);
             CREATE TABLE b (id INT PRIMARY KEY);",
        )]);
        assert_eq!(res.diagnostics.len(), 1);
        let before = res.model.clone();
        assert!(resolve_references(&mut res.model).is_empty());
        assert_eq!(res.model, before);
    }
}
