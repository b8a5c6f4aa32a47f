//! Naming convention checks: lowercase names, foreign-key column suffix.

use super::{AnalyzerConfig, Rule};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::{SchemaModel, Table};

pub struct NamingConvention;

impl Rule for NamingConvention {
    fn name(&self) -> &'static str {
        "naming_convention"
    }

    fn description(&self) -> &'static str {
        "Flags mixed-case names and foreign-key columns without the configured suffix"
    }

    fn check(&self, model: &SchemaModel, config: &AnalyzerConfig) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for table in &model.tables {
            if has_uppercase(&table.name) {
                diagnostics.push(
                    Diagnostic::info(
                        Category::NamingConvention,
                        format!("table name `{}` contains uppercase letters", table.name),
                    )
                    .with_table(&table.name)
                    .with_file(&table.source_file)
                    .with_hint(format!("rename to `{}`", table.name.to_lowercase())),
                );
            }

            for column in &table.columns {
                if has_uppercase(&column.name) {
                    diagnostics.push(
                        Diagnostic::info(
                            Category::NamingConvention,
                            format!("column name `{}` contains uppercase letters", column.name),
                        )
                        .with_table(&table.name)
                        .with_column(&column.name)
                        .with_file(&table.source_file),
                    );
                }
            }

            for column in foreign_key_columns(table) {
                if !column.ends_with(config.foreign_key_suffix.as_str()) {
                    diagnostics.push(
                        Diagnostic::info(
                            Category::NamingConvention,
                            format!(
                                "foreign key column `{}` does not end with `{}`",
                                column, config.foreign_key_suffix
                            ),
                        )
                        .with_table(&table.name)
                        .with_column(column)
                        .with_file(&table.source_file),
                    );
                }
            }
        }

        diagnostics
    }
}

fn has_uppercase(name: &str) -> bool {
    name.chars().any(char::is_uppercase)
}

/// Distinct foreign-key columns in first-use order.
fn foreign_key_columns(table: &Table) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for fk in &table.foreign_keys {
        for column in &fk.columns {
            if !columns.contains(&column.as_str()) {
                columns.push(column);
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_utils::model;

    #[test]
    fn test_uppercase_names() {
        let m = model(r#"CREATE TABLE "Users" (id INT PRIMARY KEY, "firstName" TEXT);"#);
        let diags = NamingConvention.check(&m, &AnalyzerConfig::default());
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].table.as_deref(), Some("Users"));
        assert_eq!(diags[0].column, None);
        assert_eq!(diags[1].column.as_deref(), Some("firstName"));
    }

    #[test]
    fn test_foreign_key_suffix() {
        let m = model(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE orders (id INT PRIMARY KEY, buyer INT REFERENCES users (id), user_id INT REFERENCES users (id));",
        );
        let diags = NamingConvention.check(&m, &AnalyzerConfig::default());
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].column.as_deref(), Some("buyer"));

        let config = AnalyzerConfig {
            foreign_key_suffix: "_ref".to_string(),
            ..Default::default()
        };
        assert_eq!(NamingConvention.check(&m, &config).len(), 2);
    }
}
