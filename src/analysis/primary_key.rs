use super::{AnalyzerConfig, Rule};
use crate::diagnostics::{Category, Diagnostic};
use crate::model::SchemaModel;

pub struct MissingPrimaryKey;

impl Rule for MissingPrimaryKey {
    fn name(&self) -> &'static str {
        "missing_primary_key"
    }

    fn description(&self) -> &'static str {
        "Reports tables without a primary key"
    }

    fn check(&self, model: &SchemaModel, _config: &AnalyzerConfig) -> Vec<Diagnostic> {
        model
            .tables
            .iter()
            .filter(|t| t.primary_key.is_empty())
            .map(|t| {
                Diagnostic::warning(
                    Category::MissingPrimaryKey,
                    format!("table `{}` has no primary key", t.name),
                )
                .with_table(&t.name)
                .with_file(&t.source_file)
                .with_hint("add a PRIMARY KEY so rows can be identified")
            })
            .collect()
    }
}
