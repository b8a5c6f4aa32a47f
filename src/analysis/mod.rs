//! Structural analysis: independent rules over a resolved model.

mod cycles;
mod fk_index;
mod naming;
mod orphans;
mod primary_key;

pub use cycles::{CircularDependencies, find_cycles};
pub use fk_index::MissingForeignKeyIndex;
pub use naming::NamingConvention;
pub use orphans::OrphanTables;
pub use primary_key::MissingPrimaryKey;

use crate::diagnostics::{Diagnostic, sort_by_severity};
use crate::model::SchemaModel;
use serde::{Deserialize, Serialize};

/// Rule toggles and naming settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default = "default_true")]
    pub orphan_tables: bool,
    #[serde(default = "default_true")]
    pub circular_dependencies: bool,
    #[serde(default = "default_true")]
    pub missing_primary_key: bool,
    #[serde(default = "default_true")]
    pub naming_convention: bool,
    #[serde(default = "default_true")]
    pub missing_fk_index: bool,
    /// Suffix every foreign-key column is expected to carry
    #[serde(default = "default_foreign_key_suffix")]
    pub foreign_key_suffix: String,
}

fn default_true() -> bool {
    true
}

fn default_foreign_key_suffix() -> String {
    "_id".to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            orphan_tables: true,
            circular_dependencies: true,
            missing_primary_key: true,
            naming_convention: true,
            missing_fk_index: true,
            foreign_key_suffix: default_foreign_key_suffix(),
        }
    }
}

impl AnalyzerConfig {
    fn is_enabled(&self, rule: &str) -> bool {
        match rule {
            "orphan_tables" => self.orphan_tables,
            "circular_dependencies" => self.circular_dependencies,
            "missing_primary_key" => self.missing_primary_key,
            "naming_convention" => self.naming_convention,
            "missing_fk_index" => self.missing_fk_index,
            _ => true,
        }
    }
}

/// One structural check.
pub trait Rule: Send + Sync {
    /// Rule name, matching its [`AnalyzerConfig`] toggle
    fn name(&self) -> &'static str;
    /// Human-readable description
    fn description(&self) -> &'static str;
    fn check(&self, model: &SchemaModel, config: &AnalyzerConfig) -> Vec<Diagnostic>;
}

/// Runs rules in registration order.
pub struct Analyzer {
    rules: Vec<Box<dyn Rule>>,
}

impl Analyzer {
    /// All built-in rules, in reporting order.
    pub fn with_defaults() -> Self {
        Self {
            rules: vec![
                Box::new(OrphanTables),
                Box::new(CircularDependencies),
                Box::new(MissingPrimaryKey),
                Box::new(NamingConvention),
                Box::new(MissingForeignKeyIndex),
            ],
        }
    }

    /// Run every enabled rule; the result is sorted most severe first.
    pub fn run(&self, model: &SchemaModel, config: &AnalyzerConfig) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            if !config.is_enabled(rule.name()) {
                log::debug!("rule {} disabled", rule.name());
                continue;
            }
            let found = rule.check(model, config);
            log::debug!("rule {}: {} diagnostics", rule.name(), found.len());
            diagnostics.extend(found);
        }
        sort_by_severity(&mut diagnostics);
        diagnostics
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// `(name, description)` for every registered rule.
    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description()))
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Analyze `model` with the built-in rules.
pub fn analyze(model: &SchemaModel, config: &AnalyzerConfig) -> Vec<Diagnostic> {
    Analyzer::with_defaults().run(model, config)
}


#[cfg(test)]
mod tests {
    use super::test_utils::model;
    use super::*;
    use crate::diagnostics::{Category, Severity};

    const SCHEMA: &str = "
        CREATE TABLE users (id INT PRIMARY KEY, email TEXT UNIQUE);
        CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));
        CREATE TABLE audit_log (message TEXT);
    ";

    #[test]
    fn test_rule_order() {
        assert_eq!(
            Analyzer::with_defaults().rule_names(),
            vec![
                "orphan_tables",
                "circular_dependencies",
                "missing_primary_key",
                "naming_convention",
                "missing_fk_index"
            ]
        );
    }

    #[test]
    fn test_sorted_by_severity() {
        let diags = analyze(&model(SCHEMA), &AnalyzerConfig::default());
        assert!(!diags.is_empty());
        assert!(diags.windows(2).all(|w| w[0].severity >= w[1].severity));
        assert!(
            diags
                .iter()
                .any(|d| d.category == Category::MissingPrimaryKey && d.severity == Severity::Warning)
        );
    }

    #[test]
    fn test_disabled_rules_do_not_run() {
        let config = AnalyzerConfig {
            orphan_tables: false,
            missing_primary_key: false,
            missing_fk_index: false,
            ..Default::default()
        };
        let diags = analyze(&model(SCHEMA), &config);
        assert!(diags.iter().all(|d| {
            !matches!(
                d.category,
                Category::OrphanTable | Category::MissingPrimaryKey | Category::MissingFkIndex
            )
        }));
    }

    #[test]
    fn test_empty_model_has_no_findings() {
        assert!(analyze(&SchemaModel::default(), &AnalyzerConfig::default()).is_empty());
    }

    #[test]
    fn test_config_defaults_from_partial_yaml() {
        let config: AnalyzerConfig = serde_yaml::from_str("naming_convention: false").unwrap();
        assert!(!config.naming_convention);
        assert!(config.orphan_tables);
        assert_eq!(config.foreign_key_suffix, "_id");
    }
}
