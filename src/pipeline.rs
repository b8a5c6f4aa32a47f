//! Files → parser → builder → resolver, and the full analysis batch.

use crate::analysis::Analyzer;
use crate::builder::{PartialModel, build_partial};
use crate::config::Config;
use crate::diagnostics::{Category, Diagnostic, sort_by_severity};
use crate::layout::{Layout, LayoutEngine, LayoutGraph, group_by_folder};
use crate::model::SchemaModel;
use crate::source::SourceFile;
use crate::sql::{ParserKind, StatementParser, parse_file};
use serde::{Deserialize, Serialize};

/// Resolved model plus the diagnostics produced while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub model: SchemaModel,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one parse batch.
pub struct Pipeline {
    parser: Box<dyn StatementParser>,
}

impl Pipeline {
    pub fn new(kind: ParserKind) -> Self {
        Self::with_parser(kind.parser())
    }

    pub fn with_parser(parser: Box<dyn StatementParser>) -> Self {
        Self { parser }
    }

    pub fn parser_name(&self) -> &'static str {
        self.parser.name()
    }

    /// Parse and build every file independently, then merge and resolve.
    ///
    /// Files are processed in path order regardless of input order. A file
    /// that fails to parse contributes an error diagnostic and nothing else.
    pub fn run(&self, files: &[SourceFile]) -> PipelineOutput {
        let mut ordered: Vec<&SourceFile> = files.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(&b.path));

        let mut diagnostics = Vec::new();
        let partials: Vec<PartialModel> = ordered
            .into_iter()
            .map(|file| match parse_file(self.parser.as_ref(), &file.path, &file.text) {
                Ok(decls) => {
                    log::debug!("{}: {} declarations", file.path, decls.len());
                    build_partial(&file.path, decls)
                }
                Err(err) => {
                    log::warn!("{err}");
                    diagnostics.push(
                        Diagnostic::error(Category::Parse, err.source.to_string())
                            .with_file(&file.path)
                            .with_hint(format!(
                                "the {} parser skipped this file",
                                self.parser_name()
                            )),
                    );
                    PartialModel {
                        source_file: file.path.clone(),
                        ..Default::default()
                    }
                }
            })
            .collect();

        let resolution = crate::resolve::merge(partials);
        diagnostics.extend(resolution.diagnostics);
        sort_by_severity(&mut diagnostics);

        PipelineOutput {
            model: resolution.model,
            diagnostics,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ParserKind::default())
    }
}

/// Everything one batch yields: model, all diagnostics, optional layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub model: SchemaModel,
    /// Batch and analyzer diagnostics, most severe first
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        crate::diagnostics::has_errors(&self.diagnostics)
    }
}

/// Run the pipeline and the analyzer with `config`; lay the model out
/// when `with_layout` is set.
pub fn analyze_batch(files: &[SourceFile], config: &Config, with_layout: bool) -> Report {
    let pipeline = Pipeline::new(config.parser);
    log::info!("parsing {} files with the {} parser", files.len(), pipeline.parser_name());
    let output = pipeline.run(files);
    if output.model.is_empty() {
        log::warn!("no tables, enums or sequences found");
    }

    let mut diagnostics = output.diagnostics;
    diagnostics.extend(Analyzer::with_defaults().run(&output.model, &config.analyzer));
    sort_by_severity(&mut diagnostics);

    let layout = with_layout.then(|| layout_model(&output.model, config));

    log::info!(
        "{} tables, {} enums, {} diagnostics",
        output.model.tables.len(),
        output.model.enums.len(),
        diagnostics.len()
    );

    Report {
        model: output.model,
        diagnostics,
        layout,
    }
}

/// Layout of `model` according to `config.layout`, grouped by folder
/// when `grouped` is set.
pub fn layout_model(model: &SchemaModel, config: &Config) -> Layout {
    let engine = LayoutEngine::new(config.layout.clone());
    let graph = LayoutGraph::from_model(model);
    if config.layout.grouped {
        engine.layout_grouped(&graph, &group_by_folder(model), None)
    } else {
        engine.layout(&graph, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    #[test]
    fn test_files_processed_in_path_order() {
        let files = [
            SourceFile::new("b.sql", "CREATE TABLE b (id INT PRIMARY KEY);"),
            SourceFile::new("a.sql", "CREATE TABLE a (id INT PRIMARY KEY);"),
        ];
        let output = Pipeline::default().run(&files);
        let names: Vec<&str> = output.model.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_failure_is_isolated() {
        let files = [
            SourceFile::new("bad.sql", "CREATE TABLE broken (name TEXT DEFAULT 'oops);"),
            SourceFile::new("good.sql", "CREATE TABLE good (id INT PRIMARY KEY);"),
        ];
        let output = Pipeline::new(ParserKind::Strict).run(&files);
        assert_eq!(output.model.tables.len(), 1);
        assert_eq!(output.diagnostics.len(), 1);
        let d = &output.diagnostics[0];
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.category, Category::Parse);
        assert_eq!(d.file.as_deref(), Some("bad.sql"));
        assert_eq!(d.hint.as_deref(), Some("the strict parser skipped this file"));
    }

    #[test]
    fn test_empty_batch_yields_empty_model() {
        let pipeline = Pipeline::new(ParserKind::Tolerant);
        assert_eq!(pipeline.parser_name(), "tolerant");

        let files = [SourceFile::new("empty.sql", "-- nothing here\n")];
        let report = analyze_batch(&files, &Config::default(), false);
        assert!(report.model.is_empty());
        assert!(report.diagnostics.is_empty());
        assert!(report.layout.is_none());
    }

    #[test]
    fn test_analyze_batch_merges_diagnostics() {
        let files = [SourceFile::new(
            "schema.sql",
            "CREATE TABLE logs (message TEXT);
             CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id), x INT REFERENCES ghosts (id));",
        )];
        let report = analyze_batch(&files, &Config::default(), true);

        let categories: Vec<Category> = report.diagnostics.iter().map(|d| d.category).collect();
        assert!(categories.contains(&Category::UnresolvedReference));
        assert!(categories.contains(&Category::MissingPrimaryKey));
        assert!(categories.contains(&Category::OrphanTable));
        assert!(!report.has_errors());

        let severities: Vec<Severity> = report.diagnostics.iter().map(|d| d.severity).collect();
        let mut sorted = severities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(severities, sorted);

        let layout = report.layout.unwrap();
        assert_eq!(layout.nodes.len(), 3);
    }

    #[test]
    fn test_grouped_layout_by_folder() {
        let files = [
            SourceFile::new("auth/users.sql", "CREATE TABLE users (id INT PRIMARY KEY);"),
            SourceFile::new(
                "shop/orders.sql",
                "CREATE TABLE orders (id INT PRIMARY KEY, user_id INT REFERENCES users (id));",
            ),
        ];
        let mut config = Config::default();
        config.layout.grouped = true;
        let report = analyze_batch(&files, &config, true);
        let layout = report.layout.unwrap();
        let names: Vec<&str> = layout.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["auth", "shop"]);
    }
}
