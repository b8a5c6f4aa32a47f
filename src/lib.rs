pub mod analysis;
pub mod ast;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod measure;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod source;
pub mod sql;

use wasm_bindgen::prelude::*;

pub use config::Config;
pub use diagnostics::{Category, Diagnostic, Severity};
pub use error::Error;
pub use layout::{Layout, LayoutConfig, LayoutEngine, LayoutGraph, Point, RankDir};
pub use model::SchemaModel;
pub use pipeline::{Pipeline, PipelineOutput, Report, analyze_batch};
pub use source::SourceFile;
pub use sql::ParserKind;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Analyze a batch of schema files.
///
/// `files_json` is a JSON array of `{ "path": ..., "text": ... }` objects and
/// `config_yaml` optional `ddlgraph.yml` content. Returns the report (model,
/// diagnostics, layout) as JSON.
#[wasm_bindgen(js_name = "analyzeSchema")]
pub fn analyze_schema(files_json: &str, config_yaml: Option<String>) -> Result<String, String> {
    run_batch(files_json, config_yaml.as_deref()).map_err(|e| e.to_string())
}

fn run_batch(files_json: &str, config_yaml: Option<&str>) -> error::Result<String> {
    let files: Vec<SourceFile> = serde_json::from_str(files_json)?;
    let config = match config_yaml {
        Some(yaml) => Config::from_yaml_str(yaml)?,
        None => Config::default(),
    };
    let report = analyze_batch(&files, &config, true);
    Ok(serde_json::to_string(&report)?)
}
