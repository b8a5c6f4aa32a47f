//! ddlgraph CLI - analyze and lay out a directory of DDL files

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use ddlgraph::analysis::Analyzer;
use ddlgraph::config::Config;
use ddlgraph::report::render_text;
use ddlgraph::source::load_directory;
use ddlgraph::{ParserKind, RankDir, analyze_batch};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Parse schema files, check them, and optionally compute a diagram layout
#[derive(Parser, Debug)]
#[command(name = "ddlgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing schema files
    #[arg(required_unless_present = "list_rules")]
    dir: Option<PathBuf>,

    /// Config file (default: ddlgraph.yml or ddlgraph.yaml inside DIR)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Statement parser: strict or tolerant
    #[arg(long)]
    parser: Option<ParserKind>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Compute node positions
    #[arg(long)]
    layout: bool,

    /// Group nodes by folder (implies --layout)
    #[arg(long)]
    grouped: bool,

    /// Rank direction: LR, TB, RL or BT
    #[arg(long)]
    rank_dir: Option<RankDir>,

    /// Print the analyzer rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Aligned diagnostics table
    Text,
    /// Model, diagnostics and layout as JSON
    Json,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list_rules {
        print!("{}", list_rules());
        return Ok(ExitCode::SUCCESS);
    }
    let Some(dir) = cli.dir.as_deref() else {
        bail!("no schema directory given");
    };

    let config = load_config(&cli, dir)?;
    let files = load_directory(dir, &config)
        .with_context(|| format!("failed to load schema files from {}", dir.display()))?;

    let with_layout = cli.layout || config.layout.grouped;
    let report = analyze_batch(&files, &config, with_layout);

    match cli.format {
        OutputFormat::Text => {
            print!("{}", render_text(&report.diagnostics));
            if let Some(layout) = &report.layout {
                println!(
                    "layout: {} nodes, {} groups, {:.0} x {:.0}",
                    layout.nodes.len(),
                    layout.groups.len(),
                    layout.width,
                    layout.height
                );
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
            println!("{json}");
        }
    }

    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

/// One `name  description` line per analyzer rule.
fn list_rules() -> String {
    let rules = Analyzer::with_defaults().describe();
    let width = rules.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    rules
        .iter()
        .map(|(name, description)| format!("{name:<width$}  {description}\n"))
        .collect()
}

/// Config from file, then command-line overrides, validated once more.
fn load_config(cli: &Cli, dir: &Path) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load_from_dir(dir)?,
    };
    if let Some(parser) = cli.parser {
        config.parser = parser;
    }
    if let Some(rank_dir) = cli.rank_dir {
        config.layout.rank_dir = rank_dir;
    }
    if cli.grouped {
        config.layout.grouped = true;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_args() {
        let cli = Cli::try_parse_from(["ddlgraph", "schema"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("schema")));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.parser.is_none());
        assert!(!cli.layout);
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::try_parse_from([
            "ddlgraph",
            "db",
            "--parser",
            "strict",
            "--format",
            "json",
            "--grouped",
            "--rank-dir",
            "tb",
        ])
        .unwrap();
        assert_eq!(cli.parser, Some(ParserKind::Strict));
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.rank_dir, Some(RankDir::Tb));

        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&cli, dir.path()).unwrap();
        assert_eq!(config.parser, ParserKind::Strict);
        assert!(config.layout.grouped);
        assert_eq!(config.layout.rank_dir, RankDir::Tb);
    }

    #[test]
    fn test_list_rules_needs_no_dir() {
        assert!(Cli::try_parse_from(["ddlgraph"]).is_err());
        let cli = Cli::try_parse_from(["ddlgraph", "--list-rules"]).unwrap();
        assert!(cli.list_rules);
        assert!(cli.dir.is_none());

        let listing = list_rules();
        let names: Vec<&str> = listing
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(
            names,
            vec![
                "orphan_tables",
                "circular_dependencies",
                "missing_primary_key",
                "naming_convention",
                "missing_fk_index"
            ]
        );
        assert!(listing.contains("Reports foreign-key columns not covered"));
    }

    #[test]
    fn test_bad_rank_dir_rejected() {
        assert!(Cli::try_parse_from(["ddlgraph", "db", "--rank-dir", "up"]).is_err());
    }
}
