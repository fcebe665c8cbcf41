//! graph-suggest CLI: rank suggestions for one node of a JSON adjacency file.
//!
//! Logging: set `RUST_LOG=graph_suggest=debug` to see per-iteration logs on stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use graph_suggest::{AdjacencyGraph, SuggestConfig, SuggestSettings, Suggester};

#[derive(Parser, Debug)]
#[command(
    name = "graph-suggest",
    about = "Approximate personalized PageRank suggestions for a graph node",
    arg_required_else_help = true
)]
struct Cli {
    /// Node to suggest new connections for.
    node: String,

    /// JSON adjacency file: `{ "node": ["neighbor", ...] }`.
    #[arg(long, short = 'g', value_name = "FILE")]
    graph: PathBuf,

    /// TOML settings file (max_results, iterations, alpha, forward_only, concurrency_limit).
    #[arg(long = "conf", short = 'c', value_name = "FILE")]
    config_file: Option<PathBuf>,

    /// Cap on returned suggestions.
    #[arg(long)]
    max_results: Option<usize>,

    /// Number of propagation rounds.
    #[arg(long)]
    iterations: Option<usize>,

    /// Probability of continuing the walk instead of teleporting home.
    #[arg(long)]
    alpha: Option<f64>,

    /// Follow outgoing connections only.
    #[arg(long, default_value_t = false)]
    forward_only: bool,

    /// Max simultaneous fetches per iteration.
    #[arg(long)]
    concurrency_limit: Option<usize>,

    /// Include run diagnostics in the output.
    #[arg(long, default_value_t = false)]
    diagnostics: bool,

    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,

    /// Debug logging (ignored when RUST_LOG is set).
    #[arg(long, short = 'v', default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

impl Cli {
    fn flag_settings(&self) -> SuggestSettings {
        SuggestSettings {
            max_results: self.max_results,
            iterations: self.iterations,
            alpha: self.alpha,
            forward_only: self.forward_only.then_some(true),
            concurrency_limit: self.concurrency_limit,
        }
    }
}

fn resolve_settings(cli: &Cli) -> Result<SuggestSettings> {
    let mut settings = match cli.config_file.as_deref() {
        Some(path) => SuggestSettings::load(path)?,
        None => SuggestSettings::default(),
    };
    settings.apply_env_overrides();
    Ok(settings.overlay(&cli.flag_settings()))
}

fn load_graph(path: &Path) -> Result<AdjacencyGraph> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file '{}'", path.display()))?;
    AdjacencyGraph::from_json_str(&raw)
        .with_context(|| format!("invalid adjacency JSON in '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "graph_suggest=debug"
        } else {
            "graph_suggest=warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = resolve_settings(&cli)?;
    let graph = load_graph(&cli.graph)?;
    tracing::debug!(
        event = "graph_suggest.cli.graph_loaded",
        nodes = graph.node_count(),
        path = %cli.graph.display(),
        "adjacency graph loaded"
    );

    let mut config = SuggestConfig::bidirectional(graph.forward_fetcher(), graph.reverse_fetcher());
    settings.apply_to(&mut config);
    let suggester = Suggester::new(config).context("invalid suggestion settings")?;
    let outcome = suggester
        .suggest_with_diagnostics(&cli.node)
        .await
        .with_context(|| format!("suggest failed for node '{}'", cli.node))?;

    match cli.output {
        OutputFormat::Json => {
            let payload = if cli.diagnostics {
                json!({
                    "node": cli.node,
                    "suggestions": outcome.suggestions,
                    "diagnostics": outcome.diagnostics,
                })
            } else {
                json!({
                    "node": cli.node,
                    "suggestions": outcome.suggestions,
                })
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            for (rank, suggestion) in outcome.suggestions.iter().enumerate() {
                println!("{:>3}. {}\t{:.6}", rank + 1, suggestion.node_id, suggestion.score);
            }
            if cli.diagnostics {
                let diagnostics = &outcome.diagnostics;
                println!(
                    "# mode={} iterations={} fetch_calls={} candidates={} final_mass={:.6} duration_ms={:.3}",
                    diagnostics.mode,
                    diagnostics.iterations,
                    diagnostics.fetch_calls,
                    diagnostics.candidate_count,
                    diagnostics.final_mass,
                    diagnostics.total_duration_ms
                );
            }
        }
    }
    Ok(())
}
