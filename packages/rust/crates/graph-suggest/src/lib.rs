//! graph-suggest - "people you may know" ranking over an async graph backend.
//!
//! Approximates personalized PageRank (random walk with restart) around a
//! start node with a fixed number of power-iteration steps, then ranks the
//! nodes that are not yet directly connected to it.
//!
//! # Architecture
//!
//! ```text
//! graph-suggest/src/
//! ├── lib.rs        # Re-exports (this file)
//! ├── error.rs      # SuggestError / SettingsError
//! ├── model.rs      # NodeId, ProbabilityMap, Suggestion, WalkMode
//! ├── fetcher.rs    # ConnectionFetcher trait + closure adapter
//! ├── graph.rs      # In-memory AdjacencyGraph backend
//! ├── config.rs     # SuggestConfig + validation
//! ├── settings.rs   # TOML / env numeric settings
//! ├── propagate.rs  # One bounded-parallel propagation step
//! ├── driver.rs     # Sequential iteration loop
//! ├── topk.rs       # Bounded top-k selector
//! ├── assemble.rs   # Exclusion + ranking
//! └── suggest.rs    # Suggester entry points
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use graph_suggest::{AdjacencyGraph, SuggestConfig, Suggester};
//!
//! let graph = AdjacencyGraph::from_json_str(r#"{"a": ["b"], "b": ["c"]}"#)?;
//! let suggester = Suggester::new(SuggestConfig::forward_only(graph.forward_fetcher()))?;
//! let ranked = suggester.suggest("a").await?;
//! ```

mod assemble;
mod config;
mod driver;
mod error;
mod fetcher;
mod graph;
mod model;
mod propagate;
mod settings;
mod suggest;
mod topk;

pub use assemble::assemble;
pub use config::{
    DEFAULT_ALPHA, DEFAULT_CONCURRENCY_LIMIT, DEFAULT_ITERATIONS, DEFAULT_MAX_RESULTS,
    SuggestConfig,
};
pub use error::{FetchSource, SettingsError, SuggestError};
pub use fetcher::{ConnectionFetcher, FetchDirection, FnFetcher, SharedFetcher, fetcher_fn};
pub use graph::AdjacencyGraph;
pub use model::{NodeId, ProbabilityMap, Suggestion, WalkMode, total_mass};
pub use settings::SuggestSettings;
pub use suggest::{SuggestDiagnostics, SuggestOutcome, Suggester, suggest};
pub use topk::TopKSelector;
