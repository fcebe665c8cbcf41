//! Public entry points: validate once, walk, exclude, rank.

use std::time::Instant;

use serde::Serialize;

use crate::assemble::assemble_counted;
use crate::config::{ResolvedConfig, SuggestConfig};
use crate::driver::run_iterations;
use crate::error::SuggestError;
use crate::model::{ProbabilityMap, Suggestion, WalkMode, total_mass};
use crate::propagate::Propagator;

/// Run statistics for one `suggest` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestDiagnostics {
    /// Damping factor used.
    pub alpha: f64,
    /// Propagation rounds executed.
    pub iterations: usize,
    /// Adjacency followed by the walk.
    pub mode: WalkMode,
    /// Fetcher invocations, including the final start-node lookup.
    pub fetch_calls: usize,
    /// Largest probability map seen across iterations.
    pub peak_active_nodes: usize,
    /// Sum of mass in the final map.
    pub final_mass: f64,
    /// Nodes left after excluding the start node and its connections.
    pub candidate_count: usize,
    /// Wall time of the call.
    pub total_duration_ms: f64,
}

/// Suggestions plus the diagnostics of the run that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestOutcome {
    /// Ranked suggestions, descending by score.
    pub suggestions: Vec<Suggestion>,
    /// Run statistics.
    pub diagnostics: SuggestDiagnostics,
}

/// Validated suggestion engine.
///
/// Construction checks the config synchronously, so configuration errors
/// surface before any future is created. Every call builds its own maps and
/// selector; one `Suggester` may serve concurrent calls.
#[derive(Clone)]
pub struct Suggester {
    config: ResolvedConfig,
}

impl Suggester {
    /// Validate `config`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the forward fetcher is missing, the
    /// reverse fetcher is missing in bidirectional mode, `alpha` is outside
    /// (0, 1) or `concurrency_limit` is zero.
    pub fn new(config: SuggestConfig) -> Result<Self, SuggestError> {
        let config = config.resolve()?;
        Ok(Self { config })
    }

    /// Adjacency followed by the walk.
    #[must_use]
    pub fn mode(&self) -> WalkMode {
        self.config.fetchers.mode()
    }

    /// Approximate personalized PageRank map around `node_id`, without exclusion.
    ///
    /// # Errors
    ///
    /// Fails with the first fetcher or worker error.
    pub async fn rank(&self, node_id: &str) -> Result<ProbabilityMap, SuggestError> {
        let propagator = self.propagator(node_id);
        Ok(run_iterations(&propagator, self.config.iterations).await?.probs)
    }

    /// Ranked suggestions for `node_id`.
    ///
    /// # Errors
    ///
    /// Fails with the first fetcher or worker error; no partial list is returned.
    pub async fn suggest(&self, node_id: &str) -> Result<Vec<Suggestion>, SuggestError> {
        Ok(self.suggest_with_diagnostics(node_id).await?.suggestions)
    }

    /// Ranked suggestions together with run statistics.
    ///
    /// # Errors
    ///
    /// Fails with the first fetcher or worker error; no partial list is returned.
    pub async fn suggest_with_diagnostics(
        &self,
        node_id: &str,
    ) -> Result<SuggestOutcome, SuggestError> {
        let started = Instant::now();
        let propagator = self.propagator(node_id);

        let walk = run_iterations(&propagator, self.config.iterations).await?;
        let final_mass = total_mass(&walk.probs);
        let connected = propagator.start_connections().await?;
        let (suggestions, candidate_count) =
            assemble_counted(node_id, walk.probs, &connected, self.config.max_results);

        let diagnostics = SuggestDiagnostics {
            alpha: self.config.alpha,
            iterations: self.config.iterations,
            mode: propagator.fetchers().mode(),
            fetch_calls: propagator.fetch_calls(),
            peak_active_nodes: walk.peak_active_nodes,
            final_mass,
            candidate_count,
            total_duration_ms: started.elapsed().as_secs_f64() * 1000.0,
        };
        tracing::debug!(
            event = "graph_suggest.suggest.completed",
            start = %node_id,
            mode = %diagnostics.mode,
            iterations = diagnostics.iterations,
            fetch_calls = diagnostics.fetch_calls,
            candidate_count,
            returned = suggestions.len(),
            duration_ms = diagnostics.total_duration_ms,
            "suggestions ranked"
        );
        Ok(SuggestOutcome {
            suggestions,
            diagnostics,
        })
    }

    fn propagator(&self, node_id: &str) -> Propagator {
        Propagator::new(
            node_id,
            self.config.alpha,
            self.config.concurrency_limit,
            self.config.fetchers.clone(),
        )
    }
}

/// One-shot helper: validate `config` and rank suggestions for `node_id`.
///
/// Prefer [`Suggester::new`] when configuration errors must be observed
/// before awaiting anything.
///
/// # Errors
///
/// Any configuration, fetcher or worker error.
pub async fn suggest(
    node_id: &str,
    config: SuggestConfig,
) -> Result<Vec<Suggestion>, SuggestError> {
    Suggester::new(config)?.suggest(node_id).await
}
