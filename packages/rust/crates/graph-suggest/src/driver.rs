//! Iteration driver: threads the probability map through successive steps.

use crate::error::SuggestError;
use crate::model::{ProbabilityMap, total_mass};
use crate::propagate::Propagator;

/// Final map of a run plus bookkeeping for diagnostics.
#[derive(Debug, Clone)]
pub(crate) struct WalkOutcome {
    pub(crate) probs: ProbabilityMap,
    pub(crate) peak_active_nodes: usize,
}

/// Run `iterations` propagation steps starting from all mass on the start
/// node. Iterations are strictly sequential; any step error ends the run.
pub(crate) async fn run_iterations(
    propagator: &Propagator,
    iterations: usize,
) -> Result<WalkOutcome, SuggestError> {
    let mut probs = ProbabilityMap::from([(propagator.start().to_string(), 1.0)]);
    let mut peak_active_nodes = probs.len();

    for iteration in 1..=iterations {
        let active_nodes = probs.len();
        probs = propagator.step(&probs).await?;
        peak_active_nodes = peak_active_nodes.max(probs.len());
        tracing::debug!(
            event = "graph_suggest.iteration.completed",
            start = %propagator.start(),
            iteration,
            iterations,
            active_nodes,
            next_nodes = probs.len(),
            total_mass = total_mass(&probs),
            "propagation iteration completed"
        );
    }

    Ok(WalkOutcome {
        probs,
        peak_active_nodes,
    })
}
