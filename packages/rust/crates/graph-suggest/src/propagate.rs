//! One power-iteration step of personalized PageRank.
//!
//! Each active node becomes a unit of work on a bounded worker pool. Workers
//! only fetch neighbors and compute their per-neighbor share; the dispatch
//! loop is the single consumer that merges shares into the next map, after
//! every unit has joined.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;

use crate::config::Fetchers;
use crate::error::SuggestError;
use crate::fetcher::FetchDirection;
use crate::model::{NodeId, ProbabilityMap};

/// Mass one node hands to each of its neighbors.
#[derive(Debug)]
struct Contribution {
    neighbors: Vec<NodeId>,
    share: f64,
}

/// `None` marks a unit that saw the stop flag and skipped its fetch.
type UnitResult = Result<Option<(usize, Contribution)>, SuggestError>;

/// Holds a unit's permit. Unless the unit completes, dropping the guard raises
/// the stop flag before the permit returns to the pool, so the dispatch loop
/// observes the failure no later than the freed permit.
struct UnitGuard {
    stop: Arc<AtomicBool>,
    completed: bool,
    _permit: OwnedSemaphorePermit,
}

impl UnitGuard {
    fn new(permit: OwnedSemaphorePermit, stop: Arc<AtomicBool>) -> Self {
        Self {
            stop,
            completed: false,
            _permit: permit,
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        if !self.completed {
            self.stop.store(true, Ordering::Release);
        }
    }
}

/// Parameters shared by every step of one call.
#[derive(Clone)]
pub(crate) struct Propagator {
    start: NodeId,
    alpha: f64,
    concurrency_limit: usize,
    fetchers: Fetchers,
    fetch_calls: Arc<AtomicUsize>,
}

impl Propagator {
    pub(crate) fn new(
        start: &str,
        alpha: f64,
        concurrency_limit: usize,
        fetchers: Fetchers,
    ) -> Self {
        Self {
            start: start.to_string(),
            alpha,
            concurrency_limit,
            fetchers,
            fetch_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn start(&self) -> &str {
        &self.start
    }

    pub(crate) fn fetchers(&self) -> &Fetchers {
        &self.fetchers
    }

    /// Fetcher invocations issued so far (forward and reverse counted separately).
    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Forward neighbors of the start node, counted like any other fetch.
    pub(crate) async fn start_connections(&self) -> Result<Vec<NodeId>, SuggestError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        self.fetchers
            .forward
            .connections(&self.start)
            .await
            .map_err(|error| SuggestError::fetch(&self.start, FetchDirection::Forward, error))
    }

    /// Distribute `probs` one step. Returns only after every unit has joined;
    /// on the first failure, no further unit is dispatched, units not yet
    /// fetching skip their fetch, and the remaining ones are aborted.
    pub(crate) async fn step(&self, probs: &ProbabilityMap) -> Result<ProbabilityMap, SuggestError> {
        let mut active: Vec<(&NodeId, f64)> = probs
            .iter()
            .filter(|(_, mass)| **mass > 0.0)
            .map(|(node_id, mass)| (node_id, *mass))
            .collect();
        active.sort_by(|left, right| left.0.cmp(right.0));

        let mut contributions: Vec<Option<Contribution>> =
            std::iter::repeat_with(|| None).take(active.len()).collect();
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let stop = Arc::new(AtomicBool::new(false));
        let mut workers: JoinSet<UnitResult> = JoinSet::new();

        for (slot, (node_id, mass)) in active.iter().enumerate() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if stop.load(Ordering::Acquire) {
                break;
            }
            while let Some(joined) = workers.try_join_next() {
                self.absorb(joined, &mut contributions, &mut workers)?;
            }

            let node_id = (*node_id).clone();
            let share_base = self.alpha * mass;
            let fetchers = self.fetchers.clone();
            let fetch_calls = Arc::clone(&self.fetch_calls);
            let mut guard = UnitGuard::new(permit, Arc::clone(&stop));
            workers.spawn(async move {
                if guard.stopped() {
                    guard.completed = true;
                    return Ok(None);
                }
                let neighbors = fetch_neighbors(&node_id, &fetchers, &fetch_calls).await?;
                guard.completed = true;
                // Dangling nodes keep an empty neighbor list and contribute nothing.
                let share = if neighbors.is_empty() {
                    0.0
                } else {
                    share_base / neighbors.len() as f64
                };
                Ok(Some((slot, Contribution { neighbors, share })))
            });
        }

        while let Some(joined) = workers.join_next().await {
            self.absorb(joined, &mut contributions, &mut workers)?;
        }

        let mut next = ProbabilityMap::with_capacity(probs.len().saturating_mul(2));
        next.insert(self.start.clone(), 1.0 - self.alpha);
        for contribution in contributions.into_iter().flatten() {
            for neighbor in contribution.neighbors {
                *next.entry(neighbor).or_insert(0.0) += contribution.share;
            }
        }

        tracing::trace!(
            event = "graph_suggest.propagate.step",
            start = %self.start,
            active_nodes = active.len(),
            next_nodes = next.len(),
            "propagation step merged"
        );
        Ok(next)
    }

    fn absorb(
        &self,
        joined: Result<UnitResult, tokio::task::JoinError>,
        contributions: &mut [Option<Contribution>],
        workers: &mut JoinSet<UnitResult>,
    ) -> Result<(), SuggestError> {
        let failure = match joined {
            Ok(Ok(Some((slot, contribution)))) => {
                contributions[slot] = Some(contribution);
                return Ok(());
            }
            Ok(Ok(None)) => return Ok(()),
            Ok(Err(error)) => error,
            Err(join_error) => SuggestError::Worker(join_error),
        };
        workers.abort_all();
        tracing::warn!(
            event = "graph_suggest.propagate.aborted",
            start = %self.start,
            cancelled_units = workers.len(),
            error = %failure,
            "propagation step aborted"
        );
        Err(failure)
    }
}

async fn fetch_neighbors(
    node_id: &str,
    fetchers: &Fetchers,
    fetch_calls: &AtomicUsize,
) -> Result<Vec<NodeId>, SuggestError> {
    let forward = async {
        fetch_calls.fetch_add(1, Ordering::Relaxed);
        fetchers
            .forward
            .connections(node_id)
            .await
            .map_err(|error| SuggestError::fetch(node_id, FetchDirection::Forward, error))
    };
    let Some(reverse_fetcher) = fetchers.reverse.as_ref() else {
        return forward.await;
    };
    let reverse = async {
        fetch_calls.fetch_add(1, Ordering::Relaxed);
        reverse_fetcher
            .connections(node_id)
            .await
            .map_err(|error| SuggestError::fetch(node_id, FetchDirection::Reverse, error))
    };

    let (mut neighbors, incoming) = tokio::try_join!(forward, reverse)?;
    neighbors.extend(incoming);
    Ok(neighbors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;

    fn fetchers(graph: &AdjacencyGraph, bidirectional: bool) -> Fetchers {
        Fetchers {
            forward: graph.forward_fetcher(),
            reverse: bidirectional.then(|| graph.reverse_fetcher()),
        }
    }

    fn start_map(start: &str) -> ProbabilityMap {
        ProbabilityMap::from([(start.to_string(), 1.0)])
    }

    #[tokio::test]
    async fn splits_mass_evenly_and_injects_teleport() -> Result<(), SuggestError> {
        let mut graph = AdjacencyGraph::new();
        graph.set_connections("s", ["a", "b"]);
        let propagator = Propagator::new("s", 0.5, 4, fetchers(&graph, false));

        let next = propagator.step(&start_map("s")).await?;
        assert!((next["s"] - 0.5).abs() < 1e-12);
        assert!((next["a"] - 0.25).abs() < 1e-12);
        assert!((next["b"] - 0.25).abs() < 1e-12);
        assert_eq!(propagator.fetch_calls(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn dangling_node_drops_its_mass() -> Result<(), SuggestError> {
        let graph = AdjacencyGraph::new();
        let propagator = Propagator::new("s", 0.5, 4, fetchers(&graph, false));

        let next = propagator.step(&start_map("s")).await?;
        assert_eq!(next.len(), 1);
        assert!((next["s"] - 0.5).abs() < 1e-12);
        Ok(())
    }

    #[tokio::test]
    async fn duplicates_and_reverse_edges_each_take_a_share() -> Result<(), SuggestError> {
        let mut graph = AdjacencyGraph::new();
        graph.set_connections("s", ["a", "a"]);
        graph.set_connections("b", ["s"]);
        let propagator = Propagator::new("s", 0.5, 4, fetchers(&graph, true));

        let next = propagator.step(&start_map("s")).await?;
        assert!((next["a"] - 2.0 * 0.5 / 3.0).abs() < 1e-12);
        assert!((next["b"] - 0.5 / 3.0).abs() < 1e-12);
        assert_eq!(propagator.fetch_calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn teleport_accumulates_with_incoming_mass() -> Result<(), SuggestError> {
        let mut graph = AdjacencyGraph::new();
        graph.set_connections("a", ["s"]);
        let propagator = Propagator::new("s", 0.5, 4, fetchers(&graph, false));

        let probs = ProbabilityMap::from([("a".to_string(), 0.4), ("s".to_string(), 0.0)]);
        let next = propagator.step(&probs).await?;
        assert!((next["s"] - (0.5 + 0.2)).abs() < 1e-12);
        assert_eq!(propagator.fetch_calls(), 1);
        Ok(())
    }
}
