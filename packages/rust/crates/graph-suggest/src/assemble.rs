//! Turns a final probability map into ranked, not-yet-connected suggestions.

use std::collections::HashSet;

use crate::model::{NodeId, ProbabilityMap, Suggestion};
use crate::topk::TopKSelector;

/// Rank `final_probs`, skipping `start` and its current direct connections.
///
/// Returns at most `max_results` entries in descending score order.
#[must_use]
pub fn assemble(
    start: &str,
    final_probs: ProbabilityMap,
    forward_neighbors_of_start: &[NodeId],
    max_results: usize,
) -> Vec<Suggestion> {
    assemble_counted(start, final_probs, forward_neighbors_of_start, max_results).0
}

/// Same as [`assemble`], also returning how many candidates survived exclusion.
pub(crate) fn assemble_counted(
    start: &str,
    final_probs: ProbabilityMap,
    forward_neighbors_of_start: &[NodeId],
    max_results: usize,
) -> (Vec<Suggestion>, usize) {
    let connected: HashSet<&str> = forward_neighbors_of_start
        .iter()
        .map(String::as_str)
        .collect();

    let mut selector = TopKSelector::new(max_results);
    let mut candidate_count = 0_usize;
    for (node_id, score) in final_probs {
        if node_id == start || connected.contains(node_id.as_str()) {
            continue;
        }
        candidate_count += 1;
        selector.push(Suggestion { node_id, score });
    }
    (selector.into_sorted_vec(), candidate_count)
}
