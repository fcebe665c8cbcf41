//! Shared value types.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque node identifier (user id, document id, ...).
pub type NodeId = String;

/// Probability mass per node for one iteration. Only nodes holding mass are keys.
pub type ProbabilityMap = HashMap<NodeId, f64>;

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested node.
    pub node_id: NodeId,
    /// Approximate personalized PageRank mass of the node.
    pub score: f64,
}

impl Suggestion {
    /// Build a suggestion from an id and score.
    #[must_use]
    pub fn new(node_id: impl Into<NodeId>, score: f64) -> Self {
        Self {
            node_id: node_id.into(),
            score,
        }
    }
}

/// Which adjacency the random walk may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkMode {
    /// Outgoing connections only.
    ForwardOnly,
    /// Outgoing and incoming connections.
    #[default]
    Bidirectional,
}

impl WalkMode {
    /// Mode matching the `forward_only` config flag.
    #[must_use]
    pub fn from_forward_only(forward_only: bool) -> Self {
        if forward_only {
            Self::ForwardOnly
        } else {
            Self::Bidirectional
        }
    }
}

impl fmt::Display for WalkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForwardOnly => f.write_str("forward_only"),
            Self::Bidirectional => f.write_str("bidirectional"),
        }
    }
}

/// Sum of all mass in a probability map.
#[must_use]
pub fn total_mass(probs: &ProbabilityMap) -> f64 {
    probs.values().sum()
}
