//! In-memory adjacency backend.
//!
//! Serializes as a plain JSON object `{ "node": ["neighbor", ...] }`, which is
//! the input format of the `graph-suggest` binary.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::fetcher::{ConnectionFetcher, SharedFetcher};
use crate::model::NodeId;

/// Directed adjacency list keyed by source node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjacencyGraph {
    outgoing: HashMap<NodeId, Vec<NodeId>>,
}

impl AdjacencyGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON adjacency format.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error when `raw` is not an object mapping node ids
    /// to arrays of node ids.
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Set the full outgoing list of `source`, replacing any previous one.
    pub fn set_connections<I, S>(&mut self, source: impl Into<NodeId>, targets: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.outgoing
            .insert(source.into(), targets.into_iter().map(Into::into).collect());
    }

    /// Append one directed edge.
    pub fn add_edge(&mut self, source: impl Into<NodeId>, target: impl Into<NodeId>) {
        self.outgoing
            .entry(source.into())
            .or_default()
            .push(target.into());
    }

    /// Outgoing neighbors of `node_id` (empty for unknown nodes).
    #[must_use]
    pub fn outgoing(&self, node_id: &str) -> &[NodeId] {
        self.outgoing.get(node_id).map_or(&[], Vec::as_slice)
    }

    /// Number of nodes with an outgoing list.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    /// Build the incoming adjacency. Sources are visited in sorted order so
    /// neighbor lists come out stable.
    #[must_use]
    pub fn incoming_index(&self) -> HashMap<NodeId, Vec<NodeId>> {
        let mut sources: Vec<&NodeId> = self.outgoing.keys().collect();
        sources.sort();

        let mut incoming: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for source in sources {
            for target in &self.outgoing[source] {
                incoming
                    .entry(target.clone())
                    .or_default()
                    .push(source.clone());
            }
        }
        incoming
    }

    /// Fetcher over the outgoing lists (snapshot of the current graph).
    #[must_use]
    pub fn forward_fetcher(&self) -> SharedFetcher {
        Arc::new(MapFetcher {
            adjacency: self.outgoing.clone(),
        })
    }

    /// Fetcher over the derived incoming lists (snapshot of the current graph).
    #[must_use]
    pub fn reverse_fetcher(&self) -> SharedFetcher {
        Arc::new(MapFetcher {
            adjacency: self.incoming_index(),
        })
    }
}

struct MapFetcher {
    adjacency: HashMap<NodeId, Vec<NodeId>>,
}

#[async_trait]
impl ConnectionFetcher for MapFetcher {
    async fn connections(&self, node_id: &str) -> Result<Vec<NodeId>> {
        Ok(self.adjacency.get(node_id).cloned().unwrap_or_default())
    }
}
