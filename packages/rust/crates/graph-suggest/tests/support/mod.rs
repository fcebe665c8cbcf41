//! Shared fixtures for graph-suggest integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use graph_suggest::{AdjacencyGraph, ConnectionFetcher, NodeId};

/// Small friend graph used across tests.
pub fn friend_graph() -> AdjacencyGraph {
    let mut graph = AdjacencyGraph::new();
    graph.set_connections("Andrew", ["Ben", "Matt"]);
    graph.set_connections("Ben", ["Chuck", "Stephen", "Andrew"]);
    graph.set_connections("Chuck", ["Stephen", "Rajat", "Ben", "Lyric"]);
    graph.set_connections("Lyric", ["Chuck"]);
    graph.set_connections("Matt", ["Pachu"]);
    graph.set_connections("Pachu", Vec::<String>::new());
    graph.set_connections("Rajat", ["Chuck", "Stephen"]);
    graph.set_connections("Stephen", ["Ben", "Chuck", "Rajat"]);
    graph
}

/// Star graph `hub -> leaf00..leafNN`.
pub fn star_graph(hub: &str, leaves: usize) -> AdjacencyGraph {
    let mut graph = AdjacencyGraph::new();
    graph.set_connections(hub, (0..leaves).map(|i| format!("leaf{i:02}")));
    graph
}

pub fn node_ids(ranked: &[graph_suggest::Suggestion]) -> Vec<&str> {
    ranked.iter().map(|s| s.node_id.as_str()).collect()
}

/// Wraps a graph fetcher; counts calls, tracks concurrency, fails or panics on chosen nodes.
pub struct InstrumentedFetcher {
    inner: Arc<dyn ConnectionFetcher>,
    delay: Option<Duration>,
    fail_on: HashSet<String>,
    panic_on: HashSet<String>,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl InstrumentedFetcher {
    pub fn new(inner: Arc<dyn ConnectionFetcher>) -> Self {
        Self {
            inner,
            delay: None,
            fail_on: HashSet::new(),
            panic_on: HashSet::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_on(mut self, node_id: &str) -> Self {
        self.fail_on.insert(node_id.to_string());
        self
    }

    pub fn panicking_on(mut self, node_id: &str) -> Self {
        self.panic_on.insert(node_id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionFetcher for InstrumentedFetcher {
    async fn connections(&self, node_id: &str) -> Result<Vec<NodeId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(node_id.to_string());
        }
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let result = if self.panic_on.contains(node_id) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("fetcher panicked on {node_id}");
        } else if self.fail_on.contains(node_id) {
            Err(anyhow!("backend unavailable for {node_id}"))
        } else {
            self.inner.connections(node_id).await
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
