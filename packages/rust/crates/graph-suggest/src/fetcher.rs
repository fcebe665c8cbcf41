//! Neighbor fetcher abstraction.
//!
//! The graph backend is supplied by the caller. Fetchers are shared across
//! propagation workers, so they must be `Send + Sync` and are held behind `Arc`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::NodeId;

/// Async adjacency lookup so suggestions can run against any store or test double.
#[async_trait]
pub trait ConnectionFetcher: Send + Sync {
    /// Return the neighbors of `node_id`. Duplicates are allowed and each
    /// receives its own share of mass.
    async fn connections(&self, node_id: &str) -> Result<Vec<NodeId>>;
}

/// Shared handle used by config and workers.
pub type SharedFetcher = Arc<dyn ConnectionFetcher>;

/// Adjacency direction, reported in fetch errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchDirection {
    /// Outgoing connections (`forward_connections`).
    Forward,
    /// Incoming connections (`reverse_connections`).
    Reverse,
}

impl fmt::Display for FetchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forward => f.write_str("forward"),
            Self::Reverse => f.write_str("reverse"),
        }
    }
}

/// Adapter turning an async closure into a [`ConnectionFetcher`].
pub struct FnFetcher<F> {
    fetch: F,
}

impl<F> FnFetcher<F> {
    /// Wrap `fetch`.
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F, Fut> ConnectionFetcher for FnFetcher<F>
where
    F: Fn(NodeId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<NodeId>>> + Send + 'static,
{
    async fn connections(&self, node_id: &str) -> Result<Vec<NodeId>> {
        (self.fetch)(node_id.to_string()).await
    }
}

/// Shorthand for `Arc::new(FnFetcher::new(fetch))`.
pub fn fetcher_fn<F, Fut>(fetch: F) -> SharedFetcher
where
    F: Fn(NodeId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<NodeId>>> + Send + 'static,
{
    Arc::new(FnFetcher::new(fetch))
}
