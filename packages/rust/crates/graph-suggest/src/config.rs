//! Per-call configuration and its validation.

use std::fmt;

use crate::error::SuggestError;
use crate::fetcher::SharedFetcher;
use crate::model::WalkMode;

/// Default cap on returned suggestions.
pub const DEFAULT_MAX_RESULTS: usize = 25;
/// Default number of propagation rounds.
pub const DEFAULT_ITERATIONS: usize = 3;
/// Default probability of continuing the walk instead of teleporting home.
pub const DEFAULT_ALPHA: f64 = 0.5;
/// Default number of per-node fetch units in flight.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 10;

/// Caller-supplied parameters for one `suggest` call.
#[derive(Clone)]
pub struct SuggestConfig {
    /// Cap on returned suggestions.
    pub max_results: usize,
    /// Number of propagation rounds.
    pub iterations: usize,
    /// Damping factor in (0, 1).
    pub alpha: f64,
    /// Never consult reverse connections when true.
    pub forward_only: bool,
    /// Max per-node units in flight per iteration.
    pub concurrency_limit: usize,
    /// Outgoing adjacency. Required.
    pub forward_connections: Option<SharedFetcher>,
    /// Incoming adjacency. Required unless `forward_only`.
    pub reverse_connections: Option<SharedFetcher>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            iterations: DEFAULT_ITERATIONS,
            alpha: DEFAULT_ALPHA,
            forward_only: false,
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
            forward_connections: None,
            reverse_connections: None,
        }
    }
}

impl fmt::Debug for SuggestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestConfig")
            .field("max_results", &self.max_results)
            .field("iterations", &self.iterations)
            .field("alpha", &self.alpha)
            .field("forward_only", &self.forward_only)
            .field("concurrency_limit", &self.concurrency_limit)
            .field("forward_connections", &self.forward_connections.is_some())
            .field("reverse_connections", &self.reverse_connections.is_some())
            .finish()
    }
}

impl SuggestConfig {
    /// Forward-only config over a single fetcher.
    #[must_use]
    pub fn forward_only(forward: SharedFetcher) -> Self {
        Self {
            forward_only: true,
            forward_connections: Some(forward),
            ..Self::default()
        }
    }

    /// Bidirectional config over both fetchers.
    #[must_use]
    pub fn bidirectional(forward: SharedFetcher, reverse: SharedFetcher) -> Self {
        Self {
            forward_connections: Some(forward),
            reverse_connections: Some(reverse),
            ..Self::default()
        }
    }

    /// Walk mode implied by `forward_only`.
    #[must_use]
    pub fn mode(&self) -> WalkMode {
        WalkMode::from_forward_only(self.forward_only)
    }

    pub(crate) fn resolve(self) -> Result<ResolvedConfig, SuggestError> {
        let forward = self
            .forward_connections
            .ok_or(SuggestError::MissingForwardConnections)?;
        let reverse = if self.forward_only {
            None
        } else {
            Some(
                self.reverse_connections
                    .ok_or(SuggestError::MissingReverseConnections)?,
            )
        };
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(SuggestError::InvalidAlpha(self.alpha));
        }
        if self.concurrency_limit == 0 {
            return Err(SuggestError::InvalidConcurrencyLimit);
        }
        Ok(ResolvedConfig {
            max_results: self.max_results,
            iterations: self.iterations,
            alpha: self.alpha,
            concurrency_limit: self.concurrency_limit,
            fetchers: Fetchers { forward, reverse },
        })
    }
}

/// Fetchers after validation. `reverse` is present exactly in bidirectional mode.
#[derive(Clone)]
pub(crate) struct Fetchers {
    pub(crate) forward: SharedFetcher,
    pub(crate) reverse: Option<SharedFetcher>,
}

impl Fetchers {
    pub(crate) fn mode(&self) -> WalkMode {
        if self.reverse.is_some() {
            WalkMode::Bidirectional
        } else {
            WalkMode::ForwardOnly
        }
    }
}

/// Validated, immutable parameters for one call.
#[derive(Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) max_results: usize,
    pub(crate) iterations: usize,
    pub(crate) alpha: f64,
    pub(crate) concurrency_limit: usize,
    pub(crate) fetchers: Fetchers,
}
