//! Error types for suggestion computation.
//!
//! Library code returns [`SuggestError`]; fetchers report failures as
//! `anyhow::Error`, which is boxed into [`SuggestError::Fetch`].

use thiserror::Error;
use tokio::task::JoinError;

use crate::fetcher::FetchDirection;

/// Boxed fetcher failure carried by [`SuggestError::Fetch`].
pub type FetchSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure modes of a `suggest` call.
///
/// Configuration variants are raised synchronously by `Suggester::new`,
/// before any asynchronous work starts. The others abort the whole call;
/// partial results are never returned.
#[derive(Error, Debug)]
pub enum SuggestError {
    /// No forward connection fetcher was supplied.
    #[error("Missing required forward_connections fetcher")]
    MissingForwardConnections,

    /// Bidirectional mode was requested without a reverse fetcher.
    #[error("Missing required reverse_connections fetcher (set forward_only to skip it)")]
    MissingReverseConnections,

    /// Damping factor outside the open interval (0, 1).
    #[error("alpha must be within (0, 1), got {0}")]
    InvalidAlpha(f64),

    /// A zero-permit worker pool would never make progress.
    #[error("concurrency_limit must be greater than 0")]
    InvalidConcurrencyLimit,

    /// A neighbor fetch failed.
    #[error("{direction} connections fetch failed for node '{node_id}': {source}")]
    Fetch {
        /// Node whose neighbors were being fetched.
        node_id: String,
        /// Which adjacency was requested.
        direction: FetchDirection,
        /// Error reported by the fetcher.
        #[source]
        source: FetchSource,
    },

    /// A propagation worker panicked or was cancelled outside of an abort.
    #[error("propagation worker failed: {0}")]
    Worker(#[from] JoinError),
}

impl SuggestError {
    /// True for errors raised by config validation.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::MissingForwardConnections
                | Self::MissingReverseConnections
                | Self::InvalidAlpha(_)
                | Self::InvalidConcurrencyLimit
        )
    }

    pub(crate) fn fetch(
        node_id: &str,
        direction: FetchDirection,
        source: anyhow::Error,
    ) -> Self {
        Self::Fetch {
            node_id: node_id.to_string(),
            direction,
            source: source.into(),
        }
    }
}

/// Failure loading [`crate::SuggestSettings`] from disk.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        /// File that was requested.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for the settings schema.
    #[error("invalid settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}
