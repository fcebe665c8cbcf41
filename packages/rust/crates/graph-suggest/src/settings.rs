//! Numeric settings loadable from TOML and `GRAPH_SUGGEST_*` environment variables.
//!
//! Fetchers are never part of settings; they are attached programmatically.
//! Precedence when layering: explicit overlay > environment > file > defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SuggestConfig;
use crate::error::SettingsError;

pub(crate) const ENV_MAX_RESULTS: &str = "GRAPH_SUGGEST_MAX_RESULTS";
pub(crate) const ENV_ITERATIONS: &str = "GRAPH_SUGGEST_ITERATIONS";
pub(crate) const ENV_ALPHA: &str = "GRAPH_SUGGEST_ALPHA";
pub(crate) const ENV_FORWARD_ONLY: &str = "GRAPH_SUGGEST_FORWARD_ONLY";
pub(crate) const ENV_CONCURRENCY_LIMIT: &str = "GRAPH_SUGGEST_CONCURRENCY_LIMIT";

/// Optional overrides for the numeric fields of [`SuggestConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestSettings {
    /// Cap on returned suggestions.
    pub max_results: Option<usize>,
    /// Number of propagation rounds.
    pub iterations: Option<usize>,
    /// Damping factor.
    pub alpha: Option<f64>,
    /// Skip reverse connections.
    pub forward_only: Option<bool>,
    /// Max per-node units in flight.
    pub concurrency_limit: Option<usize>,
}

impl SuggestSettings {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Read`] when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `GRAPH_SUGGEST_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Unparseable values are
    /// skipped with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = parse_env(&lookup, ENV_MAX_RESULTS) {
            self.max_results = Some(value);
        }
        if let Some(value) = parse_env(&lookup, ENV_ITERATIONS) {
            self.iterations = Some(value);
        }
        if let Some(value) = parse_env(&lookup, ENV_ALPHA) {
            self.alpha = Some(value);
        }
        if let Some(value) = lookup(ENV_FORWARD_ONLY).and_then(|raw| parse_bool(&raw)) {
            self.forward_only = Some(value);
        }
        if let Some(value) = parse_env(&lookup, ENV_CONCURRENCY_LIMIT) {
            self.concurrency_limit = Some(value);
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn overlay(self, other: &Self) -> Self {
        Self {
            max_results: other.max_results.or(self.max_results),
            iterations: other.iterations.or(self.iterations),
            alpha: other.alpha.or(self.alpha),
            forward_only: other.forward_only.or(self.forward_only),
            concurrency_limit: other.concurrency_limit.or(self.concurrency_limit),
        }
    }

    /// Copy every set field into `config`.
    pub fn apply_to(&self, config: &mut SuggestConfig) {
        if let Some(value) = self.max_results {
            config.max_results = value;
        }
        if let Some(value) = self.iterations {
            config.iterations = value;
        }
        if let Some(value) = self.alpha {
            config.alpha = value;
        }
        if let Some(value) = self.forward_only {
            config.forward_only = value;
        }
        if let Some(value) = self.concurrency_limit {
            config.concurrency_limit = value;
        }
    }
}

fn parse_env<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(
                event = "graph_suggest.settings.env_ignored",
                key,
                value = trimmed,
                "ignoring unparseable environment override"
            );
            None
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        "" => None,
        other => {
            tracing::warn!(
                event = "graph_suggest.settings.env_ignored",
                key = ENV_FORWARD_ONLY,
                value = other,
                "ignoring unparseable environment override"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_partial_toml() -> Result<(), SettingsError> {
        let settings = SuggestSettings::from_toml_str("max_results = 5\nalpha = 0.7\n")?;
        assert_eq!(settings.max_results, Some(5));
        assert_eq!(settings.alpha, Some(0.7));
        assert_eq!(settings.iterations, None);
        Ok(())
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            SuggestSettings::from_toml_str("max_result = 5"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn env_overrides_skip_garbage() {
        let vars = HashMap::from([
            (ENV_ITERATIONS, "4"),
            (ENV_ALPHA, "not-a-number"),
            (ENV_FORWARD_ONLY, "yes"),
        ]);
        let mut settings = SuggestSettings {
            alpha: Some(0.3),
            ..SuggestSettings::default()
        };
        settings.apply_overrides_from(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(settings.iterations, Some(4));
        assert_eq!(settings.alpha, Some(0.3));
        assert_eq!(settings.forward_only, Some(true));
    }

    #[test]
    fn overlay_prefers_other_and_applies_to_config() {
        let file = SuggestSettings {
            max_results: Some(5),
            iterations: Some(2),
            ..SuggestSettings::default()
        };
        let flags = SuggestSettings {
            max_results: Some(3),
            ..SuggestSettings::default()
        };
        let merged = file.overlay(&flags);
        let mut config = SuggestConfig::default();
        merged.apply_to(&mut config);
        assert_eq!(config.max_results, 3);
        assert_eq!(config.iterations, 2);
        assert_eq!(config.concurrency_limit, 10);
    }
}
