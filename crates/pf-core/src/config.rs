//! Engine configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Tunables for the orchestrator and the suggestion aggregator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Shortest generated text accepted from the generation service
    pub min_viable_length: usize,
    /// Bound on each generation call
    pub attempt_timeout: Duration,
    /// Bound on the advisory call
    pub advisory_timeout: Duration,
    /// Keywords must be longer than this before the advisory service is asked
    pub advisory_min_keywords: usize,
    pub max_suggestions: usize,
    /// Opaque model id forwarded to the generation service
    pub model_id: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_viable_length: 20,
            attempt_timeout: Duration::from_secs(30),
            advisory_timeout: Duration::from_secs(8),
            advisory_min_keywords: 10,
            max_suggestions: 6,
            model_id: None,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Ok(Self {
            min_viable_length: parse_var("PF_MIN_VIABLE_LENGTH")?
                .unwrap_or(defaults.min_viable_length),
            attempt_timeout: parse_var("PF_ATTEMPT_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.attempt_timeout),
            advisory_timeout: parse_var("PF_ADVISORY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.advisory_timeout),
            advisory_min_keywords: parse_var("PF_ADVISORY_MIN_KEYWORDS")?
                .unwrap_or(defaults.advisory_min_keywords),
            max_suggestions: parse_var("PF_MAX_SUGGESTIONS")?.unwrap_or(defaults.max_suggestions),
            model_id: env::var("PF_MODEL").ok().filter(|m| !m.trim().is_empty()),
        })
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Configuration(format!("{} has an invalid value: '{}'", name, raw)))
}
