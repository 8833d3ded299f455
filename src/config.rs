use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::apis::{self, PaperSource, SourceError};

/// Source keys in the order they are queried and printed.
pub const SOURCE_ORDER: [&str; 2] = ["arxiv", "biorxiv"];

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} is not a whole number of seconds")]
    Timeout { var: &'static str, value: String },
    #[error("unknown source {0:?} (expected one of: arxiv, biorxiv)")]
    UnknownSource(String),
}

/// Runtime configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub arxiv_url: String,
    pub biorxiv_url: String,
    pub timeout: Duration,
    pub enabled_source_names: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arxiv_url: apis::arxiv::DEFAULT_BASE_URL.to_string(),
            biorxiv_url: apis::biorxiv::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            enabled_source_names: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("PREPRINT_DIGEST_ARXIV_URL") {
            config.arxiv_url = url;
        }
        if let Some(url) = lookup("PREPRINT_DIGEST_BIORXIV_URL") {
            config.biorxiv_url = url;
        }
        if let Some(raw) = lookup("PREPRINT_DIGEST_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Timeout {
                var: "PREPRINT_DIGEST_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(list) = lookup("PREPRINT_DIGEST_SOURCES") {
            let names = list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            config.set_sources(names)?;
        }

        Ok(config)
    }

    /// Restrict the run to `names`. An empty list enables every source.
    pub fn set_sources(&mut self, names: Vec<String>) -> Result<(), ConfigError> {
        if let Some(unknown) = names.iter().find(|n| !SOURCE_ORDER.contains(&n.as_str())) {
            return Err(ConfigError::UnknownSource(unknown.clone()));
        }
        self.enabled_source_names = names;
        Ok(())
    }

    fn should_enable(&self, name: &str) -> bool {
        self.enabled_source_names.is_empty()
            || self.enabled_source_names.iter().any(|n| n == name)
    }

    /// Build the enabled sources, always arXiv before bioRxiv.
    pub fn build_sources(&self) -> Result<Vec<Arc<dyn PaperSource>>, SourceError> {
        let mut sources: Vec<Arc<dyn PaperSource>> = Vec::new();
        if self.should_enable("arxiv") {
            sources.push(Arc::new(apis::arxiv::ArxivClient::new(
                self.arxiv_url.clone(),
                self.timeout,
            )?));
        }
        if self.should_enable("biorxiv") {
            sources.push(Arc::new(apis::biorxiv::BiorxivClient::new(
                self.biorxiv_url.clone(),
                self.timeout,
            )?));
        }
        Ok(sources)
    }
}
