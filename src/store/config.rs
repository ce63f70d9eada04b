//! Document store configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{StoreError, StoreResult};
use super::resolver::LatestOrdering;

/// Store configuration, passed to the repository at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding every document (default: "data/proformas")
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Per-call backing store timeout in milliseconds (default: 10000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum concurrent blob fetches while listing (default: 8)
    #[serde(default = "default_list_concurrency")]
    pub list_concurrency: usize,

    /// How the current version of a document is chosen (default: name)
    #[serde(default)]
    pub latest_ordering: LatestOrdering,
}

fn default_namespace() -> String {
    "data/proformas".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_list_concurrency() -> usize {
    8
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            timeout_ms: default_timeout_ms(),
            list_concurrency: default_list_concurrency(),
            latest_ordering: LatestOrdering::default(),
        }
    }
}

impl StoreConfig {
    /// Create a config with the given namespace
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Concurrency bound, never below one
    pub fn concurrency(&self) -> usize {
        self.list_concurrency.max(1)
    }

    pub fn validate(&self) -> StoreResult<()> {
        let namespace = self.namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(StoreError::Validation("namespace must not be empty".into()));
        }
        if namespace.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return Err(StoreError::Validation(format!(
                "invalid namespace: {}",
                self.namespace
            )));
        }
        if self.timeout_ms == 0 {
            return Err(StoreError::Validation("timeout_ms must be > 0".into()));
        }
        Ok(())
    }
}
