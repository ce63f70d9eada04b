//! HTTP Server Configuration
//!
//! Host, port, data directory, CORS and the nested store settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::store::StoreConfig;

/// Environment variables that override file settings
pub const ENV_PORT: &str = "PORT";
pub const ENV_DATA_DIR: &str = "PROFORMA_DATA_DIR";
pub const ENV_NAMESPACE: &str = "PROFORMA_NAMESPACE";
pub const ENV_TIMEOUT_MS: &str = "PROFORMA_TIMEOUT_MS";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Root of the local blob store (default: ".")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// CORS allowed origins (empty = any)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub store: StoreConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            cors_origins: Vec::new(),
            store: StoreConfig::default(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| format!("{} is not a valid port: {:?}", ENV_PORT, port))?;
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            self.store.namespace = namespace;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_MS) {
            self.store.timeout_ms = timeout
                .trim()
                .parse()
                .map_err(|_| format!("{} is not a number: {:?}", ENV_TIMEOUT_MS, timeout))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("port must be > 0".to_string());
        }
        self.store.validate().map_err(|e| e.to_string())
    }
}
