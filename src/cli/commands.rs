//! CLI command implementations
//!
//! Configuration is resolved once here (file, then environment, then
//! flags) and handed down as explicit values.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tokio::runtime::Runtime;

use crate::http_server::proforma_routes::SharedRepository;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{log_event, log_event_with_fields, Event};
use crate::store::{BlobStore, Document, DocumentRepository, LocalBackend};

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_document, write_json};

/// Load configuration from an optional JSON file plus process environment
pub fn load_config(path: Option<&Path>) -> CliResult<HttpServerConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> CliResult<HttpServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;
            serde_json::from_str(&content)
                .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?
        }
        None => HttpServerConfig::default(),
    };

    config.apply_overrides(lookup).map_err(CliError::config_error)?;
    config.validate().map_err(CliError::config_error)?;

    Ok(config)
}

fn open_repository(config: &HttpServerConfig) -> SharedRepository {
    let backend: Arc<dyn BlobStore> = Arc::new(LocalBackend::new(config.data_dir.clone()));
    DocumentRepository::new(backend, config.store.clone())
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

/// Parse arguments and run
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Create { config, file } => create(config.as_deref(), &file),
        Command::List { config } => list(config.as_deref()),
        Command::Get { config, id } => get(config.as_deref(), &id),
    }
}

/// Start the HTTP server
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    log_event(Event::ServerStart);

    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("port", &config.port.to_string()),
            ("namespace", &config.store.namespace),
        ],
    );

    let server = HttpServer::with_config(config);

    runtime()?.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Store one document and print its storage key
pub fn create(config_path: Option<&Path>, file: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let doc = Document::from_value(read_document(file)?)?;
    let repository = open_repository(&config);

    let key = runtime()?.block_on(repository.create(doc))?;
    write_json(&json!({
        "success": true,
        "key": key.file_name(),
        "version": key.version,
    }))
}

/// Print every document summary, newest first
pub fn list(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    let repository = open_repository(&config);

    let summaries = runtime()?.block_on(repository.list())?;
    write_json(&summaries)
}

/// Print the latest version of one document
pub fn get(config_path: Option<&Path>, id: &str) -> CliResult<()> {
    let config = load_config(config_path)?;
    let repository = open_repository(&config);

    let doc = runtime()?.block_on(repository.get_latest(id))?;
    write_json(&doc)
}
