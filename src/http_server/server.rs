//! # HTTP Server
//!
//! Combines the liveness and proforma routers behind a CORS layer.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::{log_event_with_fields, Event};
use crate::store::{BlobStore, DocumentRepository, LocalBackend};

use super::config::HttpServerConfig;
use super::observability_routes::health_routes;
use super::proforma_routes::{proforma_routes, ProformaState, SharedRepository};

/// HTTP server for the proforma store
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Serve documents from the local filesystem under `config.data_dir`
    pub fn with_config(config: HttpServerConfig) -> Self {
        let backend: Arc<dyn BlobStore> = Arc::new(LocalBackend::new(config.data_dir.clone()));
        let repository = DocumentRepository::new(backend, config.store.clone());
        Self::with_repository(config, repository)
    }

    /// Serve documents from an already built repository
    pub fn with_repository(config: HttpServerConfig, repository: SharedRepository) -> Self {
        let state = Arc::new(ProformaState::new(repository));
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, state: Arc<ProformaState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest("/api/proformas", proforma_routes(state))
            .layer(ServiceBuilder::new().layer(cors))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(
            Event::Serving,
            &[
                ("addr", &addr.to_string()),
                ("data_dir", &self.config.data_dir.display().to_string()),
                ("namespace", &self.config.store.namespace),
            ],
        );

        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_config(config);
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds() {
        let mut config = HttpServerConfig::default();
        config.cors_origins = vec!["http://localhost:5173".to_string()];
        let _router = HttpServer::with_config(config).router();
    }
}
