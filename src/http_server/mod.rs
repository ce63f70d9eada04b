//! # Proforma HTTP Server Module
//!
//! # Endpoints
//!
//! - `GET /` - Banner
//! - `GET /health` - Health check
//! - `POST /api/proformas` - Store a document, respond with its storage key
//! - `GET /api/proformas` - Document summaries, newest first
//! - `GET /api/proformas/:id` - Latest version of a document

pub mod config;
pub mod server;
pub mod observability_routes;
pub mod proforma_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;
