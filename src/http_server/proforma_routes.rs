//! Proforma HTTP Routes
//!
//! Create, list and get-latest over the document repository.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};
use crate::store::{BlobStore, Document, DocumentRepository, DocumentSummary, StoreError};

/// Repository over a type-erased backend
pub type SharedRepository = DocumentRepository<Arc<dyn BlobStore>>;

// ==================
// Shared State
// ==================

/// State shared across handlers
pub struct ProformaState {
    pub repository: SharedRepository,
}

impl ProformaState {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    pub key: String,
    pub version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub proformas: Vec<DocumentSummary>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: u16,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: StoreError) -> ApiError {
    let code = e.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        log_event_with_fields(Event::RequestFailed, &[("error", &e.to_string())]);
    }

    (
        status,
        Json(ErrorResponse {
            success: false,
            error: e.to_string(),
            code,
        }),
    )
}

// ==================
// Proforma Routes
// ==================

/// Create proforma routes
pub fn proforma_routes(state: Arc<ProformaState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/:id", get(get_latest_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn create_handler(
    State(state): State<Arc<ProformaState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateResponse>), ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| api_error(StoreError::Validation(format!("invalid JSON body: {}", e))))?;
    let doc = Document::from_value(value).map_err(api_error)?;

    let key = state.repository.create(doc).await.map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateResponse {
            success: true,
            key: key.file_name(),
            version: key.version,
        }),
    ))
}

async fn list_handler(
    State(state): State<Arc<ProformaState>>,
) -> Result<Json<ListResponse>, ApiError> {
    let proformas = state.repository.list().await.map_err(api_error)?;

    Ok(Json(ListResponse {
        total: proformas.len(),
        proformas,
    }))
}

async fn get_latest_handler(
    State(state): State<Arc<ProformaState>>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let doc = state.repository.get_latest(&id).await.map_err(api_error)?;
    Ok(Json(doc))
}
