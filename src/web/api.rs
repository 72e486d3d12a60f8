use crate::ingest::{accumulate, IngestError};
use crate::storage::{Storage, StorageError};
use axum::{
    body::Body,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tracing::{error, info};
use uuid::Uuid;

/// Shared state for the HTTP handlers
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

/// What the sender gets back once its batch is stored
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub id: Uuid,
    pub entries: usize,
    pub expected_schema: bool,
}

#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    /// Present (with any value) to get a placeholder answer instead of stored data
    #[serde(rename = "dummyRequest", default)]
    pub dummy_request: Option<String>,
    #[serde(default = "default_source_limit")]
    pub limit: usize,
}

fn default_source_limit() -> usize {
    100
}

const MAX_SOURCE_LIMIT: usize = 1000;

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// POST /api/logs
///
/// The body is consumed as a stream, one line at a time. A body that fails
/// mid-stream is answered with 500 and nothing is stored.
pub async fn ingest_logs(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Json<BatchReceipt>, ApiError> {
    let stream = body.into_data_stream().map_err(std::io::Error::other);

    let batch = accumulate(StreamReader::new(stream)).await?;
    state.storage.write_batch(&batch).await?;

    info!(batch_id = %batch.id, entries = batch.entries.len(), "Batch stored");

    Ok(Json(BatchReceipt {
        id: batch.id,
        entries: batch.entries.len(),
        expected_schema: batch.expected_schema,
    }))
}

/// GET /api/source?limit=N
///
/// Messages of the newest N batches, newest batch first, entries in the
/// order they were received. Structured entries contribute their full message.
pub async fn get_source(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    if query.dummy_request.is_some() {
        return Ok(Json(vec![format!("HttpSource_value:{}", Uuid::new_v4())]));
    }

    let limit = query.limit.clamp(1, MAX_SOURCE_LIMIT);
    let batches = state.storage.list_batches(limit, 0).await?;

    let messages = batches
        .iter()
        .flat_map(|batch| batch.entries.iter().map(|e| e.message().to_string()))
        .collect();

    Ok(Json(messages))
}

#[derive(Debug)]
pub enum ApiError {
    InternalError(String),
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        error!(error = %e, "Request body could not be read, batch discarded");
        ApiError::InternalError(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        error!(error = %e, "Storage operation failed");
        ApiError::InternalError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
