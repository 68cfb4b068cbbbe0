use crate::event::EventRecord;
use crate::processor::BatchEventProcessor;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use uuid::Uuid;

/// Shared state for the ingest API
pub struct IngestState {
    pub processor: BatchEventProcessor,
}

pub fn router(state: Arc<IngestState>) -> Router {
    Router::new()
        .route("/events", post(ingest_batch))
        .route("/healthz", get(health))
        .with_state(state)
}

/// Start the ingest HTTP server
pub async fn start_server(
    listen_addr: SocketAddr,
    state: Arc<IngestState>,
) -> Result<(), std::io::Error> {
    let app = router(state);

    info!(addr = %listen_addr, "Starting ingest HTTP server");

    let listener = TcpListener::bind(listen_addr).await?;
    axum::serve(listener, app).await
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BatchFailureResponse {
    pub attempted: usize,
    pub failures: Vec<RecordFailureInfo>,
}

#[derive(Debug, Serialize)]
pub struct RecordFailureInfo {
    pub index: usize,
    pub reason: String,
}

/// GET /healthz
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// POST /events
///
/// One delivery of a batch. A clean batch answers 204; any captured failure
/// answers 500 with every reason, so the deliverer's redelivery policy can
/// act on it.
pub async fn ingest_batch(
    State(state): State<Arc<IngestState>>,
    Json(batch): Json<Vec<EventRecord>>,
) -> Response {
    let batch_id = Uuid::new_v4();
    info!(batch_id = %batch_id, size = batch.len(), "Received event batch");

    match state.processor.process_batch(&batch).await {
        Ok(stats) => {
            info!(
                batch_id = %batch_id,
                records = stats.records_attempted,
                sent = stats.notifications_sent,
                "Batch processed"
            );
            StatusCode::NO_CONTENT.into_response()
        }
        Err(batch_error) => {
            let failures: Vec<RecordFailureInfo> = batch_error
                .failures()
                .iter()
                .map(|f| RecordFailureInfo {
                    index: f.index,
                    reason: f.reason.to_string(),
                })
                .collect();

            error!(
                batch_id = %batch_id,
                failed = failures.len(),
                "Batch completed with failures"
            );

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(BatchFailureResponse {
                    attempted: batch.len(),
                    failures,
                }),
            )
                .into_response()
        }
    }
}
