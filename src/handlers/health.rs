use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{appstate::AppState, middleware::request_tracing::RequestTraceData};

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

pub async fn health(
    State(app_state): State<Arc<AppState>>,
    Extension(request_trace_data): Extension<RequestTraceData>,
) -> (StatusCode, Json<HealthResponse>) {
    info!("[{}] health", request_trace_data.get_id());

    match app_state.get_db().ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: String::from("ok"),
                database: String::from("connected"),
            }),
        ),
        Err(e) => {
            error!("[{}] health check failed: {}", request_trace_data.get_id(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: String::from("error"),
                    database: String::from("disconnected"),
                }),
            )
        }
    }
}
