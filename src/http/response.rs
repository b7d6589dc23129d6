//! Response mapping for health results.
//!
//! # Design Decisions
//! - A report's status code comes from its health status (200/200/503)
//! - Runtimes without log sinks answer 501 with an explicit "unavailable" body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::health::HealthResponse;

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        match self {
            HealthResponse::Report(report) => {
                let status = StatusCode::from_u16(report.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(report)).into_response()
            }
            HealthResponse::NotApplicable { runtime } => (
                StatusCode::NOT_IMPLEMENTED,
                Json(serde_json::json!({
                    "status": "unavailable",
                    "runtime": runtime,
                    "reason": "health checks need log sinks, which only the server runtime has",
                })),
            )
                .into_response(),
        }
    }
}
