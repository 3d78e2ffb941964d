use axum::{http::StatusCode, Json};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: u16,
    pub message: &'static str,
}

/// Liveness only; the database is not consulted.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse { status: StatusCode::OK.as_u16(), message: "OK" }))
}
