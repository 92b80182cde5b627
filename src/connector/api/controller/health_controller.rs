use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::connector::api::Container;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    provider_configured: bool,
}

pub async fn health(State(container): State<Arc<Container>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        provider_configured: container.provider_configured(),
    })
}
