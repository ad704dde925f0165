use axum::Json;
use axum::extract::State;

use crate::dto::{HealthResponse, RoleResponse};
use crate::state::AppState;

pub mod rights;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn list_roles_handler(State(state): State<AppState>) -> Json<Vec<RoleResponse>> {
    Json(
        state
            .rights_service
            .roles()
            .iter()
            .map(RoleResponse::from)
            .collect(),
    )
}
