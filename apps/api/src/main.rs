//! Perimetra API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use perimetra_application::RightsService;
use perimetra_core::AppError;
use perimetra_infrastructure::{InMemoryPerimeterRepository, SeedDocument};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let seed = SeedDocument::from_path(&config.seed_path)
        .await?
        .into_parts()?;

    let rights_service = RightsService::new(
        Arc::new(InMemoryPerimeterRepository::new(seed.tree)),
        Arc::new(seed.grants),
        Arc::new(seed.catalog),
    );
    let app_state = AppState {
        rights_service,
        manageable_default_depth: config.manageable_default_depth,
    };

    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind {address}: {error}")))?;

    info!(%address, seed_path = %config.seed_path.display(), "perimetra-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
