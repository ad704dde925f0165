use axum::Router;
use axum::routing::get;
use perimetra_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let rights_routes = Router::new()
        .route("/api/roles", get(handlers::list_roles_handler))
        .route(
            "/api/users/{user_id}/data-rights",
            get(handlers::rights::data_rights_handler),
        )
        .route(
            "/api/users/{user_id}/manageable-perimeters",
            get(handlers::rights::manageable_perimeters_handler),
        );

    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health_handler))
        .merge(rights_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}
