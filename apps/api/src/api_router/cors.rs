use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use perimetra_core::AppError;
use tower_http::cors::CorsLayer;

pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}
