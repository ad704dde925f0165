use perimetra_application::RightsService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rights_service: RightsService,
    pub manageable_default_depth: usize,
}
