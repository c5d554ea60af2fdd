use carewatch_core::CheckinService;
use std::sync::Arc;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CheckinService>,
}

impl AppState {
    pub fn new(service: Arc<CheckinService>) -> Self {
        Self { service }
    }
}
