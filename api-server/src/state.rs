use core_service::CoreService;
use std::sync::Arc;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub core: Arc<CoreService>,
}

impl AppState {
    pub fn new(core: Arc<CoreService>) -> Self {
        Self { core }
    }
}
