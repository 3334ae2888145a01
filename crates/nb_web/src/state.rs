use std::sync::Arc;

use nb_fetch::BriefingManager;

#[derive(Debug, Clone)]
pub struct AppState {
    pub manager: Arc<BriefingManager>,
}

impl AppState {
    pub fn new(manager: BriefingManager) -> Self {
        Self { manager: Arc::new(manager) }
    }
}
