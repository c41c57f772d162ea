use std::sync::Arc;

use service::disease::DiseaseService;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct ServerState {
    pub diseases: Arc<DiseaseService>,
    /// Prefix of the alert header names, e.g. `amachouApp`.
    pub app_name: Arc<str>,
}

impl ServerState {
    pub fn new(diseases: Arc<DiseaseService>, app_name: &str) -> Self {
        Self { diseases, app_name: Arc::from(app_name) }
    }
}
