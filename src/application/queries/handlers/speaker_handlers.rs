//! Speaker Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRegistryPort;
use crate::application::queries::ListSpeakers;
use crate::domain::speaker::VoiceReference;

/// ListSpeakers Handler
pub struct ListSpeakersHandler {
    registry: Arc<dyn SpeakerRegistryPort>,
}

impl ListSpeakersHandler {
    pub fn new(registry: Arc<dyn SpeakerRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, _query: ListSpeakers) -> Result<Vec<VoiceReference>, ApplicationError> {
        Ok(self.registry.list().await?)
    }
}
