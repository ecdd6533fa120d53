//! Speaker Command Handlers

use std::sync::Arc;

use crate::application::commands::{CreateSpeaker, DeleteSpeaker};
use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRegistryPort;
use crate::domain::speaker::VoiceReference;

// ============================================================================
// CreateSpeaker
// ============================================================================

/// CreateSpeaker Handler
pub struct CreateSpeakerHandler {
    registry: Arc<dyn SpeakerRegistryPort>,
}

impl CreateSpeakerHandler {
    pub fn new(registry: Arc<dyn SpeakerRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, command: CreateSpeaker) -> Result<VoiceReference, ApplicationError> {
        let size = command.audio.len();
        let speaker = self.registry.create(&command.id, &command.audio).await?;

        tracing::info!(speaker = %speaker.id, size, "Speaker created");

        Ok(speaker)
    }
}

// ============================================================================
// DeleteSpeaker
// ============================================================================

/// DeleteSpeaker Handler
///
/// 删除不存在的自定义音色不算错误
pub struct DeleteSpeakerHandler {
    registry: Arc<dyn SpeakerRegistryPort>,
}

impl DeleteSpeakerHandler {
    pub fn new(registry: Arc<dyn SpeakerRegistryPort>) -> Self {
        Self { registry }
    }

    pub async fn handle(&self, command: DeleteSpeaker) -> Result<bool, ApplicationError> {
        let existed = self.registry.delete(&command.id).await?;

        if existed {
            tracing::info!(speaker = %command.id, "Speaker deleted");
        } else {
            tracing::debug!(speaker = %command.id, "Speaker delete requested but no file existed");
        }

        Ok(existed)
    }
}
