//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    CreateSpeakerHandler, DeleteSpeakerHandler, SynthesisDefaults, SynthesizeHandler,
    // Query handlers
    GetArtifactHandler, ListModelSpeakersHandler, ListModelsHandler, ListSpeakersHandler,
    // Core
    ArtifactCachePort, BackendRegistry, InFlightTable, SpeakerRegistryPort, SynthesisOrchestrator,
};
use crate::domain::model::ModelCatalog;
use crate::domain::synthesis::RequestLimits;

/// AppState 的依赖
pub struct AppComponents {
    pub catalog: Arc<ModelCatalog>,
    pub backends: Arc<BackendRegistry>,
    pub speakers: Arc<dyn SpeakerRegistryPort>,
    pub cache: Arc<dyn ArtifactCachePort>,
    pub orchestrator: Arc<SynthesisOrchestrator>,
    pub limits: RequestLimits,
    pub defaults: SynthesisDefaults,
}

/// 应用状态
pub struct AppState {
    // ========== Ports ==========
    pub backends: Arc<BackendRegistry>,

    // ========== Command Handlers ==========
    pub synthesize_handler: SynthesizeHandler,
    pub create_speaker_handler: CreateSpeakerHandler,
    pub delete_speaker_handler: DeleteSpeakerHandler,

    // ========== Query Handlers ==========
    pub list_models_handler: ListModelsHandler,
    pub list_model_speakers_handler: ListModelSpeakersHandler,
    pub list_speakers_handler: ListSpeakersHandler,
    pub get_artifact_handler: GetArtifactHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(components: AppComponents) -> Self {
        let AppComponents {
            catalog,
            backends,
            speakers,
            cache,
            orchestrator,
            limits,
            defaults,
        } = components;

        Self {
            backends: backends.clone(),

            synthesize_handler: SynthesizeHandler::new(
                limits,
                defaults,
                cache.clone(),
                Arc::new(InFlightTable::new()),
                orchestrator,
            ),
            create_speaker_handler: CreateSpeakerHandler::new(speakers.clone()),
            delete_speaker_handler: DeleteSpeakerHandler::new(speakers.clone()),

            list_models_handler: ListModelsHandler::new(catalog.clone()),
            list_model_speakers_handler: ListModelSpeakersHandler::new(
                catalog,
                backends,
                speakers.clone(),
            ),
            list_speakers_handler: ListSpeakersHandler::new(speakers),
            get_artifact_handler: GetArtifactHandler::new(cache),
        }
    }
}
