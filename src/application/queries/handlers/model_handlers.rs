//! Model Query Handlers

use std::sync::Arc;

use crate::application::backend_registry::BackendRegistry;
use crate::application::error::ApplicationError;
use crate::application::ports::SpeakerRegistryPort;
use crate::application::queries::{ListModelSpeakers, ListModels};
use crate::domain::model::{ModelCatalog, ModelSpec};

// ============================================================================
// ListModels
// ============================================================================

/// ListModels Handler
pub struct ListModelsHandler {
    catalog: Arc<ModelCatalog>,
}

impl ListModelsHandler {
    pub fn new(catalog: Arc<ModelCatalog>) -> Self {
        Self { catalog }
    }

    pub async fn handle(&self, _query: ListModels) -> Result<Vec<ModelSpec>, ApplicationError> {
        Ok(self.catalog.models().to_vec())
    }
}

// ============================================================================
// ListModelSpeakers
// ============================================================================

/// ListModelSpeakers Handler
///
/// 查询失败时记录日志并返回空列表
pub struct ListModelSpeakersHandler {
    catalog: Arc<ModelCatalog>,
    backends: Arc<BackendRegistry>,
    registry: Arc<dyn SpeakerRegistryPort>,
}

impl ListModelSpeakersHandler {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        backends: Arc<BackendRegistry>,
        registry: Arc<dyn SpeakerRegistryPort>,
    ) -> Self {
        Self {
            catalog,
            backends,
            registry,
        }
    }

    pub async fn handle(&self, query: ListModelSpeakers) -> Result<Vec<String>, ApplicationError> {
        let Some((model, _)) = self.catalog.resolve(&query.model_id) else {
            return Ok(Vec::new());
        };

        let caps = model.capabilities;
        if caps.supports_voice_cloning {
            return match self.registry.list().await {
                Ok(speakers) => Ok(speakers
                    .into_iter()
                    .map(|s| s.id.as_str().to_string())
                    .collect()),
                Err(e) => {
                    tracing::warn!(model_id = %model.id, error = %e, "Failed to list speakers");
                    Ok(Vec::new())
                }
            };
        }

        if caps.supports_named_speaker {
            if !model.speakers.is_empty() {
                return Ok(model.speakers.clone());
            }
            return match self.backends.get(model).await {
                Ok(backend) => Ok(backend.speakers().await),
                Err(e) => {
                    tracing::warn!(model_id = %model.id, error = %e, "Failed to load model for speaker list");
                    Ok(Vec::new())
                }
            };
        }

        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ChunkRequest, RawAudio, SynthesizerError, SynthesizerFactory, SynthesizerPort,
    };
    use crate::domain::model::Capabilities;
    use crate::infrastructure::adapters::FileSpeakerRegistry;
    use async_trait::async_trait;

    struct FailingFactory;

    #[async_trait]
    impl SynthesizerFactory for FailingFactory {
        async fn create(
            &self,
            _model: &ModelSpec,
            _use_gpu: bool,
        ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
            Err(SynthesizerError::LoadFailed("offline".to_string()))
        }
    }

    struct ListingBackend;

    #[async_trait]
    impl SynthesizerPort for ListingBackend {
        async fn synthesize_chunk(&self, _request: ChunkRequest) -> Result<RawAudio, SynthesizerError> {
            Ok(RawAudio(Vec::new()))
        }

        async fn speakers(&self) -> Vec<String> {
            vec!["p300".to_string()]
        }
    }

    struct ListingFactory;

    #[async_trait]
    impl SynthesizerFactory for ListingFactory {
        async fn create(
            &self,
            _model: &ModelSpec,
            _use_gpu: bool,
        ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
            Ok(Arc::new(ListingBackend))
        }
    }

    fn named_model() -> ModelSpec {
        ModelSpec {
            id: "vctk".to_string(),
            backend_name: "tts_models/en/vctk/vits".to_string(),
            label: "VITS".to_string(),
            languages: vec!["en".to_string()],
            capabilities: Capabilities {
                supports_named_speaker: true,
                ..Default::default()
            },
            speakers: Vec::new(),
        }
    }

    async fn handler(
        factory: Arc<dyn SynthesizerFactory>,
    ) -> (tempfile::TempDir, ListModelSpeakersHandler) {
        let dir = tempfile::tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();
        registry.create("client-42", b"RIFF").await.unwrap();

        let mut models = ModelCatalog::builtin().models().to_vec();
        models.push(named_model());
        let handler = ListModelSpeakersHandler::new(
            Arc::new(ModelCatalog::new(models, "xtts-v2")),
            Arc::new(BackendRegistry::new(factory, false)),
            Arc::new(registry),
        );
        (dir, handler)
    }

    fn query(model_id: &str) -> ListModelSpeakers {
        ListModelSpeakers {
            model_id: model_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_cloning_model_lists_registry() {
        let (_dir, handler) = handler(Arc::new(ListingFactory)).await;

        let speakers = handler.handle(query("xtts-v2")).await.unwrap();
        assert_eq!(
            speakers,
            vec!["female-1", "male-1", "female-2", "male-2", "client-42"]
        );
    }

    #[tokio::test]
    async fn test_single_speaker_model_is_empty() {
        let (_dir, handler) = handler(Arc::new(ListingFactory)).await;
        assert!(handler.handle(query("tacotron-en")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_named_model_asks_backend() {
        let (_dir, handler) = handler(Arc::new(ListingFactory)).await;
        assert_eq!(handler.handle(query("vctk")).await.unwrap(), vec!["p300"]);
    }

    #[tokio::test]
    async fn test_backend_failure_yields_empty_list() {
        let (_dir, handler) = handler(Arc::new(FailingFactory)).await;
        assert!(handler.handle(query("vctk")).await.unwrap().is_empty());
    }
}
