//! Synthesis Orchestrator - 多块合成编排
//!
//! 流程: 解析模型与参考音频 (plan) -> 计算缓存 key -> 分块 -> 逐块调用后端
//! -> 按序拼接编码 -> 写入缓存
//!
//! 缓存 key 按实际使用的音色计算：回退音色与覆盖前的旧样本都不会污染请求音色的 key。
//!
//! 中间产物只存在于每个请求独立的临时目录中，目录随 guard 释放，
//! 成功、失败、取消三种路径都不会遗留临时文件。

use futures_util::{stream, StreamExt, TryStreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

use crate::application::backend_registry::BackendRegistry;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactCachePort, AudioEncoderPort, ChunkRequest, RawAudio, SpeakerRegistryPort,
    SynthesizerPort, VoiceSelection,
};
use crate::application::voice_resolver::{resolve_reference, VoiceResolution};
use crate::domain::chunker;
use crate::domain::model::{ModelCatalog, ModelSpec};
use crate::domain::synthesis::{CacheKey, OutputFormat, SynthesisRequest};

/// 编排配置
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// 单块最大字符数
    pub max_chunk_chars: usize,
    /// 同一请求内并发的后端调用数
    pub chunk_concurrency: usize,
    /// 临时工作目录
    pub work_dir: PathBuf,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 250,
            chunk_concurrency: 1,
            work_dir: std::env::temp_dir(),
        }
    }
}

/// 合成结果
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// 缓存中的产物路径
    pub path: PathBuf,
    /// 实际使用的模型
    pub model_id: String,
    pub chunk_count: usize,
    pub duration_ms: u64,
    /// 是否使用了回退音色
    pub voice_fallback: bool,
}

/// 合成计划：模型与参考音频已解析，缓存 key 已确定
#[derive(Debug, Clone)]
pub struct SynthesisPlan {
    pub key: CacheKey,
    model: ModelSpec,
    reference: Option<VoiceResolution>,
}

impl SynthesisPlan {
    /// 是否使用了回退音色
    pub fn voice_fallback(&self) -> bool {
        self.reference.as_ref().is_some_and(|r| r.fallback)
    }

    pub fn model_id(&self) -> &str {
        &self.model.id
    }
}

pub struct SynthesisOrchestrator {
    config: OrchestratorConfig,
    catalog: Arc<ModelCatalog>,
    backends: Arc<BackendRegistry>,
    speakers: Arc<dyn SpeakerRegistryPort>,
    encoder: Arc<dyn AudioEncoderPort>,
    cache: Arc<dyn ArtifactCachePort>,
}

impl SynthesisOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        catalog: Arc<ModelCatalog>,
        backends: Arc<BackendRegistry>,
        speakers: Arc<dyn SpeakerRegistryPort>,
        encoder: Arc<dyn AudioEncoderPort>,
        cache: Arc<dyn ArtifactCachePort>,
    ) -> Self {
        Self {
            config,
            catalog,
            backends,
            speakers,
            encoder,
            cache,
        }
    }

    /// 检查编码器是否支持格式（在任何合成工作之前调用）
    pub fn ensure_supported(&self, format: OutputFormat) -> Result<(), ApplicationError> {
        if self.encoder.supports_format(format) {
            Ok(())
        } else {
            Err(ApplicationError::validation(format!(
                "Unsupported format: {}",
                format
            )))
        }
    }

    /// 解析模型与参考音频，计算缓存 key
    ///
    /// 不访问后端，缓存命中路径也会调用
    pub async fn plan(&self, request: &SynthesisRequest) -> Result<SynthesisPlan, ApplicationError> {
        self.ensure_supported(request.format())?;

        let (model, model_fallback) = self
            .catalog
            .resolve(request.model_id())
            .ok_or_else(|| ApplicationError::not_found("Model", request.model_id()))?;
        if model_fallback {
            tracing::warn!(
                requested = %request.model_id(),
                model_id = %model.id,
                "Unknown model, using default"
            );
        }

        let reference = if model.capabilities.supports_voice_cloning {
            Some(resolve_reference(self.speakers.as_ref(), request.speaker()).await?)
        } else {
            None
        };

        let voice = match &reference {
            Some(r) => Some(format!("{}@{}", r.speaker_id, r.revision)),
            None => request.speaker().map(|s| s.as_str().to_string()),
        };

        Ok(SynthesisPlan {
            key: CacheKey::for_request(request, voice.as_deref()),
            model: model.clone(),
            reference,
        })
    }

    /// 按计划合成并写入缓存
    ///
    /// 调用方负责先确认缓存未命中
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
        plan: &SynthesisPlan,
    ) -> Result<SynthesisOutcome, ApplicationError> {
        let format = request.format();
        let key = &plan.key;
        let model = &plan.model;

        let backend = self.backends.get(model).await.map_err(|e| {
            ApplicationError::internal(format!("Failed to load model {}: {}", model.id, e))
        })?;

        let voice = self.select_voice(plan, request, backend.as_ref()).await;
        let voice_fallback = plan.voice_fallback();
        let language = model
            .capabilities
            .requires_language
            .then(|| request.language().to_string());

        let chunks = chunker::split(request.text(), self.config.max_chunk_chars);
        let chunk_count = chunks.len();
        if chunk_count == 0 {
            return Err(ApplicationError::validation("Text is required"));
        }

        tracing::info!(
            cache_key = %key,
            model_id = %model.id,
            chunks = chunk_count,
            format = %format,
            "Synthesis started"
        );

        // 请求级临时目录，drop 时删除
        fs::create_dir_all(&self.config.work_dir)
            .await
            .map_err(|e| ApplicationError::StorageError(e.to_string()))?;
        let scratch = tempfile::Builder::new()
            .prefix("synth-")
            .tempdir_in(&self.config.work_dir)
            .map_err(|e| ApplicationError::StorageError(e.to_string()))?;

        // buffered 保证结果按块顺序产出；第一个错误即中止，其余 future 被丢弃
        let segments: Vec<RawAudio> = stream::iter(chunks)
            .map(|chunk| {
                let index = chunk.index;
                let backend = backend.clone();
                let request = ChunkRequest {
                    text: chunk.text,
                    language: language.clone(),
                    voice: voice.clone(),
                };
                async move {
                    let audio = backend.synthesize_chunk(request).await.map_err(|e| {
                        tracing::error!(chunk_index = index, error = %e, "Chunk synthesis failed");
                        ApplicationError::SynthesisError {
                            chunk_index: index,
                            message: e.to_string(),
                        }
                    })?;
                    tracing::debug!(chunk_index = index, size = audio.len(), "Chunk synthesized");
                    Ok::<_, ApplicationError>(audio)
                }
            })
            .buffered(self.config.chunk_concurrency.max(1))
            .try_collect()
            .await?;

        let encoded = self.encoder.encode(segments, format).await?;

        let artifact = scratch
            .path()
            .join(format!("{}.{}", key, format.extension()));
        fs::write(&artifact, &encoded.data)
            .await
            .map_err(|e| ApplicationError::StorageError(e.to_string()))?;

        let path = self.cache.put(key, &artifact).await?;

        if let Err(e) = scratch.close() {
            tracing::warn!(error = %e, "Failed to remove scratch directory");
        }

        tracing::info!(
            cache_key = %key,
            chunks = chunk_count,
            duration_ms = encoded.duration_ms,
            size = encoded.data.len(),
            "Synthesis completed"
        );

        Ok(SynthesisOutcome {
            path,
            model_id: model.id.clone(),
            chunk_count,
            duration_ms: encoded.duration_ms,
            voice_fallback,
        })
    }

    /// 按模型能力选择音色
    async fn select_voice(
        &self,
        plan: &SynthesisPlan,
        request: &SynthesisRequest,
        backend: &dyn SynthesizerPort,
    ) -> VoiceSelection {
        let model = &plan.model;

        if let Some(reference) = &plan.reference {
            tracing::debug!(speaker = %reference.speaker_id, "Using speaker sample");
            return VoiceSelection::Reference(reference.path.clone());
        }

        if model.capabilities.supports_named_speaker {
            let named = match request.speaker() {
                Some(id) => Some(id.to_string()),
                None => {
                    let default = match model.speakers.first() {
                        Some(name) => Some(name.clone()),
                        None => backend.speakers().await.into_iter().next(),
                    };
                    if let Some(name) = &default {
                        tracing::info!(speaker = %name, "Using default speaker");
                    }
                    default
                }
            };
            return named.map(VoiceSelection::Named).unwrap_or(VoiceSelection::None);
        }

        if let Some(id) = request.speaker() {
            tracing::debug!(speaker = %id, model_id = %model.id, "Model has no voice control, speaker ignored");
        }
        VoiceSelection::None
    }
}
