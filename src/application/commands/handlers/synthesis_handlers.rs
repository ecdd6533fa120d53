//! Synthesis Command Handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::commands::SynthesizeCommand;
use crate::application::error::ApplicationError;
use crate::application::inflight::InFlightTable;
use crate::application::orchestrator::SynthesisOrchestrator;
use crate::application::ports::ArtifactCachePort;
use crate::domain::synthesis::{CacheKey, OutputFormat, RequestLimits, SynthesisRequest};

/// 请求缺省值
#[derive(Debug, Clone)]
pub struct SynthesisDefaults {
    pub model_id: String,
    pub language: String,
    pub format: OutputFormat,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            model_id: crate::domain::model::DEFAULT_MODEL_ID.to_string(),
            language: "en".to_string(),
            format: OutputFormat::Wav,
        }
    }
}

// ============================================================================
// Synthesize
// ============================================================================

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeResponse {
    pub key: CacheKey,
    /// 缓存中的产物路径
    pub path: PathBuf,
    pub format: OutputFormat,
    pub cache_hit: bool,
    /// 本次实际合成的块数，命中缓存时为 0
    pub chunk_count: usize,
    pub voice_fallback: bool,
}

impl SynthesizeResponse {
    /// 下载文件名 `{key}.{ext}`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.key, self.format.extension())
    }

    fn hit(key: CacheKey, path: PathBuf, format: OutputFormat, voice_fallback: bool) -> Self {
        Self {
            key,
            path,
            format,
            cache_hit: true,
            chunk_count: 0,
            voice_fallback,
        }
    }
}

/// Synthesize Handler
///
/// 准入校验 -> 解析音色与 key -> 查缓存 -> 同 key 排队 -> 再查缓存 -> 编排合成
pub struct SynthesizeHandler {
    limits: RequestLimits,
    defaults: SynthesisDefaults,
    cache: Arc<dyn ArtifactCachePort>,
    inflight: Arc<InFlightTable>,
    orchestrator: Arc<SynthesisOrchestrator>,
}

impl SynthesizeHandler {
    pub fn new(
        limits: RequestLimits,
        defaults: SynthesisDefaults,
        cache: Arc<dyn ArtifactCachePort>,
        inflight: Arc<InFlightTable>,
        orchestrator: Arc<SynthesisOrchestrator>,
    ) -> Self {
        Self {
            limits,
            defaults,
            cache,
            inflight,
            orchestrator,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeCommand,
    ) -> Result<SynthesizeResponse, ApplicationError> {
        let model_id = non_blank(command.model_id).unwrap_or_else(|| self.defaults.model_id.clone());
        let language = non_blank(command.language).unwrap_or_else(|| self.defaults.language.clone());
        let format = non_blank(command.format)
            .unwrap_or_else(|| self.defaults.format.extension().to_string());

        let request = SynthesisRequest::new(
            &command.text,
            model_id,
            language,
            command.speaker.as_deref(),
            &format,
            &self.limits,
        )?;
        let plan = self.orchestrator.plan(&request).await?;
        let key = plan.key.clone();

        if self.cache.exists(&key).await {
            tracing::info!(cache_key = %key, "Cache hit");
            return Ok(SynthesizeResponse::hit(
                key.clone(),
                self.cache.path(&key),
                request.format(),
                plan.voice_fallback(),
            ));
        }

        let _guard = self.inflight.acquire(&key).await;

        // 排队期间可能已被同 key 的请求写入
        if self.cache.exists(&key).await {
            tracing::info!(cache_key = %key, "Cache filled by concurrent request");
            return Ok(SynthesizeResponse::hit(
                key.clone(),
                self.cache.path(&key),
                request.format(),
                plan.voice_fallback(),
            ));
        }

        tracing::info!(cache_key = %key, "Cache miss");
        let outcome = self.orchestrator.synthesize(&request, &plan).await?;

        Ok(SynthesizeResponse {
            key,
            path: outcome.path,
            format: request.format(),
            cache_hit: false,
            chunk_count: outcome.chunk_count,
            voice_fallback: outcome.voice_fallback,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
