//! Synthesizer Port - TTS 推理后端抽象
//!
//! 外部神经合成引擎的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::model::ModelSpec;

/// 合成后端错误
#[derive(Debug, Error)]
pub enum SynthesizerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model load failed: {0}")]
    LoadFailed(String),
}

/// 音色选择（由模型能力决定）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceSelection {
    /// 后端自行决定
    None,
    /// 具名说话人
    Named(String),
    /// 参考音频（音色克隆）
    Reference(PathBuf),
}

/// 单块合成请求
#[derive(Debug, Clone)]
pub struct ChunkRequest {
    pub text: String,
    /// 仅当模型 requires_language 时为 Some
    pub language: Option<String>,
    pub voice: VoiceSelection,
}

/// 原始音频（WAV 容器）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAudio(pub Vec<u8>);

impl RawAudio {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Synthesizer Port
///
/// 一个实例对应一个已加载的模型
#[async_trait]
pub trait SynthesizerPort: Send + Sync {
    /// 合成单个文本块
    async fn synthesize_chunk(&self, request: ChunkRequest) -> Result<RawAudio, SynthesizerError>;

    /// 后端内置的具名说话人
    async fn speakers(&self) -> Vec<String> {
        Vec::new()
    }

    /// 释放模型资源
    async fn shutdown(&self) {}
}

/// 按模型配置构造后端实例
#[async_trait]
pub trait SynthesizerFactory: Send + Sync {
    async fn create(
        &self,
        model: &ModelSpec,
        use_gpu: bool,
    ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError>;
}
