//! Speaker Registry Port - 音色参考音频管理

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::speaker::{SpeakerId, SpeakerIdError, VoiceReference};

/// 音色存储错误
#[derive(Debug, Error)]
pub enum SpeakerStoreError {
    #[error("Invalid speaker id: {0}")]
    InvalidId(#[from] SpeakerIdError),

    #[error("Built-in speaker cannot be modified: {0}")]
    BuiltinProtected(String),

    #[error("Speaker audio is empty")]
    EmptyAudio,

    #[error("Speaker not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 参考音频文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerSample {
    pub path: PathBuf,
    /// 文件被覆盖后随之改变（大小 + 修改时间）
    pub revision: String,
}

/// Speaker Registry Port
#[async_trait]
pub trait SpeakerRegistryPort: Send + Sync {
    /// 内置音色在前，自定义音色按 id 排序在后
    async fn list(&self) -> Result<Vec<VoiceReference>, SpeakerStoreError>;

    /// 保存自定义音色，覆盖同 id 的旧文件
    async fn create(&self, id: &str, audio: &[u8]) -> Result<VoiceReference, SpeakerStoreError>;

    /// 删除自定义音色，返回文件是否存在过
    async fn delete(&self, id: &str) -> Result<bool, SpeakerStoreError>;

    /// 参考音频文件及其版本
    async fn sample(&self, id: &SpeakerId) -> Result<SpeakerSample, SpeakerStoreError>;

    /// 参考音频路径
    async fn audio_path(&self, id: &SpeakerId) -> Result<PathBuf, SpeakerStoreError> {
        Ok(self.sample(id).await?.path)
    }
}
