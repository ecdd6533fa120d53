//! Audio Encoder Port - 拼接与编码
//!
//! 把按顺序排列的原始音频拼接后编码为目标容器格式

use async_trait::async_trait;
use thiserror::Error;

use super::RawAudio;
use crate::domain::synthesis::OutputFormat;

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(OutputFormat),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

/// 编码结果
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    /// 时长（毫秒）
    pub duration_ms: u64,
    pub sample_rate: u32,
    pub channels: u8,
}

/// Audio Encoder Port
#[async_trait]
pub trait AudioEncoderPort: Send + Sync {
    /// 按顺序拼接 segments 并编码
    async fn encode(
        &self,
        segments: Vec<RawAudio>,
        format: OutputFormat,
    ) -> Result<EncodedAudio, EncodeError>;

    /// 是否支持指定格式
    fn supports_format(&self, format: OutputFormat) -> bool;
}
