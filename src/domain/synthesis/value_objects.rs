//! Synthesis Context - Value Objects

use serde::{Deserialize, Serialize};

use super::RequestError;
use crate::domain::speaker::SpeakerId;

/// 输出容器格式（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit PCM WAV，无损
    #[default]
    Wav,
    /// MP3 (LAME)
    Mp3,
    /// Opus (OGG 容器)
    Opus,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Wav, OutputFormat::Mp3, OutputFormat::Opus];

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
        }
    }

    /// 由文件头识别格式
    pub fn sniff(header: &[u8]) -> Option<Self> {
        match header {
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(Self::Wav),
            [b'O', b'g', b'g', b'S', ..] => Some(Self::Opus),
            [b'I', b'D', b'3', ..] => Some(Self::Mp3),
            [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some(Self::Mp3),
            _ => None,
        }
    }

    /// 响应 Content-Type
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "mp3" => Ok(Self::Mp3),
            "opus" | "ogg" => Ok(Self::Opus),
            _ => Err(RequestError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 请求准入限制
#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    /// 文本最大字符数
    pub max_text_length: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_text_length: 1000,
        }
    }
}

/// 合成请求
///
/// 不变量:
/// - text 已做空白规范化（连续空白折叠为单个空格，首尾去空白）且非空
/// - text 字符数不超过 max_text_length
/// - format 属于封闭格式集合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    model_id: String,
    language: String,
    speaker: Option<SpeakerId>,
    format: OutputFormat,
}

impl SynthesisRequest {
    /// 校验并创建请求
    pub fn new(
        text: &str,
        model_id: impl Into<String>,
        language: impl Into<String>,
        speaker: Option<&str>,
        format: &str,
        limits: &RequestLimits,
    ) -> Result<Self, RequestError> {
        let text = normalize_whitespace(text);
        if text.is_empty() {
            return Err(RequestError::EmptyText);
        }

        let len = text.chars().count();
        if len > limits.max_text_length {
            return Err(RequestError::TextTooLong {
                len,
                max: limits.max_text_length,
            });
        }

        let format: OutputFormat = format.parse()?;

        let speaker = match speaker.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => Some(SpeakerId::parse(id).map_err(RequestError::InvalidSpeaker)?),
            None => None,
        };

        let model_id = model_id.into();
        if model_id.trim().is_empty() {
            return Err(RequestError::EmptyModel);
        }

        Ok(Self {
            text,
            model_id,
            language: language.into(),
            speaker,
            format,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn speaker(&self) -> Option<&SpeakerId> {
        self.speaker.as_ref()
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// 连续空白折叠为单个空格
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
