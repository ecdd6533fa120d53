//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::domain::model::{Capabilities, ModelSpec};
use crate::domain::speaker::VoiceReference;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

/// 合成表单
#[derive(Debug, Deserialize)]
pub struct SynthesizeForm {
    #[serde(default)]
    pub text: String,
    pub model_id: Option<String>,
    pub language: Option<String>,
    pub speaker: Option<String>,
    pub fmt: Option<String>,
}

// ============================================================================
// Model DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub id: String,
    pub label: String,
    pub languages: Vec<String>,
    pub capabilities: Capabilities,
}

impl From<ModelSpec> for ModelResponse {
    fn from(model: ModelSpec) -> Self {
        Self {
            id: model.id,
            label: model.label,
            languages: model.languages,
            capabilities: model.capabilities,
        }
    }
}

// ============================================================================
// Speaker DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SpeakerResponse {
    pub id: String,
    pub label: String,
    pub is_default: bool,
    /// 是否有可用的参考音频
    pub has_sample: bool,
}

impl From<VoiceReference> for SpeakerResponse {
    fn from(speaker: VoiceReference) -> Self {
        Self {
            id: speaker.id.as_str().to_string(),
            label: speaker.label,
            is_default: speaker.is_default,
            has_sample: speaker.path.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteSpeakerRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSpeakerResponse {
    pub id: String,
    /// 文件是否存在过
    pub deleted: bool,
}
