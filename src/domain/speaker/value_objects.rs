//! Speaker Context - Value Objects

use serde::Serialize;
use std::path::PathBuf;

use super::SpeakerIdError;

/// 标识符最大长度
pub const MAX_SPEAKER_ID_LEN: usize = 64;

/// 内置音色（固定、不可删除、不可覆盖）
///
/// 顺序即 list 与 fallback 的顺序，第一个为默认音色
pub const BUILTIN_SPEAKERS: &[(&str, &str)] = &[
    ("female-1", "Female Voice 1"),
    ("male-1", "Male Voice 1"),
    ("female-2", "Female Voice 2"),
    ("male-2", "Male Voice 2"),
];

/// 参考音频文件扩展名
pub const SPEAKER_AUDIO_EXT: &str = "wav";

/// 音色标识
///
/// 不变量: 仅包含字母、数字、`-`、`_`，非空且不超过 64 字符
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SpeakerId(String);

impl SpeakerId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, SpeakerIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SpeakerIdError::Empty);
        }
        if raw.chars().count() > MAX_SPEAKER_ID_LEN {
            return Err(SpeakerIdError::TooLong(MAX_SPEAKER_ID_LEN));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(SpeakerIdError::InvalidChar(bad));
        }
        Ok(Self(raw))
    }

    /// 默认音色
    pub fn default_builtin() -> Self {
        Self(BUILTIN_SPEAKERS[0].0.to_string())
    }

    pub fn is_builtin(&self) -> bool {
        builtin_label(&self.0).is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 资源文件名 `{id}.wav`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, SPEAKER_AUDIO_EXT)
    }
}

impl std::fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 内置音色标签
pub fn builtin_label(id: &str) -> Option<&'static str> {
    BUILTIN_SPEAKERS
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, label)| *label)
}

/// 所有内置音色 id（按固定顺序）
pub fn builtin_ids() -> impl Iterator<Item = SpeakerId> {
    BUILTIN_SPEAKERS
        .iter()
        .map(|(id, _)| SpeakerId((*id).to_string()))
}

/// 音色元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoiceReference {
    pub id: SpeakerId,
    pub label: String,
    /// 是否内置
    pub is_default: bool,
    /// 参考音频路径（内置音色未预置样本时为 None）
    pub path: Option<PathBuf>,
}
