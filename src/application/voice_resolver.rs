//! 参考音频解析
//!
//! 请求的音色缺少样本时，按内置顺序回退到第一个存在样本的内置音色，
//! 并在结果中标记 fallback。

use std::path::PathBuf;

use crate::application::error::ApplicationError;
use crate::application::ports::{SpeakerRegistryPort, SpeakerStoreError};
use crate::domain::speaker::{builtin_ids, SpeakerId};

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceResolution {
    /// 实际使用的音色
    pub speaker_id: SpeakerId,
    pub path: PathBuf,
    /// 样本版本，样本被覆盖后改变
    pub revision: String,
    /// 是否使用了回退音色
    pub fallback: bool,
}

/// 解析参考音频路径
///
/// 未指定音色时使用默认内置音色，这不算回退
pub async fn resolve_reference(
    registry: &dyn SpeakerRegistryPort,
    requested: Option<&SpeakerId>,
) -> Result<VoiceResolution, ApplicationError> {
    let wanted = requested
        .cloned()
        .unwrap_or_else(SpeakerId::default_builtin);

    match registry.sample(&wanted).await {
        Ok(sample) => {
            return Ok(VoiceResolution {
                speaker_id: wanted,
                path: sample.path,
                revision: sample.revision,
                fallback: false,
            })
        }
        Err(SpeakerStoreError::NotFound(_)) => {
            tracing::warn!(speaker = %wanted, "Speaker sample not found, trying built-in fallback");
        }
        Err(e) => return Err(e.into()),
    }

    for candidate in builtin_ids().filter(|id| *id != wanted) {
        match registry.sample(&candidate).await {
            Ok(sample) => {
                tracing::warn!(
                    requested = %wanted,
                    fallback = %candidate,
                    "Using fallback speaker"
                );
                return Ok(VoiceResolution {
                    speaker_id: candidate,
                    path: sample.path,
                    revision: sample.revision,
                    fallback: true,
                });
            }
            Err(SpeakerStoreError::NotFound(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApplicationError::not_found("Speaker", wanted.as_str()))
}
