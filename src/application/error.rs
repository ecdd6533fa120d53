//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{CacheError, EncodeError, SpeakerStoreError};
use crate::domain::synthesis::RequestError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误（未做任何工作即拒绝）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 后端在某个块上合成失败，整个请求中止
    #[error("Synthesis failed on chunk {chunk_index}: {message}")]
    SynthesisError { chunk_index: usize, message: String },

    /// 编码错误
    #[error("Encoding error: {0}")]
    EncodeError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type,
            id: id.into(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<RequestError> for ApplicationError {
    fn from(err: RequestError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<SpeakerStoreError> for ApplicationError {
    fn from(err: SpeakerStoreError) -> Self {
        match err {
            SpeakerStoreError::InvalidId(_)
            | SpeakerStoreError::BuiltinProtected(_)
            | SpeakerStoreError::EmptyAudio => Self::ValidationError(err.to_string()),
            SpeakerStoreError::NotFound(id) => Self::not_found("Speaker", id),
            SpeakerStoreError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<CacheError> for ApplicationError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound(key) => Self::not_found("Cache entry", key),
            CacheError::IoError(msg) => Self::StorageError(msg),
        }
    }
}

impl From<EncodeError> for ApplicationError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::UnsupportedFormat(format) => {
                Self::ValidationError(format!("Unsupported format: {}", format))
            }
            other => Self::EncodeError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_errors_map_to_kinds() {
        let err: ApplicationError =
            SpeakerStoreError::BuiltinProtected("female-1".to_string()).into();
        assert!(matches!(err, ApplicationError::ValidationError(_)));

        let err: ApplicationError = SpeakerStoreError::NotFound("client-42".to_string()).into();
        assert!(matches!(err, ApplicationError::NotFound { .. }));

        let err: ApplicationError = SpeakerStoreError::IoError("disk full".to_string()).into();
        assert!(matches!(err, ApplicationError::StorageError(_)));
    }

    #[test]
    fn test_request_error_is_validation() {
        let err: ApplicationError = RequestError::EmptyText.into();
        assert_eq!(err.to_string(), "Validation error: Text is required");
    }
}
