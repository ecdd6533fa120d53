//! Synthesis Context - Errors

use thiserror::Error;

use crate::domain::speaker::SpeakerIdError;

/// 请求校验错误
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Text is required")]
    EmptyText,

    #[error("Max text length is {max} (got {len})")]
    TextTooLong { len: usize, max: usize },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Model id is required")]
    EmptyModel,

    #[error("Invalid speaker: {0}")]
    InvalidSpeaker(SpeakerIdError),
}
