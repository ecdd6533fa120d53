//! Speaker Context - Errors

use thiserror::Error;

/// 音色标识校验错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeakerIdError {
    #[error("speaker id must not be empty")]
    Empty,

    #[error("speaker id must be at most {0} characters")]
    TooLong(usize),

    #[error("speaker id contains invalid character {0:?} (allowed: letters, digits, '-', '_')")]
    InvalidChar(char),
}
