//! Domain Layer - 领域层
//!
//! 包含三个上下文:
//! - Synthesis Context: 合成请求、输出格式、缓存 key
//! - Speaker Context: 音色标识与内置音色
//! - Model Context: 模型目录与能力描述

pub mod model;
pub mod speaker;
pub mod synthesis;

// 共享的文本分块器
pub mod chunker;

pub use chunker::{split, TextChunk};
