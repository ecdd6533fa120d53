//! Artifact Queries

use std::path::PathBuf;

use crate::domain::synthesis::{CacheKey, OutputFormat};

/// 按下载文件名获取缓存产物
#[derive(Debug, Clone)]
pub struct GetArtifact {
    /// `{key}.{ext}` 或裸 key
    pub filename: String,
}

/// 产物位置
#[derive(Debug, Clone)]
pub struct GetArtifactResponse {
    pub key: CacheKey,
    pub path: PathBuf,
    /// 文件名无扩展名时为 None
    pub format: Option<OutputFormat>,
}

impl GetArtifactResponse {
    pub fn content_type(&self) -> &'static str {
        self.format
            .map(|f| f.content_type())
            .unwrap_or("application/octet-stream")
    }
}
