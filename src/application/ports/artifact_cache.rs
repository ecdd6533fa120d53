//! Artifact Cache Port - 合成结果缓存
//!
//! 内容寻址、按 TTL 惰性淘汰的磁盘缓存。文件修改时间是唯一的新鲜度依据。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::synthesis::CacheKey;

/// Artifact Cache 错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache entry not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 一次清扫的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 扫描的文件数
    pub scanned: u64,
    /// 删除的过期文件数
    pub removed: u64,
    /// 删除失败的文件数（仅记录日志）
    pub failed: u64,
}

/// Artifact Cache Port
#[async_trait]
pub trait ArtifactCachePort: Send + Sync {
    /// 条目存在且未过期时返回 true
    ///
    /// 注意：发现过期条目时会顺带删除，调用方不能把它当作只读操作
    async fn exists(&self, key: &CacheKey) -> bool;

    /// 条目在磁盘上的位置（不保证存在）
    fn path(&self, key: &CacheKey) -> PathBuf;

    /// 把 source 复制到缓存中，覆盖已有条目，返回缓存路径
    async fn put(&self, key: &CacheKey, source: &Path) -> Result<PathBuf, CacheError>;

    /// 删除所有过期条目
    async fn sweep(&self) -> SweepReport;
}
