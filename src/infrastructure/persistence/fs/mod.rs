//! 文件系统持久化

mod artifact_cache;

pub use artifact_cache::{FileArtifactCache, FileCacheConfig};
