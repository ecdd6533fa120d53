//! Persistence Layer - 数据持久化
//!
//! 合成结果的文件系统缓存

pub mod fs;

pub use self::fs::{FileArtifactCache, FileCacheConfig};
