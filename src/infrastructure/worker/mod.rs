//! Worker Layer - 后台任务
//!
//! 实现 CacheSweeper，周期性清理过期缓存

mod cache_sweeper;

pub use cache_sweeper::{CacheSweeper, CacheSweeperConfig};
