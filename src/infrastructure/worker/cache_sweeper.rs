//! Cache Sweeper - 周期性清理过期缓存

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::application::ports::ArtifactCachePort;

/// Sweeper 配置
#[derive(Debug, Clone)]
pub struct CacheSweeperConfig {
    /// 清扫间隔（秒）
    pub interval_secs: u64,
}

impl Default for CacheSweeperConfig {
    fn default() -> Self {
        Self { interval_secs: 3600 }
    }
}

/// 缓存清扫 Worker
///
/// 启动后立即清扫一次，之后按间隔执行，收到关闭信号时退出
pub struct CacheSweeper {
    config: CacheSweeperConfig,
    cache: Arc<dyn ArtifactCachePort>,
    shutdown: watch::Receiver<bool>,
}

impl CacheSweeper {
    pub fn new(
        config: CacheSweeperConfig,
        cache: Arc<dyn ArtifactCachePort>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            cache,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        tracing::info!(interval_secs = period.as_secs(), "CacheSweeper started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.cache.sweep().await;
                    if report.failed > 0 {
                        tracing::warn!(failed = report.failed, "Some expired cache entries could not be removed");
                    }
                }
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("CacheSweeper stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{CacheError, SweepReport};
    use crate::domain::synthesis::CacheKey;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingCache {
        sweeps: AtomicU64,
    }

    #[async_trait]
    impl ArtifactCachePort for CountingCache {
        async fn exists(&self, _key: &CacheKey) -> bool {
            false
        }

        fn path(&self, key: &CacheKey) -> PathBuf {
            PathBuf::from(key.as_str())
        }

        async fn put(&self, key: &CacheKey, _source: &Path) -> Result<PathBuf, CacheError> {
            Err(CacheError::NotFound(key.to_string()))
        }

        async fn sweep(&self) -> SweepReport {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            SweepReport::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_interval_until_shutdown() {
        let cache = Arc::new(CountingCache::default());
        let (tx, rx) = watch::channel(false);
        let sweeper = CacheSweeper::new(CacheSweeperConfig { interval_secs: 10 }, cache.clone(), rx);
        let handle = tokio::spawn(sweeper.run());

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(cache.sweeps.load(Ordering::SeqCst), 3);

        tx.send(true).unwrap();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(cache.sweeps.load(Ordering::SeqCst), 3);
    }
}
