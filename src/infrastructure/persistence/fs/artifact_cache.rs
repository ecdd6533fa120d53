//! File Artifact Cache - 平铺目录的 TTL 缓存
//!
//! 目录布局: `{dir}/{key}`，文件修改时间即写入时间。
//! 不维护索引，清扫时直接扫描目录。

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

use crate::application::ports::{
    ArtifactCachePort, CacheError, ClockPort, SweepReport, SystemClock,
};
use crate::domain::synthesis::CacheKey;

/// 文件缓存配置
#[derive(Debug, Clone)]
pub struct FileCacheConfig {
    /// 缓存目录
    pub dir: PathBuf,
    /// 条目存活时间（秒）
    pub ttl_secs: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/cache"),
            ttl_secs: 86400,
        }
    }
}

/// 文件系统缓存
pub struct FileArtifactCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn ClockPort>,
}

impl FileArtifactCache {
    /// 创建缓存，目录不存在时创建
    pub async fn new(config: FileCacheConfig) -> Result<Self, CacheError> {
        fs::create_dir_all(&config.dir)
            .await
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        let ttl = Duration::seconds(i64::try_from(config.ttl_secs).unwrap_or(i64::MAX));

        tracing::info!(
            dir = %config.dir.display(),
            ttl_secs = config.ttl_secs,
            "FileArtifactCache initialized"
        );

        Ok(Self {
            dir: config.dir,
            ttl,
            clock: Arc::new(SystemClock),
        })
    }

    /// 替换时间来源
    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 按修改时间判断是否过期
    fn is_stale(&self, modified: DateTime<Utc>) -> bool {
        self.clock.now() - modified > self.ttl
    }

    async fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
        let metadata = fs::metadata(path).await.ok()?;
        if !metadata.is_file() {
            return None;
        }
        metadata.modified().ok().map(DateTime::<Utc>::from)
    }
}

/// 暂存文件，未提交即 drop 时删除
struct Staging {
    path: PathBuf,
    committed: bool,
}

impl Staging {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn commit(mut self, source: &Path, target: &Path) -> std::io::Result<()> {
        std::fs::copy(source, &self.path)?;
        std::fs::rename(&self.path, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staging file");
                }
            }
        }
    }
}

#[async_trait]
impl ArtifactCachePort for FileArtifactCache {
    async fn exists(&self, key: &CacheKey) -> bool {
        let path = self.path(key);
        let Some(modified) = Self::modified_at(&path).await else {
            return false;
        };

        if !self.is_stale(modified) {
            return true;
        }

        tracing::debug!(cache_key = %key, "Cache entry expired");
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(cache_key = %key, error = %e, "Failed to remove expired cache entry");
        }
        false
    }

    fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    async fn put(&self, key: &CacheKey, source: &Path) -> Result<PathBuf, CacheError> {
        let target = self.path(key);
        // 先复制到同目录的隐藏文件，再 rename 覆盖，读者不会看到半个文件
        let staging = Staging::new(self.dir.join(format!(".{}.{}.tmp", key, Uuid::new_v4())));
        let source = source.to_path_buf();
        let dest = target.clone();

        // 整个暂存过程在阻塞任务中完成，调用方被取消时任务仍会走到提交或清理
        tokio::task::spawn_blocking(move || staging.commit(&source, &dest))
            .await
            .map_err(|e| CacheError::IoError(format!("Cache write task failed: {}", e)))?
            .map_err(|e| CacheError::IoError(e.to_string()))?;

        tracing::debug!(cache_key = %key, path = %target.display(), "Cache entry written");

        Ok(target)
    }

    async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::default();

        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to scan cache dir");
                return report;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read cache dir entry");
                    break;
                }
            };

            let path = entry.path();
            let Some(modified) = Self::modified_at(&path).await else {
                continue;
            };
            report.scanned += 1;

            if !self.is_stale(modified) {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove expired cache entry");
                }
            }
        }

        tracing::info!(
            scanned = report.scanned,
            removed = report.removed,
            failed = report.failed,
            "Cache sweep completed"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::ManualClock;
    use tempfile::tempdir;

    fn key(text: &str) -> CacheKey {
        CacheKey::compute("xtts-v2", "en", None, text, "wav")
    }

    async fn cache_with_clock(dir: &Path, ttl_secs: u64) -> (FileArtifactCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = FileArtifactCache::new(FileCacheConfig {
            dir: dir.join("cache"),
            ttl_secs,
        })
        .await
        .unwrap()
        .with_clock(clock.clone());
        (cache, clock)
    }

    fn source(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[tokio::test]
    async fn test_put_then_exists() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;
        let key = key("hello");

        assert!(!cache.exists(&key).await);

        let src = source(dir.path(), "a.wav", b"RIFF-a");
        let path = cache.put(&key, &src).await.unwrap();
        assert_eq!(path, cache.path(&key));
        assert!(cache.exists(&key).await);
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF-a");
        // 源文件保留
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_entry() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;
        let key = key("hello");

        cache.put(&key, &source(dir.path(), "a", b"first")).await.unwrap();
        cache.put(&key, &source(dir.path(), "b", b"second")).await.unwrap();

        assert_eq!(std::fs::read(cache.path(&key)).unwrap(), b"second");
        // 没有残留的临时文件
        assert_eq!(std::fs::read_dir(cache.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_put_missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;

        let err = cache
            .put(&key("x"), &dir.path().join("missing.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::IoError(_)));
        assert_eq!(std::fs::read_dir(cache.dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_put_leaves_no_staging_file() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;
        let key = key("hello");
        let src = source(dir.path(), "big.wav", &vec![7u8; 4 * 1024 * 1024]);

        // 立即放弃等待
        let _ = tokio::time::timeout(std::time::Duration::ZERO, cache.put(&key, &src)).await;

        // 阻塞任务结束后只可能剩下完整的条目
        for _ in 0..100 {
            if cache.path(&key).exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let names: Vec<String> = std::fs::read_dir(cache.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(names.iter().all(|n| !n.ends_with(".tmp")), "{:?}", names);
        assert_eq!(std::fs::read(cache.path(&key)).unwrap().len(), 4 * 1024 * 1024);
    }

    #[test]
    fn test_uncommitted_staging_is_removed_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".staging.tmp");
        std::fs::write(&path, b"partial").unwrap();

        drop(Staging::new(path.clone()));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stale_entry_is_removed_on_lookup() {
        let dir = tempdir().unwrap();
        let (cache, clock) = cache_with_clock(dir.path(), 60).await;
        let key = key("hello");

        cache.put(&key, &source(dir.path(), "a", b"data")).await.unwrap();
        clock.advance(Duration::seconds(30));
        assert!(cache.exists(&key).await);

        clock.advance(Duration::seconds(31));
        assert!(!cache.exists(&key).await);
        assert!(!cache.path(&key).exists());
    }

    #[tokio::test]
    async fn test_directory_at_key_path_is_not_an_entry() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;
        let key = key("hello");

        std::fs::create_dir(cache.path(&key)).unwrap();
        assert!(!cache.exists(&key).await);
    }

    fn backdate(path: &Path, secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweep_removes_stale_files_only() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;

        let old = key("old");
        let fresh = key("fresh");
        cache.put(&old, &source(dir.path(), "a", b"old")).await.unwrap();
        cache.put(&fresh, &source(dir.path(), "b", b"fresh")).await.unwrap();
        backdate(&cache.path(&old), 120);

        let report = cache.sweep().await;
        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                removed: 1,
                failed: 0
            }
        );
        assert!(!cache.path(&old).exists());
        assert!(cache.exists(&fresh).await);
    }

    #[tokio::test]
    async fn test_sweep_on_empty_dir() {
        let dir = tempdir().unwrap();
        let (cache, _clock) = cache_with_clock(dir.path(), 60).await;
        assert_eq!(cache.sweep().await, SweepReport::default());
    }
}
