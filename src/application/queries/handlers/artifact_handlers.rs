//! Artifact Query Handlers

use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::application::error::ApplicationError;
use crate::application::ports::ArtifactCachePort;
use crate::application::queries::{GetArtifact, GetArtifactResponse};
use crate::domain::synthesis::{CacheKey, OutputFormat};

/// GetArtifact Handler
///
/// 文件名来自外部，先校验为合法 key 再访问文件系统；
/// 扩展名必须与产物实际格式一致
pub struct GetArtifactHandler {
    cache: Arc<dyn ArtifactCachePort>,
}

impl GetArtifactHandler {
    pub fn new(cache: Arc<dyn ArtifactCachePort>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, query: GetArtifact) -> Result<GetArtifactResponse, ApplicationError> {
        let (stem, ext) = match query.filename.split_once('.') {
            Some((stem, ext)) => (stem, Some(ext)),
            None => (query.filename.as_str(), None),
        };

        let key = CacheKey::parse(stem)
            .ok_or_else(|| ApplicationError::not_found("File", query.filename.as_str()))?;
        let requested = match ext {
            Some(ext) => Some(
                ext.parse::<OutputFormat>()
                    .map_err(|_| ApplicationError::not_found("File", query.filename.as_str()))?,
            ),
            None => None,
        };

        if !self.cache.exists(&key).await {
            return Err(ApplicationError::not_found("File", query.filename));
        }

        let path = self.cache.path(&key);
        let stored = stored_format(&path).await;
        if let (Some(requested), Some(stored)) = (requested, stored) {
            if requested != stored {
                tracing::debug!(
                    cache_key = %key,
                    requested = %requested,
                    stored = %stored,
                    "Download extension does not match artifact"
                );
                return Err(ApplicationError::not_found("File", query.filename));
            }
        }

        Ok(GetArtifactResponse {
            path,
            key,
            format: stored.or(requested),
        })
    }
}

/// 读取文件头识别产物格式
async fn stored_format(path: &Path) -> Option<OutputFormat> {
    let mut file = tokio::fs::File::open(path).await.ok()?;
    let mut header = [0u8; 12];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return None,
        }
    }
    OutputFormat::sniff(&header[..filled])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::{FileArtifactCache, FileCacheConfig};

    async fn setup() -> (tempfile::TempDir, Arc<FileArtifactCache>, CacheKey) {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileArtifactCache::new(FileCacheConfig {
            dir: dir.path().join("cache"),
            ttl_secs: 60,
        })
        .await
        .unwrap();

        let key = CacheKey::compute("xtts-v2", "en", None, "hello", "mp3");
        let source = dir.path().join("out.mp3");
        std::fs::write(&source, b"ID3").unwrap();
        cache.put(&key, &source).await.unwrap();

        (dir, Arc::new(cache), key)
    }

    #[tokio::test]
    async fn test_download_by_filename() {
        let (_dir, cache, key) = setup().await;
        let handler = GetArtifactHandler::new(cache);

        let resp = handler
            .handle(GetArtifact {
                filename: format!("{}.mp3", key),
            })
            .await
            .unwrap();
        assert_eq!(resp.key, key);
        assert_eq!(resp.content_type(), "audio/mpeg");
        assert!(resp.path.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_is_not_found() {
        let (_dir, cache, _key) = setup().await;
        let handler = GetArtifactHandler::new(cache);

        for filename in ["../secret", "..%2Fsecret.wav", "abc.wav", ""] {
            let err = handler
                .handle(GetArtifact {
                    filename: filename.to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::NotFound { .. }), "{}", filename);
        }
    }

    #[tokio::test]
    async fn test_unknown_key_is_not_found() {
        let (_dir, cache, _key) = setup().await;
        let handler = GetArtifactHandler::new(cache);

        let other = CacheKey::compute("xtts-v2", "en", None, "other", "wav");
        let err = handler
            .handle(GetArtifact {
                filename: format!("{}.wav", other),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_mismatched_extension_is_not_found() {
        let (_dir, cache, key) = setup().await;
        let handler = GetArtifactHandler::new(cache);

        let err = handler
            .handle(GetArtifact {
                filename: format!("{}.wav", key),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_bare_key_reports_stored_format() {
        let (_dir, cache, key) = setup().await;
        let handler = GetArtifactHandler::new(cache);

        let resp = handler
            .handle(GetArtifact {
                filename: key.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(resp.format, Some(OutputFormat::Mp3));
        assert_eq!(resp.content_type(), "audio/mpeg");
    }
}
