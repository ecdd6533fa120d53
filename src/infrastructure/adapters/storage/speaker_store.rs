//! File Speaker Registry - 参考音频目录
//!
//! 目录布局: `{dir}/{id}.wav`，内置音色的样本与自定义音色同目录存放。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{SpeakerRegistryPort, SpeakerSample, SpeakerStoreError};
use crate::domain::speaker::{
    builtin_ids, builtin_label, SpeakerId, VoiceReference, BUILTIN_SPEAKERS, SPEAKER_AUDIO_EXT,
};

/// 文件系统音色存储
pub struct FileSpeakerRegistry {
    dir: PathBuf,
}

impl FileSpeakerRegistry {
    /// 创建存储，目录不存在时创建
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, SpeakerStoreError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SpeakerStoreError::IoError(e.to_string()))?;

        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, id: &SpeakerId) -> PathBuf {
        self.dir.join(id.file_name())
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
    }

    /// 解析可写的自定义音色 id
    fn custom_id(id: &str) -> Result<SpeakerId, SpeakerStoreError> {
        let id = SpeakerId::parse(id)?;
        if id.is_builtin() {
            return Err(SpeakerStoreError::BuiltinProtected(id.as_str().to_string()));
        }
        Ok(id)
    }
}

#[async_trait]
impl SpeakerRegistryPort for FileSpeakerRegistry {
    async fn list(&self) -> Result<Vec<VoiceReference>, SpeakerStoreError> {
        let mut speakers = Vec::with_capacity(BUILTIN_SPEAKERS.len());

        for id in builtin_ids() {
            let path = self.file_path(&id);
            let path = Self::is_file(&path).await.then_some(path);
            let label = builtin_label(id.as_str()).unwrap_or_default().to_string();
            speakers.push(VoiceReference {
                id,
                label,
                is_default: true,
                path,
            });
        }

        let mut custom = Vec::new();
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| SpeakerStoreError::IoError(e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SpeakerStoreError::IoError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != SPEAKER_AUDIO_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // 目录中不合法的文件名直接忽略
            let Ok(id) = SpeakerId::parse(stem) else {
                continue;
            };
            if id.is_builtin() || !Self::is_file(&path).await {
                continue;
            }
            custom.push(VoiceReference {
                label: id.as_str().to_string(),
                id,
                is_default: false,
                path: Some(path),
            });
        }

        custom.sort_by(|a, b| a.id.cmp(&b.id));
        speakers.extend(custom);

        Ok(speakers)
    }

    async fn create(&self, id: &str, audio: &[u8]) -> Result<VoiceReference, SpeakerStoreError> {
        let id = Self::custom_id(id)?;
        if audio.is_empty() {
            return Err(SpeakerStoreError::EmptyAudio);
        }

        let path = self.file_path(&id);
        let part = self.dir.join(format!("{}.part", id.file_name()));

        if let Err(e) = fs::write(&part, audio).await {
            let _ = fs::remove_file(&part).await;
            return Err(SpeakerStoreError::IoError(e.to_string()));
        }
        if let Err(e) = fs::rename(&part, &path).await {
            let _ = fs::remove_file(&part).await;
            return Err(SpeakerStoreError::IoError(e.to_string()));
        }

        tracing::debug!(speaker = %id, path = %path.display(), size = audio.len(), "Speaker audio saved");

        Ok(VoiceReference {
            label: id.as_str().to_string(),
            id,
            is_default: false,
            path: Some(path),
        })
    }

    async fn delete(&self, id: &str) -> Result<bool, SpeakerStoreError> {
        let id = Self::custom_id(id)?;

        match fs::remove_file(self.file_path(&id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SpeakerStoreError::IoError(e.to_string())),
        }
    }

    async fn sample(&self, id: &SpeakerId) -> Result<SpeakerSample, SpeakerStoreError> {
        let path = self.file_path(id);
        let metadata = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(SpeakerStoreError::NotFound(id.as_str().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SpeakerStoreError::NotFound(id.as_str().to_string()))
            }
            Err(e) => return Err(SpeakerStoreError::IoError(e.to_string())),
        };

        let modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        Ok(SpeakerSample {
            path,
            revision: format!("{}-{}", metadata.len(), modified),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ids(speakers: &[VoiceReference]) -> Vec<&str> {
        speakers.iter().map(|s| s.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_builtins_first_then_sorted_custom() {
        let dir = tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();

        registry.create("zeta", b"RIFF").await.unwrap();
        registry.create("alpha", b"RIFF").await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        std::fs::write(dir.path().join("bad name.wav"), b"RIFF").unwrap();

        let speakers = registry.list().await.unwrap();
        assert_eq!(
            ids(&speakers),
            vec!["female-1", "male-1", "female-2", "male-2", "alpha", "zeta"]
        );
        assert!(speakers[..4].iter().all(|s| s.is_default));
        assert!(speakers[4..].iter().all(|s| !s.is_default));
        assert_eq!(speakers[0].label, "Female Voice 1");
        assert!(speakers[0].path.is_none());
    }

    #[tokio::test]
    async fn test_create_overwrites_and_leaves_no_part_file() {
        let dir = tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();

        registry.create("client-42", b"first").await.unwrap();
        let speaker = registry.create("client-42", b"second").await.unwrap();

        let path = speaker.path.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_builtin_invalid_and_empty() {
        let dir = tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();

        assert!(matches!(
            registry.create("female-1", b"RIFF").await,
            Err(SpeakerStoreError::BuiltinProtected(_))
        ));
        assert!(matches!(
            registry.create("a/b", b"RIFF").await,
            Err(SpeakerStoreError::InvalidId(_))
        ));
        assert!(matches!(
            registry.create("client-42", b"").await,
            Err(SpeakerStoreError::EmptyAudio)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let dir = tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();

        let id = SpeakerId::parse("client-42").unwrap();

        registry.create("client-42", b"RIFF").await.unwrap();
        assert_eq!(
            registry.audio_path(&id).await.unwrap(),
            dir.path().join("client-42.wav")
        );

        assert!(registry.delete("client-42").await.unwrap());
        assert!(matches!(
            registry.audio_path(&id).await,
            Err(SpeakerStoreError::NotFound(_))
        ));
        assert!(!registry.delete("client-42").await.unwrap());
        assert!(matches!(
            registry.delete("male-2").await,
            Err(SpeakerStoreError::BuiltinProtected(_))
        ));
    }

    #[tokio::test]
    async fn test_audio_path_for_builtin_sample() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("male-1.wav"), b"RIFF").unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();

        let male = SpeakerId::parse("male-1").unwrap();
        assert_eq!(registry.audio_path(&male).await.unwrap(), dir.path().join("male-1.wav"));

        let missing = SpeakerId::parse("female-2").unwrap();
        assert!(matches!(
            registry.audio_path(&missing).await,
            Err(SpeakerStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_sample_revision_changes_on_overwrite() {
        let dir = tempdir().unwrap();
        let registry = FileSpeakerRegistry::new(dir.path()).await.unwrap();
        let id = SpeakerId::parse("client-42").unwrap();

        registry.create("client-42", b"RIFF-first").await.unwrap();
        let first = registry.sample(&id).await.unwrap();

        registry.create("client-42", b"RIFF-second-take").await.unwrap();
        let second = registry.sample(&id).await.unwrap();

        assert_eq!(first.path, second.path);
        assert_ne!(first.revision, second.revision);
    }
}
