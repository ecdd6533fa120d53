//! Backend Registry - 已加载模型实例表
//!
//! 每个模型首次使用时构造，并发的首次调用共享同一次构造。
//! 启动时可预加载，关闭时统一释放。

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::application::ports::{SynthesizerError, SynthesizerFactory, SynthesizerPort};
use crate::domain::model::ModelSpec;

type BackendSlot = Arc<OnceCell<Arc<dyn SynthesizerPort>>>;

pub struct BackendRegistry {
    factory: Arc<dyn SynthesizerFactory>,
    use_gpu: bool,
    /// model_id -> 实例
    backends: DashMap<String, BackendSlot>,
}

impl BackendRegistry {
    pub fn new(factory: Arc<dyn SynthesizerFactory>, use_gpu: bool) -> Self {
        Self {
            factory,
            use_gpu,
            backends: DashMap::new(),
        }
    }

    /// 获取模型实例，不存在则构造
    ///
    /// 构造失败不会占位，下次调用重新构造
    pub async fn get(&self, model: &ModelSpec) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
        let slot = self
            .backends
            .entry(model.id.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let backend = slot
            .get_or_try_init(|| async {
                tracing::info!(
                    model_id = %model.id,
                    backend_name = %model.backend_name,
                    use_gpu = self.use_gpu,
                    "Loading model"
                );
                self.factory.create(model, self.use_gpu).await
            })
            .await?;

        Ok(backend.clone())
    }

    /// 预加载模型
    pub async fn preload(&self, model: &ModelSpec) -> Result<(), SynthesizerError> {
        self.get(model).await?;
        tracing::info!(model_id = %model.id, "Model preloaded");
        Ok(())
    }

    /// 已加载的模型 id
    pub fn loaded(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .backends
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// 释放所有模型实例
    pub async fn shutdown(&self) {
        let slots: Vec<(String, BackendSlot)> = self
            .backends
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        self.backends.clear();

        for (model_id, slot) in slots {
            if let Some(backend) = slot.get() {
                backend.shutdown().await;
                tracing::info!(model_id = %model_id, "Model unloaded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ChunkRequest, RawAudio};
    use crate::domain::model::ModelCatalog;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullBackend {
        shutdowns: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SynthesizerPort for NullBackend {
        async fn synthesize_chunk(&self, _request: ChunkRequest) -> Result<RawAudio, SynthesizerError> {
            Ok(RawAudio(Vec::new()))
        }

        async fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        created: AtomicUsize,
        shutdowns: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl SynthesizerFactory for CountingFactory {
        async fn create(
            &self,
            _model: &ModelSpec,
            _use_gpu: bool,
        ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            if self.fail {
                return Err(SynthesizerError::LoadFailed("no weights".to_string()));
            }
            Ok(Arc::new(NullBackend {
                shutdowns: self.shutdowns.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn test_constructs_once_under_concurrency() {
        let factory = Arc::new(CountingFactory::default());
        let registry = Arc::new(BackendRegistry::new(factory.clone(), false));
        let model = ModelCatalog::builtin().get("xtts-v2").unwrap().clone();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let model = model.clone();
            handles.push(tokio::spawn(async move { registry.get(&model).await.is_ok() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        assert_eq!(factory.created.load(Ordering::SeqCst), 1);
        assert_eq!(registry.loaded(), vec!["xtts-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let factory = Arc::new(CountingFactory {
            fail: true,
            ..Default::default()
        });
        let registry = BackendRegistry::new(factory.clone(), false);
        let model = ModelCatalog::builtin().get("tacotron-en").unwrap().clone();

        assert!(registry.get(&model).await.is_err());
        assert!(registry.get(&model).await.is_err());
        assert_eq!(factory.created.load(Ordering::SeqCst), 2);
        assert!(registry.loaded().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_releases_backends() {
        let factory = Arc::new(CountingFactory::default());
        let registry = BackendRegistry::new(factory.clone(), true);
        let catalog = ModelCatalog::builtin();

        registry.preload(catalog.get("tacotron-en").unwrap()).await.unwrap();
        registry.preload(catalog.get("xtts-v2").unwrap()).await.unwrap();
        assert_eq!(registry.loaded().len(), 2);

        registry.shutdown().await;
        assert!(registry.loaded().is_empty());
        assert_eq!(factory.shutdowns.load(Ordering::SeqCst), 2);
    }
}
