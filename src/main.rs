//! Chorus - 多模型 TTS 合成服务

use std::sync::Arc;

use chorus::application::{
    ArtifactCachePort, BackendRegistry, OrchestratorConfig, SynthesisDefaults,
    SynthesisOrchestrator, SynthesizerFactory,
};
use chorus::config::{load_config, print_config, AppConfig, BackendKind};
use chorus::domain::model::ModelCatalog;
use chorus::domain::synthesis::RequestLimits;
use chorus::infrastructure::adapters::{
    FileSpeakerRegistry, HttpSynthesizerConfig, HttpSynthesizerFactory, PcmEncoder,
    ToneSynthesizerFactory,
};
use chorus::infrastructure::http::{AppComponents, AppState, HttpServer, ServerConfig};
use chorus::infrastructure::persistence::{FileArtifactCache, FileCacheConfig};
use chorus::infrastructure::worker::{CacheSweeper, CacheSweeperConfig};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 优先级：旧版环境变量 > CHORUS_ 环境变量 > 配置文件 > 默认值
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Chorus - TTS synthesis service v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    let builtin = ModelCatalog::builtin();
    let catalog = Arc::new(ModelCatalog::new(
        builtin.models().to_vec(),
        config.synthesis.default_model.clone(),
    ));

    let cache = Arc::new(
        FileArtifactCache::new(FileCacheConfig {
            dir: config.cache.dir.clone(),
            ttl_secs: config.cache.ttl_secs,
        })
        .await?,
    );
    let speakers = Arc::new(FileSpeakerRegistry::new(&config.storage.speakers_dir).await?);
    let encoder = Arc::new(PcmEncoder::new(config.audio.bitrate));

    let factory: Arc<dyn SynthesizerFactory> = match config.backend.kind {
        BackendKind::Http => Arc::new(HttpSynthesizerFactory::new(
            HttpSynthesizerConfig::new(&config.backend.url)
                .with_timeout(config.backend.timeout_secs),
        )?),
        BackendKind::Tone => {
            tracing::warn!("Using tone backend, audio is synthetic");
            Arc::new(ToneSynthesizerFactory::default())
        }
    };
    let backends = Arc::new(BackendRegistry::new(factory, config.synthesis.use_gpu));

    // 预加载失败不阻止启动，首次请求时重试
    if let Some(model_id) = config
        .synthesis
        .preload_model
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    {
        match catalog.resolve(model_id) {
            Some((model, _)) => {
                if let Err(e) = backends.preload(model).await {
                    tracing::warn!(model_id = %model.id, error = %e, "Model preload failed");
                }
            }
            None => tracing::warn!(model_id = %model_id, "Preload model not in catalog"),
        }
    }

    let orchestrator = Arc::new(SynthesisOrchestrator::new(
        OrchestratorConfig {
            max_chunk_chars: config.synthesis.max_chunk_chars,
            chunk_concurrency: config.synthesis.chunk_concurrency,
            work_dir: config.storage.work_dir.clone(),
        },
        catalog.clone(),
        backends.clone(),
        speakers.clone(),
        encoder,
        cache.clone(),
    ));

    // 后台缓存清理
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = (config.cache.sweep_interval_secs > 0).then(|| {
        let cache: Arc<dyn ArtifactCachePort> = cache.clone();
        tokio::spawn(
            CacheSweeper::new(
                CacheSweeperConfig {
                    interval_secs: config.cache.sweep_interval_secs,
                },
                cache,
                shutdown_rx,
            )
            .run(),
        )
    });

    let state = AppState::new(AppComponents {
        catalog,
        backends: backends.clone(),
        speakers,
        cache,
        orchestrator,
        limits: RequestLimits {
            max_text_length: config.synthesis.max_text_length,
        },
        defaults: SynthesisDefaults {
            model_id: config.synthesis.default_model.clone(),
            ..SynthesisDefaults::default()
        },
    });

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_size(config.storage.max_upload_size);
    let server = HttpServer::new(server_config, state);

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "CacheSweeper task failed");
        }
    }
    backends.shutdown().await;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// 初始化日志
///
/// `RUST_LOG` 优先于配置中的 log.level
fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
