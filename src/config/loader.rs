//! Configuration Loader
//!
//! 优先级（从高到低）：
//! 1. 兼容旧部署的环境变量（`PORT` / `CACHE_TTL_SECONDS` / `MAX_TEXT_LENGTH` / `USE_GPU`）
//! 2. 环境变量（前缀 `CHORUS_`）
//! 3. 配置文件（config.toml / config.local.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, BackendKind};
use crate::domain::model::ModelCatalog;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `CHORUS_SERVER__PORT=8080`
/// - `CHORUS_BACKEND__URL=http://tts:5002`
/// - `CHORUS_CACHE__TTL_SECS=3600`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// `config_path` 为 None 时搜索默认配置文件
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 例如: CHORUS_SYNTHESIS__MAX_CHUNK_CHARS=200
    builder = builder.add_source(
        Environment::with_prefix("CHORUS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 缺省字段由 serde default 补齐
    let config = builder.build()?;
    let mut app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    apply_legacy_env(&mut app_config, |name| std::env::var(name).ok())?;
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 应用旧版环境变量
fn apply_legacy_env<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::ParseError(format!("Invalid value for {}: {}", name, value)))
    }

    if let Some(v) = lookup("PORT") {
        config.server.port = parse("PORT", &v)?;
    }
    if let Some(v) = lookup("CACHE_TTL_SECONDS") {
        config.cache.ttl_secs = parse("CACHE_TTL_SECONDS", &v)?;
    }
    if let Some(v) = lookup("MAX_TEXT_LENGTH") {
        config.synthesis.max_text_length = parse("MAX_TEXT_LENGTH", &v)?;
    }
    if let Some(v) = lookup("USE_GPU") {
        config.synthesis.use_gpu = matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }

    Ok(())
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }
    if config.cache.ttl_secs == 0 {
        return invalid("Cache TTL must be positive");
    }
    if config.synthesis.max_text_length == 0 {
        return invalid("max_text_length must be positive");
    }
    if config.synthesis.max_chunk_chars == 0 {
        return invalid("max_chunk_chars must be positive");
    }
    if config.synthesis.chunk_concurrency == 0 {
        return invalid("chunk_concurrency must be positive");
    }
    if config.backend.kind == BackendKind::Http && config.backend.url.trim().is_empty() {
        return invalid("Backend URL cannot be empty");
    }
    if config.audio.bitrate == 0 {
        return invalid("Audio bitrate must be positive");
    }
    // 默认模型是回退目标，必须在内置目录里
    if ModelCatalog::builtin()
        .get(&config.synthesis.default_model)
        .is_none()
    {
        return Err(ConfigError::ValidationError(format!(
            "Unknown default model: {}",
            config.synthesis.default_model
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Backend: {:?} ({})", config.backend.kind, config.backend.url);
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!("Cache Directory: {:?}", config.cache.dir);
    tracing::info!("Cache TTL: {}s", config.cache.ttl_secs);
    tracing::info!("Max Text Length: {}", config.synthesis.max_text_length);
    tracing::info!("Max Chunk Chars: {}", config.synthesis.max_chunk_chars);
    tracing::info!("Use GPU: {}", config.synthesis.use_gpu);
    tracing::info!("Speakers Directory: {:?}", config.storage.speakers_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
