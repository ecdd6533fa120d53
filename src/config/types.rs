//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::model::DEFAULT_MODEL_ID;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// 产物缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 合成配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// TTS 后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub log: LogConfig,
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// 产物存活时间（秒）
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// 后台清理间隔（秒），0 表示不启动清理任务
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data/cache")
}

fn default_ttl_secs() -> u64 {
    86400
}

fn default_sweep_interval() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

// ============================================================================
// Synthesis
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 单次请求文本最大字符数
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// 单块最大字符数
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// 同一请求内并发的后端调用数
    #[serde(default = "default_chunk_concurrency")]
    pub chunk_concurrency: usize,

    #[serde(default)]
    pub use_gpu: bool,

    /// 启动时预加载的模型
    #[serde(default = "default_model")]
    pub preload_model: Option<String>,

    /// 请求未指定模型时使用
    #[serde(default = "default_model_id")]
    pub default_model: String,
}

fn default_max_text_length() -> usize {
    1000
}

fn default_max_chunk_chars() -> usize {
    250
}

fn default_chunk_concurrency() -> usize {
    1
}

fn default_model() -> Option<String> {
    Some(DEFAULT_MODEL_ID.to_string())
}

fn default_model_id() -> String {
    DEFAULT_MODEL_ID.to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            max_chunk_chars: default_max_chunk_chars(),
            chunk_concurrency: default_chunk_concurrency(),
            use_gpu: false,
            preload_model: default_model(),
            default_model: default_model_id(),
        }
    }
}

// ============================================================================
// Backend
// ============================================================================

/// 后端类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// 远程 TTS 服务
    #[default]
    Http,
    /// 本地正弦波合成（开发与测试）
    Tone,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_backend_url")]
    pub url: String,

    /// 单块请求超时（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:5002".to_string()
}

fn default_backend_timeout() -> u64 {
    120
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 参考音频目录
    #[serde(default = "default_speakers_dir")]
    pub speakers_dir: PathBuf,

    /// 合成临时目录
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,

    /// 上传大小上限（字节）
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_speakers_dir() -> PathBuf {
    PathBuf::from("data/speakers")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("data/work")
}

fn default_max_upload_size() -> usize {
    20 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            speakers_dir: default_speakers_dir(),
            work_dir: default_work_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

// ============================================================================
// Audio
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 有损编码码率（kbps）
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

fn default_bitrate() -> u32 {
    64
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            bitrate: default_bitrate(),
        }
    }
}

// ============================================================================
// Log
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// EnvFilter 指令，如 `info` 或 `chorus=debug,tower_http=info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 输出 JSON 格式日志
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
