//! Chorus - 多模型 TTS 合成服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Synthesis Context: 合成请求、输出格式、缓存 key
//! - Speaker Context: 音色标识与内置音色
//! - Model Context: 模型目录与能力描述
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Synthesizer, ArtifactCache, SpeakerRegistry, AudioEncoder, Clock）
//! - Orchestrator: 分块合成编排、后端注册表、同 key 请求去重
//! - Commands / Queries: CQRS 处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API
//! - Adapters: TTS 后端、音频编码、音色存储
//! - Persistence: 文件系统产物缓存
//! - Worker: 缓存清理

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
