//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Synthesizer、ArtifactCache、SpeakerRegistry、AudioEncoder、Clock）
//! - backend_registry / inflight / voice_resolver / orchestrator: 合成流程的组成部分
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod backend_registry;
pub mod commands;
pub mod error;
pub mod inflight;
pub mod orchestrator;
pub mod ports;
pub mod queries;
pub mod voice_resolver;

// Re-exports
pub use backend_registry::BackendRegistry;
pub use inflight::{InFlightGuard, InFlightTable};
pub use orchestrator::{OrchestratorConfig, SynthesisOrchestrator, SynthesisOutcome, SynthesisPlan};
pub use voice_resolver::{resolve_reference, VoiceResolution};

pub use commands::{
    handlers::{
        CreateSpeakerHandler, DeleteSpeakerHandler, SynthesisDefaults, SynthesizeHandler,
        SynthesizeResponse,
    },
    CreateSpeaker, DeleteSpeaker, SynthesizeCommand,
};

pub use error::ApplicationError;

pub use ports::{
    ArtifactCachePort, AudioEncoderPort, CacheError, ChunkRequest, ClockPort, EncodeError,
    EncodedAudio, RawAudio, SpeakerRegistryPort, SpeakerStoreError, SweepReport, SynthesizerError,
    SynthesizerFactory, SynthesizerPort, SystemClock, VoiceSelection,
};

pub use queries::{
    handlers::{GetArtifactHandler, ListModelSpeakersHandler, ListModelsHandler, ListSpeakersHandler},
    GetArtifact, GetArtifactResponse, ListModelSpeakers, ListModels, ListSpeakers,
};
