//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_cache;
mod audio_encoder;
mod clock;
mod speaker_registry;
mod synthesizer;

pub use artifact_cache::{ArtifactCachePort, CacheError, SweepReport};
pub use audio_encoder::{AudioEncoderPort, EncodeError, EncodedAudio};
pub use clock::{ClockPort, SystemClock};
#[cfg(test)]
pub use clock::ManualClock;
pub use speaker_registry::{SpeakerRegistryPort, SpeakerSample, SpeakerStoreError};
pub use synthesizer::{
    ChunkRequest, RawAudio, SynthesizerError, SynthesizerFactory, SynthesizerPort, VoiceSelection,
};
