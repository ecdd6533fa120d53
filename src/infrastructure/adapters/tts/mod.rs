//! TTS Adapter - 合成后端实现
//!
//! - http: 外部 TTS HTTP 服务
//! - tone: 本地确定性正弦波，开发与测试用

mod http_synthesizer;
mod tone_synthesizer;

pub use http_synthesizer::{HttpSynthesizer, HttpSynthesizerConfig, HttpSynthesizerFactory};
pub use tone_synthesizer::{ToneSynthesizer, ToneSynthesizerConfig, ToneSynthesizerFactory};
