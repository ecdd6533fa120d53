//! Tone Synthesizer - 本地确定性后端
//!
//! 不调用任何模型，按文本长度生成正弦波 WAV。用于开发环境与测试：
//! 相同输入总是得到相同输出，音高由音色决定。

use async_trait::async_trait;
use std::f32::consts::PI;
use std::sync::Arc;

use crate::application::ports::{
    ChunkRequest, RawAudio, SynthesizerError, SynthesizerFactory, SynthesizerPort, VoiceSelection,
};
use crate::domain::model::ModelSpec;
use crate::infrastructure::adapters::encoder::wav;

/// Tone 后端配置
#[derive(Debug, Clone)]
pub struct ToneSynthesizerConfig {
    pub sample_rate: u32,
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u32,
}

impl Default for ToneSynthesizerConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            ms_per_char: 60,
        }
    }
}

pub struct ToneSynthesizer {
    config: ToneSynthesizerConfig,
    speakers: Vec<String>,
}

impl ToneSynthesizer {
    pub fn new(config: ToneSynthesizerConfig, speakers: Vec<String>) -> Self {
        Self { config, speakers }
    }

    /// 由音色推导音高，同一音色固定
    fn frequency(voice: &VoiceSelection) -> f32 {
        let seed = match voice {
            VoiceSelection::None => return 220.0,
            VoiceSelection::Named(name) => name.as_bytes().to_vec(),
            VoiceSelection::Reference(path) => path.to_string_lossy().as_bytes().to_vec(),
        };
        let digest = md5::compute(seed);
        220.0 + (digest[0] as f32 / 255.0) * 220.0
    }

    fn render(&self, text: &str, frequency: f32) -> Vec<i16> {
        let chars = text.chars().count().max(1) as u64;
        let frames = (chars * self.config.ms_per_char as u64 * self.config.sample_rate as u64 / 1000) as usize;
        let rate = self.config.sample_rate as f32;

        (0..frames)
            .map(|i| {
                let t = i as f32 / rate;
                ((2.0 * PI * frequency * t).sin() * 0.3 * i16::MAX as f32) as i16
            })
            .collect()
    }
}

#[async_trait]
impl SynthesizerPort for ToneSynthesizer {
    async fn synthesize_chunk(&self, request: ChunkRequest) -> Result<RawAudio, SynthesizerError> {
        if request.text.trim().is_empty() {
            return Err(SynthesizerError::ServiceError("Empty text".to_string()));
        }

        let samples = self.render(&request.text, Self::frequency(&request.voice));
        Ok(RawAudio(wav::encode_pcm16(&samples, self.config.sample_rate, 1)))
    }

    async fn speakers(&self) -> Vec<String> {
        self.speakers.clone()
    }
}

pub struct ToneSynthesizerFactory {
    config: ToneSynthesizerConfig,
}

impl ToneSynthesizerFactory {
    pub fn new(config: ToneSynthesizerConfig) -> Self {
        Self { config }
    }
}

impl Default for ToneSynthesizerFactory {
    fn default() -> Self {
        Self::new(ToneSynthesizerConfig::default())
    }
}

#[async_trait]
impl SynthesizerFactory for ToneSynthesizerFactory {
    async fn create(
        &self,
        model: &ModelSpec,
        _use_gpu: bool,
    ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
        tracing::debug!(model_id = %model.id, "Creating tone synthesizer");
        Ok(Arc::new(ToneSynthesizer::new(
            self.config.clone(),
            model.speakers.clone(),
        )))
    }
}
