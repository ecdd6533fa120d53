//! PCM Encoder - 解码、拼接、编码
//!
//! 后端返回的每个 WAV 片段先解码为 PCM，对齐到第一个片段的采样率与声道，
//! 拼接后编码为目标容器。编解码是 CPU 密集操作，放在 blocking 线程池执行。

use async_trait::async_trait;

use super::pcm::PcmBuffer;
use super::{mp3, ogg_opus, wav};
use crate::application::ports::{AudioEncoderPort, EncodeError, EncodedAudio, RawAudio};
use crate::domain::synthesis::OutputFormat;

/// 默认码率（kbps）
pub const DEFAULT_BITRATE_KBPS: u32 = 64;

pub struct PcmEncoder {
    /// 有损格式码率（kbps）
    bitrate_kbps: u32,
}

impl PcmEncoder {
    pub fn new(bitrate_kbps: u32) -> Self {
        Self { bitrate_kbps }
    }
}

impl Default for PcmEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_BITRATE_KBPS)
    }
}

fn encode_blocking(
    segments: Vec<RawAudio>,
    format: OutputFormat,
    bitrate_kbps: u32,
) -> Result<EncodedAudio, EncodeError> {
    let decoded = segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            wav::decode(segment.as_bytes()).map_err(|e| match e {
                EncodeError::InvalidInput(msg) | EncodeError::DecodingError(msg) => {
                    EncodeError::DecodingError(format!("segment {}: {}", index, msg))
                }
                other => other,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pcm = PcmBuffer::concat(decoded)
        .ok_or_else(|| EncodeError::InvalidInput("No audio segments".to_string()))?;
    let duration_ms = pcm.duration_ms();
    let sample_rate = pcm.sample_rate;
    let channels = pcm.channels as u8;

    let data = match format {
        OutputFormat::Wav => wav::encode(&pcm),
        OutputFormat::Opus => ogg_opus::encode(pcm, bitrate_kbps * 1000)?,
        OutputFormat::Mp3 => mp3::encode(pcm, bitrate_kbps)?,
    };

    Ok(EncodedAudio {
        data,
        format,
        duration_ms,
        sample_rate,
        channels,
    })
}

#[async_trait]
impl AudioEncoderPort for PcmEncoder {
    async fn encode(
        &self,
        segments: Vec<RawAudio>,
        format: OutputFormat,
    ) -> Result<EncodedAudio, EncodeError> {
        let count = segments.len();
        let bitrate_kbps = self.bitrate_kbps;

        let encoded = tokio::task::spawn_blocking(move || {
            encode_blocking(segments, format, bitrate_kbps)
        })
        .await
        .map_err(|e| EncodeError::EncodingError(format!("Encoder task failed: {}", e)))??;

        tracing::debug!(
            segments = count,
            format = %format,
            duration_ms = encoded.duration_ms,
            size = encoded.data.len(),
            "Audio encoded"
        );

        Ok(encoded)
    }

    fn supports_format(&self, format: OutputFormat) -> bool {
        OutputFormat::ALL.contains(&format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(value: i16, frames: usize, rate: u32) -> RawAudio {
        RawAudio(wav::encode_pcm16(&vec![value; frames], rate, 1))
    }

    #[tokio::test]
    async fn test_wav_concatenation_preserves_order() {
        let encoder = PcmEncoder::default();
        let encoded = encoder
            .encode(
                vec![tone(1, 160, 16000), tone(2, 160, 16000), tone(3, 160, 16000)],
                OutputFormat::Wav,
            )
            .await
            .unwrap();

        assert_eq!(encoded.duration_ms, 30);
        let pcm = wav::decode(&encoded.data).unwrap();
        assert_eq!(pcm.samples.len(), 480);
        assert_eq!(pcm.samples[0], 1);
        assert_eq!(pcm.samples[200], 2);
        assert_eq!(pcm.samples[479], 3);
    }

    #[tokio::test]
    async fn test_mismatched_rates_are_conformed() {
        let encoder = PcmEncoder::default();
        let encoded = encoder
            .encode(
                vec![tone(5, 1600, 16000), tone(5, 3200, 32000)],
                OutputFormat::Wav,
            )
            .await
            .unwrap();

        assert_eq!(encoded.sample_rate, 16000);
        assert_eq!(encoded.duration_ms, 200);
    }

    #[tokio::test]
    async fn test_lossy_formats() {
        let encoder = PcmEncoder::default();
        let segments = vec![tone(100, 22050, 22050)];

        let opus = encoder.encode(segments.clone(), OutputFormat::Opus).await.unwrap();
        assert_eq!(&opus.data[0..4], b"OggS");

        let mp3 = encoder.encode(segments, OutputFormat::Mp3).await.unwrap();
        assert!(!mp3.data.is_empty());
        assert_eq!(mp3.format, OutputFormat::Mp3);
    }

    #[tokio::test]
    async fn test_invalid_segment_is_decoding_error() {
        let encoder = PcmEncoder::default();
        let err = encoder
            .encode(
                vec![tone(1, 160, 16000), RawAudio(b"garbage".to_vec())],
                OutputFormat::Wav,
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("segment 1"));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let encoder = PcmEncoder::default();
        assert!(matches!(
            encoder.encode(Vec::new(), OutputFormat::Wav).await,
            Err(EncodeError::InvalidInput(_))
        ));
    }
}
