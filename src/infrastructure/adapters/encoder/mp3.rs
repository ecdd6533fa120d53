//! MP3 编码 (LAME)

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};

use super::pcm::PcmBuffer;
use crate::application::ports::EncodeError;

/// flush 所需的最大输出
const FLUSH_RESERVE: usize = 7200;

/// LAME 支持的采样率
fn compatible_sample_rate(sample_rate: u32) -> u32 {
    const RATES: [u32; 9] = [8000, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000];
    RATES
        .iter()
        .copied()
        .find(|&r| r >= sample_rate)
        .unwrap_or(48000)
}

/// 取不超过目标值的最近档位
fn bitrate_for(kbps: u32) -> Bitrate {
    match kbps {
        0..=47 => Bitrate::Kbps32,
        48..=79 => Bitrate::Kbps64,
        80..=111 => Bitrate::Kbps96,
        112..=159 => Bitrate::Kbps128,
        _ => Bitrate::Kbps192,
    }
}

fn encoding_error(context: &str, e: impl std::fmt::Debug) -> EncodeError {
    EncodeError::EncodingError(format!("{}: {:?}", context, e))
}

pub fn encode(pcm: PcmBuffer, bitrate_kbps: u32) -> Result<Vec<u8>, EncodeError> {
    let channel_count: u16 = if pcm.channels == 1 { 1 } else { 2 };
    let target_rate = compatible_sample_rate(pcm.sample_rate);
    let pcm = pcm.conform(target_rate, channel_count);

    let mut builder = Builder::new()
        .ok_or_else(|| EncodeError::EncodingError("Failed to create LAME builder".to_string()))?;
    builder
        .set_num_channels(channel_count as u8)
        .map_err(|e| encoding_error("Failed to set channels", e))?;
    builder
        .set_sample_rate(pcm.sample_rate)
        .map_err(|e| encoding_error("Failed to set sample rate", e))?;
    builder
        .set_brate(bitrate_for(bitrate_kbps))
        .map_err(|e| encoding_error("Failed to set bitrate", e))?;
    builder
        .set_quality(Quality::Good)
        .map_err(|e| encoding_error("Failed to set quality", e))?;
    let mut encoder = builder
        .build()
        .map_err(|e| encoding_error("Failed to initialize LAME", e))?;

    let frames = pcm.frames();
    let mut out: Vec<u8> = Vec::new();
    out.reserve(mp3lame_encoder::max_required_buffer_size(frames));

    if channel_count == 1 {
        encoder.encode_to_vec(MonoPcm(pcm.samples.as_slice()), &mut out)
    } else {
        encoder.encode_to_vec(InterleavedPcm(pcm.samples.as_slice()), &mut out)
    }
    .map_err(|e| encoding_error("MP3 encode failed", e))?;

    out.reserve(FLUSH_RESERVE);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(|e| encoding_error("MP3 flush failed", e))?;

    tracing::debug!(
        sample_rate = pcm.sample_rate,
        channels = channel_count,
        bitrate_kbps,
        size = out.len(),
        "Encoded to MP3"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatible_rates() {
        assert_eq!(compatible_sample_rate(22050), 22050);
        assert_eq!(compatible_sample_rate(20000), 22050);
        assert_eq!(compatible_sample_rate(96000), 48000);
    }

    #[test]
    fn test_bitrate_steps() {
        assert!(matches!(bitrate_for(64), Bitrate::Kbps64));
        assert!(matches!(bitrate_for(500), Bitrate::Kbps192));
    }

    #[test]
    fn test_encode_mono() {
        let pcm = PcmBuffer {
            samples: (0..22050).map(|i| ((i % 100) * 100) as i16).collect(),
            sample_rate: 22050,
            channels: 1,
        };
        let data = encode(pcm, 64).unwrap();
        assert!(!data.is_empty());
        assert!(data.len() < 44100);
    }

    #[test]
    fn test_encode_stereo_produces_mp3_stream() {
        let pcm = PcmBuffer {
            samples: (0..2 * 16000).map(|i| ((i % 64) * 200) as i16).collect(),
            sample_rate: 16000,
            channels: 2,
        };
        let data = encode(pcm, 96).unwrap();

        let frame_sync = data.len() > 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0;
        assert!(frame_sync || data.starts_with(b"ID3"));
    }
}
