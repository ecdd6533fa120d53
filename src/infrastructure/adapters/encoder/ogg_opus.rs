//! Opus (OGG 容器) 编码，帧布局遵循 RFC 7845

use ogg::writing::PacketWriter;
use ogg::PacketWriteEndInfo;
use opus::{Application, Channels, Encoder};

use super::pcm::PcmBuffer;
use crate::application::ports::EncodeError;

/// 20ms 帧
const FRAME_MS: usize = 20;
const MAX_PACKET_SIZE: usize = 4000;
const GRANULE_RATE: u64 = 48000;
const VENDOR: &str = "chorus";

/// Opus 支持的输入采样率
fn compatible_sample_rate(sample_rate: u32) -> u32 {
    match sample_rate {
        8000 | 12000 | 16000 | 24000 | 48000 => sample_rate,
        r if r <= 8000 => 8000,
        r if r <= 12000 => 12000,
        r if r <= 16000 => 16000,
        r if r <= 24000 => 24000,
        _ => 48000,
    }
}

fn encoding_error(context: &str, e: impl std::fmt::Display) -> EncodeError {
    EncodeError::EncodingError(format!("{}: {}", context, e))
}

pub fn encode(pcm: PcmBuffer, bitrate: u32) -> Result<Vec<u8>, EncodeError> {
    // 仅支持单声道或立体声
    let channel_count: u16 = if pcm.channels == 1 { 1 } else { 2 };
    let target_rate = compatible_sample_rate(pcm.sample_rate);
    let pcm = pcm.conform(target_rate, channel_count);
    let sample_rate = pcm.sample_rate;
    let channels = if channel_count == 1 {
        Channels::Mono
    } else {
        Channels::Stereo
    };

    let mut encoder = Encoder::new(sample_rate, channels, Application::Voip)
        .map_err(|e| encoding_error("Failed to create Opus encoder", e))?;
    encoder
        .set_bitrate(opus::Bitrate::Bits(bitrate as i32))
        .map_err(|e| encoding_error("Failed to set bitrate", e))?;

    // 编码器 lookahead 作为 pre-skip
    let pre_skip = encoder.get_lookahead().map(|l| l as u16).unwrap_or(312);

    let frame_size = sample_rate as usize * FRAME_MS / 1000;
    let samples_per_frame = frame_size * channel_count as usize;

    // granule position 以 48kHz 计
    let granule_scale = GRANULE_RATE as f64 / sample_rate as f64;
    let frame_granule = (frame_size as f64 * granule_scale) as u64;
    let mut granule_pos = (pre_skip as f64 * granule_scale) as u64;

    // 额外的静音帧把编码器缓冲中的尾部样本冲出来
    let flush_frames = (pre_skip as usize).div_ceil(samples_per_frame).max(1);

    let mut ogg_data = Vec::new();
    {
        let mut writer = PacketWriter::new(&mut ogg_data);

        writer
            .write_packet(
                opus_head(channel_count as u8, sample_rate, pre_skip),
                0,
                PacketWriteEndInfo::EndPage,
                0,
            )
            .map_err(|e| encoding_error("Failed to write Opus head", e))?;
        writer
            .write_packet(opus_tags(), 0, PacketWriteEndInfo::EndPage, 0)
            .map_err(|e| encoding_error("Failed to write Opus tags", e))?;

        let mut output = vec![0u8; MAX_PACKET_SIZE];
        let silence = vec![0i16; samples_per_frame];
        let frames = pcm
            .samples
            .chunks(samples_per_frame)
            .map(|chunk| {
                // 末帧不足时补零
                let mut frame = chunk.to_vec();
                frame.resize(samples_per_frame, 0);
                frame
            })
            .chain(std::iter::repeat(silence).take(flush_frames));

        let total = pcm.samples.len().div_ceil(samples_per_frame) + flush_frames;
        for (index, frame) in frames.enumerate() {
            let len = encoder
                .encode(&frame, &mut output)
                .map_err(|e| encoding_error("Opus encode failed", e))?;
            granule_pos += frame_granule;

            let end_info = if index + 1 == total {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            writer
                .write_packet(output[..len].to_vec(), 0, end_info, granule_pos)
                .map_err(|e| encoding_error("Failed to write Opus packet", e))?;
        }
    }

    tracing::debug!(
        sample_rate,
        channels = channel_count,
        bitrate,
        size = ogg_data.len(),
        "Encoded to Opus"
    );

    Ok(ogg_data)
}

/// OpusHead 包
fn opus_head(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // output gain
    head.push(0); // mapping family
    head
}

/// OpusTags 包，无 user comment
fn opus_tags() -> Vec<u8> {
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(VENDOR.len() as u32).to_le_bytes());
    tags.extend_from_slice(VENDOR.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes());
    tags
}
