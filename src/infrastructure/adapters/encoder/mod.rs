//! Audio Encoder Adapter
//!
//! - wav: symphonia 解码 + PCM16 写出
//! - ogg_opus: libopus + OGG 封装
//! - mp3: LAME

mod mp3;
mod ogg_opus;
mod pcm;
mod pcm_encoder;
pub mod wav;

pub use pcm::PcmBuffer;
pub use pcm_encoder::{PcmEncoder, DEFAULT_BITRATE_KBPS};
