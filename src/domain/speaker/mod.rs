//! Speaker Context - 音色上下文
//!
//! 内置音色 + 用户上传的参考音频

mod errors;
mod value_objects;

pub use errors::SpeakerIdError;
pub use value_objects::{
    builtin_ids, builtin_label, SpeakerId, VoiceReference, BUILTIN_SPEAKERS, MAX_SPEAKER_ID_LEN,
    SPEAKER_AUDIO_EXT,
};
