//! Storage Adapter - 文件系统存储

mod speaker_store;

pub use speaker_store::FileSpeakerRegistry;
