//! Speaker Commands

/// 上传自定义音色
#[derive(Debug, Clone)]
pub struct CreateSpeaker {
    pub id: String,
    pub audio: Vec<u8>,
}

/// 删除自定义音色
#[derive(Debug, Clone)]
pub struct DeleteSpeaker {
    pub id: String,
}
