//! Synthesis Commands

/// 合成命令
///
/// 字段均为外部原始输入，缺省值由 handler 补齐
#[derive(Debug, Clone, Default)]
pub struct SynthesizeCommand {
    pub text: String,
    pub model_id: Option<String>,
    pub language: Option<String>,
    pub speaker: Option<String>,
    pub format: Option<String>,
}
