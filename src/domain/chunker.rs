//! 文本分块器
//!
//! TTS 后端单次输入长度有限，超长文本按空白切分后贪心打包为若干块。
//! 单个超长 token 不拆分，单独成为一个超长块。

use serde::Serialize;

/// 文本块
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextChunk {
    /// 块序号（从 0 开始，保持原文顺序）
    pub index: usize,
    pub text: String,
}

impl TextChunk {
    fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }

    /// 字符数
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// 将文本切分为长度不超过 `max_len` 个字符的块
///
/// - 文本本身不超过 `max_len` 时原样返回一个块
/// - 否则按空白切分 token，贪心打包，token 之间用单个空格连接
/// - 块的顺序即 token 原始顺序
pub fn split(text: &str, max_len: usize) -> Vec<TextChunk> {
    let max_len = max_len.max(1);

    if text.trim().is_empty() {
        return Vec::new();
    }

    if text.chars().count() <= max_len {
        return vec![TextChunk::new(0, text.to_string())];
    }

    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_len = 0usize;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();

        if !buffer.is_empty() && buffer_len + token_len + 1 > max_len {
            chunks.push(TextChunk::new(chunks.len(), std::mem::take(&mut buffer)));
            buffer_len = 0;
        }

        if !buffer.is_empty() {
            buffer.push(' ');
            buffer_len += 1;
        }
        buffer.push_str(token);
        buffer_len += token_len;
    }

    if !buffer.is_empty() {
        chunks.push(TextChunk::new(chunks.len(), buffer));
    }

    chunks
}

/// 用单个空格重新拼接所有块
pub fn join(chunks: &[TextChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
