//! 缓存 key 生成
//!
//! key = md5(len-prefixed 字段序列)，32 位十六进制。
//! 每个字段带长度前缀，字段之间的字符挪动也会改变 key。

use serde::Serialize;

use super::SynthesisRequest;

/// 缓存 key 长度（md5 十六进制）
pub const CACHE_KEY_LEN: usize = 32;

/// 内容寻址的缓存 key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// 由请求字段计算 key
    ///
    /// `voice` 为实际使用的音色标识（克隆模型下含样本版本），
    /// 不同样本合成的音频不会共用同一个 key
    pub fn for_request(request: &SynthesisRequest, voice: Option<&str>) -> Self {
        Self::compute(
            request.model_id(),
            request.language(),
            voice,
            request.text(),
            request.format().extension(),
        )
    }

    pub fn compute(
        model_id: &str,
        language: &str,
        speaker: Option<&str>,
        text: &str,
        format: &str,
    ) -> Self {
        let mut ctx = md5::Context::new();
        for field in [model_id, language, speaker.unwrap_or(""), text, format] {
            ctx.consume((field.len() as u64).to_le_bytes());
            ctx.consume(field.as_bytes());
        }
        // 区分 "未指定 speaker" 与 "speaker 为空串"
        ctx.consume([speaker.is_some() as u8]);

        Self(format!("{:x}", ctx.compute()))
    }

    /// 解析外部传入的 key（例如下载文件名）
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == CACHE_KEY_LEN
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::synthesis::RequestLimits;

    fn key(model: &str, lang: &str, speaker: Option<&str>, text: &str, fmt: &str) -> CacheKey {
        CacheKey::compute(model, lang, speaker, text, fmt)
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = key("xtts-v2", "en", Some("female-1"), "hello", "wav");
        let b = key("xtts-v2", "en", Some("female-1"), "hello", "wav");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), CACHE_KEY_LEN);
    }

    #[test]
    fn test_every_field_changes_key() {
        let base = key("xtts-v2", "en", Some("female-1"), "hello", "wav");
        assert_ne!(base, key("tacotron-en", "en", Some("female-1"), "hello", "wav"));
        assert_ne!(base, key("xtts-v2", "ru", Some("female-1"), "hello", "wav"));
        assert_ne!(base, key("xtts-v2", "en", Some("male-1"), "hello", "wav"));
        assert_ne!(base, key("xtts-v2", "en", None, "hello", "wav"));
        assert_ne!(base, key("xtts-v2", "en", Some("female-1"), "hello!", "wav"));
        assert_ne!(base, key("xtts-v2", "en", Some("female-1"), "hello", "mp3"));
    }

    #[test]
    fn test_field_boundaries_matter() {
        assert_ne!(key("ab", "c", None, "x", "wav"), key("a", "bc", None, "x", "wav"));
    }

    #[test]
    fn test_request_key_uses_normalized_text() {
        let limits = RequestLimits::default();
        let a = SynthesisRequest::new("hello  world", "xtts-v2", "en", None, "wav", &limits).unwrap();
        let b = SynthesisRequest::new("hello world ", "xtts-v2", "en", None, "wav", &limits).unwrap();
        assert_eq!(
            CacheKey::for_request(&a, Some("female-1")),
            CacheKey::for_request(&b, Some("female-1"))
        );
        assert_ne!(
            CacheKey::for_request(&a, Some("female-1")),
            CacheKey::for_request(&a, Some("female-2"))
        );
    }

    #[test]
    fn test_parse_rejects_non_keys() {
        let k = key("xtts-v2", "en", None, "hi", "wav");
        assert_eq!(CacheKey::parse(k.as_str()), Some(k));
        assert!(CacheKey::parse("../../etc/passwd").is_none());
        assert!(CacheKey::parse("ABCDEF").is_none());
    }
}
