//! Synthesis Context - 合成请求上下文
//!
//! 职责:
//! - 请求准入校验
//! - 输出格式
//! - 内容寻址缓存 key

mod cache_key;
mod errors;
mod value_objects;

pub use cache_key::{CacheKey, CACHE_KEY_LEN};
pub use errors::RequestError;
pub use value_objects::{normalize_whitespace, OutputFormat, RequestLimits, SynthesisRequest};
