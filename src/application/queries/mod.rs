//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：处理所有读操作

mod artifact_queries;
mod model_queries;
mod speaker_queries;

pub mod handlers;

pub use artifact_queries::*;
pub use model_queries::*;
pub use speaker_queries::*;
