//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：合成请求与音色管理

mod speaker_commands;
mod synthesis_commands;

pub mod handlers;

pub use speaker_commands::*;
pub use synthesis_commands::*;
