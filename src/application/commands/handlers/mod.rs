//! Command Handlers 实现

mod speaker_handlers;
mod synthesis_handlers;

pub use speaker_handlers::*;
pub use synthesis_handlers::*;
