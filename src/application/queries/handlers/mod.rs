//! Query Handlers 实现

mod artifact_handlers;
mod model_handlers;
mod speaker_handlers;

pub use artifact_handlers::*;
pub use model_handlers::*;
pub use speaker_handlers::*;
