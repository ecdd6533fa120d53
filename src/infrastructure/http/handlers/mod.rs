//! HTTP Handlers

mod models;
mod ping;
mod speaker;
mod synthesize;

pub use models::*;
pub use ping::*;
pub use speaker::*;
pub use synthesize::*;
