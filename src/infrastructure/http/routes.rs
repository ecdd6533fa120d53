//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping                   GET   健康检查
//! - /api/models                 GET   列出模型
//! - /api/speakers/{model_id}    GET   列出模型可用说话人
//! - /api/synthesize             POST  合成音频（表单）
//! - /api/download/{filename}    GET   下载缓存产物
//! - /api/speaker/list           GET   列出音色
//! - /api/speaker/upload         POST  上传音色（multipart）
//! - /api/speaker/delete         POST  删除音色

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/models", get(handlers::list_models))
        .route("/speakers/:model_id", get(handlers::list_model_speakers))
        .route("/synthesize", post(handlers::synthesize))
        .route("/download/:filename", get(handlers::download))
        .nest("/speaker", speaker_routes())
}

/// Speaker 路由
fn speaker_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/list", get(handlers::list_speakers))
        .route("/upload", post(handlers::upload_speaker))
        .route("/delete", post(handlers::delete_speaker))
}
