//! Synthesis HTTP Handlers

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Form,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::{GetArtifact, SynthesizeCommand};
use crate::infrastructure::http::dto::SynthesizeForm;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 缓存命中标记头
pub const X_CACHE: &str = "x-cache";

/// 合成音频，直接返回音频内容
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SynthesizeForm>,
) -> Result<Response, ApiError> {
    let command = SynthesizeCommand {
        text: form.text,
        model_id: form.model_id,
        language: form.language,
        speaker: form.speaker,
        format: form.fmt,
    };

    let result = state.synthesize_handler.handle(command).await?;

    tracing::info!(
        cache_key = %result.key,
        cache_hit = result.cache_hit,
        chunks = result.chunk_count,
        voice_fallback = result.voice_fallback,
        "Synthesis served"
    );

    let mut response = stream_file(
        &result.path,
        result.format.content_type(),
        &result.file_name(),
    )
    .await?;
    response.headers_mut().insert(
        X_CACHE,
        HeaderValue::from_static(if result.cache_hit { "hit" } else { "miss" }),
    );

    Ok(response)
}

/// 下载缓存产物
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let artifact = state
        .get_artifact_handler
        .handle(GetArtifact {
            filename: filename.clone(),
        })
        .await?;

    stream_file(&artifact.path, artifact.content_type(), &filename).await
}

/// 流式返回文件内容
async fn stream_file(
    path: &std::path::Path,
    content_type: &str,
    filename: &str,
) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open audio file: {}", e)))?;

    let file_size = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?
        .len();

    let body = Body::from_stream(ReaderStream::new(file));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
