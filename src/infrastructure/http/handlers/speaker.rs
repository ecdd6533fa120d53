//! Speaker HTTP Handlers

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::sync::Arc;

use crate::application::{CreateSpeaker, DeleteSpeaker, ListSpeakers};
use crate::infrastructure::http::dto::{
    ApiResponse, DeleteSpeakerRequest, DeleteSpeakerResponse, SpeakerResponse,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出音色
pub async fn list_speakers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<SpeakerResponse>>>, ApiError> {
    let speakers = state.list_speakers_handler.handle(ListSpeakers).await?;
    Ok(Json(ApiResponse::success(
        speakers.into_iter().map(SpeakerResponse::from).collect(),
    )))
}

/// 上传音色参考音频
///
/// multipart 字段: `id`（音色 id）、`file`（WAV 音频）
pub async fn upload_speaker(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<SpeakerResponse>>, ApiError> {
    let mut id: Option<String> = None;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "id" => {
                id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read id: {}", e)))?,
                );
            }
            "file" => {
                if let Some(ext) = field
                    .file_name()
                    .and_then(|f| std::path::Path::new(f).extension())
                    .and_then(|e| e.to_str())
                {
                    if !ext.eq_ignore_ascii_case("wav") {
                        return Err(ApiError::BadRequest(
                            "Only WAV audio files are allowed".to_string(),
                        ));
                    }
                }

                audio = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let id = id.ok_or_else(|| ApiError::BadRequest("Speaker id is required".to_string()))?;
    let audio = audio.ok_or_else(|| ApiError::BadRequest("Audio file is required".to_string()))?;

    let speaker = state
        .create_speaker_handler
        .handle(CreateSpeaker {
            id: id.trim().to_string(),
            audio,
        })
        .await?;

    Ok(Json(ApiResponse::success(SpeakerResponse::from(speaker))))
}

/// 删除自定义音色
pub async fn delete_speaker(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteSpeakerRequest>,
) -> Result<Json<ApiResponse<DeleteSpeakerResponse>>, ApiError> {
    let deleted = state
        .delete_speaker_handler
        .handle(DeleteSpeaker { id: req.id.clone() })
        .await?;

    Ok(Json(ApiResponse::success(DeleteSpeakerResponse {
        id: req.id,
        deleted,
    })))
}
