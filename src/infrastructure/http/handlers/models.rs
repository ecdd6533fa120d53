//! Model HTTP Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{ListModelSpeakers, ListModels};
use crate::infrastructure::http::dto::{ApiResponse, ModelResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 列出模型
pub async fn list_models(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ModelResponse>>>, ApiError> {
    let models = state.list_models_handler.handle(ListModels).await?;
    Ok(Json(ApiResponse::success(
        models.into_iter().map(ModelResponse::from).collect(),
    )))
}

/// 列出模型可用的说话人
pub async fn list_model_speakers(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let speakers = state
        .list_model_speakers_handler
        .handle(ListModelSpeakers { model_id })
        .await?;
    Ok(Json(ApiResponse::success(speakers)))
}
