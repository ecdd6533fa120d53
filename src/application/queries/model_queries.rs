//! Model Queries

/// 列出所有模型
#[derive(Debug, Clone)]
pub struct ListModels;

/// 列出模型可用的说话人
#[derive(Debug, Clone)]
pub struct ListModelSpeakers {
    pub model_id: String,
}
