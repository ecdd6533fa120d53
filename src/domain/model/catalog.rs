//! 模型目录
//!
//! 每个模型在注册时附带能力描述，调用方按描述决定是否传入 language / speaker，
//! 不在每次调用时探测后端。

use serde::Serialize;

/// 模型能力描述
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// 后端需要显式 language 参数
    pub requires_language: bool,
    /// 后端按名称选择说话人
    pub supports_named_speaker: bool,
    /// 后端以参考音频克隆音色
    pub supports_voice_cloning: bool,
}

/// 模型配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    /// 对外模型 id
    pub id: String,
    /// 后端模型名
    pub backend_name: String,
    pub label: String,
    pub languages: Vec<String>,
    pub capabilities: Capabilities,
    /// 后端内置的具名说话人（supports_named_speaker 时使用，首个为默认）
    pub speakers: Vec<String>,
}

impl ModelSpec {
    pub fn supports_language(&self, language: &str) -> bool {
        self.languages.iter().any(|l| l == language)
    }
}

/// 默认模型 id
pub const DEFAULT_MODEL_ID: &str = "xtts-v2";

/// 模型目录
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelSpec>,
    default_id: String,
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelSpec>, default_id: impl Into<String>) -> Self {
        Self {
            models,
            default_id: default_id.into(),
        }
    }

    /// 内置模型目录
    pub fn builtin() -> Self {
        fn model(
            id: &str,
            backend: &str,
            label: &str,
            langs: &[&str],
            caps: Capabilities,
        ) -> ModelSpec {
            ModelSpec {
                id: id.to_string(),
                backend_name: backend.to_string(),
                label: label.to_string(),
                languages: langs.iter().map(|l| l.to_string()).collect(),
                capabilities: caps,
                speakers: Vec::new(),
            }
        }

        Self::new(
            vec![
                model(
                    "tacotron-en",
                    "tts_models/en/ljspeech/tacotron2-DDC",
                    "Tacotron 2 (English)",
                    &["en"],
                    Capabilities::default(),
                ),
                model(
                    "tacotron-ru",
                    "tts_models/ru/mai/tacotron2",
                    "Tacotron 2 (Russian)",
                    &["ru"],
                    Capabilities::default(),
                ),
                model(
                    "xtts-v2",
                    "tts_models/multilingual/multi-dataset/xtts_v2",
                    "XTTS v2 (Multilingual)",
                    &[
                        "en", "ru", "de", "es", "fr", "it", "pt", "pl", "tr", "ko", "nl", "cs",
                        "ar", "zh-cn", "ja", "hu",
                    ],
                    Capabilities {
                        requires_language: true,
                        supports_named_speaker: false,
                        supports_voice_cloning: true,
                    },
                ),
            ],
            DEFAULT_MODEL_ID,
        )
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn get(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }

    /// 解析模型 id
    ///
    /// 兼容旧的语言代码 id（`en` / `ru`），其他未知 id 回退到默认模型。
    /// 返回 (模型, 是否发生回退)。
    pub fn resolve(&self, id: &str) -> Option<(&ModelSpec, bool)> {
        if let Some(model) = self.get(id) {
            return Some((model, false));
        }

        let alias = match id {
            "en" => Some("tacotron-en"),
            "ru" => Some("tacotron-ru"),
            _ => None,
        };
        if let Some(model) = alias.and_then(|a| self.get(a)) {
            return Some((model, false));
        }

        self.get(&self.default_id).map(|m| (m, true))
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
