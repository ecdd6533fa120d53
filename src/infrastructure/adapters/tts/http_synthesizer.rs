//! HTTP Synthesizer - 调用外部 TTS HTTP 服务
//!
//! 外部 TTS API:
//! POST {base_url}/api/tts
//! Request: {"model": "...", "text": "...", "language": "en", "speaker": "...", "speaker_wav": "...", "gpu": false}
//! Response: audio/wav binary
//!
//! GET {base_url}/api/speakers?model=...
//! Response: ["p225", "p226", ...]

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    ChunkRequest, RawAudio, SynthesizerError, SynthesizerFactory, SynthesizerPort, VoiceSelection,
};
use crate::domain::model::ModelSpec;

/// TTS 推理请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    /// 后端模型名
    model: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    /// 具名说话人
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker: Option<&'a str>,
    /// 参考音频路径（TTS 服务与本服务共享文件系统）
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_wav: Option<String>,
    gpu: bool,
}

/// HTTP 后端配置
#[derive(Debug, Clone)]
pub struct HttpSynthesizerConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSynthesizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5002".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpSynthesizerConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn map_send_error(e: reqwest::Error) -> SynthesizerError {
    if e.is_timeout() {
        SynthesizerError::Timeout
    } else if e.is_connect() {
        SynthesizerError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        SynthesizerError::NetworkError(e.to_string())
    }
}

/// 单个模型的 HTTP 后端
pub struct HttpSynthesizer {
    client: Client,
    base_url: String,
    backend_name: String,
    use_gpu: bool,
}

impl HttpSynthesizer {
    fn tts_url(&self) -> String {
        format!("{}/api/tts", self.base_url)
    }

    fn speakers_url(&self) -> String {
        format!("{}/api/speakers", self.base_url)
    }
}

#[async_trait]
impl SynthesizerPort for HttpSynthesizer {
    async fn synthesize_chunk(&self, request: ChunkRequest) -> Result<RawAudio, SynthesizerError> {
        let (speaker, speaker_wav) = match &request.voice {
            VoiceSelection::None => (None, None),
            VoiceSelection::Named(name) => (Some(name.as_str()), None),
            VoiceSelection::Reference(path) => (None, Some(path.to_string_lossy().to_string())),
        };

        let body = TtsHttpRequest {
            model: &self.backend_name,
            text: &request.text,
            language: request.language.as_deref(),
            speaker,
            speaker_wav,
            gpu: self.use_gpu,
        };

        tracing::debug!(
            url = %self.tts_url(),
            model = %self.backend_name,
            text_len = request.text.len(),
            "Sending TTS request"
        );

        let response = self
            .client
            .post(self.tts_url())
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesizerError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesizerError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio.is_empty() {
            return Err(SynthesizerError::InvalidResponse("Empty audio body".to_string()));
        }

        Ok(RawAudio(audio))
    }

    async fn speakers(&self) -> Vec<String> {
        let result = self
            .client
            .get(self.speakers_url())
            .query(&[("model", self.backend_name.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(model = %self.backend_name, error = %e, "Failed to fetch speakers");
                return Vec::new();
            }
        };

        match response.json::<Vec<String>>().await {
            Ok(speakers) => speakers,
            Err(e) => {
                tracing::warn!(model = %self.backend_name, error = %e, "Invalid speakers response");
                Vec::new()
            }
        }
    }
}

/// HTTP 后端工厂，所有模型共享同一个连接池
pub struct HttpSynthesizerFactory {
    client: Client,
    config: HttpSynthesizerConfig,
}

impl HttpSynthesizerFactory {
    pub fn new(config: HttpSynthesizerConfig) -> Result<Self, SynthesizerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesizerError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl SynthesizerFactory for HttpSynthesizerFactory {
    async fn create(
        &self,
        model: &ModelSpec,
        use_gpu: bool,
    ) -> Result<Arc<dyn SynthesizerPort>, SynthesizerError> {
        tracing::debug!(
            base_url = %self.config.base_url,
            model = %model.backend_name,
            "Creating HTTP synthesizer"
        );

        Ok(Arc::new(HttpSynthesizer {
            client: self.client.clone(),
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            backend_name: model.backend_name.clone(),
            use_gpu,
        }))
    }
}
