use crate::config::toml_config::BackendConfig;
use crate::core::audio::encode_base64;
use crate::core::SpeechBackend;
use crate::domain::model::{DeviceProfile, LoadedModel, SynthesisJob, Waveform};
use crate::utils::error::{BridgeError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct LoadModelBody<'a> {
    model_id: &'a str,
    device: &'a str,
    dtype: &'a str,
    attn_implementation: &'a str,
}

#[derive(Debug, Serialize)]
struct SynthesisBody<'a> {
    model_id: &'a str,
    text: &'a str,
    language: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruct: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ref_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    x_vector_only_mode: Option<bool>,
}

impl<'a> SynthesisBody<'a> {
    fn from_job(model_id: &'a str, job: &'a SynthesisJob) -> Self {
        match job {
            SynthesisJob::CustomVoice {
                text,
                language,
                speaker,
                instruct,
            } => Self {
                model_id,
                text,
                language,
                speaker: Some(speaker.as_str()),
                instruct: instruct.as_deref(),
                ref_audio: None,
                ref_text: None,
                x_vector_only_mode: None,
            },
            SynthesisJob::VoiceDesign {
                text,
                language,
                instruct,
            } => Self {
                model_id,
                text,
                language,
                speaker: None,
                instruct: Some(instruct.as_str()),
                ref_audio: None,
                ref_text: None,
                x_vector_only_mode: None,
            },
            SynthesisJob::VoiceClone {
                text,
                language,
                ref_audio,
                ref_text,
                x_vector_only,
            } => Self {
                model_id,
                text,
                language,
                speaker: None,
                instruct: None,
                ref_audio: Some(encode_base64(ref_audio)),
                ref_text: ref_text.as_deref(),
                x_vector_only_mode: Some(*x_vector_only),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct HealthReply {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SynthesisReply {
    #[serde(default)]
    waveforms: Vec<Vec<f32>>,
    #[serde(default)]
    sample_rate: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// 透過 HTTP 呼叫模型推論服務
#[derive(Debug, Clone)]
pub struct HttpSpeechBackend {
    client: Client,
    base_url: String,
    headers: HashMap<String, String>,
}

impl HttpSpeechBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers: config.headers.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_headers(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        request
    }

    /// 非 2xx 回應：優先使用 JSON 的 `error`/`detail`，否則用原始內容
    async fn error_from(response: Response) -> BridgeError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorReply>(&body)
            .ok()
            .and_then(|reply| reply.error.or(reply.detail))
            .unwrap_or_else(|| {
                let trimmed = body.trim();
                if trimmed.is_empty() {
                    format!("backend returned HTTP {}", status)
                } else {
                    trimmed.to_string()
                }
            });

        BridgeError::BackendError {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl SpeechBackend for HttpSpeechBackend {
    async fn probe(&self) -> Result<()> {
        let url = self.endpoint("health");
        tracing::debug!("Probing speech backend: {}", url);

        let response = self
            .with_headers(self.client.get(&url))
            .send()
            .await
            .map_err(|e| BridgeError::BackendUnavailable {
                message: format!("speech backend unreachable at {}: {}", self.base_url, e),
            })?;

        tracing::debug!("Health response status: {}", response.status());

        if !response.status().is_success() {
            let err = Self::error_from(response).await;
            return Err(BridgeError::BackendUnavailable {
                message: err.to_string(),
            });
        }

        let reply: HealthReply = response.json().await?;
        if reply.status == "ok" {
            Ok(())
        } else {
            Err(BridgeError::BackendUnavailable {
                message: reply
                    .error
                    .unwrap_or_else(|| format!("backend reported status '{}'", reply.status)),
            })
        }
    }

    async fn load_model(&self, model_id: &str, device: &DeviceProfile) -> Result<LoadedModel> {
        let body = LoadModelBody {
            model_id,
            device: &device.device,
            dtype: device.dtype.as_str(),
            attn_implementation: &device.attn_implementation,
        };

        tracing::debug!("Loading model {} on {}", model_id, device.device);
        let response = self
            .with_headers(self.client.post(self.endpoint("v1/models/load")))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let loaded: LoadedModel = response.json().await?;
        tracing::info!("📦 Model ready: {}", loaded.model_id);
        Ok(loaded)
    }

    async fn synthesize(&self, model: &LoadedModel, job: &SynthesisJob) -> Result<Waveform> {
        let path = format!("v1/audio/{}", job.mode().endpoint_name());
        let body = SynthesisBody::from_job(&model.model_id, job);

        tracing::debug!("Requesting synthesis: {}", path);
        let response = self
            .with_headers(self.client.post(self.endpoint(&path)))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let reply: SynthesisReply = response.json().await?;
        let sample_rate = reply
            .sample_rate
            .or(model.sample_rate)
            .ok_or_else(|| BridgeError::generation("backend response has no sample_rate"))?;

        let samples = reply
            .waveforms
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::generation("backend returned no waveforms"))?;

        Ok(Waveform::new(samples, sample_rate))
    }
}
