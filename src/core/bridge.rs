use crate::core::audio::{encode_base64, encode_wav};
use crate::core::device::{select_device, DevicePreference, HostFacts};
use crate::core::dispatch::plan_job;
use crate::core::model_id::resolve_model_id;
use crate::domain::model::{BridgeResponse, GenerateRequest};
use crate::domain::ports::{ConfigProvider, SpeechBackend};
use crate::utils::error::BridgeError;
use serde_json::Value;

/// 一次呼叫的結果：要寫到 stdout 的 JSON 與行程結束碼
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub response: BridgeResponse,
    pub exit_code: i32,
}

impl Outcome {
    fn reply(response: BridgeResponse) -> Self {
        Self {
            response,
            exit_code: 0,
        }
    }

    /// 輸入格式錯誤時以非零結束碼回報
    fn malformed(err: BridgeError) -> Self {
        tracing::warn!("❌ {} ({})", err, err.recovery_suggestion());
        Self {
            response: BridgeResponse::error(err.to_string()),
            exit_code: 1,
        }
    }
}

pub struct Bridge<B: SpeechBackend, C: ConfigProvider> {
    backend: B,
    config: C,
    host: HostFacts,
}

impl<B: SpeechBackend, C: ConfigProvider> Bridge<B, C> {
    pub fn new(backend: B, config: C) -> Self {
        Self {
            backend,
            config,
            host: HostFacts::detect(),
        }
    }

    pub fn with_host_facts(mut self, host: HostFacts) -> Self {
        self.host = host;
        self
    }

    /// 解析一份原始請求並執行對應的指令
    pub async fn handle(&self, raw: &str) -> Outcome {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => return Outcome::malformed(BridgeError::InvalidJson(e)),
        };

        let command = match &value {
            Value::Object(map) => match map.get("command") {
                None => "generate".to_string(),
                Some(Value::String(command)) => command.clone(),
                Some(other) => other.to_string(),
            },
            _ => return Outcome::malformed(BridgeError::invalid_request("expected a JSON object")),
        };

        tracing::debug!("Dispatching command: {}", command);

        match command.as_str() {
            "check" => Outcome::reply(self.check().await),
            "generate" => match serde_json::from_value::<GenerateRequest>(value) {
                Ok(request) => Outcome::reply(self.generate(&request).await),
                Err(e) => Outcome::malformed(BridgeError::invalid_request(e.to_string())),
            },
            other => {
                tracing::warn!("Unknown command: {}", other);
                Outcome::reply(BridgeResponse::error(format!("Unknown command: {}", other)))
            }
        }
    }

    pub async fn check(&self) -> BridgeResponse {
        match self.backend.probe().await {
            Ok(()) => {
                tracing::info!("✅ Speech backend is ready");
                BridgeResponse::ok()
            }
            Err(e) => {
                tracing::warn!("Speech backend not ready: {}", e);
                BridgeResponse::error(format!("Missing dependency: {}", e))
            }
        }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> BridgeResponse {
        let model_id = resolve_model_id(
            &request.model_path,
            self.config.model_aliases(),
            self.config.model_namespace(),
        );

        let preference = DevicePreference::parse(self.config.device_preference()).unwrap_or_else(|e| {
            tracing::warn!("{}; falling back to auto device selection", e);
            DevicePreference::Auto
        });
        let device = select_device(preference, self.host);

        let job = match plan_job(request, &model_id, &self.config) {
            Ok(job) => job,
            Err(e) => return BridgeResponse::error(format!("Generation failed: {}", e)),
        };

        tracing::info!(
            "🚀 Generating {:?} speech with {} on {} ({} chars)",
            job.mode(),
            model_id,
            device.device,
            job.text().chars().count()
        );

        let model = match self.backend.load_model(&model_id, &device).await {
            Ok(model) => model,
            Err(e) => {
                tracing::error!("❌ Model load failed: {} ({})", e, e.recovery_suggestion());
                return BridgeResponse::error(format!("Failed to load model {}: {}", model_id, e));
            }
        };

        let waveform = match self.backend.synthesize(&model, &job).await {
            Ok(waveform) => waveform,
            Err(e) => {
                tracing::error!("❌ Generation failed: {} ({})", e, e.recovery_suggestion());
                return BridgeResponse::error(format!("Generation failed: {}", e));
            }
        };

        if waveform.samples.is_empty() {
            return BridgeResponse::error("Generation failed: backend returned empty audio");
        }

        let wav_bytes = match encode_wav(&waveform) {
            Ok(bytes) => bytes,
            Err(e) => return BridgeResponse::error(format!("Generation failed: {}", e)),
        };

        tracing::info!(
            "✅ Generated {:.2}s of audio at {} Hz ({} bytes)",
            waveform.duration_secs(),
            waveform.sample_rate,
            wav_bytes.len()
        );

        BridgeResponse::audio(encode_base64(&wav_bytes), waveform.sample_rate)
    }
}
