use serde::{Deserialize, Serialize};

/// `generate` 指令的請求欄位；`null` 與缺少欄位同樣處理
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerateRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub model_path: String,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruct: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_audio_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_text: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub use_voice_clone: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 寫到 stdout 的回應；未設定的欄位不輸出
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BridgeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BridgeResponse {
    pub fn audio(audio_base64: String, sample_rate: u32) -> Self {
        Self {
            audio_base64: Some(audio_base64),
            sample_rate: Some(sample_rate),
            format: Some("wav".to_string()),
            ..Self::default()
        }
    }

    pub fn ok() -> Self {
        Self {
            status: Some("ok".to_string()),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// 單聲道音訊
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Bfloat16,
    Float32,
}

impl Dtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::Bfloat16 => "bfloat16",
            Dtype::Float32 => "float32",
        }
    }
}

/// 載入模型時的裝置設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub device: String,
    pub dtype: Dtype,
    pub attn_implementation: String,
}

/// 三種生成模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    CustomVoice,
    VoiceDesign,
    VoiceClone,
}

impl GenerationMode {
    /// backend 路徑中使用的名稱
    pub fn endpoint_name(&self) -> &'static str {
        match self {
            GenerationMode::CustomVoice => "custom_voice",
            GenerationMode::VoiceDesign => "voice_design",
            GenerationMode::VoiceClone => "voice_clone",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisJob {
    CustomVoice {
        text: String,
        language: String,
        speaker: String,
        instruct: Option<String>,
    },
    VoiceDesign {
        text: String,
        language: String,
        instruct: String,
    },
    VoiceClone {
        text: String,
        language: String,
        ref_audio: Vec<u8>,
        ref_text: Option<String>,
        x_vector_only: bool,
    },
}

impl SynthesisJob {
    pub fn mode(&self) -> GenerationMode {
        match self {
            SynthesisJob::CustomVoice { .. } => GenerationMode::CustomVoice,
            SynthesisJob::VoiceDesign { .. } => GenerationMode::VoiceDesign,
            SynthesisJob::VoiceClone { .. } => GenerationMode::VoiceClone,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            SynthesisJob::CustomVoice { text, .. }
            | SynthesisJob::VoiceDesign { text, .. }
            | SynthesisJob::VoiceClone { text, .. } => text,
        }
    }
}

/// backend 回報的已載入模型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModel {
    pub model_id: String,
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults_and_nulls() {
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "command": "generate",
            "text": "Hello",
            "model_path": null,
            "speaker": null,
            "use_voice_clone": null
        }))
        .unwrap();

        assert_eq!(request.text, "Hello");
        assert_eq!(request.model_path, "");
        assert_eq!(request.speaker, None);
        assert!(!request.use_voice_clone);
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let json = serde_json::to_value(BridgeResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));

        let json = serde_json::to_value(BridgeResponse::audio("AAAA".to_string(), 24000)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"audio_base64": "AAAA", "sample_rate": 24000, "format": "wav"})
        );
    }
}
