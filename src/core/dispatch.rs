use crate::core::audio::decode_base64;
use crate::domain::model::{GenerateRequest, SynthesisJob};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{BridgeError, Result};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// 依模型 ID 與 clone 旗標決定生成模式，第一個符合的規則勝出
pub fn plan_job<C: ConfigProvider>(
    request: &GenerateRequest,
    model_id: &str,
    config: &C,
) -> Result<SynthesisJob> {
    let text = request.text.clone();
    let language = non_empty(&request.language)
        .unwrap_or(config.default_language())
        .to_string();
    let speaker = non_empty(&request.speaker)
        .unwrap_or(config.default_speaker())
        .to_string();
    let instruct = non_empty(&request.instruct).map(str::to_string);

    if request.use_voice_clone {
        let ref_audio_b64 = non_empty(&request.ref_audio_base64).ok_or_else(|| {
            BridgeError::generation("voice cloning requires ref_audio_base64")
        })?;
        let ref_audio = decode_base64(ref_audio_b64).map_err(|e| {
            BridgeError::generation(format!("invalid ref_audio_base64: {}", e))
        })?;
        if ref_audio.is_empty() {
            return Err(BridgeError::generation("ref_audio_base64 decoded to zero bytes"));
        }

        let ref_text = non_empty(&request.ref_text).map(str::to_string);
        let x_vector_only = ref_text.is_none();

        return Ok(SynthesisJob::VoiceClone {
            text,
            language,
            ref_audio,
            ref_text,
            x_vector_only,
        });
    }

    if model_id.contains("CustomVoice") {
        return Ok(SynthesisJob::CustomVoice {
            text,
            language,
            speaker,
            instruct,
        });
    }

    if model_id.contains("VoiceDesign") {
        return Ok(SynthesisJob::VoiceDesign {
            text,
            language,
            instruct: instruct.unwrap_or_else(|| config.voice_design_instruct().to_string()),
        });
    }

    // Base 模型沒有參考音訊時，用預設說話人生成
    Ok(SynthesisJob::CustomVoice {
        text,
        language,
        speaker,
        instruct: None,
    })
}
