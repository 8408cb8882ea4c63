//! Caller side of the bridge: spawns the `tts-bridge` binary, sends one
//! request on stdin and turns the JSON reply back into samples.

use crate::core::audio::{decode_base64, decode_wav};
use crate::domain::model::{BridgeResponse, GenerateRequest, Waveform};
use crate::utils::error::{BridgeError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const FALLBACK_SAMPLE_RATE: u32 = 24000;

#[derive(Debug, Clone)]
pub struct BridgeClient {
    program: PathBuf,
    args: Vec<String>,
}

impl BridgeClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub async fn check_dependencies(&self) -> Result<bool> {
        let request = serde_json::json!({ "command": "check" });

        match self.call(&request.to_string()).await {
            Ok(response) if response.status.as_deref() == Some("ok") => Ok(true),
            Ok(response) => {
                if let Some(err) = response.error {
                    tracing::warn!("TTS dependencies not available: {}", err);
                }
                Ok(false)
            }
            Err(e) => {
                tracing::warn!("Failed to check TTS dependencies: {}", e);
                Ok(false)
            }
        }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<Waveform> {
        tracing::info!("Calling bridge for text: {}", request.text);

        let mut payload = serde_json::to_value(request)?;
        if let Some(map) = payload.as_object_mut() {
            map.insert("command".to_string(), "generate".into());
        }

        let response = self.call(&payload.to_string()).await?;

        if let Some(err) = response.error {
            return Err(BridgeError::generation(format!("Bridge TTS error: {}", err)));
        }

        let audio_b64 = response
            .audio_base64
            .ok_or_else(|| BridgeError::generation("No audio in response"))?;
        let sample_rate = response.sample_rate.unwrap_or(FALLBACK_SAMPLE_RATE);

        let decoded = decode_wav(&decode_base64(&audio_b64)?)?;
        tracing::debug!("Generated {} samples at {} Hz", decoded.samples.len(), sample_rate);

        Ok(Waveform::new(decoded.samples, sample_rate))
    }

    /// 執行一次 bridge 並解析 stdout 上的 JSON 回應
    pub async fn call(&self, request_json: &str) -> Result<BridgeResponse> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BridgeError::ProcessError {
                message: format!("failed to start {}: {}", self.program.display(), e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let written = match stdin.write_all(request_json.as_bytes()).await {
                Ok(()) => stdin.shutdown().await,
                Err(e) => Err(e),
            };
            // bridge 提早結束時仍要讀取它已寫出的回應
            match written {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("Bridge closed stdin before reading the full request");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let output = child.wait_with_output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_response(&stdout);

        if !output.status.success() {
            let message = match parsed {
                Ok(BridgeResponse {
                    error: Some(err), ..
                }) => err,
                _ => String::from_utf8_lossy(&output.stderr).trim().to_string(),
            };
            return Err(BridgeError::ProcessError {
                message: format!("bridge exited with {}: {}", output.status, message),
            });
        }

        parsed
    }
}

/// 忽略 JSON 之前的雜訊行（例如第三方套件印到 stdout 的警告）
pub fn parse_response(stdout: &str) -> Result<BridgeResponse> {
    let json_line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with('{'))
        .unwrap_or(stdout);

    serde_json::from_str(json_line).map_err(|e| BridgeError::ProcessError {
        message: format!("failed to parse bridge response: {} - {}", e, json_line.trim()),
    })
}
