#![allow(dead_code)]

use httpmock::prelude::*;
use httpmock::Mock;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tts_bridge::BridgeResponse;

pub const BRIDGE_BIN: &str = env!("CARGO_BIN_EXE_tts-bridge");

pub struct BridgeRun {
    pub response: BridgeResponse,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// 以乾淨的環境啟動 bridge，送入 stdin 後等待結束
pub fn run_bridge(args: &[&str], stdin: &str) -> BridgeRun {
    run_bridge_bytes(args, stdin.as_bytes())
}

pub fn run_bridge_bytes(args: &[&str], stdin: &[u8]) -> BridgeRun {
    let mut child = bridge_command(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tts-bridge");

    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin)
        .expect("write stdin");

    let output = child.wait_with_output().expect("wait for tts-bridge");
    into_run(output)
}

pub fn bridge_command(args: &[&str]) -> Command {
    let mut command = Command::new(BRIDGE_BIN);
    command
        .args(args)
        .env_remove("TTS_BRIDGE_CONFIG")
        .env_remove("TTS_BRIDGE_BACKEND_URL")
        .env_remove("TTS_BRIDGE_DEVICE")
        .env_remove("RUST_LOG");
    command
}

fn into_run(output: Output) -> BridgeRun {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let response = serde_json::from_str(stdout.trim()).unwrap_or_else(|e| {
        panic!("stdout is not a single JSON object ({}): {:?}", e, stdout)
    });

    BridgeRun {
        response,
        exit_code: output.status.code().unwrap_or(-1),
        stdout,
        stderr,
    }
}

pub fn mock_health(server: &MockServer) -> Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200).json_body(serde_json::json!({"status": "ok"}));
    })
}

pub fn mock_load<'a>(server: &'a MockServer, model_id: &str) -> Mock<'a> {
    let model_id = model_id.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/v1/models/load")
            .json_body(serde_json::json!({
                "model_id": model_id,
                "device": "cpu",
                "dtype": "float32",
                "attn_implementation": "eager"
            }));
        then.status(200).json_body(serde_json::json!({
            "model_id": model_id,
            "sample_rate": 24000
        }));
    })
}

pub fn mock_synthesis<'a>(server: &'a MockServer, mode: &str, samples: &[f32]) -> Mock<'a> {
    let path = format!("/v1/audio/{}", mode);
    let samples = samples.to_vec();
    server.mock(move |when, then| {
        when.method(POST).path(path);
        then.status(200).json_body(serde_json::json!({
            "waveforms": [samples],
            "sample_rate": 24000
        }));
    })
}
