mod common;

use common::{bridge_command, mock_health, mock_load, mock_synthesis, run_bridge, run_bridge_bytes};
use httpmock::prelude::*;
use std::io::Write;
use std::process::Stdio;
use tempfile::{NamedTempFile, TempDir};
use tts_bridge::core::audio::{decode_base64, decode_wav, encode_base64};
use tts_bridge::BridgeResponse;

#[test]
fn test_invalid_json_yields_error_and_non_zero_exit() {
    let run = run_bridge(&[], "this is not json");

    assert_eq!(run.exit_code, 1);
    assert!(run
        .response
        .error
        .as_deref()
        .unwrap()
        .starts_with("Invalid JSON: "));
    assert_eq!(run.stdout.lines().count(), 1);
}

#[test]
fn test_unknown_command() {
    let run = run_bridge(&[], r#"{"command": "synthesize"}"#);

    assert_eq!(run.exit_code, 0);
    assert_eq!(
        run.response,
        BridgeResponse::error("Unknown command: synthesize")
    );
}

#[test]
fn test_check_against_healthy_backend() {
    let server = MockServer::start();
    let health = mock_health(&server);

    let run = run_bridge(
        &["--backend-url", &server.base_url(), "--verbose"],
        r#"{"command": "check"}"#,
    );

    health.assert();
    assert_eq!(run.exit_code, 0);
    assert_eq!(run.response, BridgeResponse::ok());
    // 日誌被擷取在記憶體中，不會出現在 stderr
    assert!(run.stderr.is_empty(), "unexpected stderr: {}", run.stderr);
}

#[test]
fn test_check_with_unreachable_backend() {
    let run = run_bridge(
        &["--backend-url", "http://127.0.0.1:9"],
        r#"{"command": "check"}"#,
    );

    assert_eq!(run.exit_code, 0);
    assert!(run
        .response
        .error
        .as_deref()
        .unwrap()
        .starts_with("Missing dependency: speech backend unreachable"));
}

#[test]
fn test_generate_returns_decodable_wav() {
    let server = MockServer::start();
    let load = mock_load(&server, "Qwen/Qwen3-TTS-12Hz-0.6B-CustomVoice");
    let synth = mock_synthesis(&server, "custom_voice", &[0.0, 0.1, 0.2, 0.3, -0.3]);

    let request = serde_json::json!({
        "command": "generate",
        "model_path": "/srv/models/Qwen3-TTS-12Hz-0.6B-CustomVoice/",
        "text": "Good morning",
        "speaker": "serena",
        "language": "English"
    });
    let run = run_bridge(
        &["--backend-url", &server.base_url(), "--device", "cpu"],
        &request.to_string(),
    );

    load.assert();
    synth.assert();
    assert_eq!(run.exit_code, 0);
    assert_eq!(run.response.format.as_deref(), Some("wav"));
    assert_eq!(run.response.sample_rate, Some(24000));

    let wav = decode_base64(run.response.audio_base64.as_deref().unwrap()).unwrap();
    assert_eq!(&wav[0..4], b"RIFF");
    let waveform = decode_wav(&wav).unwrap();
    assert_eq!(waveform.sample_rate, 24000);
    assert_eq!(waveform.samples.len(), 5);
}

#[test]
fn test_generate_voice_clone_end_to_end() {
    let server = MockServer::start();
    let load = mock_load(&server, "Qwen/Qwen3-TTS-12Hz-1.7B-Base");
    let synth = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/audio/voice_clone")
            .json_body(serde_json::json!({
                "model_id": "Qwen/Qwen3-TTS-12Hz-1.7B-Base",
                "text": "Say it like me",
                "language": "Auto",
                "ref_audio": encode_base64(b"RIFF-reference"),
                "ref_text": "this is my voice",
                "x_vector_only_mode": false
            }));
        then.status(200).json_body(serde_json::json!({
            "waveforms": [[0.2, 0.2]],
            "sample_rate": 24000
        }));
    });

    let request = serde_json::json!({
        "model_path": "Qwen3-TTS-12Hz-1.7B-Base",
        "text": "Say it like me",
        "use_voice_clone": true,
        "ref_audio_base64": encode_base64(b"RIFF-reference"),
        "ref_text": "this is my voice"
    });
    let run = run_bridge(
        &["--backend-url", &server.base_url(), "--device", "cpu"],
        &request.to_string(),
    );

    load.assert();
    synth.assert();
    assert!(run.response.error.is_none(), "{:?}", run.response.error);
}

#[test]
fn test_generate_reports_load_failure() {
    let server = MockServer::start();
    let load = server.mock(|when, then| {
        when.method(POST).path("/v1/models/load");
        then.status(404)
            .json_body(serde_json::json!({"error": "Repository Not Found"}));
    });

    let run = run_bridge(
        &["--backend-url", &server.base_url()],
        r#"{"model_path": "/models/my-model", "text": "Hi"}"#,
    );

    load.assert();
    assert_eq!(run.exit_code, 0);
    assert_eq!(
        run.response.error.as_deref(),
        Some("Failed to load model Qwen/my-model: Repository Not Found")
    );
}

#[test]
fn test_invalid_configuration_exits_with_config_error() {
    let run = run_bridge(&["--device", "tpu"], r#"{"command": "check"}"#);

    assert_eq!(run.exit_code, 2);
    assert!(run
        .response
        .error
        .as_deref()
        .unwrap()
        .starts_with("Configuration error: "));
}

#[test]
fn test_log_stderr_flag_passes_logs_through() {
    let run = run_bridge(&["--log-stderr"], r#"{"command": "nope"}"#);

    assert_eq!(run.response.error.as_deref(), Some("Unknown command: nope"));
    assert!(run.stderr.contains("Unknown command: nope"));
    assert_eq!(run.stdout.lines().count(), 1);
}

#[test]
fn test_captured_logs_written_to_configured_file() {
    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("bridge.log");

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        "[backend]\nbase_url = \"http://127.0.0.1:9\"\n\n[logging]\nfile = \"{}\"\n",
        log_path.to_str().unwrap().replace('\\', "/")
    )
    .unwrap();

    let run = run_bridge(
        &["--config", config_file.path().to_str().unwrap()],
        r#"{"command": "check"}"#,
    );

    assert!(run.response.error.is_some());
    assert!(run.stderr.is_empty());
    let logs = std::fs::read_to_string(&log_path).unwrap();
    assert!(logs.contains("Speech backend not ready"));
}

#[test]
fn test_non_utf8_stdin_is_malformed_input() {
    let run = run_bridge_bytes(&[], &[0xff, 0xfe, b'{', b'}']);

    assert_eq!(run.exit_code, 1);
    assert!(run
        .response
        .error
        .as_deref()
        .unwrap()
        .starts_with("Invalid JSON: "));
}

#[test]
fn test_config_error_after_large_request_is_still_reported() {
    let request = serde_json::json!({
        "model_path": "Qwen3-TTS-12Hz-1.7B-Base",
        "text": "Hi",
        "use_voice_clone": true,
        "ref_audio_base64": "A".repeat(300 * 1024)
    });

    let run = run_bridge(&["--device", "tpu"], &request.to_string());

    assert_eq!(run.exit_code, 2);
    assert!(run
        .response
        .error
        .as_deref()
        .unwrap()
        .starts_with("Configuration error: "));
}

#[test]
fn test_closed_stdout_exits_non_zero() {
    let mut child = bridge_command(&[])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // 先關掉讀取端，bridge 寫回應時會失敗
    drop(child.stdout.take());
    child
        .stdin
        .take()
        .unwrap()
        .write_all(br#"{"command": "nope"}"#)
        .unwrap();

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(3));
}
