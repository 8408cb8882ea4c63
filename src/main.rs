use clap::Parser;
use std::io::{self, Write};
use tokio::io::AsyncReadExt;
use tts_bridge::utils::logger::{self, LogCapture, LogTarget};
use tts_bridge::{Bridge, BridgeError, BridgeResponse, CliConfig, HttpSpeechBackend};

/// 設定錯誤時不處理請求
const CONFIG_ERROR_EXIT: i32 = 2;
const MALFORMED_INPUT_EXIT: i32 = 1;
/// 回應無法寫到 stdout
const OUTPUT_ERROR_EXIT: i32 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = CliConfig::parse();
    let exit_code = run(cli).await;
    std::process::exit(exit_code);
}

/// stdout 只會輸出這一行 JSON
fn emit(response: &BridgeResponse) -> io::Result<()> {
    let line = serde_json::to_string(response).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Failed to serialize response: {}", e) }).to_string()
    });
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", line)?;
    handle.flush()
}

fn config_error_message(err: &BridgeError) -> String {
    match err {
        BridgeError::ConfigError { .. } => err.to_string(),
        other => format!("Configuration error: {}", other),
    }
}

/// 讀完整個 stdin；呼叫端在寫完請求前不會開始讀 stdout
async fn read_request() -> io::Result<String> {
    let mut raw = Vec::new();
    tokio::io::stdin().read_to_end(&mut raw).await?;
    String::from_utf8(raw).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

async fn run(cli: CliConfig) -> i32 {
    let input = read_request().await;

    let config = match cli.load_bridge_config() {
        Ok(config) => config,
        Err(e) => {
            return finish(
                &BridgeResponse::error(config_error_message(&e)),
                CONFIG_ERROR_EXIT,
            );
        }
    };

    // 預設把日誌留在記憶體裡，stdout 與 stderr 都保持乾淨
    let capture = LogCapture::new();
    let target = if cli.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::Captured(capture.clone())
    };
    logger::init_bridge_logger(
        cli.verbose,
        Some(&config.logging.level),
        config.log_format(),
        &target,
    );

    tracing::info!("Starting tts-bridge");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let log_file = config.logging.file.clone();

    let input = match input {
        Ok(input) => input,
        Err(e) => {
            tracing::error!("❌ Failed to read request from stdin: {}", e);
            let code = finish(
                &BridgeResponse::error(format!("Invalid JSON: {}", e)),
                MALFORMED_INPUT_EXIT,
            );
            persist_logs(&capture, log_file.as_deref());
            return code;
        }
    };

    let backend = match HttpSpeechBackend::new(&config.backend) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("❌ Failed to create backend client: {} ({})", e, e.recovery_suggestion());
            let code = finish(
                &BridgeResponse::error(config_error_message(&e)),
                CONFIG_ERROR_EXIT,
            );
            persist_logs(&capture, log_file.as_deref());
            return code;
        }
    };
    tracing::debug!("Speech backend: {}", backend.base_url());

    let bridge = Bridge::new(backend, config);
    let outcome = bridge.handle(&input).await;

    if let Some(error) = &outcome.response.error {
        tracing::warn!("Request finished with error: {}", error);
    } else {
        tracing::info!("✅ Request finished");
    }

    let code = finish(&outcome.response, outcome.exit_code);
    persist_logs(&capture, log_file.as_deref());
    code
}

/// 輸出回應並決定結束碼
fn finish(response: &BridgeResponse, exit_code: i32) -> i32 {
    match emit(response) {
        Ok(()) => exit_code,
        Err(e) => {
            tracing::error!("❌ Failed to write response to stdout: {}", e);
            OUTPUT_ERROR_EXIT
        }
    }
}

fn persist_logs(capture: &LogCapture, path: Option<&str>) {
    if let Some(path) = path {
        if !capture.is_empty() {
            // 無處可回報寫檔失敗，直接忽略
            let _ = capture.persist(path);
        }
    }
}
