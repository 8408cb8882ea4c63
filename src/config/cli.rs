use crate::config::toml_config::BridgeConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "tts-bridge")]
#[command(about = "Reads one TTS job as JSON on stdin and writes base64 WAV audio as JSON on stdout")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(long, env = "TTS_BRIDGE_CONFIG")]
    pub config: Option<String>,

    /// Base URL of the speech backend
    #[arg(long, env = "TTS_BRIDGE_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Device preference: auto, cuda, mps or cpu
    #[arg(long, env = "TTS_BRIDGE_DEVICE")]
    pub device: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs to stderr instead of capturing them")]
    pub log_stderr: bool,
}

impl CliConfig {
    /// 預設值 < TOML 檔案 < 環境變數 / 命令列
    pub fn load_bridge_config(&self) -> Result<BridgeConfig> {
        let config = match &self.config {
            Some(path) => BridgeConfig::from_file(path)?,
            None => BridgeConfig::default(),
        };

        let config = config
            .with_backend_url(self.backend_url.clone())
            .with_device(self.device.clone());

        config.validate()?;
        Ok(config)
    }
}
