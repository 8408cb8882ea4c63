use crate::core::device::DEVICE_PREFERENCES;
use crate::core::model_id::DEFAULT_NAMESPACE;
use crate::core::ConfigProvider;
use crate::utils::error::{BridgeError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8765";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub backend: BackendConfig,
    pub device: DeviceConfig,
    pub defaults: DefaultsConfig,
    pub models: ModelsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub headers: HashMap<String, String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_seconds: 600,
            headers: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub preference: String, // auto / cuda / mps / cpu
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            preference: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub speaker: String,
    pub language: String,
    pub voice_design_instruct: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            speaker: "Vivian".to_string(),
            language: "Auto".to_string(),
            voice_design_instruct: "Natural speaking voice.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub namespace: String,
    pub aliases: HashMap<String, String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            aliases: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// 結束時把擷取到的日誌寫入這個檔案
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl BridgeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            BridgeError::config(format!(
                "cannot read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content)
            .map_err(|e| BridgeError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${TTS_BACKEND_TOKEN})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn with_backend_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.backend.base_url = url;
        }
        self
    }

    pub fn with_device(mut self, device: Option<String>) -> Self {
        if let Some(device) = device {
            self.device.preference = device;
        }
        self
    }

    pub fn log_format(&self) -> LogFormat {
        LogFormat::parse(&self.logging.format).unwrap_or_default()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("backend.base_url", &self.backend.base_url)?;
        validation::validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 86_400)?;

        for (name, value) in &self.backend.headers {
            if value.contains("${") {
                return Err(BridgeError::InvalidConfigValueError {
                    field: format!("backend.headers.{}", name),
                    value: value.clone(),
                    reason: "unresolved environment variable".to_string(),
                });
            }
        }

        let preference = self.device.preference.trim().to_ascii_lowercase();
        validation::validate_one_of("device.preference", &preference, DEVICE_PREFERENCES)?;

        validation::validate_non_empty_string("defaults.speaker", &self.defaults.speaker)?;
        validation::validate_non_empty_string("defaults.language", &self.defaults.language)?;
        validation::validate_non_empty_string("models.namespace", &self.models.namespace)?;

        validation::validate_one_of("logging.format", &self.logging.format.to_ascii_lowercase(), &["compact", "json"])?;
        if let Some(file) = &self.logging.file {
            validation::validate_path("logging.file", file)?;
        }

        Ok(())
    }
}

impl ConfigProvider for BridgeConfig {
    fn default_speaker(&self) -> &str {
        &self.defaults.speaker
    }

    fn default_language(&self) -> &str {
        &self.defaults.language
    }

    fn voice_design_instruct(&self) -> &str {
        &self.defaults.voice_design_instruct
    }

    fn model_namespace(&self) -> &str {
        &self.models.namespace
    }

    fn model_aliases(&self) -> &HashMap<String, String> {
        &self.models.aliases
    }

    fn device_preference(&self) -> &str {
        &self.device.preference
    }
}

impl Validate for BridgeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
