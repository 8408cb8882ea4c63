use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Backend request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("WAV error: {0}")]
    WavError(#[from] hound::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{message}")]
    BackendError { status: u16, message: String },

    #[error("{message}")]
    BackendUnavailable { message: String },

    #[error("{message}")]
    GenerationError { message: String },

    #[error("Bridge process error: {message}")]
    ProcessError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Backend,
    Audio,
    System,
}

impl BridgeError {
    pub fn config(message: impl Into<String>) -> Self {
        BridgeError::ConfigError {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        BridgeError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn generation(message: impl Into<String>) -> Self {
        BridgeError::GenerationError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            BridgeError::InvalidJson(_)
            | BridgeError::InvalidRequest { .. }
            | BridgeError::SerializationError(_) => ErrorCategory::Input,
            BridgeError::ConfigError { .. } | BridgeError::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            BridgeError::HttpError(_)
            | BridgeError::BackendError { .. }
            | BridgeError::BackendUnavailable { .. }
            | BridgeError::GenerationError { .. } => ErrorCategory::Backend,
            BridgeError::Base64Error(_) | BridgeError::WavError(_) => ErrorCategory::Audio,
            BridgeError::IoError(_) | BridgeError::ProcessError { .. } => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check that the request is a single JSON object with the expected fields",
            ErrorCategory::Config => "Check the TOML config file, TTS_BRIDGE_* environment variables and CLI flags",
            ErrorCategory::Backend => "Make sure the speech backend is running and the model id exists",
            ErrorCategory::Audio => "Check that reference audio is base64-encoded and the backend returns valid samples",
            ErrorCategory::System => "Check process permissions and that the bridge binary is installed",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
