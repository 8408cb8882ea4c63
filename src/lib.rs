pub mod adapters;
pub mod client;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpSpeechBackend;
pub use client::BridgeClient;
pub use config::BridgeConfig;
pub use core::bridge::{Bridge, Outcome};
pub use domain::model::{BridgeResponse, GenerateRequest, Waveform};
pub use utils::error::{BridgeError, Result};
