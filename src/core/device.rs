use crate::domain::model::{DeviceProfile, Dtype};
use crate::utils::error::{BridgeError, Result};
use std::path::Path;

pub const DEVICE_PREFERENCES: &[&str] = &["auto", "cuda", "mps", "cpu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePreference {
    Auto,
    Cuda,
    Mps,
    Cpu,
}

impl DevicePreference {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(DevicePreference::Auto),
            "cuda" => Ok(DevicePreference::Cuda),
            "mps" => Ok(DevicePreference::Mps),
            "cpu" => Ok(DevicePreference::Cpu),
            other => Err(BridgeError::InvalidConfigValueError {
                field: "device.preference".to_string(),
                value: other.to_string(),
                reason: format!("Expected one of: {}", DEVICE_PREFERENCES.join(", ")),
            }),
        }
    }
}

/// 主機上可用的加速器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostFacts {
    pub cuda_available: bool,
    pub mps_available: bool,
}

impl HostFacts {
    pub fn detect() -> Self {
        let visible = std::env::var("CUDA_VISIBLE_DEVICES").ok();
        Self {
            cuda_available: cuda_visible(visible.as_deref()) && Path::new("/dev/nvidiactl").exists(),
            mps_available: cfg!(all(target_os = "macos", target_arch = "aarch64")),
        }
    }
}

fn cuda_visible(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None => true,
        Some("") | Some("-1") => false,
        Some(_) => true,
    }
}

pub fn cuda_profile() -> DeviceProfile {
    DeviceProfile {
        device: "cuda:0".to_string(),
        dtype: Dtype::Bfloat16,
        attn_implementation: "flash_attention_2".to_string(),
    }
}

/// MPS 上 float16 容易產生 inf/nan，所以固定 float32
pub fn mps_profile() -> DeviceProfile {
    DeviceProfile {
        device: "mps".to_string(),
        dtype: Dtype::Float32,
        attn_implementation: "eager".to_string(),
    }
}

pub fn cpu_profile() -> DeviceProfile {
    DeviceProfile {
        device: "cpu".to_string(),
        dtype: Dtype::Float32,
        attn_implementation: "eager".to_string(),
    }
}

pub fn select_device(preference: DevicePreference, facts: HostFacts) -> DeviceProfile {
    match preference {
        DevicePreference::Cuda => cuda_profile(),
        DevicePreference::Mps => mps_profile(),
        DevicePreference::Cpu => cpu_profile(),
        DevicePreference::Auto if facts.cuda_available => cuda_profile(),
        DevicePreference::Auto if facts.mps_available => mps_profile(),
        DevicePreference::Auto => cpu_profile(),
    }
}
