use crate::domain::model::{DeviceProfile, LoadedModel, SynthesisJob, Waveform};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 模型推論服務的介面；實際推論全部在外部完成
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// 確認推論服務與其相依套件可用
    async fn probe(&self) -> Result<()>;

    async fn load_model(&self, model_id: &str, device: &DeviceProfile) -> Result<LoadedModel>;

    async fn synthesize(&self, model: &LoadedModel, job: &SynthesisJob) -> Result<Waveform>;
}

pub trait ConfigProvider: Send + Sync {
    fn default_speaker(&self) -> &str;
    fn default_language(&self) -> &str;
    fn voice_design_instruct(&self) -> &str;
    fn model_namespace(&self) -> &str;
    fn model_aliases(&self) -> &HashMap<String, String>;
    fn device_preference(&self) -> &str;
}
