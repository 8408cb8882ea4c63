pub mod audio;
pub mod bridge;
pub mod device;
pub mod dispatch;
pub mod model_id;

pub use crate::domain::model::{BridgeResponse, GenerateRequest, SynthesisJob, Waveform};
pub use crate::domain::ports::{ConfigProvider, SpeechBackend};
pub use crate::utils::error::Result;
