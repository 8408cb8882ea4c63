// Adapters layer: concrete implementations for external systems.

pub mod http_backend;

pub use http_backend::HttpSpeechBackend;
