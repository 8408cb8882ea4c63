// Domain layer: wire types and ports. The model runtime lives behind `SpeechBackend`.

pub mod model;
pub mod ports;
