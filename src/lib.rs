pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Modulation routing and capability traits
pub mod synth; // Graph resolution and rendering

pub use config::SynthConfig;
pub use error::Error;
pub use graph::node::{EnvelopeGenerator, Operator};
pub use graph::routing::{Routing, RoutingEdge};
pub use synth::fm::FmSynth;

pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
/// Gate samples above this level count as "high".
pub(crate) const GATE_THRESHOLD: f32 = 0.5;
