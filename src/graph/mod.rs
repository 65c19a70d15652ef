//! Modulation routing and the capability traits consumed by the renderer.
//!
//! The graph layer knows nothing about waveforms or envelopes beyond the
//! trait surface in `node`. Operators are identified purely by their index
//! in the synth's operator list; `routing` turns a flat edge list into the
//! derived structures the renderer walks.

/// Capability traits for operators and envelope generators.
pub mod node;
/// Routing-table resolution: modulation sources and terminal operators.
pub mod routing;
