//! Composable building blocks for constructing audio-processing graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what a voice needs:
//! trigger events, gain staging, and block-based rendering. The `extensions`
//! module adds the fluent `.amplify()` helper so a click reads as a one-line
//! patch.

/// Multiply two signals together (envelope-controlled gain).
pub mod amplify;
/// Exponential decay envelope node.
pub mod envelope;
/// Fluent combinators (`.amplify()`).
pub mod extensions;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators.
pub mod oscillator;

pub use node::{GraphNode, RenderCtx};
