//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside click voices. They stay focused on the
//! signal-processing math so graph combinators can layer on triggering and
//! gain staging.

/// Exponential "set value, then ramp" gain envelope.
pub mod envelope;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use oscillator::OscillatorWaveform;
