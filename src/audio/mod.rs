//! Audio output: the capability seam, the lazily-acquired engine handle, and
//! the click voices that travel to the output.
//!
//! Everything that touches a real device sits behind [`AudioHost`] and
//! [`AudioContext`], so the transport can be driven with [`NullHost`] (no
//! capability) or [`recording::RecordingHost`] (captures clicks) in place of
//! the cpal backend.

pub mod click;
pub mod cpal_host;
pub mod engine;
pub mod mixer;
pub mod recording;

pub use click::{ClickSynth, ClickTone, ClickVoice};
pub use cpal_host::{CpalContext, CpalHost};
pub use engine::AudioEngine;
pub use mixer::{ClickMixer, ClickQueue};

use crate::error::MetronomeError;

/// Execution state of an output context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Rendering audio
    Running,
    /// Created but not (yet) producing sound
    Suspended,
    /// Torn down; must not be used again
    Closed,
}

impl ContextState {
    pub(crate) fn as_u8(self) -> u8 {
        match self {
            ContextState::Running => 0,
            ContextState::Suspended => 1,
            ContextState::Closed => 2,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => ContextState::Running,
            1 => ContextState::Suspended,
            _ => ContextState::Closed,
        }
    }
}

/// A live audio output that accepts click voices
pub trait AudioContext: Send + 'static {
    fn state(&self) -> ContextState;

    /// Start (or restart) rendering. Idempotent.
    fn resume(&mut self) -> Result<(), MetronomeError>;

    /// Hand a voice to the output; it starts sounding on the next block.
    fn schedule(&mut self, voice: ClickVoice) -> Result<(), MetronomeError>;

    /// Tear the output down. Idempotent.
    fn close(&mut self);
}

/// Factory for audio contexts (the host's audio capability)
pub trait AudioHost: Send + 'static {
    type Context: AudioContext;

    fn create_context(&mut self) -> Result<Self::Context, MetronomeError>;
}

/// Host without any audio capability: every context request fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

/// Never constructed; exists so `NullHost` can name a context type
#[derive(Debug)]
pub enum NoContext {}

impl AudioContext for NoContext {
    fn state(&self) -> ContextState {
        match *self {}
    }

    fn resume(&mut self) -> Result<(), MetronomeError> {
        match *self {}
    }

    fn schedule(&mut self, _voice: ClickVoice) -> Result<(), MetronomeError> {
        match *self {}
    }

    fn close(&mut self) {
        match *self {}
    }
}

impl AudioHost for NullHost {
    type Context = NoContext;

    fn create_context(&mut self) -> Result<Self::Context, MetronomeError> {
        Err(MetronomeError::NoOutputDevice)
    }
}
