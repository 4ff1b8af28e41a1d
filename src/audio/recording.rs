//! Headless host that records every click instead of playing it.
//!
//! Useful for driving the transport without a sound card: the log tells you
//! which clicks were scheduled, when, and with what tone.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use super::{AudioContext, AudioHost, ClickTone, ClickVoice, ContextState};
use crate::error::MetronomeError;

/// One scheduled click
#[derive(Debug, Clone, Copy)]
pub struct ClickRecord {
    pub accent: bool,
    pub tone: ClickTone,
    pub at: Instant,
}

/// Everything the host and its contexts have seen
#[derive(Debug, Clone, Default)]
pub struct RecordingLog {
    pub contexts_created: u32,
    pub resumes: u32,
    pub closes: u32,
    pub clicks: Vec<ClickRecord>,
}

/// Shared view of a [`RecordingLog`], cloneable across threads
#[derive(Debug, Clone, Default)]
pub struct RecordingHandle {
    inner: Arc<Mutex<RecordingLog>>,
}

impl RecordingHandle {
    fn with<R>(&self, f: impl FnOnce(&mut RecordingLog) -> R) -> R {
        let mut log = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut log)
    }

    /// Copy of the log as it stands now
    pub fn snapshot(&self) -> RecordingLog {
        self.with(|log| log.clone())
    }

    pub fn clicks(&self) -> Vec<ClickRecord> {
        self.with(|log| log.clicks.clone())
    }

    pub fn click_count(&self) -> usize {
        self.with(|log| log.clicks.len())
    }

    pub fn clear_clicks(&self) {
        self.with(|log| log.clicks.clear());
    }
}

pub struct RecordingHost {
    log: RecordingHandle,
    start_suspended: bool,
    refuse_resume: bool,
}

impl RecordingHost {
    /// Contexts start out running
    pub fn new() -> Self {
        Self {
            log: RecordingHandle::default(),
            start_suspended: false,
            refuse_resume: false,
        }
    }

    /// Contexts start out suspended, like a browser before the first gesture
    pub fn suspended() -> Self {
        Self {
            start_suspended: true,
            ..Self::new()
        }
    }

    /// Contexts start suspended and every resume fails (counted in `resumes`)
    pub fn unresumable() -> Self {
        Self {
            start_suspended: true,
            refuse_resume: true,
            ..Self::new()
        }
    }

    pub fn starts_suspended(&self) -> bool {
        self.start_suspended
    }

    pub fn log(&self) -> RecordingHandle {
        self.log.clone()
    }
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for RecordingHost {
    type Context = RecordingContext;

    fn create_context(&mut self) -> Result<Self::Context, MetronomeError> {
        self.log.with(|log| log.contexts_created += 1);
        let state = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(RecordingContext {
            log: self.log.clone(),
            state,
            refuse_resume: self.refuse_resume,
        })
    }
}

pub struct RecordingContext {
    log: RecordingHandle,
    state: ContextState,
    refuse_resume: bool,
}

impl AudioContext for RecordingContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn resume(&mut self) -> Result<(), MetronomeError> {
        match self.state {
            ContextState::Closed => Err(MetronomeError::ContextClosed),
            ContextState::Running => Ok(()),
            ContextState::Suspended => {
                self.log.with(|log| log.resumes += 1);
                if self.refuse_resume {
                    return Err(MetronomeError::AudioBackend(
                        "resume refused".to_string(),
                    ));
                }
                self.state = ContextState::Running;
                Ok(())
            }
        }
    }

    fn schedule(&mut self, voice: ClickVoice) -> Result<(), MetronomeError> {
        if self.state == ContextState::Closed {
            return Err(MetronomeError::ContextClosed);
        }
        let record = ClickRecord {
            accent: voice.is_accent(),
            tone: voice.tone(),
            at: Instant::now(),
        };
        self.log.with(|log| log.clicks.push(record));
        Ok(())
    }

    fn close(&mut self) {
        if self.state != ContextState::Closed {
            self.log.with(|log| log.closes += 1);
            self.state = ContextState::Closed;
        }
    }
}
