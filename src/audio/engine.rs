use log::{info, warn};

use super::{AudioContext, AudioHost, ContextState};

/// Lazily-created handle to the host's audio output
///
/// The context is created on the first `acquire()`, reused afterwards, and
/// closed once by `release()`. A host that fails to produce a context is not
/// asked again; the engine stays silent for the rest of its life. The same
/// goes for a context that refuses to resume `MAX_RESUME_ATTEMPTS` times in a
/// row.
pub struct AudioEngine<H: AudioHost> {
    host: H,
    context: Option<H::Context>,
    unavailable: bool,
    released: bool,
    resume_failures: u32,
}

/// Consecutive resume failures before the engine gives up on its context
const MAX_RESUME_ATTEMPTS: u32 = 3;

impl<H: AudioHost> AudioEngine<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            context: None,
            unavailable: false,
            released: false,
            resume_failures: 0,
        }
    }

    /// Get a running context, creating or resuming it as needed.
    ///
    /// Returns `None` when no audio is available (no device, backend
    /// failure, or the engine has been released).
    pub fn acquire(&mut self) -> Option<&mut H::Context> {
        if self.released || self.unavailable {
            return None;
        }

        if self.context.is_none() {
            match self.host.create_context() {
                Ok(context) => {
                    info!("Audio context created ({:?})", context.state());
                    self.context = Some(context);
                }
                Err(e) => {
                    warn!("Audio unavailable, continuing without sound: {}", e);
                    self.unavailable = true;
                    return None;
                }
            }
        }

        let context = self.context.as_mut()?;
        match context.state() {
            ContextState::Running => {}
            ContextState::Suspended => {
                if let Err(e) = context.resume() {
                    self.resume_failures += 1;
                    if self.resume_failures == 1 {
                        warn!("Failed to resume audio context: {}", e);
                    }
                    if self.resume_failures >= MAX_RESUME_ATTEMPTS {
                        warn!(
                            "Audio context would not resume after {} attempts, continuing without sound",
                            self.resume_failures
                        );
                        self.unavailable = true;
                    }
                    return None;
                }
                self.resume_failures = 0;
            }
            ContextState::Closed => return None,
        }

        Some(context)
    }

    /// Close the context. Further `acquire()` calls return `None`.
    pub fn release(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.close();
            info!("Audio context released");
        }
        self.released = true;
    }

    /// Whether a context currently exists
    pub fn is_acquired(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether the engine has given up on producing sound
    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }
}

impl<H: AudioHost> Drop for AudioEngine<H> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{recording::RecordingHost, NullHost};

    #[test]
    fn creates_context_lazily_once() {
        let host = RecordingHost::new();
        let log = host.log();
        let mut engine = AudioEngine::new(host);

        assert!(!engine.is_acquired());
        assert_eq!(log.snapshot().contexts_created, 0);

        assert!(engine.acquire().is_some());
        assert!(engine.acquire().is_some());
        assert!(engine.is_acquired());
        assert_eq!(log.snapshot().contexts_created, 1);
    }

    #[test]
    fn resumes_suspended_context() {
        let host = RecordingHost::suspended();
        let log = host.log();
        let mut engine = AudioEngine::new(host);

        let state = engine.acquire().map(|ctx| ctx.state());
        assert_eq!(state, Some(ContextState::Running));
        assert_eq!(log.snapshot().resumes, 1);

        // Already running, nothing more to resume
        engine.acquire();
        assert_eq!(log.snapshot().resumes, 1);
    }

    #[test]
    fn missing_capability_is_silent() {
        let mut engine = AudioEngine::new(NullHost);
        assert!(engine.acquire().is_none());
        assert!(engine.acquire().is_none());
        assert!(!engine.is_acquired());
    }

    #[test]
    fn gives_up_after_repeated_resume_failures() {
        let host = RecordingHost::unresumable();
        let log = host.log();
        let mut engine = AudioEngine::new(host);

        for _ in 0..MAX_RESUME_ATTEMPTS {
            assert!(engine.acquire().is_none());
        }
        assert!(engine.is_unavailable());
        assert_eq!(log.snapshot().resumes, MAX_RESUME_ATTEMPTS);

        // No further resume attempts once unavailable
        assert!(engine.acquire().is_none());
        assert_eq!(log.snapshot().resumes, MAX_RESUME_ATTEMPTS);
        assert_eq!(log.snapshot().contexts_created, 1);
    }

    #[test]
    fn host_is_kept_for_inspection() {
        let host = RecordingHost::suspended();
        let engine = AudioEngine::new(host);
        assert!(engine.host().starts_suspended());
        assert!(!engine.is_unavailable());
    }

    #[test]
    fn release_closes_once() {
        let host = RecordingHost::new();
        let log = host.log();
        let mut engine = AudioEngine::new(host);

        engine.acquire();
        engine.release();
        engine.release();
        assert_eq!(log.snapshot().closes, 1);

        // Released engines never hand the context out again
        assert!(engine.acquire().is_none());
        assert_eq!(log.snapshot().contexts_created, 1);
        assert!(engine.is_released());
    }

    #[test]
    fn drop_releases() {
        let host = RecordingHost::new();
        let log = host.log();
        {
            let mut engine = AudioEngine::new(host);
            engine.acquire();
        }
        assert_eq!(log.snapshot().closes, 1);
    }
}
