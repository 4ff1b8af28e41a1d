//! Transport: the beat clock.
//!
//! The transport owns run/stop state, the beat counter, the click synthesizer
//! and the single repeating timer that advances beats. Every change that needs
//! a new timer (start, tempo, signature) cancels the old one and arms a fresh
//! one inside the mutator itself:
//!
//! ```text
//!   configure / set_bpm / set_signature (while running)
//!       cancel timer (joins the tick thread)
//!       beat = 0
//!       tick          -> beat 1, accented click
//!       arm timer     -> tick every 60000 / bpm ms
//! ```
//!
//! Restarts are deliberately not phase-preserving: a tempo change while
//! running re-fires the downbeat immediately.

mod timer;

pub use timer::TickTimer;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, info, trace};

use crate::{
    audio::{AudioHost, ClickSynth, CpalHost},
    config::MetronomeConfig,
    error::MetronomeError,
    sequencing::{Tempo, TimeSignature},
};

/// Published on every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatEvent {
    /// 1-based position in the measure
    pub beat: u8,
    /// True on the downbeat
    pub accent: bool,
    pub beats_per_measure: u8,
}

/// Observable transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSnapshot {
    pub is_running: bool,
    /// 0 when stopped, otherwise 1..=beats_per_measure
    pub current_beat: u8,
    pub tempo: Tempo,
    pub signature: TimeSignature,
}

/// State shared between the transport and its tick thread
struct Core<H: AudioHost> {
    tempo: Tempo,
    signature: TimeSignature,
    is_running: bool,
    current_beat: u8,
    synth: ClickSynth<H>,
    subscribers: Vec<Sender<BeatEvent>>,
}

impl<H: AudioHost> Core<H> {
    fn tick(&mut self) {
        if !self.is_running {
            return;
        }

        let beats = self.signature.beats_per_measure;
        self.current_beat = (self.current_beat % beats) + 1;

        let event = BeatEvent {
            beat: self.current_beat,
            accent: self.current_beat == 1,
            beats_per_measure: beats,
        };
        trace!("Beat {}/{}", event.beat, beats);

        // Drop subscribers whose receiver has gone away
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        self.synth.play_click(event.accent);
    }

    fn snapshot(&self) -> TransportSnapshot {
        TransportSnapshot {
            is_running: self.is_running,
            current_beat: self.current_beat,
            tempo: self.tempo,
            signature: self.signature,
        }
    }
}

fn lock_core<H: AudioHost>(core: &Mutex<Core<H>>) -> MutexGuard<'_, Core<H>> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct Transport<H: AudioHost = CpalHost> {
    core: Arc<Mutex<Core<H>>>,
    timer: Option<TickTimer>,
}

impl<H: AudioHost> Transport<H> {
    pub fn new(host: H) -> Self {
        Self::with_config(host, MetronomeConfig::default())
    }

    pub fn with_config(host: H, config: MetronomeConfig) -> Self {
        let core = Core {
            tempo: config.tempo,
            signature: config.signature,
            is_running: false,
            current_beat: 0,
            synth: ClickSynth::new(host),
            subscribers: Vec::new(),
        };

        Self {
            core: Arc::new(Mutex::new(core)),
            timer: None,
        }
    }

    fn core(&self) -> MutexGuard<'_, Core<H>> {
        lock_core(&self.core)
    }

    pub fn snapshot(&self) -> TransportSnapshot {
        self.core().snapshot()
    }

    pub fn tempo(&self) -> Tempo {
        self.core().tempo
    }

    pub fn signature(&self) -> TimeSignature {
        self.core().signature
    }

    pub fn is_running(&self) -> bool {
        self.core().is_running
    }

    pub fn current_beat(&self) -> u8 {
        self.core().current_beat
    }

    /// Receive a [`BeatEvent`] for every tick from now on
    pub fn subscribe(&self) -> Receiver<BeatEvent> {
        let (tx, rx) = unbounded();
        self.core().subscribers.push(tx);
        rx
    }

    /// Inspect the audio engine (e.g. whether output was ever acquired)
    pub fn with_synth<R>(&self, f: impl FnOnce(&ClickSynth<H>) -> R) -> R {
        f(&self.core().synth)
    }

    /// Set tempo from a number, clamped to 40..=240. NaN is ignored.
    pub fn set_bpm(&mut self, bpm: impl Into<f64>) -> Result<Tempo, MetronomeError> {
        let bpm = bpm.into();
        match Tempo::from_f64(bpm) {
            Some(tempo) => {
                let signature = self.signature();
                self.configure(tempo, signature)?;
                Ok(tempo)
            }
            None => {
                debug!("Ignoring non-numeric tempo {}", bpm);
                Ok(self.tempo())
            }
        }
    }

    /// Set tempo from user text. Non-numeric text leaves the tempo unchanged.
    pub fn set_bpm_input(&mut self, input: &str) -> Result<Tempo, MetronomeError> {
        match Tempo::parse(input) {
            Some(tempo) => {
                let signature = self.signature();
                self.configure(tempo, signature)?;
                Ok(tempo)
            }
            None => {
                debug!("Ignoring non-numeric tempo input {:?}", input);
                Ok(self.tempo())
            }
        }
    }

    /// Select a time signature by label ("2/4", "3/4", "2/2")
    pub fn set_signature(&mut self, label: &str) -> Result<TimeSignature, MetronomeError> {
        let signature = TimeSignature::from_label(label)?;
        let tempo = self.tempo();
        self.configure(tempo, signature)?;
        Ok(signature)
    }

    /// Apply tempo and signature together; restarts at most once if running.
    pub fn configure(
        &mut self,
        tempo: Tempo,
        signature: TimeSignature,
    ) -> Result<(), MetronomeError> {
        let (changed, running) = {
            let mut core = self.core();
            let changed = core.tempo != tempo || core.signature != signature;
            if changed {
                debug!(
                    "Configure: {} {} -> {} {}",
                    core.tempo, core.signature, tempo, signature
                );
            }
            core.tempo = tempo;
            core.signature = signature;
            (changed, core.is_running)
        };

        if changed && running {
            info!("Restarting at {} in {}", tempo, signature);
            self.restart()?;
        }
        Ok(())
    }

    /// Start playback: acquire audio, tick beat 1 now, then every beat interval.
    ///
    /// Calling this while already running does nothing.
    pub fn start(&mut self) -> Result<(), MetronomeError> {
        if self.timer.is_some() {
            debug!("Start ignored, already running");
            return Ok(());
        }

        {
            let mut core = self.core();
            if !core.synth.prepare() {
                debug!("Starting without audio output");
            }
            core.is_running = true;
            info!("Start at {} in {}", core.tempo, core.signature);
        }

        self.restart()
    }

    /// Stop playback and reset the beat to 0. Audio output stays open.
    pub fn stop(&mut self) {
        let was_running = self.timer.is_some();
        self.cancel_timer();

        let mut core = self.core();
        core.is_running = false;
        core.current_beat = 0;
        if was_running {
            info!("Stop");
        }
    }

    pub fn toggle(&mut self) -> Result<(), MetronomeError> {
        if self.is_running() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Stop, then release the audio output. Consumes the transport.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.stop();
        self.core().synth.release();
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }

    /// Cancel, reset to beat 0, tick once, arm a fresh timer.
    fn restart(&mut self) -> Result<(), MetronomeError> {
        self.cancel_timer();

        let interval = {
            let mut core = self.core();
            core.current_beat = 0;
            core.tick();
            core.tempo.beat_interval()
        };

        let core = Arc::clone(&self.core);
        match TickTimer::arm(interval, move || lock_core(&core).tick()) {
            Ok(timer) => {
                self.timer = Some(timer);
                Ok(())
            }
            Err(e) => {
                let mut core = self.core();
                core.is_running = false;
                core.current_beat = 0;
                Err(e)
            }
        }
    }
}

impl Transport<CpalHost> {
    /// Transport on the default output device
    pub fn with_default_output(config: MetronomeConfig) -> Self {
        Self::with_config(CpalHost::new(), config)
    }
}

impl<H: AudioHost> Drop for Transport<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{
        recording::{RecordingHandle, RecordingHost},
        NullHost,
    };

    // 40 BPM keeps the timer thread (1.5s) out of the way of hand-driven ticks
    fn recording() -> (Transport<RecordingHost>, RecordingHandle) {
        let host = RecordingHost::new();
        let log = host.log();
        let config = MetronomeConfig::new().bpm(40);
        (Transport::with_config(host, config), log)
    }

    #[test]
    fn starts_idle_with_defaults() {
        let host = RecordingHost::new();
        let log = host.log();
        let transport = Transport::new(host);
        let snap = transport.snapshot();

        assert!(!snap.is_running);
        assert_eq!(snap.current_beat, 0);
        assert_eq!(snap.tempo.bpm(), 180);
        assert_eq!(snap.signature, TimeSignature::TWO_FOUR);

        // Audio is only acquired on demand
        assert_eq!(log.snapshot().contexts_created, 0);
        assert!(!transport.with_synth(|s| s.engine().is_acquired()));
    }

    #[test]
    fn start_ticks_downbeat_immediately() {
        let (mut transport, log) = recording();
        let beats = transport.subscribe();

        transport.start().unwrap();

        assert!(transport.is_running());
        assert_eq!(transport.current_beat(), 1);
        assert_eq!(
            beats.try_recv().ok(),
            Some(BeatEvent { beat: 1, accent: true, beats_per_measure: 2 })
        );

        let clicks = log.clicks();
        assert_eq!(clicks.len(), 1);
        assert!(clicks[0].accent);
        assert_eq!(clicks[0].tone.frequency, 1400.0);
        assert_eq!(log.snapshot().contexts_created, 1);
    }

    #[test]
    fn stop_resets_beat_and_keeps_audio() {
        let (mut transport, log) = recording();
        transport.start().unwrap();
        transport.stop();

        assert!(!transport.is_running());
        assert_eq!(transport.current_beat(), 0);
        assert_eq!(log.snapshot().closes, 0);
        assert!(transport.with_synth(|s| s.engine().is_acquired()));

        // Restart reuses the same context
        transport.start().unwrap();
        assert_eq!(log.snapshot().contexts_created, 1);
    }

    #[test]
    fn toggle_flips_running_state() {
        let (mut transport, _log) = recording();
        transport.toggle().unwrap();
        assert!(transport.is_running());
        transport.toggle().unwrap();
        assert!(!transport.is_running());
        assert_eq!(transport.current_beat(), 0);
    }

    #[test]
    fn set_bpm_clamps_and_ignores_nan() {
        let (mut transport, _log) = recording();

        assert_eq!(transport.set_bpm(10).unwrap().bpm(), 40);
        assert_eq!(transport.set_bpm(999).unwrap().bpm(), 240);
        assert_eq!(transport.set_bpm(96.4).unwrap().bpm(), 96);
        assert_eq!(transport.set_bpm(f64::NAN).unwrap().bpm(), 96);
        assert_eq!(transport.tempo().bpm(), 96);
    }

    #[test]
    fn set_bpm_input_rejects_text() {
        let (mut transport, _log) = recording();
        transport.set_bpm(120).unwrap();

        assert_eq!(transport.set_bpm_input("abc").unwrap().bpm(), 120);
        assert_eq!(transport.set_bpm_input("").unwrap().bpm(), 120);
        assert_eq!(transport.set_bpm_input("200").unwrap().bpm(), 200);
    }

    #[test]
    fn set_bpm_while_stopped_does_not_start() {
        let (mut transport, log) = recording();
        transport.set_bpm(100).unwrap();
        assert!(!transport.is_running());
        assert_eq!(transport.current_beat(), 0);
        assert_eq!(log.click_count(), 0);
    }

    #[test]
    fn set_bpm_while_running_restarts_at_downbeat() {
        let (mut transport, log) = recording();
        transport.set_signature("3/4").unwrap();
        transport.start().unwrap();

        // Advance mid-measure by hand
        lock_core(&transport.core).tick();
        assert_eq!(transport.current_beat(), 2);

        log.clear_clicks();
        transport.set_bpm(200).unwrap();

        assert_eq!(transport.current_beat(), 1);
        let clicks = log.clicks();
        assert_eq!(clicks.len(), 1);
        assert!(clicks[0].accent);
        assert_eq!(
            transport.timer.as_ref().map(|t| t.interval()),
            Some(Tempo::new(200).beat_interval())
        );
    }

    #[test]
    fn unchanged_tempo_does_not_restart() {
        let (mut transport, log) = recording();
        transport.start().unwrap();
        lock_core(&transport.core).tick();
        log.clear_clicks();

        transport.set_bpm(40).unwrap();
        assert_eq!(transport.current_beat(), 2);
        assert_eq!(log.click_count(), 0);
    }

    #[test]
    fn set_signature_changes_cycle_length() {
        let (mut transport, _log) = recording();
        let beats = transport.subscribe();
        transport.set_signature("3/4").unwrap();
        transport.start().unwrap();

        for _ in 0..5 {
            lock_core(&transport.core).tick();
        }
        let seen: Vec<u8> = beats.try_iter().map(|e| e.beat).collect();
        assert_eq!(seen, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn set_signature_while_running_restarts() {
        let (mut transport, _log) = recording();
        transport.start().unwrap();
        lock_core(&transport.core).tick();
        assert_eq!(transport.current_beat(), 2);

        let beats = transport.subscribe();
        transport.set_signature("3/4").unwrap();
        assert_eq!(transport.current_beat(), 1);
        assert_eq!(beats.try_recv().ok().map(|e| e.beats_per_measure), Some(3));
    }

    #[test]
    fn unknown_signature_leaves_state() {
        let (mut transport, _log) = recording();
        transport.start().unwrap();

        let result = transport.set_signature("5/4");
        assert_eq!(result, Err(MetronomeError::UnknownSignature("5/4".to_string())));
        assert_eq!(transport.signature(), TimeSignature::TWO_FOUR);
        assert_eq!(transport.current_beat(), 1);
    }

    #[test]
    fn configure_restarts_once() {
        let (mut transport, log) = recording();
        transport.start().unwrap();
        log.clear_clicks();

        transport
            .configure(Tempo::new(90), TimeSignature::THREE_FOUR)
            .unwrap();
        assert_eq!(log.click_count(), 1);
        assert_eq!(transport.tempo().bpm(), 90);
        assert_eq!(transport.signature(), TimeSignature::THREE_FOUR);
    }

    #[test]
    fn accent_only_on_downbeat() {
        let (mut transport, log) = recording();
        transport.set_signature("3/4").unwrap();
        transport.start().unwrap();
        for _ in 0..5 {
            lock_core(&transport.core).tick();
        }

        let accents: Vec<bool> = log.clicks().iter().map(|c| c.accent).collect();
        assert_eq!(accents, vec![true, false, false, true, false, false]);
    }

    #[test]
    fn ticks_without_audio_capability() {
        let mut transport = Transport::new(NullHost);
        let beats = transport.subscribe();

        transport.start().unwrap();
        lock_core(&transport.core).tick();

        let seen: Vec<u8> = beats.try_iter().map(|e| e.beat).collect();
        assert_eq!(seen, vec![1, 2]);
        assert!(!transport.with_synth(|s| s.engine().is_acquired()));
    }

    #[test]
    fn shutdown_releases_audio() {
        let (mut transport, log) = recording();
        transport.start().unwrap();
        transport.shutdown();

        let snap = log.snapshot();
        assert_eq!(snap.closes, 1);
        assert_eq!(snap.contexts_created, 1);
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let (mut transport, _log) = recording();
        drop(transport.subscribe());
        transport.start().unwrap();
        assert!(lock_core(&transport.core).subscribers.is_empty());
    }
}
