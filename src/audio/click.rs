//! Click voices and the synthesizer that schedules them.

use log::{trace, warn};

use super::{engine::AudioEngine, AudioContext, AudioHost};
use crate::graph::{
    amplify::Amplify,
    envelope::EnvNode,
    extensions::NodeExt,
    node::{GraphNode, RenderCtx},
    oscillator::OscNode,
};

/// Sound parameters for one kind of click
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickTone {
    /// Square wave pitch (Hz)
    pub frequency: f32,
    /// Level at the instant of triggering
    pub gain: f32,
    /// Level the exponential ramp settles on
    pub floor: f32,
    /// Seconds for the ramp from `gain` to `floor`
    pub decay: f32,
    /// Seconds after which the voice stops outright
    pub duration: f32,
}

impl ClickTone {
    /// Downbeat: brighter and louder
    pub const ACCENT: ClickTone = ClickTone {
        frequency: 1400.0,
        gain: 0.35,
        floor: 0.001,
        decay: 0.100,
        duration: 0.120,
    };

    pub const REGULAR: ClickTone = ClickTone {
        frequency: 900.0,
        gain: 0.22,
        floor: 0.001,
        decay: 0.100,
        duration: 0.120,
    };

    pub fn for_beat(accent: bool) -> Self {
        if accent {
            Self::ACCENT
        } else {
            Self::REGULAR
        }
    }
}

/// One short-lived click: square oscillator through an exponential decay.
///
/// The voice triggers itself on its first rendered block, so it starts the
/// moment the output picks it up, and goes silent `duration` seconds later.
pub struct ClickVoice {
    node: Amplify<OscNode, EnvNode>,
    tone: ClickTone,
    accent: bool,
    triggered: bool,
    elapsed_samples: u32,
    stop_samples: u32,
}

impl ClickVoice {
    pub fn new(accent: bool) -> Self {
        Self::from_tone(ClickTone::for_beat(accent), accent)
    }

    pub fn from_tone(tone: ClickTone, accent: bool) -> Self {
        let node = OscNode::square()
            .with_frequency(tone.frequency)
            .amplify(EnvNode::exp_decay(tone.gain, tone.floor, tone.decay));

        Self {
            node,
            tone,
            accent,
            triggered: false,
            elapsed_samples: 0,
            stop_samples: 0,
        }
    }

    pub fn tone(&self) -> ClickTone {
        self.tone
    }

    pub fn is_accent(&self) -> bool {
        self.accent
    }

    /// True once the voice has played out its full duration
    pub fn is_finished(&self) -> bool {
        self.triggered && self.elapsed_samples >= self.stop_samples
    }

    /// Render into `out`, overwriting it. Frames past the stop time are zero.
    pub fn render(&mut self, out: &mut [f32], sample_rate: f32) {
        let ctx = RenderCtx::from_freq(sample_rate, self.tone.frequency, self.tone.gain);

        if !self.triggered {
            self.stop_samples = (self.tone.duration * sample_rate).round() as u32;
            self.node.note_on(&ctx);
            self.triggered = true;
        }

        let remaining = self.stop_samples.saturating_sub(self.elapsed_samples) as usize;
        let audible = remaining.min(out.len());

        let (sounding, silent) = out.split_at_mut(audible);
        if !sounding.is_empty() {
            self.node.render_block(sounding, &ctx);
        }
        silent.fill(0.0);

        self.elapsed_samples = self.elapsed_samples.saturating_add(audible as u32);
        if audible < out.len() && self.node.is_active() {
            self.node.note_off(&ctx);
        }
    }
}

/// Turns beat ticks into clicks on the shared audio resource
pub struct ClickSynth<H: AudioHost> {
    engine: AudioEngine<H>,
}

impl<H: AudioHost> ClickSynth<H> {
    pub fn new(host: H) -> Self {
        Self {
            engine: AudioEngine::new(host),
        }
    }

    /// Make sure the output exists and is running before the first click
    pub fn prepare(&mut self) -> bool {
        self.engine.acquire().is_some()
    }

    /// Schedule one click. Never blocks on rendering; a missing or failing
    /// output skips the click.
    pub fn play_click(&mut self, accent: bool) {
        let Some(context) = self.engine.acquire() else {
            trace!("No audio output, skipping click (accent: {})", accent);
            return;
        };

        if let Err(e) = context.schedule(ClickVoice::new(accent)) {
            warn!("Dropped click: {}", e);
        }
    }

    pub fn engine(&self) -> &AudioEngine<H> {
        &self.engine
    }

    pub fn release(&mut self) {
        self.engine.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn bounce(accent: bool, samples: usize) -> Vec<f32> {
        let mut voice = ClickVoice::new(accent);
        let mut buffer = vec![0.0f32; samples];
        for block in buffer.chunks_mut(256) {
            voice.render(block, SAMPLE_RATE);
        }
        buffer
    }

    #[test]
    fn accent_is_louder_and_higher() {
        assert!(ClickTone::ACCENT.gain > ClickTone::REGULAR.gain);
        assert!(ClickTone::ACCENT.frequency > ClickTone::REGULAR.frequency);
        assert_eq!(ClickTone::for_beat(true), ClickTone::ACCENT);
        assert_eq!(ClickTone::for_beat(false), ClickTone::REGULAR);
    }

    #[test]
    fn peak_matches_initial_gain() {
        let accent = bounce(true, 9_600);
        let regular = bounce(false, 9_600);

        let peak = |buf: &[f32]| buf.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert_eq!(peak(&accent), 0.35);
        assert_eq!(peak(&regular), 0.22);
    }

    #[test]
    fn decays_to_floor_by_100ms() {
        let buffer = bounce(true, 9_600);

        // 100ms = 4800 samples; square wave so |sample| is the envelope level
        let at_ramp_end = buffer[4_800].abs();
        assert!((at_ramp_end - 0.001).abs() < 1e-5, "got {at_ramp_end}");

        // Still holding the floor just before the stop
        assert!((buffer[5_700].abs() - 0.001).abs() < 1e-5);
    }

    #[test]
    fn silent_after_120ms() {
        let buffer = bounce(false, 9_600);

        // 120ms = 5760 samples
        assert!(buffer[5_759].abs() > 0.0);
        assert!(buffer[5_760..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn finished_only_after_duration() {
        let mut voice = ClickVoice::new(false);
        assert!(!voice.is_finished());

        let mut block = vec![0.0f32; 4_800];
        voice.render(&mut block, SAMPLE_RATE);
        assert!(!voice.is_finished());

        voice.render(&mut block, SAMPLE_RATE);
        assert!(voice.is_finished());
    }

    #[test]
    fn pitch_follows_tone() {
        let buffer = bounce(true, 5_760);
        let crossings = buffer
            .windows(2)
            .filter(|w| w[0].signum() != w[1].signum())
            .count();

        // 1400 Hz for 120ms = 168 cycles = ~336 sign changes
        assert!((333..=337).contains(&crossings), "got {crossings}");
    }
}
