use crate::{graph::node::RenderCtx, MIN_TIME};

/*
Exponential Decay Envelope
==========================

A percussive click is all transient: the level jumps to its peak the instant
the note starts, then falls away. This envelope models exactly that shape,
mirroring the familiar "set value, then exponential ramp" automation pattern:

    set level = start          at trigger time
    ramp level -> floor        exponentially over ramp_time seconds
    hold level = floor         until the voice is stopped


Why Exponential?
----------------

Hearing is logarithmic. A linear fade spends most of its time sounding loud
and then vanishes abruptly; an exponential fade loses the same number of
decibels every millisecond, which is how struck objects actually decay.

    Level
    start ┐╲
          │ ╲
          │  ╲_
          │    ╲__
          │       ╲____
    floor └────────────╲══════════→ Time
          0        ramp_time


The Math: Per-Sample Ratio
--------------------------

Over N = ramp_time * sample_rate samples we want

    start * ratio^N = floor

so

    ratio = (floor / start) ^ (1 / N)

and each sample is a single multiply: level *= ratio.

Example: start 0.35, floor 0.001, 100 ms at 48 kHz
  - N = 4800 samples
  - ratio = (0.001 / 0.35)^(1/4800) ≈ 0.998779
  - halfway through (2400 samples) the level is sqrt(0.35 * 0.001) ≈ 0.0187

Both endpoints must be positive; an exponential can never reach zero. The
floor is what makes the ramp well-defined, and the voice stopping is what
finally silences it.
*/

/// Smallest level either endpoint may take
const MIN_LEVEL: f32 = 1.0e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Idle, // Not triggered, level = 0
    Ramp, // Decaying from start toward floor
    Hold, // Ramp finished, holding at floor
}

pub struct Envelope {
    start_level: f32,
    floor_level: f32,
    ramp_time: f32,

    stage: EnvelopeState,
    level: f32,

    // Pre-computed at note_on so the per-sample cost is one multiply
    ratio: f32,
    ramp_total_samples: u32,
    ramp_elapsed_samples: u32,
}

impl Envelope {
    pub fn exp_decay(start: f32, floor: f32, ramp_time: f32) -> Self {
        Self {
            start_level: start.max(MIN_LEVEL),
            floor_level: floor.max(MIN_LEVEL),
            ramp_time: ramp_time.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            ratio: 1.0,
            ramp_total_samples: 1,
            ramp_elapsed_samples: 0,
        }
    }

    /// Jump to the start level and begin the ramp.
    pub fn note_on(&mut self, ctx: &RenderCtx) {
        self.ramp_total_samples = (self.ramp_time * ctx.sample_rate).round().max(1.0) as u32;
        self.ratio =
            (self.floor_level / self.start_level).powf(1.0 / self.ramp_total_samples as f32);
        self.ramp_elapsed_samples = 0;
        self.level = self.start_level;
        self.stage = EnvelopeState::Ramp;
    }

    /// Cut to silence.
    pub fn note_off(&mut self) {
        self.reset();
    }

    /// Produce the current level and advance by one sample.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = self.level;

        if self.stage == EnvelopeState::Ramp {
            self.ramp_elapsed_samples += 1;
            if self.ramp_elapsed_samples >= self.ramp_total_samples {
                self.level = self.floor_level;
                self.stage = EnvelopeState::Hold;
            } else {
                self.level *= self.ratio;
            }
        }

        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeState::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.ramp_elapsed_samples = 0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}
