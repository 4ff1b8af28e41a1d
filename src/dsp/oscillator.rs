use crate::graph::node::RenderCtx;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase Accumulator
=================

Every waveform here is a function of a single number: phase, running from 0.0
up to (but not including) 1.0 once per cycle.

    phase_increment = frequency / sample_rate

Each sample we read the waveform at the current phase, then advance:

    phase += phase_increment
    if phase >= 1.0 { phase -= 1.0 }

At 900 Hz and 48 kHz the increment is 0.01875, so one cycle takes ~53 samples.

Waveforms as functions of phase:

    Sine      sin(2π · phase)
    Square    +1 for phase < 0.5, -1 otherwise
    Saw       2 · phase - 1
    Triangle  1 - 4 · |phase - 0.5|

The square is naive (not band-limited). At click frequencies and a 100 ms
envelope the aliasing is inaudible next to the transient itself.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorWaveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

pub struct OscillatorBlock {
    waveform: OscillatorWaveform,
    phase: f32,
}

impl OscillatorBlock {
    pub fn new(waveform: OscillatorWaveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorWaveform::Sine)
    }

    pub fn square() -> Self {
        Self::new(OscillatorWaveform::Square)
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorWaveform::Saw)
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorWaveform::Triangle)
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    /// Restart the cycle so every trigger begins on the same edge
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    fn sample_at(&self, phase: f32) -> f32 {
        match self.waveform {
            OscillatorWaveform::Sine => (std::f32::consts::TAU * phase).sin(),
            OscillatorWaveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            OscillatorWaveform::Saw => 2.0 * phase - 1.0,
            OscillatorWaveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }

    /// Fill the buffer with the waveform at `ctx.frequency`
    pub fn render(&mut self, destination: &mut [f32], ctx: &RenderCtx) {
        let increment = ctx.frequency / ctx.sample_rate;

        for sample in destination.iter_mut() {
            *sample = self.sample_at(self.phase);
            self.phase += increment;
            if self.phase >= 1.0 {
                self.phase -= self.phase.floor();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn square_alternates_each_half_cycle() {
        // 1 kHz at 48 kHz = 48 samples per cycle
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 1_000.0, 1.0);
        let mut osc = OscillatorBlock::square();
        let mut buffer = vec![0.0f32; 96];
        osc.render(&mut buffer, &ctx);

        // Skip the samples sitting exactly on an edge
        assert!(buffer[..23].iter().all(|&s| s == 1.0));
        assert!(buffer[25..47].iter().all(|&s| s == -1.0));
        assert!(buffer[49..71].iter().all(|&s| s == 1.0));
    }

    #[test]
    fn square_zero_crossings_match_frequency() {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 900.0, 1.0);
        let mut osc = OscillatorBlock::square();
        let mut buffer = vec![0.0f32; SAMPLE_RATE as usize];
        osc.render(&mut buffer, &ctx);

        // Two sign changes per cycle
        let crossings = buffer
            .windows(2)
            .filter(|w| w[0].signum() != w[1].signum())
            .count();
        assert!((1_798..=1_801).contains(&crossings), "got {crossings}");
    }

    #[test]
    fn phase_continues_across_blocks() {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);

        let mut whole = OscillatorBlock::sine();
        let mut one_block = vec![0.0f32; 256];
        whole.render(&mut one_block, &ctx);

        let mut split = OscillatorBlock::sine();
        let mut first = vec![0.0f32; 100];
        let mut second = vec![0.0f32; 156];
        split.render(&mut first, &ctx);
        split.render(&mut second, &ctx);

        assert!((one_block[100] - second[0]).abs() < 1e-6);
        assert!((one_block[255] - second[155]).abs() < 1e-5);
    }

    #[test]
    fn saw_and_triangle_shapes() {
        // 1 kHz at 48 kHz: phase at sample 12 is 0.25
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 1_000.0, 1.0);

        let mut saw = OscillatorBlock::sawtooth();
        let mut buffer = vec![0.0f32; 13];
        saw.render(&mut buffer, &ctx);
        assert_eq!(saw.waveform(), OscillatorWaveform::Saw);
        assert_eq!(buffer[0], -1.0);
        assert!((buffer[12] - -0.5).abs() < 1e-5);

        let mut tri = OscillatorBlock::triangle();
        tri.render(&mut buffer, &ctx);
        assert_eq!(tri.waveform(), OscillatorWaveform::Triangle);
        assert_eq!(buffer[0], -1.0);
        assert!(buffer[12].abs() < 1e-5);
    }

    #[test]
    fn reset_restarts_cycle() {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 1_000.0, 1.0);
        let mut osc = OscillatorBlock::square();
        let mut buffer = vec![0.0f32; 30];
        osc.render(&mut buffer, &ctx);
        assert_eq!(buffer[29], -1.0);

        osc.reset();
        osc.render(&mut buffer[..1], &ctx);
        assert_eq!(buffer[0], 1.0);
    }
}
