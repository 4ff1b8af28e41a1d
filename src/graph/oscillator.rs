use crate::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

The oscillator is the raw sound source of a click. The waveform decides its
color:

Square: Hollow but cutting - only odd harmonics.
  - Sound: Woody, buzzy, very present in a mix
  - Harmonics: 1st, 3rd, 5th, 7th, ... falling off as 1/n
  - Use: Metronome clicks, chiptune beeps

Sine: A single frequency, no harmonics.
  - Sound: Pure, soft; easy to lose under other instruments

Saw / Triangle: Available for experimenting with alternative click timbres.

A square at 900 Hz carries energy at 2.7 kHz, 4.5 kHz, 6.3 kHz ... right
where the ear is most sensitive, which is why it reads as a crisp "tick"
even at low gain.

Example usage:
  let click = OscNode::square().with_frequency(1400.0);

  // Percussive click: square → exponential decay
  let voice = OscNode::square()
      .with_frequency(900.0)
      .amplify(EnvNode::exp_decay(0.22, 0.001, 0.1));
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency and uses this instead.
    base_frequency: Option<f32>,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    /// Set a fixed frequency, ignoring the pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self
    }

    pub fn frequency(&self) -> Option<f32> {
        self.base_frequency
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.osc.waveform()
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match self.base_frequency {
            Some(frequency) => {
                let fixed_ctx = RenderCtx { frequency, ..*ctx };
                self.osc.render(out, &fixed_ctx);
            }
            None => self.osc.render(out, ctx),
        }
    }

    fn note_on(&mut self, _ctx: &RenderCtx) {
        self.osc.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::from_freq(sample_rate, 440.0, 1.0);
        let mut osc = OscNode::sine();

        let mut buffer = vec![0.0f32; 128];
        osc.render_block(&mut buffer, &ctx);

        // sample n should be sin(2pi f n / sr)
        let sample_index = 12;
        let expected = (TAU * ctx.frequency * sample_index as f32 / sample_rate).sin();
        let actual = buffer[sample_index];
        assert!(
            (actual - expected).abs() < 1e-5,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn constructors_pick_waveform() {
        assert_eq!(OscNode::sine().waveform(), OscillatorWaveform::Sine);
        assert_eq!(OscNode::sawtooth().waveform(), OscillatorWaveform::Saw);
        assert_eq!(OscNode::triangle().waveform(), OscillatorWaveform::Triangle);
        assert_eq!(OscNode::triangle().frequency(), None);
    }

    #[test]
    fn fixed_frequency_ignores_ctx() {
        // ctx says 100 Hz, node is pinned to 1 kHz (48 samples per cycle)
        let ctx = RenderCtx::from_freq(48_000.0, 100.0, 1.0);
        let mut osc = OscNode::square().with_frequency(1_000.0);

        let mut buffer = vec![0.0f32; 48];
        osc.render_block(&mut buffer, &ctx);

        assert_eq!(buffer[10], 1.0);
        assert_eq!(buffer[30], -1.0);
        assert_eq!(osc.frequency(), Some(1_000.0));
        assert_eq!(osc.waveform(), OscillatorWaveform::Square);
    }
}
