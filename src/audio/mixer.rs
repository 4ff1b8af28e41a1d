use rtrb::{Consumer, Producer, PushError, RingBuffer};

use super::click::ClickVoice;
use crate::{error::MetronomeError, MAX_BLOCK_SIZE};

/// Voices waiting in the queue between the tick thread and the audio callback
pub const CLICK_QUEUE_SIZE: usize = 16;

/// Voices rendered at once. Clicks are 120ms and beats are at least 250ms
/// apart, so more than one is only ever live around a restart.
const MAX_ACTIVE_VOICES: usize = 8;

/// Sending half of the click queue (lives with the audio context)
///
/// Finished voices come back on a second ring and are freed here, on the
/// tick thread, so the audio callback never deallocates.
pub struct ClickQueue {
    tx: Producer<ClickVoice>,
    retired: Consumer<ClickVoice>,
}

impl ClickQueue {
    pub fn push(&mut self, voice: ClickVoice) -> Result<(), MetronomeError> {
        self.collect_retired();
        self.tx
            .push(voice)
            .map_err(|_| MetronomeError::AudioBackend("click queue is full".to_string()))
    }

    /// Drop voices the mixer has finished with; returns how many
    pub fn collect_retired(&mut self) -> usize {
        let mut freed = 0;
        while let Ok(voice) = self.retired.pop() {
            drop(voice);
            freed += 1;
        }
        freed
    }
}

/// Renders queued click voices into output buffers (runs in the audio callback)
pub struct ClickMixer {
    rx: Consumer<ClickVoice>,
    retired: Producer<ClickVoice>,
    active: Vec<ClickVoice>,
    mix_buf: Vec<f32>,
    voice_buf: Vec<f32>,
}

impl ClickMixer {
    /// Create a mixer plus the queue that feeds it
    pub fn with_queue(capacity: usize) -> (Self, ClickQueue) {
        let capacity = capacity.max(1);
        let (tx, rx) = RingBuffer::<ClickVoice>::new(capacity);
        // Room for every voice that can be queued or live at once
        let (retired_tx, retired_rx) = RingBuffer::<ClickVoice>::new(capacity + MAX_ACTIVE_VOICES);

        let mixer = Self {
            rx,
            retired: retired_tx,
            active: Vec::with_capacity(MAX_ACTIVE_VOICES),
            mix_buf: vec![0.0; MAX_BLOCK_SIZE],
            voice_buf: vec![0.0; MAX_BLOCK_SIZE],
        };

        let queue = ClickQueue {
            tx,
            retired: retired_rx,
        };

        (mixer, queue)
    }

    /// Number of voices still sounding
    pub fn active_voices(&self) -> usize {
        self.active.len()
    }

    fn pull_voices(&mut self) {
        while self.active.len() < MAX_ACTIVE_VOICES {
            match self.rx.pop() {
                Ok(voice) => self.active.push(voice),
                Err(_) => break,
            }
        }
    }

    /// Render one mono block (at most MAX_BLOCK_SIZE frames), overwriting `out`
    pub fn render_block(&mut self, out: &mut [f32], sample_rate: f32) {
        debug_assert!(out.len() <= MAX_BLOCK_SIZE);
        self.pull_voices();
        out.fill(0.0);

        let frames = out.len();
        for voice in self.active.iter_mut() {
            let vbuf = &mut self.voice_buf[..frames];
            voice.render(vbuf, sample_rate);
            for (o, &s) in out.iter_mut().zip(vbuf.iter()) {
                *o += s;
            }
        }

        self.retire_finished();
    }

    /// Hand finished voices back to the queue side. A voice stays in the
    /// active list (rendering silence) while the return ring is full.
    fn retire_finished(&mut self) {
        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].is_finished() && self.retired.slots() > 0 {
                let voice = self.active.swap_remove(i);
                if let Err(PushError::Full(voice)) = self.retired.push(voice) {
                    self.active.push(voice);
                    break;
                }
            } else {
                i += 1;
            }
        }
    }

    /// Fill an interleaved device buffer, copying the mono mix to every channel
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize, sample_rate: f32) {
        let channels = channels.max(1);
        let total_frames = data.len() / channels;
        let mut frames_written = 0;

        // Temporarily take the mix buffer so render_block can borrow self
        let mut block_buf = std::mem::take(&mut self.mix_buf);

        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
            let block = &mut block_buf[..frames_to_render];
            self.render_block(block, sample_rate);

            let out_off = frames_written * channels;
            for (i, &s) in block.iter().enumerate() {
                for ch in 0..channels {
                    data[out_off + i * channels + ch] = s;
                }
            }

            frames_written += frames_to_render;
        }

        self.mix_buf = block_buf;
    }
}
