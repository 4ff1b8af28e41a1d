//! Default-device audio output through cpal.
//!
//! The `cpal::Stream` lives on its own thread for its whole life, so the
//! context handed to the transport is `Send` on every platform. The context
//! talks to that thread with commands and feeds the audio callback through a
//! lock-free click queue.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange,
};
use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use log::{debug, info, warn};

use super::{
    mixer::{ClickMixer, ClickQueue, CLICK_QUEUE_SIZE},
    AudioContext, AudioHost, ClickVoice, ContextState,
};
use crate::error::MetronomeError;

/// Opens the host's default output device
#[derive(Debug, Clone, Copy)]
pub struct CpalHost {
    queue_capacity: usize,
}

impl CpalHost {
    pub fn new() -> Self {
        Self {
            queue_capacity: CLICK_QUEUE_SIZE,
        }
    }
}

impl Default for CpalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for CpalHost {
    type Context = CpalContext;

    fn create_context(&mut self) -> Result<Self::Context, MetronomeError> {
        CpalContext::open(self.queue_capacity)
    }
}

enum StreamCommand {
    Resume(Sender<Result<(), MetronomeError>>),
    Close,
}

pub struct CpalContext {
    queue: ClickQueue,
    commands: Sender<StreamCommand>,
    state: Arc<AtomicU8>,
    sample_rate: f32,
    channels: usize,
    thread: Option<JoinHandle<()>>,
}

impl CpalContext {
    fn open(queue_capacity: usize) -> Result<Self, MetronomeError> {
        let (mixer, queue) = ClickMixer::with_queue(queue_capacity);
        let (ready_tx, ready_rx) = bounded(1);
        let (cmd_tx, cmd_rx) = unbounded();
        let state = Arc::new(AtomicU8::new(ContextState::Suspended.as_u8()));

        let thread_state = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("metronome-audio".to_string())
            .spawn(move || run_stream(mixer, cmd_rx, ready_tx, thread_state))
            .map_err(|e| MetronomeError::AudioBackend(e.to_string()))?;

        let (sample_rate, channels) = match ready_rx.recv() {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(MetronomeError::AudioBackend(
                    "audio thread exited during setup".to_string(),
                ));
            }
        };

        info!(
            "Opened output stream: {} Hz, {} channel(s)",
            sample_rate, channels
        );

        Ok(Self {
            queue,
            commands: cmd_tx,
            state,
            sample_rate,
            channels,
            thread: Some(handle),
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl AudioContext for CpalContext {
    fn state(&self) -> ContextState {
        ContextState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn resume(&mut self) -> Result<(), MetronomeError> {
        match self.state() {
            ContextState::Running => return Ok(()),
            ContextState::Closed => return Err(MetronomeError::ContextClosed),
            ContextState::Suspended => {}
        }

        let (reply_tx, reply_rx) = bounded(1);
        self.commands
            .send(StreamCommand::Resume(reply_tx))
            .map_err(|_| MetronomeError::ContextClosed)?;
        reply_rx
            .recv()
            .map_err(|_| MetronomeError::ContextClosed)?
    }

    fn schedule(&mut self, voice: ClickVoice) -> Result<(), MetronomeError> {
        if self.state() == ContextState::Closed {
            return Err(MetronomeError::ContextClosed);
        }
        self.queue.push(voice)
    }

    fn close(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = self.commands.send(StreamCommand::Close);
            if handle.join().is_err() {
                warn!("Audio thread panicked during shutdown");
            }
        }
        self.state
            .store(ContextState::Closed.as_u8(), Ordering::Release);
    }
}

impl Drop for CpalContext {
    fn drop(&mut self) {
        self.close();
    }
}

/// Audio thread body: build the stream, report the format, serve commands.
fn run_stream(
    mixer: ClickMixer,
    commands: Receiver<StreamCommand>,
    ready: Sender<Result<(f32, usize), MetronomeError>>,
    state: Arc<AtomicU8>,
) {
    let (stream, format) = match build_stream(mixer) {
        Ok(built) => built,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // Some backends start playing as soon as the stream exists
    let _ = stream.pause();
    let _ = ready.send(Ok(format));

    for command in commands.iter() {
        match command {
            StreamCommand::Resume(reply) => {
                let result = stream
                    .play()
                    .map_err(|e| MetronomeError::AudioBackend(e.to_string()));
                if result.is_ok() {
                    state.store(ContextState::Running.as_u8(), Ordering::Release);
                    debug!("Output stream resumed");
                }
                let _ = reply.send(result);
            }
            StreamCommand::Close => break,
        }
    }

    drop(stream);
    state.store(ContextState::Closed.as_u8(), Ordering::Release);
    debug!("Output stream closed");
}

fn build_stream(mut mixer: ClickMixer) -> Result<(cpal::Stream, (f32, usize)), MetronomeError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(MetronomeError::NoOutputDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| MetronomeError::AudioBackend(e.to_string()))?;

    let config: StreamConfig = if config.sample_format() == SampleFormat::F32 {
        config.into()
    } else {
        // Many ALSA defaults are I16; look for an F32 layout near the default
        let ranges = device
            .supported_output_configs()
            .map_err(|e| MetronomeError::AudioBackend(e.to_string()))?;
        choose_f32_config(ranges, config.sample_rate().0, config.channels()).ok_or_else(|| {
            MetronomeError::AudioBackend(format!(
                "unsupported sample format {:?}, no f32 output available",
                config.sample_format()
            ))
        })?
    };

    let sample_rate = config.sample_rate.0 as f32;
    let channels = config.channels as usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _| {
                mixer.render_interleaved(data, channels, sample_rate);
            },
            |err| warn!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| MetronomeError::AudioBackend(e.to_string()))?;

    Ok((stream, (sample_rate, channels)))
}

/// Pick the F32 range closest to the wanted rate, preferring the wanted
/// channel count, then stereo.
fn choose_f32_config(
    ranges: impl IntoIterator<Item = SupportedStreamConfigRange>,
    sample_rate: u32,
    channels: u16,
) -> Option<StreamConfig> {
    let rate_diff = |range: &SupportedStreamConfigRange| {
        sample_rate
            .clamp(range.min_sample_rate().0, range.max_sample_rate().0)
            .abs_diff(sample_rate)
    };
    let channel_rank = |range: &SupportedStreamConfigRange| match range.channels() {
        c if c == channels => 0,
        2 => 1,
        _ => 2,
    };

    let range = ranges
        .into_iter()
        .filter(|range| range.sample_format() == SampleFormat::F32 && range.channels() != 0)
        .min_by(|l, r| {
            rate_diff(l)
                .cmp(&rate_diff(r))
                .then_with(|| channel_rank(l).cmp(&channel_rank(r)))
        })?;

    Some(StreamConfig {
        channels: range.channels(),
        sample_rate: SampleRate(
            sample_rate.clamp(range.min_sample_rate().0, range.max_sample_rate().0),
        ),
        buffer_size: BufferSize::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::SupportedBufferSize;

    fn range(channels: u16, min: u32, max: u32, format: SampleFormat) -> SupportedStreamConfigRange {
        SupportedStreamConfigRange::new(
            channels,
            SampleRate(min),
            SampleRate(max),
            SupportedBufferSize::Unknown,
            format,
        )
    }

    #[test]
    fn picks_f32_when_default_is_i16() {
        let ranges = vec![
            range(2, 44_100, 48_000, SampleFormat::I16),
            range(1, 8_000, 192_000, SampleFormat::F32),
            range(2, 8_000, 192_000, SampleFormat::F32),
        ];

        let config = choose_f32_config(ranges, 48_000, 2).unwrap();
        assert_eq!(config.channels, 2);
        assert_eq!(config.sample_rate, SampleRate(48_000));
    }

    #[test]
    fn clamps_rate_into_range() {
        let ranges = vec![range(2, 8_000, 44_100, SampleFormat::F32)];
        let config = choose_f32_config(ranges, 48_000, 2).unwrap();
        assert_eq!(config.sample_rate, SampleRate(44_100));
    }

    #[test]
    fn closer_rate_beats_channel_match() {
        let ranges = vec![
            range(2, 22_050, 22_050, SampleFormat::F32),
            range(6, 48_000, 48_000, SampleFormat::F32),
        ];
        let config = choose_f32_config(ranges, 48_000, 2).unwrap();
        assert_eq!(config.channels, 6);
    }

    #[test]
    fn none_without_f32() {
        let ranges = vec![range(2, 44_100, 48_000, SampleFormat::I16)];
        assert!(choose_f32_config(ranges, 48_000, 2).is_none());
    }
}
