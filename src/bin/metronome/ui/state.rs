//! UI-side state: what the user is typing and the last beat seen.

use std::time::{Duration, Instant};

use saavy_metronome::BeatEvent;

/// Longest tempo text accepted by the entry field ("240.5")
const MAX_ENTRY_LEN: usize = 6;

/// Numeric tempo entry, committed with Enter
#[derive(Debug, Default, Clone)]
pub struct BpmEntry {
    text: String,
}

impl BpmEntry {
    /// Append a typed character; only digits and one decimal point are kept
    pub fn push(&mut self, c: char) {
        let accepted = c.is_ascii_digit() || (c == '.' && !self.text.contains('.'));
        if accepted && self.text.len() < MAX_ENTRY_LEN {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn is_editing(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Take the typed text, leaving the field empty
    pub fn commit(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Latest state the widgets render from
#[derive(Debug, Default)]
pub struct UiState {
    pub bpm_entry: BpmEntry,
    /// Most recent beat and when the UI received it
    pub last_beat: Option<(BeatEvent, Instant)>,
    /// One-line notice shown in the transport bar
    pub status: Option<String>,
}

impl UiState {
    pub fn record_beat(&mut self, event: BeatEvent, at: Instant) {
        self.last_beat = Some((event, at));
    }

    pub fn clear_beat(&mut self) {
        self.last_beat = None;
    }
}

/// Pulse brightness: 1.0 at the beat, fading to 0.0 by the next one
pub fn pulse_level(elapsed: Duration, interval: Duration) -> f32 {
    if interval.is_zero() {
        return 0.0;
    }
    (1.0 - elapsed.as_secs_f32() / interval.as_secs_f32()).clamp(0.0, 1.0)
}
