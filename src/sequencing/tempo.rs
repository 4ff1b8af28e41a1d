use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tempo in whole beats per minute, always within [`Tempo::MIN`, `Tempo::MAX`]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "f64", into = "u32")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tempo(u32);

impl Tempo {
    pub const MIN: u32 = 40;
    pub const MAX: u32 = 240;

    /// Build a tempo from whole BPM, clamping into range
    pub fn new(bpm: u32) -> Self {
        Self(bpm.clamp(Self::MIN, Self::MAX))
    }

    /// Build a tempo from fractional BPM, rounding to the nearest beat
    ///
    /// Returns `None` for NaN. Infinities clamp to the range edges.
    pub fn from_f64(bpm: f64) -> Option<Self> {
        if bpm.is_nan() {
            return None;
        }
        let clamped = bpm.round().clamp(Self::MIN as f64, Self::MAX as f64);
        Some(Self(clamped as u32))
    }

    /// Parse user text such as "120", " 96.4 " or "1e2"
    ///
    /// Anything that isn't a number yields `None`, which callers treat as
    /// "leave the tempo alone". Empty input counts as not-a-number rather
    /// than 0, so clearing the entry field never drops the tempo to 40.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().and_then(Self::from_f64)
    }

    pub fn bpm(&self) -> u32 {
        self.0
    }

    /// Time between beats: 60000 / bpm milliseconds
    pub fn beat_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.0 as f64)
    }

    /// Step by a signed number of beats, staying in range
    pub fn nudge(&self, delta: i32) -> Self {
        Self::new(self.0.saturating_add_signed(delta))
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(180)
    }
}

impl From<f64> for Tempo {
    /// NaN falls back to the default tempo
    fn from(bpm: f64) -> Self {
        Self::from_f64(bpm).unwrap_or_default()
    }
}

impl From<Tempo> for u32 {
    fn from(tempo: Tempo) -> Self {
        tempo.0
    }
}

impl std::fmt::Display for Tempo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} BPM", self.0)
    }
}
