use crate::sequencing::{Tempo, TimeSignature};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Initial transport settings
///
/// ```ignore
/// let config = MetronomeConfig::new()
///     .bpm(96)
///     .signature(TimeSignature::THREE_FOUR);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetronomeConfig {
    pub tempo: Tempo,
    pub signature: TimeSignature,
}

impl MetronomeConfig {
    /// 180 BPM in 2/4
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tempo in beats per minute (clamped to 40..=240)
    pub fn bpm(mut self, bpm: u32) -> Self {
        self.tempo = Tempo::new(bpm);
        self
    }

    pub fn signature(mut self, signature: TimeSignature) -> Self {
        self.signature = signature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget() {
        let config = MetronomeConfig::new();
        assert_eq!(config.tempo.bpm(), 180);
        assert_eq!(config.signature, TimeSignature::TWO_FOUR);
    }

    #[test]
    fn builder_clamps_tempo() {
        let config = MetronomeConfig::new()
            .bpm(500)
            .signature(TimeSignature::TWO_TWO);
        assert_eq!(config.tempo.bpm(), 240);
        assert_eq!(config.signature.label(), "2/2");
    }
}
