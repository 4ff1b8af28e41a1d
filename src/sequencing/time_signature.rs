use crate::error::MetronomeError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Time signature from the fixed set offered by the selector
///
/// Only the numerator drives beat counting. The note value is carried for
/// display and has no effect on timing: 2/2 ticks twice per measure at the
/// same interval as 2/4.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    label: &'static str,
    /// Number of beats per measure (numerator)
    pub beats_per_measure: u8,
    /// Note value that gets one beat (denominator)
    pub note_value: u8,
}

impl TimeSignature {
    /// 2/4 time (march, default)
    pub const TWO_FOUR: TimeSignature = TimeSignature {
        label: "2/4",
        beats_per_measure: 2,
        note_value: 4,
    };

    /// 3/4 time (waltz)
    pub const THREE_FOUR: TimeSignature = TimeSignature {
        label: "3/4",
        beats_per_measure: 3,
        note_value: 4,
    };

    /// 2/2 time (cut time)
    pub const TWO_TWO: TimeSignature = TimeSignature {
        label: "2/2",
        beats_per_measure: 2,
        note_value: 2,
    };

    /// Every selectable signature, in selector order
    pub const ALL: [TimeSignature; 3] = [Self::TWO_FOUR, Self::THREE_FOUR, Self::TWO_TWO];

    /// Look up a signature by its label ("2/4", "3/4", "2/2")
    pub fn from_label(label: &str) -> Result<Self, MetronomeError> {
        let label = label.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|sig| sig.label == label)
            .ok_or_else(|| MetronomeError::UnknownSignature(label.to_string()))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The signature after this one in selector order, wrapping at the end
    pub fn next(&self) -> Self {
        let idx = Self::ALL
            .iter()
            .position(|sig| sig == self)
            .unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::TWO_FOUR
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label)
    }
}

impl std::str::FromStr for TimeSignature {
    type Err = MetronomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl TryFrom<String> for TimeSignature {
    type Error = MetronomeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_label(&value)
    }
}

impl From<TimeSignature> for String {
    fn from(sig: TimeSignature) -> Self {
        sig.label.to_string()
    }
}
