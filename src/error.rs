/// Errors surfaced by the transport and the audio layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetronomeError {
    /// Time signature label is not part of the fixed set
    UnknownSignature(String),
    /// Host has no default output device
    NoOutputDevice,
    /// Output backend failed to build, start or configure a stream
    AudioBackend(String),
    /// Audio context was used after it had been closed
    ContextClosed,
    /// Tick timer thread could not be spawned
    TimerSpawn(String),
}

impl std::fmt::Display for MetronomeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetronomeError::UnknownSignature(label) => {
                write!(f, "Unknown time signature '{}' (expected 2/4, 3/4 or 2/2)", label)
            }
            MetronomeError::NoOutputDevice => write!(f, "No default audio output device available"),
            MetronomeError::AudioBackend(msg) => write!(f, "Audio backend error: {}", msg),
            MetronomeError::ContextClosed => write!(f, "Audio context has already been closed"),
            MetronomeError::TimerSpawn(msg) => write!(f, "Failed to spawn tick timer: {}", msg),
        }
    }
}

impl std::error::Error for MetronomeError {}
