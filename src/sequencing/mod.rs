pub mod tempo;
pub mod time_signature;

pub use tempo::Tempo;
pub use time_signature::TimeSignature;
