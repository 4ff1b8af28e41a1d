pub mod audio; // Audio capability, click voices, output host
pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod logging;
pub mod sequencing; // Tempo and time signatures
pub mod transport; // Beat clock and tick timer

pub use config::MetronomeConfig;
pub use error::MetronomeError;
pub use sequencing::{Tempo, TimeSignature};
pub use transport::{BeatEvent, Transport, TransportSnapshot};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
