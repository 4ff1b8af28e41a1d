//! metronome - Terminal metronome
//!
//! Run with: cargo run

mod app;
mod ui;

use app::Metronome;
use log::LevelFilter;
use saavy_metronome::{logging, TimeSignature};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Logging is best effort; the UI works without it
    if let Err(e) = logging::init_logger(LevelFilter::Debug) {
        eprintln!("File logging disabled: {}", e);
    }

    Metronome::new()
        .bpm(180)
        .signature(TimeSignature::TWO_FOUR)
        .run()
}
