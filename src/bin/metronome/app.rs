//! Metronome - application builder and runner

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use log::info;

use super::ui::UiApp;

use saavy_metronome::{MetronomeConfig, TimeSignature, Transport};

/// Main application builder
pub struct Metronome {
    config: MetronomeConfig,
}

impl Metronome {
    pub fn new() -> Self {
        Self {
            config: MetronomeConfig::default(),
        }
    }

    /// Initial tempo, clamped to 40..=240
    pub fn bpm(mut self, bpm: u32) -> Self {
        self.config = self.config.bpm(bpm);
        self
    }

    pub fn signature(mut self, signature: TimeSignature) -> Self {
        self.config = self.config.signature(signature);
        self
    }

    /// Run the application (takes over the terminal until quit)
    pub fn run(self) -> EyreResult<()> {
        info!(
            "Metronome at {} in {}",
            self.config.tempo, self.config.signature
        );

        // Audio output is opened lazily on the first Start
        let transport = Transport::with_default_output(self.config);
        let mut app = UiApp::new(transport);

        let mut terminal = ratatui::try_init().wrap_err("failed to initialise terminal")?;
        let result = app.run(&mut terminal);
        ratatui::restore();

        app.into_transport().shutdown();
        info!("Metronome closed");

        result
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}
