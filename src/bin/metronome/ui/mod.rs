//! TUI module for the metronome
//!
//! Draws the transport bar, control surface and beat display, and maps
//! keys onto transport commands.

mod beat;
mod controls;
pub mod state;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossbeam::channel::Receiver;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::error;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use saavy_metronome::{
    audio::AudioHost, BeatEvent, MetronomeError, Transport, TransportSnapshot,
};

pub use state::UiState;

use beat::render_beat;
use controls::render_controls;
use transport::render_transport;

/// Tempo step for PageUp / PageDown
const COARSE_STEP: i32 = 10;

/// UI application state
pub struct UiApp<H: AudioHost> {
    transport: Transport<H>,
    /// Beat events from the transport's tick thread
    beats: Receiver<BeatEvent>,
    state: UiState,
    /// Transport state as of the last poll
    snapshot: TransportSnapshot,
    should_quit: bool,
}

impl<H: AudioHost> UiApp<H> {
    pub fn new(transport: Transport<H>) -> Self {
        let beats = transport.subscribe();
        let snapshot = transport.snapshot();
        Self {
            transport,
            beats,
            state: UiState::default(),
            snapshot,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_beats();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Hand the transport back so it can be shut down
    pub fn into_transport(self) -> Transport<H> {
        self.transport
    }

    fn poll_beats(&mut self) {
        let now = Instant::now();
        for event in self.beats.try_iter() {
            self.state.record_beat(event, now);
        }

        self.snapshot = self.transport.snapshot();
        if !self.snapshot.is_running {
            self.state.clear_beat();
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let result = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Esc => {
                if self.state.bpm_entry.is_editing() {
                    self.state.bpm_entry.clear();
                } else {
                    self.should_quit = true;
                }
                Ok(())
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                self.state.bpm_entry.push(c);
                Ok(())
            }
            KeyCode::Backspace => {
                self.state.bpm_entry.backspace();
                Ok(())
            }
            KeyCode::Enter => {
                let input = self.state.bpm_entry.commit();
                self.transport.set_bpm_input(&input).map(|_| ())
            }
            KeyCode::Left => self.nudge(-1),
            KeyCode::Right => self.nudge(1),
            KeyCode::PageDown => self.nudge(-COARSE_STEP),
            KeyCode::PageUp => self.nudge(COARSE_STEP),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Tab => {
                let next = self.transport.signature().next();
                self.transport.set_signature(next.label()).map(|_| ())
            }
            KeyCode::Char(' ') => self.transport.toggle(),
            _ => Ok(()),
        };

        match result {
            Ok(()) => self.state.status = None,
            Err(e) => {
                error!("{}", e);
                self.state.status = Some(e.to_string());
            }
        }
    }

    fn nudge(&mut self, delta: i32) -> Result<(), MetronomeError> {
        let tempo = self.transport.tempo().nudge(delta);
        self.transport.set_bpm(tempo.bpm()).map(|_| ())
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Main layout: transport, body, help
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Transport bar
                Constraint::Min(10),   // Controls + beat display
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        render_transport(frame, chunks[0], &self.snapshot, self.state.status.as_deref());

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        render_controls(frame, body[0], &self.snapshot, &self.state.bpm_entry);
        render_beat(frame, body[1], &self.snapshot, &self.state);

        let help = Paragraph::new(
            " [0-9 Enter] Tempo  [←/→] ±1  [PgUp/PgDn] ±10  [S] Signature  [Space] Start/Stop  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[2]);
    }
}
