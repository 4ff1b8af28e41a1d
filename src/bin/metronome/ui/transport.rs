//! Transport bar widget - shows play state, tempo, signature and notices

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use saavy_metronome::TransportSnapshot;

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    snapshot: &TransportSnapshot,
    status: Option<&str>,
) {
    let block = Block::default()
        .title(" Minimal Metronome ")
        .borders(Borders::ALL);

    let play_symbol = if snapshot.is_running { "▶" } else { "■" };
    let play_state_str = if snapshot.is_running { "Running" } else { "Stopped" };

    let mut spans = vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if snapshot.is_running {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{} BPM · {}  ", snapshot.tempo.bpm(), snapshot.signature),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Beats per bar: {}  ", snapshot.signature.beats_per_measure),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    if let Some(status) = status {
        spans.push(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Red),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
