//! Beat display widget - beat number, pulse ring and per-beat dots

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use saavy_metronome::TransportSnapshot;

use super::state::{pulse_level, UiState};

/// Beat number as shown in the display: "–" while stopped
pub fn beat_label(current_beat: u8) -> String {
    if current_beat == 0 {
        "–".to_string()
    } else {
        current_beat.to_string()
    }
}

/// Pulse color: the downbeat flashes magenta, other beats indigo, fading to grey
fn pulse_color(level: f32, accent: bool) -> Color {
    let (r, g, b) = if accent { (236, 72, 153) } else { (99, 102, 241) };
    let base = 60.0;
    let mix = |c: u8| (base + (c as f32 - base) * level) as u8;
    Color::Rgb(mix(r), mix(g), mix(b))
}

pub fn render_beat(frame: &mut Frame, area: Rect, snapshot: &TransportSnapshot, ui: &UiState) {
    let now = Instant::now();
    let interval = snapshot.tempo.beat_interval();

    let (level, accent) = match ui.last_beat {
        Some((event, at)) if snapshot.is_running => {
            (pulse_level(now.duration_since(at), interval), event.accent)
        }
        _ => (0.0, false),
    };

    let block = Block::default()
        .title(" Beat ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(pulse_color(level, accent)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1), // Beat n / N
            Constraint::Length(1), // BPM
            Constraint::Length(1),
            Constraint::Length(1), // Dots
            Constraint::Length(1), // Dot numbers
            Constraint::Min(0),
        ])
        .split(inner);

    let beats = snapshot.signature.beats_per_measure;

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                beat_label(snapshot.current_beat),
                Style::default()
                    .fg(pulse_color(level.max(0.6), accent))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" / {}", beats), Style::default().fg(Color::DarkGray)),
        ]))
        .alignment(Alignment::Center),
        rows[1],
    );

    frame.render_widget(
        Paragraph::new(format!("{} BPM", snapshot.tempo.bpm()))
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        rows[2],
    );

    let mut dots = Vec::new();
    let mut numbers = Vec::new();
    for beat in 1..=beats {
        let active = snapshot.current_beat == beat;
        let (symbol, style) = if active {
            ("●", Style::default().fg(pulse_color(1.0, beat == 1)))
        } else {
            ("○", Style::default().fg(Color::DarkGray))
        };
        dots.push(Span::styled(format!(" {} ", symbol), style));
        numbers.push(Span::styled(
            format!(" {} ", beat),
            if active {
                Style::default().fg(Color::Indexed(99))
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(dots)).alignment(Alignment::Center),
        rows[4],
    );
    frame.render_widget(
        Paragraph::new(Line::from(numbers)).alignment(Alignment::Center),
        rows[5],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_beat_shows_dash() {
        assert_eq!(beat_label(0), "–");
        assert_eq!(beat_label(3), "3");
    }

    #[test]
    fn pulse_color_fades_to_grey() {
        assert_eq!(pulse_color(0.0, true), Color::Rgb(60, 60, 60));
        assert_eq!(pulse_color(1.0, false), Color::Rgb(99, 102, 241));
    }
}
