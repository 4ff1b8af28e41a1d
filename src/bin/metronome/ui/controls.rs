//! Control surface widget - tempo entry, tempo slider, signature selector, start/stop

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, LineGauge, Paragraph},
    Frame,
};
use saavy_metronome::{Tempo, TimeSignature, TransportSnapshot};

use super::state::BpmEntry;

/// Slider position for a tempo, 0.0 at 40 BPM and 1.0 at 240 BPM
pub fn slider_ratio(tempo: Tempo) -> f64 {
    (tempo.bpm() - Tempo::MIN) as f64 / (Tempo::MAX - Tempo::MIN) as f64
}

pub fn render_controls(
    frame: &mut Frame,
    area: Rect,
    snapshot: &TransportSnapshot,
    entry: &BpmEntry,
) {
    let block = Block::default().title(" Controls ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tempo entry
            Constraint::Length(1), // Slider
            Constraint::Length(1), // Slow / Fast legend
            Constraint::Length(1),
            Constraint::Length(1), // Signature selector
            Constraint::Length(1), // Signature note
            Constraint::Length(1),
            Constraint::Length(1), // Start / Stop
            Constraint::Min(0),
        ])
        .split(inner);

    // Tempo entry: shows the typed text while editing, the stored tempo otherwise
    let entry_text = if entry.is_editing() {
        format!("[ {}_ ]", entry.text())
    } else {
        format!("[ {} ]", snapshot.tempo.bpm())
    };
    let entry_style = if entry.is_editing() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Tempo (BPM)  ", Style::default().fg(Color::DarkGray)),
            Span::styled(entry_text, entry_style),
        ])),
        rows[0],
    );

    let slider = LineGauge::default()
        .filled_style(Style::default().fg(Color::Indexed(99)))
        .unfilled_style(Style::default().fg(Color::DarkGray))
        .label(format!("{:>3} ", snapshot.tempo.bpm()))
        .ratio(slider_ratio(snapshot.tempo));
    frame.render_widget(slider, rows[1]);

    let legend_width = rows[2].width as usize;
    let legend = format!("{:<half$}{:>half$}", "Slow", "Fast", half = legend_width / 2);
    frame.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
        rows[2],
    );

    // Signature selector: every option, current one highlighted
    let mut spans = vec![Span::styled(
        "Time signature  ",
        Style::default().fg(Color::DarkGray),
    )];
    for sig in TimeSignature::ALL {
        let style = if sig == snapshot.signature {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", sig), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[4]);

    frame.render_widget(
        Paragraph::new(format!(
            "Downbeat is accented each measure. Beats per bar: {}.",
            snapshot.signature.beats_per_measure
        ))
        .style(Style::default().fg(Color::DarkGray)),
        rows[5],
    );

    let (label, style) = if snapshot.is_running {
        (" ■ Stop ", Style::default().fg(Color::White).bg(Color::DarkGray))
    } else {
        (
            " ▶ Start ",
            Style::default().fg(Color::White).bg(Color::Indexed(99)),
        )
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(label, style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("   {} BPM · {}", snapshot.tempo.bpm(), snapshot.signature),
                Style::default().fg(Color::Gray),
            ),
        ])),
        rows[7],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_spans_tempo_range() {
        assert_eq!(slider_ratio(Tempo::new(40)), 0.0);
        assert_eq!(slider_ratio(Tempo::new(240)), 1.0);
        assert_eq!(slider_ratio(Tempo::new(140)), 0.5);
    }
}
