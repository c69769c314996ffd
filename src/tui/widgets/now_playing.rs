//! Player bar: song, progress, transport state, volume, toast

use crate::app::state::{AppState, ToastKind};
use crate::player::PlaybackState;
use crate::tui::theme::{Icons, get_theme};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::Instant;

use super::{format_time, truncate_str};

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Player ", icons.music))
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner)[1];

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Song
            Constraint::Length(1), // Progress bar
            Constraint::Length(1), // Time + state + volume + toast
        ])
        .split(padded);

    let content_width = padded.width as usize;

    // Song line
    let song_spans = match &state.song {
        Some(song) => {
            let mut spans = vec![Span::styled(
                song.title.clone(),
                Style::default()
                    .fg(theme.palette.fg_primary)
                    .add_modifier(Modifier::BOLD),
            )];
            if !song.artist.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", song.artist),
                    Style::default().fg(theme.palette.fg_secondary),
                ));
            }
            spans
        }
        None if state.video.is_some() => vec![Span::styled(
            "Identifying song...",
            Style::default().fg(theme.palette.fg_secondary),
        )],
        None => vec![Span::styled(
            "Nothing loaded  (/ to search)",
            Style::default().fg(theme.palette.fg_secondary),
        )],
    };
    let song_text: String = song_spans.iter().map(|s| s.content.as_ref()).collect();
    if song_text.chars().count() > content_width {
        frame.render_widget(
            Paragraph::new(truncate_str(&song_text, content_width))
                .style(Style::default().fg(theme.palette.fg_primary)),
            rows[0],
        );
    } else {
        frame.render_widget(Paragraph::new(Line::from(song_spans)), rows[0]);
    }

    // Progress
    let ratio = if state.duration_secs > 0.0 {
        (state.position() / state.duration_secs).clamp(0.0, 1.0)
    } else {
        0.0
    };
    frame.render_widget(
        Paragraph::new(Span::styled(
            render_progress_bar(rows[1].width as usize, ratio, icons),
            Style::default().fg(theme.palette.accent),
        )),
        rows[1],
    );

    // Status row
    let state_icon = match state.playback {
        PlaybackState::Playing => icons.play,
        PlaybackState::Paused => icons.pause,
        PlaybackState::Ended | PlaybackState::Unstarted => icons.stop,
    };
    let vol_icon = if state.volume == 0 {
        icons.volume_mute
    } else if state.volume < 50 {
        icons.volume_low
    } else {
        icons.volume_high
    };
    let mut spans = vec![
        Span::styled(state_icon, Style::default().fg(theme.palette.sung)),
        Span::raw(" "),
        Span::styled(
            format!(
                "{} / {}",
                format_time(state.position()),
                format_time(state.duration_secs)
            ),
            Style::default().fg(theme.palette.fg_secondary),
        ),
        Span::raw("  "),
        Span::styled(vol_icon, Style::default().fg(theme.palette.fg_secondary)),
        Span::styled(
            format!(" {}%", state.volume),
            Style::default().fg(theme.palette.fg_secondary),
        ),
    ];

    if let Some(toast) = &state.toast
        && !toast.is_expired(Instant::now())
    {
        let (prefix, color) = match toast.kind {
            ToastKind::Success => (icons.success, theme.palette.accent),
            ToastKind::Error => (icons.error, theme.palette.error),
        };
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        spans.push(Span::styled(format!("   {prefix} "), Style::default().fg(color)));
        spans.push(Span::styled(
            truncate_str(&toast.message, content_width.saturating_sub(used + 5)),
            Style::default().fg(color),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[2]);
}

fn render_progress_bar(width: usize, ratio: f64, icons: &Icons) -> String {
    if width < 3 {
        return String::new();
    }

    let filled = ((width - 1) as f64 * ratio).round() as usize;
    let empty = width.saturating_sub(filled + 1);

    let mut bar = String::with_capacity(width * 3);
    for _ in 0..filled {
        bar.push_str(icons.progress_full);
    }
    bar.push_str(icons.progress_head);
    for _ in 0..empty {
        bar.push_str(icons.progress_empty);
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        let icons = Icons::nerd();
        assert_eq!(render_progress_bar(5, 0.0, &icons), "●────");
        assert_eq!(render_progress_bar(5, 0.5, &icons), "━━●──");
        assert_eq!(render_progress_bar(5, 1.0, &icons), "━━━━●");
        assert_eq!(render_progress_bar(2, 0.5, &icons), "");
    }
}
