//! Lyric view: lines centred on the anchor, the sung line highlighted

use crate::app::state::{AppState, LyricsView};
use crate::tui::theme::{LoadingSpinner, get_theme};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::time::Instant;

use super::truncate_str;

/// Which lines fit in `height` rows with `anchor` on the middle row.
///
/// Returns `(blank rows above, first line, one past the last line)`.
fn visible_window(anchor: usize, len: usize, height: usize) -> (usize, usize, usize) {
    if height == 0 || len == 0 {
        return (0, 0, 0);
    }
    let anchor = anchor.min(len - 1);
    let middle = height / 2;
    let (pad, start) = if anchor >= middle {
        (0, anchor - middle)
    } else {
        (middle - anchor, 0)
    };
    let end = (start + height - pad).min(len);
    (pad, start, end)
}

pub fn render(frame: &mut Frame, state: &mut AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;
    let now = Instant::now();
    let holding = state.follower.is_holding(now);

    let mut title = format!(" {} Lyrics ", icons.lyrics);
    if let Some(active) = state.candidates.active() {
        title = format!(" {} {} · {} ", icons.lyrics, active.title, active.source);
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(if holding {
            theme.palette.border_focus
        } else {
            theme.palette.border
        }))
        .title(truncate_str(&title, area.width.saturating_sub(4) as usize))
        .title_style(Style::default().fg(theme.palette.accent));
    let block = if holding {
        block.title_bottom(Line::from(" f: follow  Enter: jump here ").right_aligned())
    } else {
        block
    };
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

    if state.searching && state.candidates.is_empty() {
        state.lyrics_view = None;
        let spinner = LoadingSpinner::frame(state.frame);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Length(1)])
            .split(padded);
        frame.render_widget(
            Paragraph::new(format!("{spinner} Looking up lyrics..."))
                .style(Style::default().fg(theme.palette.fg_secondary))
                .alignment(Alignment::Center),
            rows[1],
        );
        return;
    }

    let sequence = state.lyrics();
    let timed = sequence.is_timed();
    // Plain lyrics have no timing, so nothing is highlighted.
    let highlighted = if timed {
        state.follower.highlighted()
    } else {
        None
    };
    let anchor = state.follower.anchor(now);
    let (pad, start, end) = visible_window(anchor, sequence.len(), padded.height as usize);
    let max_width = padded.width.saturating_sub(2) as usize;

    let mut display: Vec<Line> = vec![Line::default(); pad];
    for (i, line) in sequence.lines()[start..end].iter().enumerate() {
        let index = start + i;
        let (style, text) = match highlighted {
            Some(h) if h == index => (
                Style::default()
                    .fg(theme.palette.sung)
                    .add_modifier(Modifier::BOLD),
                format!("{} {}", icons.note, line.text),
            ),
            Some(h) if index < h => (Style::default().fg(theme.palette.fg_past), line.text.clone()),
            _ if !state.candidates.is_empty() => {
                (Style::default().fg(theme.palette.fg_primary), line.text.clone())
            }
            // Placeholder message
            _ => (Style::default().fg(theme.palette.fg_secondary), line.text.clone()),
        };
        display.push(Line::from(Span::styled(truncate_str(&text, max_width), style)));
    }

    let drawn = (end - start) as u16;
    state.lyrics_view = Some(LyricsView {
        area: Rect::new(padded.x, padded.y + pad as u16, padded.width, drawn),
        first_line: start,
    });

    frame.render_widget(Paragraph::new(display).alignment(Alignment::Center), padded);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_centres_anchor() {
        // 10 rows, anchor 20 of 50: rows show lines 15..25 with 20 on row 5
        assert_eq!(visible_window(20, 50, 10), (0, 15, 25));
    }

    #[test]
    fn window_pads_near_the_top() {
        assert_eq!(visible_window(0, 50, 10), (5, 0, 5));
        assert_eq!(visible_window(2, 50, 10), (3, 0, 7));
    }

    #[test]
    fn window_stops_at_the_last_line() {
        assert_eq!(visible_window(49, 50, 10), (0, 44, 50));
        // Out-of-range anchors are clamped
        assert_eq!(visible_window(99, 3, 10), (3, 0, 3));
    }

    #[test]
    fn window_handles_empty_inputs() {
        assert_eq!(visible_window(0, 0, 10), (0, 0, 0));
        assert_eq!(visible_window(3, 5, 0), (0, 0, 0));
    }
}
