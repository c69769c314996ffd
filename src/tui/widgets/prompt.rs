//! Bottom line: the input prompt when open, otherwise status and key hints

use crate::app::state::{AppState, InputMode};
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::truncate_str;

const HINTS: &str = "/ search  l lyrics  space pause  [ ] seek  j/k scroll  q quit";

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let width = area.width as usize;

    match &state.input_mode {
        InputMode::Prompt { kind, buffer } => {
            let label = format!(" {} {}: ", theme.icons.search, kind.label());
            let label_len = label.chars().count();
            // Keep the end of long input visible.
            let room = width.saturating_sub(label_len + 1);
            let shown: String = {
                let count = buffer.chars().count();
                buffer.chars().skip(count.saturating_sub(room)).collect()
            };
            let cursor_x = area.x + (label_len + shown.chars().count()) as u16;
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled(label, Style::default().fg(theme.palette.accent)),
                    Span::styled(shown, Style::default().fg(theme.palette.fg_primary)),
                ])),
                area,
            );
            frame.set_cursor_position(Position::new(
                cursor_x.min(area.x + area.width.saturating_sub(1)),
                area.y,
            ));
        }
        InputMode::Normal => {
            let text = if state.status.is_empty() {
                HINTS.to_string()
            } else {
                format!("{}  |  {HINTS}", state.status)
            };
            frame.render_widget(
                Paragraph::new(truncate_str(&format!(" {text}"), width))
                    .style(Style::default().fg(theme.palette.fg_secondary)),
                area,
            );
        }
    }
}
