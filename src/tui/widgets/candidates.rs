//! Lyric candidates, best first; the active one is marked

use crate::app::state::AppState;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();
    let icons = &theme.icons;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_set(theme.border_set())
        .border_style(Style::default().fg(theme.palette.border))
        .title(format!(" {} Versions ", icons.list))
        .title_style(Style::default().fg(theme.palette.accent))
        .title_bottom(Line::from(" n/p or 1-9 ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = state
        .candidates
        .candidates()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let number = if i < 9 {
                format!("{} ", i + 1)
            } else {
                "  ".to_string()
            };
            let heading = if c.artist.is_empty() {
                c.title.clone()
            } else {
                format!("{} - {}", c.artist, c.title)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(number, Style::default().fg(theme.palette.fg_secondary)),
                    Span::styled(
                        truncate_str(&heading, width.saturating_sub(2)),
                        Style::default().fg(theme.palette.fg_primary),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", truncate_str(&c.source, width.saturating_sub(2))),
                    Style::default().fg(theme.palette.fg_secondary),
                )),
            ])
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(state.candidates.active_position());

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .fg(theme.palette.sung)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(icons.selected);

    frame.render_stateful_widget(list, inner, &mut list_state);
}
