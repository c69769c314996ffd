//! Root layout
//!
//! ┌────────────────────────────────────┬──────────────┐
//! │              Lyrics                │  Candidates  │
//! │                                    │              │
//! ├────────────────────────────────────┴──────────────┤
//! │ Player                                            │
//! ├───────────────────────────────────────────────────┤
//! │ prompt / status                                   │
//! └───────────────────────────────────────────────────┘

use crate::app::state::AppState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use super::{candidates, lyrics, now_playing, prompt};

const CANDIDATES_WIDTH: u16 = 34;

pub fn render(frame: &mut Frame, state: &mut AppState) {
    let root = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),    // Lyrics + candidates
            Constraint::Length(5), // Player
            Constraint::Length(1), // Prompt / status
        ])
        .split(root);

    // Narrow terminals give the whole width to the lyrics.
    let show_candidates = rows[0].width >= CANDIDATES_WIDTH * 2 && !state.candidates.is_empty();
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(if show_candidates {
            [Constraint::Min(30), Constraint::Length(CANDIDATES_WIDTH)]
        } else {
            [Constraint::Min(1), Constraint::Length(0)]
        })
        .split(rows[0]);

    lyrics::render(frame, state, top[0]);
    if show_candidates {
        candidates::render(frame, state, top[1]);
    }
    now_playing::render(frame, state, rows[1]);
    prompt::render(frame, state, rows[2]);
}
