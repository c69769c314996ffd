use crate::app::actions::Action;
use crate::app::events::{Event, InputEvent};
use crate::app::state::{AppState, InputMode, PromptKind};
use crossterm::event::{
    self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEventKind,
};
use tokio::sync::mpsc;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: isize = 1;
const PAGE_LINES: isize = 5;

pub fn spawn_input_task(tx: mpsc::Sender<Event>, mouse_enabled: bool) {
    tokio::task::spawn_blocking(move || {
        loop {
            if event::poll(std::time::Duration::from_millis(250)).unwrap_or(false) {
                let ev = match event::read() {
                    Ok(CtEvent::Key(k)) if k.kind == KeyEventKind::Press => InputEvent::Key(k),
                    Ok(CtEvent::Mouse(m)) if mouse_enabled => InputEvent::Mouse(m),
                    Ok(CtEvent::Resize(_, _)) => InputEvent::Resize,
                    _ => continue,
                };
                if tx.blocking_send(Event::Input(ev)).is_err() {
                    break;
                }
            } else if tx.is_closed() {
                break;
            }
        }
    });
}

pub fn map_input_to_action(state: &AppState, ev: InputEvent) -> Option<Action> {
    match ev {
        InputEvent::Resize => Some(Action::Resize),
        InputEvent::Mouse(m) => match m.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollLyrics(-WHEEL_LINES)),
            MouseEventKind::ScrollDown => Some(Action::ScrollLyrics(WHEEL_LINES)),
            MouseEventKind::Down(MouseButton::Left) => {
                state.line_at(m.column, m.row).map(Action::SeekToLine)
            }
            _ => None,
        },
        InputEvent::Key(k) => match state.input_mode {
            InputMode::Prompt { .. } => handle_prompt(k),
            InputMode::Normal => handle_normal_mode(k),
        },
    }
}

fn handle_prompt(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Esc => Some(Action::CancelPrompt),
        KeyCode::Enter => Some(Action::SubmitPrompt),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ClearInput)
        }
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::CancelPrompt)
        }
        KeyCode::Char(c) => Some(Action::InputChar(c)),
        _ => None,
    }
}

fn handle_normal_mode(k: KeyEvent) -> Option<Action> {
    match k.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),

        // Prompts
        KeyCode::Char('/') | KeyCode::Char('s') => Some(Action::OpenPrompt(PromptKind::Search)),
        KeyCode::Char('l') => Some(Action::OpenPrompt(PromptKind::Lyrics)),

        // Playback
        KeyCode::Char(' ') => Some(Action::TogglePause),
        KeyCode::Char(']') | KeyCode::Right => Some(Action::SeekForward),
        KeyCode::Char('[') | KeyCode::Left => Some(Action::SeekBack),
        KeyCode::Char('=') | KeyCode::Char('+') => Some(Action::VolumeUp),
        KeyCode::Char('-') | KeyCode::Char('_') => Some(Action::VolumeDown),

        // Lyric view
        KeyCode::Up | KeyCode::Char('k') => Some(Action::ScrollLyrics(-1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::ScrollLyrics(1)),
        KeyCode::PageUp => Some(Action::ScrollLyrics(-PAGE_LINES)),
        KeyCode::PageDown => Some(Action::ScrollLyrics(PAGE_LINES)),
        KeyCode::Char('u') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ScrollLyrics(-PAGE_LINES))
        }
        KeyCode::Char('d') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Action::ScrollLyrics(PAGE_LINES))
        }
        KeyCode::Enter => Some(Action::JumpToAnchor),
        KeyCode::Char('f') | KeyCode::Esc => Some(Action::FollowPlayback),

        // Candidates
        KeyCode::Tab | KeyCode::Char('n') => Some(Action::NextCandidate),
        KeyCode::BackTab | KeyCode::Char('p') => Some(Action::PrevCandidate),
        KeyCode::Char(c @ '1'..='9') => Some(Action::SelectCandidateAt(
            (c as usize) - ('1' as usize),
        )),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::LyricsView;
    use crate::config::Config;
    use crossterm::event::{MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> InputEvent {
        InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> InputEvent {
        InputEvent::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn normal_mode_keys() {
        let state = AppState::new(&Config::default());
        let map = |ev| map_input_to_action(&state, ev);

        assert_eq!(map(key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(
            map(key(KeyCode::Char('/'))),
            Some(Action::OpenPrompt(PromptKind::Search))
        );
        assert_eq!(
            map(key(KeyCode::Char('l'))),
            Some(Action::OpenPrompt(PromptKind::Lyrics))
        );
        assert_eq!(map(key(KeyCode::Char(' '))), Some(Action::TogglePause));
        assert_eq!(map(key(KeyCode::Right)), Some(Action::SeekForward));
        assert_eq!(map(key(KeyCode::Char('j'))), Some(Action::ScrollLyrics(1)));
        assert_eq!(map(ctrl('u')), Some(Action::ScrollLyrics(-5)));
        assert_eq!(map(key(KeyCode::Tab)), Some(Action::NextCandidate));
        assert_eq!(map(key(KeyCode::Char('1'))), Some(Action::SelectCandidateAt(0)));
        assert_eq!(map(key(KeyCode::Char('9'))), Some(Action::SelectCandidateAt(8)));
        assert_eq!(map(key(KeyCode::Char('0'))), None);
    }

    #[test]
    fn prompt_mode_captures_text() {
        let mut state = AppState::new(&Config::default());
        state.input_mode = InputMode::Prompt {
            kind: PromptKind::Search,
            buffer: String::new(),
        };
        let map = |ev| map_input_to_action(&state, ev);

        assert_eq!(map(key(KeyCode::Char('q'))), Some(Action::InputChar('q')));
        assert_eq!(map(key(KeyCode::Char(' '))), Some(Action::InputChar(' ')));
        assert_eq!(map(key(KeyCode::Backspace)), Some(Action::Backspace));
        assert_eq!(map(ctrl('u')), Some(Action::ClearInput));
        assert_eq!(map(key(KeyCode::Esc)), Some(Action::CancelPrompt));
        assert_eq!(map(key(KeyCode::Enter)), Some(Action::SubmitPrompt));
    }

    #[test]
    fn mouse_scrolls_and_clicks_lines() {
        let mut state = AppState::new(&Config::default());
        state.lyrics_view = Some(LyricsView {
            area: Rect::new(0, 0, 20, 5),
            first_line: 0,
        });

        assert_eq!(
            map_input_to_action(&state, mouse(MouseEventKind::ScrollDown, 3, 3)),
            Some(Action::ScrollLyrics(1))
        );
        // Only the idle placeholder line exists
        assert_eq!(
            map_input_to_action(&state, mouse(MouseEventKind::Down(MouseButton::Left), 3, 0)),
            Some(Action::SeekToLine(0))
        );
        assert_eq!(
            map_input_to_action(&state, mouse(MouseEventKind::Down(MouseButton::Left), 3, 1)),
            None
        );
    }
}
