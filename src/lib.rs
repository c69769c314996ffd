//! Follow a video's synced lyrics in the terminal.
//!
//! The lyric core (`video::title`, `lyrics::parser`, `lyrics::resolver`,
//! `lyrics::sync`) has no terminal or player dependencies; the `app`, `tui`
//! and `player::mpv` modules are the shell around it.

pub mod app;
pub mod config;
pub mod input;
pub mod lyrics;
pub mod player;
pub mod tui;
pub mod video;
