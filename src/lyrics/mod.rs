//! Lyrics module for fetching, ranking and following synchronized lyrics
//!
//! This module provides:
//! - LRCLIB API client for fetching lyrics
//! - Timestamp parser for LRC-style payloads
//! - Candidate resolver that ranks everything LRCLIB returns
//! - Position-to-line mapping for the lyric view

pub mod lrclib;
pub mod parser;
pub mod resolver;
pub mod sync;

pub use lrclib::{LrclibClient, LyricsRecord, LyricsSource};
pub use resolver::{CandidateSet, LyricCandidate, ResolveStatus, resolve};
pub use sync::{LyricFollower, current_index};

/// Placeholder shown when a payload has no usable lines.
pub const NO_LYRICS_AVAILABLE: &str = "No lyrics available";

/// A single line of lyrics with its start time
#[derive(Debug, Clone, PartialEq)]
pub struct LyricLine {
    /// Seconds from the start of the track
    pub time: f64,
    pub text: String,
}

impl LyricLine {
    pub fn new(time: f64, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
        }
    }
}

/// Ordered lyric lines. Never empty: "nothing to show" is a single
/// sentinel line at time 0 carrying a placeholder message.
#[derive(Debug, Clone, PartialEq)]
pub struct LyricSequence {
    lines: Vec<LyricLine>,
}

impl LyricSequence {
    /// Build a sequence from parsed lines, falling back to the
    /// "no lyrics" sentinel when there are none.
    pub fn from_lines(lines: Vec<LyricLine>) -> Self {
        if lines.is_empty() {
            return Self::sentinel(NO_LYRICS_AVAILABLE);
        }
        Self { lines }
    }

    pub fn sentinel(message: impl Into<String>) -> Self {
        Self {
            lines: vec![LyricLine::new(0.0, message)],
        }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LyricLine> {
        self.lines.get(index)
    }

    /// True when at least one line carries a non-zero timestamp.
    pub fn is_timed(&self) -> bool {
        sync::has_timing(&self.lines)
    }
}
