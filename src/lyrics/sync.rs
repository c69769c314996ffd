//! Playback position to lyric line mapping

use super::LyricLine;
use std::time::{Duration, Instant};

/// Index of the line that is current at `position` seconds.
///
/// Line `i` is current when `position >= lines[i].time` and either it is the
/// last line or `position < lines[i + 1].time`. Returns `None` for an empty
/// slice, a position before the first line, or a NaN position.
pub fn current_index(position: f64, lines: &[LyricLine]) -> Option<usize> {
    if position.is_nan() {
        return None;
    }
    lines.iter().enumerate().position(|(i, line)| {
        position >= line.time
            && lines
                .get(i + 1)
                .is_none_or(|next| position < next.time)
    })
}

/// True when at least one line carries a non-zero timestamp.
pub fn has_timing(lines: &[LyricLine]) -> bool {
    lines.iter().any(|l| l.time > 0.0)
}

/// Tracks the highlighted line and where the lyric view should be centred.
///
/// Highlighting always follows playback. Auto-scrolling pauses for a while
/// after the user scrolls the view by hand. Untimed lyrics never auto-scroll:
/// the view stays wherever the user left it.
#[derive(Debug, Clone)]
pub struct LyricFollower {
    highlighted: Option<usize>,
    timed: bool,
    manual_anchor: usize,
    hold_until: Option<Instant>,
    hold: Duration,
}

impl LyricFollower {
    pub fn new(hold: Duration) -> Self {
        Self {
            highlighted: None,
            timed: false,
            manual_anchor: 0,
            hold_until: None,
            hold,
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    /// Recompute the highlighted line. Returns true when it changed.
    pub fn update(&mut self, position: f64, lines: &[LyricLine]) -> bool {
        let next = current_index(position, lines);
        let changed = next != self.highlighted;
        self.highlighted = next;
        self.timed = has_timing(lines);
        changed
    }

    /// Forget the highlighted line, e.g. after the active lyrics were swapped.
    pub fn reset(&mut self) {
        self.highlighted = None;
        self.timed = false;
        self.manual_anchor = 0;
        self.hold_until = None;
    }

    /// Move the view by `delta` lines and hold auto-follow.
    pub fn user_scrolled(&mut self, now: Instant, delta: isize, len: usize) {
        if len == 0 {
            return;
        }
        let from = if self.is_holding(now) || !self.timed {
            self.manual_anchor
        } else {
            self.highlighted.unwrap_or(0)
        };
        self.manual_anchor = from.saturating_add_signed(delta).min(len - 1);
        if self.timed {
            self.hold_until = Some(now + self.hold);
        }
    }

    pub fn is_holding(&self, now: Instant) -> bool {
        self.hold_until.is_some_and(|until| now < until)
    }

    /// Line the view should be centred on.
    pub fn anchor(&self, now: Instant) -> usize {
        if self.is_holding(now) || !self.timed {
            self.manual_anchor
        } else {
            self.highlighted.unwrap_or(0)
        }
    }

    /// Release the manual hold right away.
    pub fn release(&mut self) {
        self.hold_until = None;
    }
}

/// Start time of line `index`, used as a seek target when a line is picked.
pub fn line_time(index: usize, lines: &[LyricLine]) -> Option<f64> {
    lines.get(index).map(|l| l.time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::parser;

    fn abc() -> Vec<LyricLine> {
        vec![
            LyricLine::new(0.0, "a"),
            LyricLine::new(10.0, "b"),
            LyricLine::new(20.0, "c"),
        ]
    }

    #[test]
    fn test_current_index_boundaries() {
        let lines = abc();
        assert_eq!(current_index(5.0, &lines), Some(0));
        assert_eq!(current_index(10.0, &lines), Some(1));
        assert_eq!(current_index(19.9, &lines), Some(1));
        assert_eq!(current_index(25.0, &lines), Some(2));
        assert_eq!(current_index(-1.0, &lines), None);
        assert_eq!(current_index(f64::NAN, &lines), None);
        assert_eq!(current_index(3.0, &[]), None);
    }

    #[test]
    fn test_current_index_before_first_timed_line() {
        let lines = vec![LyricLine::new(4.0, "x"), LyricLine::new(8.0, "y")];
        assert_eq!(current_index(3.99, &lines), None);
        assert_eq!(current_index(4.0, &lines), Some(0));
    }

    #[test]
    fn test_plain_lyrics_map_to_last_line() {
        let seq = parser::parse("one\ntwo\nthree");
        assert_eq!(current_index(0.0, seq.lines()), Some(2));
        assert_eq!(current_index(42.0, seq.lines()), Some(2));
    }

    #[test]
    fn test_indices_never_decrease_over_generated_lrc() {
        let lrc: String = (0..40)
            .map(|i| {
                let t = i * 3 + (i % 4);
                format!("[{:02}:{:02}.{:02}]line {i}\n", t / 60, t % 60, (i * 7) % 100)
            })
            .collect();
        let seq = parser::parse(&lrc);
        assert_eq!(seq.len(), 40);

        let mut last: Option<usize> = None;
        let mut pos = -2.0;
        while pos < 200.0 {
            let idx = current_index(pos, seq.lines());
            assert!(idx >= last, "index went back at {pos}: {idx:?} < {last:?}");
            last = idx;
            pos += 0.37;
        }
        assert_eq!(last, Some(39));
    }

    #[test]
    fn test_follower_reset_clears_highlight() {
        let lines = abc();
        let mut f = LyricFollower::new(Duration::from_secs(2));
        assert!(f.update(12.0, &lines));
        assert_eq!(f.highlighted(), Some(1));
        assert!(!f.update(13.0, &lines));
        f.reset();
        assert_eq!(f.highlighted(), None);
        assert!(f.update(13.0, &lines));
    }

    #[test]
    fn test_user_scroll_holds_anchor_then_releases() {
        let lines = abc();
        let start = Instant::now();
        let mut f = LyricFollower::new(Duration::from_secs(2));
        f.update(1.0, &lines);

        f.user_scrolled(start, 5, lines.len());
        assert_eq!(f.anchor(start), 2);

        // Playback moves on; the view stays where the user put it.
        f.update(11.0, &lines);
        f.user_scrolled(start + Duration::from_millis(500), -2, lines.len());
        assert_eq!(f.anchor(start + Duration::from_millis(600)), 0);
        assert_eq!(f.highlighted(), Some(1));

        // Once the hold runs out the view snaps back to the highlight.
        assert_eq!(f.anchor(start + Duration::from_secs(3)), 1);
    }

    #[test]
    fn test_untimed_lyrics_stay_where_scrolled() {
        let seq = parser::parse("one\ntwo\nthree\nfour\nfive");
        let start = Instant::now();
        let mut f = LyricFollower::new(Duration::from_secs(2));
        f.update(0.5, seq.lines());
        assert_eq!(f.anchor(start), 0);

        f.user_scrolled(start, 3, seq.len());
        assert!(!f.is_holding(start));
        assert_eq!(f.anchor(start + Duration::from_secs(10)), 3);

        f.user_scrolled(start, -1, seq.len());
        f.update(60.0, seq.lines());
        assert_eq!(f.anchor(start + Duration::from_secs(20)), 2);
    }

    #[test]
    fn test_line_time() {
        let lines = abc();
        assert_eq!(line_time(2, &lines), Some(20.0));
        assert_eq!(line_time(3, &lines), None);
    }
}
