use std::time::{Duration, Instant};

/// Player position changes smaller than this are treated as jitter.
const MIN_SAMPLE_DELTA: f64 = 0.01;

/// The position the lyric view follows.
///
/// Sampled from the player once per frame. Right after a seek the player may
/// still report the old position for a moment, so samples are ignored until
/// the seek has settled.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    position: f64,
    settling_until: Option<Instant>,
    seek_threshold: f64,
    settle: Duration,
}

impl PlaybackClock {
    pub fn new(seek_threshold: f64, settle: Duration) -> Self {
        Self {
            position: 0.0,
            settling_until: None,
            seek_threshold,
            settle,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Feed a player reading. Returns true when the position moved.
    pub fn sample(&mut self, now: Instant, player_time: f64) -> bool {
        if let Some(until) = self.settling_until {
            if now < until {
                return false;
            }
            self.settling_until = None;
        }
        if !player_time.is_finite() || (player_time - self.position).abs() <= MIN_SAMPLE_DELTA {
            return false;
        }
        self.position = player_time;
        true
    }

    /// Ask to jump to `target`. Returns the position to send to the player,
    /// or `None` when the jump is too small to bother.
    pub fn request_seek(&mut self, now: Instant, target: f64) -> Option<f64> {
        let target = target.max(0.0);
        if (target - self.position).abs() < self.seek_threshold {
            return None;
        }
        self.position = target;
        self.settling_until = Some(now + self.settle);
        Some(target)
    }

    /// Back to zero for a freshly loaded video.
    pub fn reset(&mut self) {
        self.position = 0.0;
        self.settling_until = None;
    }
}
