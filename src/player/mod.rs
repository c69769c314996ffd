//! Video player seam
//!
//! The lyric logic only talks to a player through [`VideoPlayer`] (controls and
//! time getters) and hears back through [`PlayerObserver`]. `mpv` is the
//! concrete backend; tests use doubles.

pub mod clock;
pub mod mpv;

use crate::video::VideoRef;
use async_trait::async_trait;

pub use clock::PlaybackClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Unstarted,
    Playing,
    Paused,
    Ended,
}

/// Controls an embedded video player.
#[async_trait]
pub trait VideoPlayer: Send + Sync {
    async fn load(&self, video: &VideoRef) -> anyhow::Result<()>;
    async fn play(&self) -> anyhow::Result<()>;
    async fn pause(&self) -> anyhow::Result<()>;
    async fn seek_to(&self, seconds: f64) -> anyhow::Result<()>;
    async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()>;

    /// Last known playback position in seconds
    fn current_time(&self) -> f64;
    /// Length of the loaded video, 0 until known
    fn duration(&self) -> f64;
}

/// Receives player notifications.
pub trait PlayerObserver {
    fn on_ready(&mut self, duration: f64);
    fn on_state_change(&mut self, state: PlaybackState);
    fn on_error(&mut self, message: &str);
}

/// Notification coming out of a player backend
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Ready { duration: f64 },
    StateChanged(PlaybackState),
    Error(String),
}

impl PlayerEvent {
    pub fn dispatch<O: PlayerObserver + ?Sized>(self, observer: &mut O) {
        match self {
            PlayerEvent::Ready { duration } => observer.on_ready(duration),
            PlayerEvent::StateChanged(state) => observer.on_state_change(state),
            PlayerEvent::Error(message) => observer.on_error(&message),
        }
    }
}
