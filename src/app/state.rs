use super::search::{SearchOutcome, SongInfo};
use crate::config::Config;
use crate::lyrics::{CandidateSet, LyricFollower, LyricSequence, ResolveStatus, sync};
use crate::player::{PlaybackClock, PlaybackState, PlayerObserver};
use crate::video::VideoRef;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};
use tracing::debug;

const IDLE_MESSAGE: &str = "Paste a YouTube URL or search for a song";
const LOADING_MESSAGE: &str = "Loading lyrics...";
const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// New video / song search
    Search,
    /// Lyrics-only search with a manual "Artist - Title"
    Lyrics,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "Search",
            PromptKind::Lyrics => "Lyrics (Artist - Title)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Prompt { kind: PromptKind, buffer: String },
}

/// Where the lyric lines were last drawn, for mouse hit-testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricsView {
    pub area: Rect,
    /// Index of the line drawn on the first row of `area`
    pub first_line: usize,
}

impl LyricsView {
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        let a = self.area;
        if column < a.x || column >= a.x + a.width || row < a.y || row >= a.y + a.height {
            return None;
        }
        Some(self.first_line + usize::from(row - a.y))
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub created_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Success,
            created_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Error,
            created_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > TOAST_TTL
    }
}

pub struct AppState {
    pub should_quit: bool,
    pub input_mode: InputMode,

    // What is playing
    pub video: Option<VideoRef>,
    pub song: Option<SongInfo>,
    pub playback: PlaybackState,
    pub ready: bool,
    pub duration_secs: f64,
    pub volume: u8,
    pub clock: PlaybackClock,

    // Lyrics
    pub candidates: CandidateSet,
    pub follower: LyricFollower,
    pub searching: bool,
    generation: u64,
    /// Generation of the search that loaded the current video
    video_generation: u64,
    holding: bool,
    /// Frame counter, drives the loading spinner
    pub frame: u64,
    pub lyrics_view: Option<LyricsView>,

    pub toast: Option<Toast>,
    pub status: String,
}

impl AppState {
    pub fn new(cfg: &Config) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            video: None,
            song: None,
            playback: PlaybackState::default(),
            ready: false,
            duration_secs: 0.0,
            volume: cfg.player.volume.min(100),
            clock: PlaybackClock::new(
                cfg.sync.seek_threshold_secs,
                Duration::from_millis(cfg.sync.seek_settle_ms),
            ),
            candidates: CandidateSet::empty(ResolveStatus::NotFound, IDLE_MESSAGE),
            follower: LyricFollower::new(Duration::from_millis(cfg.sync.user_scroll_hold_ms)),
            searching: false,
            generation: 0,
            video_generation: 0,
            holding: false,
            frame: 0,
            lyrics_view: None,
            toast: None,
            status: String::new(),
        }
    }

    pub fn position(&self) -> f64 {
        self.clock.position()
    }

    pub fn lyrics(&self) -> &LyricSequence {
        self.candidates.active_sequence()
    }

    /// A different video was loaded into the player.
    pub fn video_changed(&mut self, video: VideoRef) {
        self.video = Some(video);
        self.song = None;
        self.candidates = CandidateSet::empty(ResolveStatus::NotFound, LOADING_MESSAGE);
        self.ready = false;
        self.playback = PlaybackState::Unstarted;
        self.duration_secs = 0.0;
        self.clock.reset();
        self.follower.reset();
    }

    /// Issue the token for a new search. Results from older tokens are ignored.
    pub fn begin_search(&mut self) -> u64 {
        self.generation += 1;
        self.searching = true;
        self.generation
    }

    /// Like [`Self::begin_search`], for a search that also identifies the
    /// loaded video. Its song info stays wanted even if a lyrics-only search
    /// supersedes it.
    pub fn begin_video_search(&mut self) -> u64 {
        let generation = self.begin_search();
        self.video_generation = generation;
        generation
    }

    /// Replace the candidate set with a finished search, unless a newer
    /// search has been started since. Returns true when anything changed.
    pub fn apply_search(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            if outcome.generation == self.video_generation
                && let Some(song) = outcome.song
            {
                debug!(
                    stale = outcome.generation,
                    latest = self.generation,
                    "keeping song info from superseded video search"
                );
                self.song = Some(song);
                return true;
            }
            debug!(
                stale = outcome.generation,
                latest = self.generation,
                "dropping superseded search result"
            );
            return false;
        }
        self.searching = false;
        if let Some(song) = outcome.song {
            self.song = Some(song);
        }
        self.status = match self.candidates_summary(&outcome.candidates) {
            Some(s) => s,
            None => String::new(),
        };
        self.candidates = outcome.candidates;
        self.follower.reset();
        self.follower.update(self.clock.position(), self.candidates.active_sequence().lines());
        true
    }

    fn candidates_summary(&self, set: &CandidateSet) -> Option<String> {
        match set.status() {
            ResolveStatus::Found => Some(format!("{} lyric candidate(s)", set.candidates().len())),
            ResolveStatus::Failed(e) => Some(format!("lookup failed: {e}")),
            _ => None,
        }
    }

    pub fn select_candidate_at(&mut self, index: usize) -> bool {
        let Some(id) = self.candidates.candidates().get(index).map(|c| c.id) else {
            return false;
        };
        if self.candidates.active_id() == Some(id) {
            return false;
        }
        self.candidates.select(id);
        self.follower.reset();
        true
    }

    pub fn next_candidate(&mut self) -> bool {
        let changed = self.candidates.select_next();
        if changed {
            self.follower.reset();
        }
        changed
    }

    pub fn prev_candidate(&mut self) -> bool {
        let changed = self.candidates.select_prev();
        if changed {
            self.follower.reset();
        }
        changed
    }

    /// One frame: take the player's readings and recompute the current line.
    /// Returns true when something visible moved.
    pub fn tick(&mut self, now: Instant, player_time: f64, player_duration: f64) -> bool {
        self.frame = self.frame.wrapping_add(1);
        let mut changed = self.searching && self.frame % 4 == 0;
        if player_duration.is_finite() && player_duration > 0.0 && player_duration != self.duration_secs
        {
            self.duration_secs = player_duration;
            changed = true;
        }
        changed |= self.clock.sample(now, player_time);
        changed |= self
            .follower
            .update(self.clock.position(), self.candidates.active_sequence().lines());
        // The view snaps back to the highlighted line when the hold runs out
        let holding = self.follower.is_holding(now);
        changed |= holding != self.holding;
        self.holding = holding;
        if let Some(toast) = &self.toast
            && toast.is_expired(now)
        {
            self.toast = None;
            changed = true;
        }
        changed
    }

    /// Seek target for the line the view is centred on.
    pub fn anchor_time(&self, now: Instant) -> Option<f64> {
        self.line_time(self.follower.anchor(now))
    }

    /// Lyric line under a mouse click, if any.
    pub fn line_at(&self, column: u16, row: u16) -> Option<usize> {
        let index = self.lyrics_view?.line_at(column, row)?;
        (index < self.lyrics().len()).then_some(index)
    }

    /// Start time of a clicked or selected line. Plain lyrics have none.
    pub fn line_time(&self, index: usize) -> Option<f64> {
        let lines = self.lyrics();
        if !lines.is_timed() {
            return None;
        }
        sync::line_time(index, lines.lines())
    }

    /// Record a seek the user asked for. Returns the position to send to the
    /// player, if the jump is big enough to matter.
    pub fn request_seek(&mut self, now: Instant, target: f64) -> Option<f64> {
        let target = if self.duration_secs > 0.0 {
            target.min(self.duration_secs)
        } else {
            target
        };
        let sent = self.clock.request_seek(now, target)?;
        self.follower.release();
        self.follower
            .update(self.clock.position(), self.candidates.active_sequence().lines());
        Some(sent)
    }
}

impl PlayerObserver for AppState {
    fn on_ready(&mut self, duration: f64) {
        self.ready = true;
        if duration > 0.0 {
            self.duration_secs = duration;
        }
        self.status = "Playing".into();
    }

    fn on_state_change(&mut self, state: PlaybackState) {
        self.playback = state;
    }

    fn on_error(&mut self, message: &str) {
        self.toast = Some(Toast::error(message));
    }
}
