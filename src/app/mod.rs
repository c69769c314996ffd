pub mod actions;
pub mod events;
pub mod search;
pub mod state;

use crate::config::Config;
use crate::input;
use crate::lyrics::{LrclibClient, LyricsSource};
use crate::player::{VideoPlayer, mpv::MpvHandle};
use crate::tui::{self, TuiTerminal};
use crate::video::{OembedClient, VideoMetadata, VideoRef};
use actions::Action;
use events::{Event, NetworkEvent};
use state::{AppState, InputMode, PromptKind, Toast};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const VOLUME_STEP: u8 = 5;

pub struct App {
    cfg: Config,
    config_path: std::path::PathBuf,
    state: AppState,
    lyrics: Arc<dyn LyricsSource>,
    metadata: Arc<dyn VideoMetadata>,
    player: Option<Arc<dyn VideoPlayer>>,
}

impl App {
    pub fn new(cfg: Config, config_path: std::path::PathBuf) -> anyhow::Result<Self> {
        let lyrics = Arc::new(LrclibClient::new(&cfg.lyrics)?);
        let metadata = Arc::new(OembedClient::new(&cfg.video, cfg.lyrics.timeout_secs)?);
        Ok(Self::with_sources(cfg, config_path, lyrics, metadata))
    }

    pub fn with_sources(
        cfg: Config,
        config_path: std::path::PathBuf,
        lyrics: Arc<dyn LyricsSource>,
        metadata: Arc<dyn VideoMetadata>,
    ) -> Self {
        let state = AppState::new(&cfg);
        Self {
            cfg,
            config_path,
            state,
            lyrics,
            metadata,
            player: None,
        }
    }

    pub fn set_player(&mut self, player: Arc<dyn VideoPlayer>) {
        self.player = Some(player);
    }

    pub async fn run(
        &mut self,
        terminal: &mut TuiTerminal,
        initial_query: Option<String>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        input::spawn_input_task(tx.clone(), self.cfg.input.mouse);
        spawn_frame_ticker(tx.clone(), self.cfg.ui.frame_ms);

        // Start mpv backend (best-effort); lyrics still work without video.
        let mpv_log = self.cfg.paths.data_dir.join("mpv.log");
        match MpvHandle::spawn(tx.clone(), &self.cfg.player, &self.cfg.video, Some(&mpv_log)).await
        {
            Ok(h) => self.player = Some(Arc::new(h)),
            Err(e) => {
                warn!("mpv unavailable: {e:#}");
                self.state.toast = Some(Toast::error(format!("mpv disabled: {e:#}")));
            }
        }

        if let Some(query) = initial_query {
            self.start_query(&query, &tx).await;
        }

        tui::draw(terminal, &mut self.state)?;

        while let Some(ev) = rx.recv().await {
            let redraw = self.handle_event(ev, &tx).await;

            if self.state.should_quit {
                break;
            }
            if redraw {
                tui::draw(terminal, &mut self.state)?;
            }
        }

        self.save_state_on_quit();
        Ok(())
    }

    /// Apply one event. Returns true when the screen needs redrawing.
    async fn handle_event(&mut self, ev: Event, tx: &mpsc::Sender<Event>) -> bool {
        match ev {
            Event::Input(input_ev) => {
                if let Some(action) = input::map_input_to_action(&self.state, input_ev) {
                    self.handle_action(action, tx).await;
                }
                true
            }
            Event::Player(pe) => {
                debug!(?pe, "player event");
                pe.dispatch(&mut self.state);
                true
            }
            Event::Network(NetworkEvent::SearchFinished(outcome)) => {
                self.state.apply_search(outcome)
            }
            Event::Tick => {
                let (time, duration) = match &self.player {
                    Some(p) => (p.current_time(), p.duration()),
                    None => (self.state.position(), self.state.duration_secs),
                };
                self.state.tick(Instant::now(), time, duration)
            }
        }
    }

    fn save_state_on_quit(&mut self) {
        self.cfg.player.volume = self.state.volume;
        if let Err(e) = crate::config::save(&self.cfg, Some(&self.config_path)) {
            warn!("failed to save config: {e:#}");
        }
    }

    async fn handle_action(&mut self, action: Action, tx: &mpsc::Sender<Event>) {
        let now = Instant::now();
        match action {
            Action::Quit => self.state.should_quit = true,

            Action::TogglePause => {
                if let Some(player) = &self.player {
                    let result = if self.state.playback == crate::player::PlaybackState::Playing {
                        player.pause().await
                    } else {
                        player.play().await
                    };
                    if let Err(e) = result {
                        self.state.toast = Some(Toast::error(format!("{e:#}")));
                    }
                }
            }
            Action::SeekForward => {
                let target = self.state.position() + self.cfg.sync.seek_step_secs;
                self.seek(now, target).await;
            }
            Action::SeekBack => {
                let target = self.state.position() - self.cfg.sync.seek_step_secs;
                self.seek(now, target).await;
            }
            Action::VolumeUp => {
                self.set_volume(self.state.volume.saturating_add(VOLUME_STEP).min(100))
                    .await
            }
            Action::VolumeDown => {
                self.set_volume(self.state.volume.saturating_sub(VOLUME_STEP))
                    .await
            }

            Action::ScrollLyrics(delta) => {
                let len = self.state.lyrics().len();
                self.state.follower.user_scrolled(now, delta, len);
            }
            Action::JumpToAnchor => {
                if let Some(t) = self.state.anchor_time(now) {
                    self.seek(now, t).await;
                }
            }
            Action::SeekToLine(index) => {
                if let Some(t) = self.state.line_time(index) {
                    self.seek(now, t).await;
                }
            }
            Action::FollowPlayback => self.state.follower.release(),

            Action::NextCandidate => {
                let changed = self.state.next_candidate();
                self.announce_candidate(changed);
            }
            Action::PrevCandidate => {
                let changed = self.state.prev_candidate();
                self.announce_candidate(changed);
            }
            Action::SelectCandidateAt(index) => {
                let changed = self.state.select_candidate_at(index);
                self.announce_candidate(changed);
            }

            Action::OpenPrompt(kind) => {
                let buffer = match (kind, &self.state.song) {
                    (PromptKind::Lyrics, Some(song)) if !song.artist.is_empty() => {
                        format!("{} - {}", song.artist, song.title)
                    }
                    (PromptKind::Lyrics, Some(song)) => song.title.clone(),
                    _ => String::new(),
                };
                self.state.input_mode = InputMode::Prompt { kind, buffer };
            }
            Action::InputChar(c) => {
                if let InputMode::Prompt { buffer, .. } = &mut self.state.input_mode {
                    buffer.push(c);
                }
            }
            Action::Backspace => {
                if let InputMode::Prompt { buffer, .. } = &mut self.state.input_mode {
                    buffer.pop();
                }
            }
            Action::ClearInput => {
                if let InputMode::Prompt { buffer, .. } = &mut self.state.input_mode {
                    buffer.clear();
                }
            }
            Action::CancelPrompt => self.state.input_mode = InputMode::Normal,
            Action::SubmitPrompt => {
                let mode = std::mem::replace(&mut self.state.input_mode, InputMode::Normal);
                if let InputMode::Prompt { kind, buffer } = mode {
                    match kind {
                        PromptKind::Search => self.start_query(&buffer, tx).await,
                        PromptKind::Lyrics => self.start_manual(&buffer, tx),
                    }
                }
            }

            Action::Resize => {}
        }
    }

    /// Load a new video (or search) and look up its lyrics.
    async fn start_query(&mut self, raw: &str, tx: &mpsc::Sender<Event>) {
        let Some(video) = VideoRef::parse(raw) else {
            self.state.status = "Type a URL or song name first".into();
            return;
        };
        info!(?video, "new query");

        self.state.video_changed(video.clone());
        if let Some(player) = &self.player
            && let Err(e) = player.load(&video).await
        {
            self.state.toast = Some(Toast::error(format!("load failed: {e:#}")));
        }

        let generation = self.state.begin_video_search();
        self.state.status = "Looking up lyrics...".into();
        let lyrics = self.lyrics.clone();
        let metadata = self.metadata.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = search::run_query(generation, &video, &*lyrics, &*metadata).await;
            let _ = tx
                .send(Event::Network(NetworkEvent::SearchFinished(outcome)))
                .await;
        });
    }

    /// Look up lyrics for a typed "Artist - Title" without touching the video.
    fn start_manual(&mut self, raw: &str, tx: &mpsc::Sender<Event>) {
        let (title, artist) = search::split_manual_input(raw);
        let generation = self.state.begin_search();
        self.state.status = format!("Searching lyrics: {raw}");
        let lyrics = self.lyrics.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = search::run_manual(generation, &title, &artist, &*lyrics).await;
            let _ = tx
                .send(Event::Network(NetworkEvent::SearchFinished(outcome)))
                .await;
        });
    }

    fn announce_candidate(&mut self, changed: bool) {
        if !changed {
            return;
        }
        if let Some(active) = self.state.candidates.active() {
            self.state.toast = Some(Toast::success(format!("Lyrics: {}", active.source)));
        }
    }

    async fn seek(&mut self, now: Instant, target: f64) {
        let Some(position) = self.state.request_seek(now, target) else {
            return;
        };
        if let Some(player) = &self.player
            && let Err(e) = player.seek_to(position).await
        {
            self.state.toast = Some(Toast::error(format!("seek failed: {e:#}")));
        }
    }

    async fn set_volume(&mut self, volume: u8) {
        self.state.volume = volume;
        if let Some(player) = &self.player
            && let Err(e) = player.set_volume(volume).await
        {
            self.state.toast = Some(Toast::error(format!("{e:#}")));
        }
    }
}

fn spawn_frame_ticker(tx: mpsc::Sender<Event>, frame_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(frame_ms.max(10)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(Event::Tick).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::ResolveStatus;
    use crate::lyrics::resolver::tests::{FakeSource, record};
    use crate::player::tests::FakePlayer;
    use async_trait::async_trait;

    struct NoMetadata;

    #[async_trait]
    impl VideoMetadata for NoMetadata {
        async fn title(&self, _video_id: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    fn app(source: FakeSource) -> (App, Arc<FakePlayer>) {
        let mut app = App::with_sources(
            Config::default(),
            std::env::temp_dir().join("singalong-test-config.toml"),
            Arc::new(source),
            Arc::new(NoMetadata),
        );
        let player = Arc::new(FakePlayer::default());
        app.set_player(player.clone());
        (app, player)
    }

    fn synced_source() -> FakeSource {
        FakeSource {
            exact: Some(record(
                "Adele",
                "Hello",
                Some("[00:00.00]Hello\n[00:10.00]It's me\n[00:20.00]I was wondering"),
                None,
            )),
            ..Default::default()
        }
    }

    async fn next_search(rx: &mut mpsc::Receiver<Event>) -> Event {
        loop {
            match rx.recv().await {
                Some(ev @ Event::Network(_)) => return ev,
                Some(_) => continue,
                None => panic!("channel closed"),
            }
        }
    }

    #[tokio::test]
    async fn search_prompt_loads_video_and_lyrics() {
        let (mut app, player) = app(synced_source());
        let (tx, mut rx) = mpsc::channel(16);

        app.handle_action(Action::OpenPrompt(PromptKind::Search), &tx).await;
        for c in "Adele - Hello".chars() {
            app.handle_action(Action::InputChar(c), &tx).await;
        }
        app.handle_action(Action::SubmitPrompt, &tx).await;
        assert_eq!(app.state.input_mode, InputMode::Normal);
        assert!(app.state.searching);
        assert_eq!(
            player.commands(),
            vec![r#"load Search("Adele - Hello")"#.to_string()]
        );

        let ev = next_search(&mut rx).await;
        assert!(app.handle_event(ev, &tx).await);
        assert_eq!(app.state.candidates.status(), &ResolveStatus::Found);
        assert_eq!(app.state.song.as_ref().unwrap().artist, "Adele");

        player.set_time(12.0);
        assert!(app.handle_event(Event::Tick, &tx).await);
        assert_eq!(app.state.follower.highlighted(), Some(1));
        assert_eq!(app.state.duration_secs, 240.0);
    }

    #[tokio::test]
    async fn clicking_a_line_seeks_the_player() {
        let (mut app, player) = app(synced_source());
        let (tx, mut rx) = mpsc::channel(16);
        app.start_query("Adele - Hello", &tx).await;
        let ev = next_search(&mut rx).await;
        app.handle_event(ev, &tx).await;

        app.handle_action(Action::SeekToLine(2), &tx).await;
        assert_eq!(player.commands().last().map(String::as_str), Some("seek 20"));
        assert_eq!(app.state.follower.highlighted(), Some(2));

        // Already there: no second seek
        app.handle_action(Action::SeekToLine(2), &tx).await;
        assert_eq!(player.commands().len(), 2);
    }

    #[tokio::test]
    async fn newer_search_wins_over_older_one() {
        let (mut app, _player) = app(synced_source());
        let (tx, mut rx) = mpsc::channel(16);

        app.start_query("https://youtu.be/dQw4w9WgXcQ", &tx).await;
        app.start_manual("Adele - Hello", &tx);

        for _ in 0..2 {
            let ev = next_search(&mut rx).await;
            assert!(app.handle_event(ev, &tx).await);
        }
        assert!(!app.state.searching);
        // Lyrics come from the manual search, song info from the video lookup
        assert_eq!(app.state.candidates.status(), &ResolveStatus::Found);
        let song = app.state.song.as_ref().unwrap();
        assert!(song.thumbnail_url.as_deref().unwrap().contains("dQw4w9WgXcQ"));
        assert_eq!(app.state.video, Some(VideoRef::Id("dQw4w9WgXcQ".into())));
    }

    #[tokio::test]
    async fn pause_and_volume_reach_the_player() {
        let (mut app, player) = app(FakeSource::default());
        let (tx, _rx) = mpsc::channel(16);

        app.handle_action(Action::TogglePause, &tx).await;
        app.handle_event(
            Event::Player(crate::player::PlayerEvent::StateChanged(
                crate::player::PlaybackState::Playing,
            )),
            &tx,
        )
        .await;
        app.handle_action(Action::TogglePause, &tx).await;
        app.handle_action(Action::VolumeUp, &tx).await;
        app.handle_action(Action::VolumeUp, &tx).await;
        app.handle_action(Action::VolumeUp, &tx).await;
        app.handle_action(Action::VolumeUp, &tx).await;
        app.handle_action(Action::VolumeUp, &tx).await;

        assert_eq!(
            player.commands(),
            vec!["play", "pause", "volume 85", "volume 90", "volume 95", "volume 100", "volume 100"]
        );
    }

    #[tokio::test]
    async fn lyrics_prompt_is_prefilled_from_song() {
        let (mut app, _player) = app(FakeSource::default());
        let (tx, _rx) = mpsc::channel(16);
        app.state.song = Some(search::SongInfo {
            title: "Hello".into(),
            artist: "Adele".into(),
            thumbnail_url: None,
        });
        app.handle_action(Action::OpenPrompt(PromptKind::Lyrics), &tx).await;
        assert_eq!(
            app.state.input_mode,
            InputMode::Prompt {
                kind: PromptKind::Lyrics,
                buffer: "Adele - Hello".into()
            }
        );
        app.handle_action(Action::ClearInput, &tx).await;
        app.handle_action(Action::CancelPrompt, &tx).await;
        assert_eq!(app.state.input_mode, InputMode::Normal);
    }
}
