use super::{PlaybackState, PlayerEvent, VideoPlayer};
use crate::app::events::Event;
use crate::config::{PlayerConfig, VideoConfig};
use crate::video::VideoRef;
use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::UnixStream,
    process::{Child, Command},
    sync::mpsc,
};
use tracing::{debug, warn};

/// Latest time-pos / duration reported by mpv, stored as f64 bits.
#[derive(Debug, Default)]
struct Telemetry {
    time: AtomicU64,
    duration: AtomicU64,
}

impl Telemetry {
    fn set_time(&self, seconds: f64) {
        self.time.store(seconds.to_bits(), Ordering::Relaxed);
    }

    fn set_duration(&self, seconds: f64) {
        self.duration.store(seconds.to_bits(), Ordering::Relaxed);
    }

    fn time(&self) -> f64 {
        f64::from_bits(self.time.load(Ordering::Relaxed))
    }

    fn duration(&self) -> f64 {
        f64::from_bits(self.duration.load(Ordering::Relaxed))
    }
}

/// What one line of mpv IPC output means for us
#[derive(Debug, Clone, PartialEq)]
enum MpvUpdate {
    Time(f64),
    Duration(f64),
    FileLoaded,
    Event(PlayerEvent),
}

#[derive(Debug)]
pub struct MpvHandle {
    child: Child,
    socket_path: PathBuf,
    writer: tokio::sync::Mutex<tokio::io::WriteHalf<UnixStream>>,
    request_id: AtomicU64,
    telemetry: Arc<Telemetry>,
    watch_url: String,
}

impl MpvHandle {
    pub async fn spawn(
        event_tx: mpsc::Sender<Event>,
        player: &PlayerConfig,
        video: &VideoConfig,
        log_file: Option<&std::path::Path>,
    ) -> anyhow::Result<Self> {
        let socket_path =
            std::env::temp_dir().join(format!("singalong-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new(&player.mpv_path);
        cmd.args([
            "--idle=yes",
            "--force-window=yes",
            "--keep-open=yes",
            "--ytdl=yes",
            "--input-terminal=no",
            // keep quiet, but we'll request log messages via IPC so we can show errors in UI
            "--really-quiet",
        ]);
        cmd.arg(format!("--volume={}", player.volume.min(100)));
        if let Some(dev) = &player.audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        if let Some(p) = log_file {
            cmd.arg(format!("--log-file={}", p.display()));
        }
        let child = cmd
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .with_context(|| format!("spawn {}", player.mpv_path))?;

        // Connect (mpv creates the socket shortly after starting).
        let stream = connect_with_retry(&socket_path).await?;
        let (reader, writer) = tokio::io::split(stream);

        let telemetry = Arc::new(Telemetry::default());
        tokio::spawn(read_events_loop(reader, event_tx, telemetry.clone()));

        let this = Self {
            child,
            socket_path,
            writer: tokio::sync::Mutex::new(writer),
            request_id: AtomicU64::new(1),
            telemetry,
            watch_url: video.watch_url.clone(),
        };

        // Ask mpv to send log-message events so we can surface load failures.
        this.command(json!({"command":["request_log_messages", "warn"]}))
            .await?;

        // Observe key properties.
        this.command(json!({"command":["observe_property", 1, "time-pos"]}))
            .await?;
        this.command(json!({"command":["observe_property", 2, "duration"]}))
            .await?;
        this.command(json!({"command":["observe_property", 3, "pause"]}))
            .await?;
        this.command(json!({"command":["observe_property", 4, "eof-reached"]}))
            .await?;

        Ok(this)
    }

    fn target_url(&self, video: &VideoRef) -> String {
        match video {
            VideoRef::Id(id) => format!("{}?v={}", self.watch_url, id),
            VideoRef::Search(query) => format!("ytdl://ytsearch1:{query}"),
        }
    }

    async fn command(&self, mut v: serde_json::Value) -> anyhow::Result<()> {
        // Tag requests so we can get structured errors back on the IPC stream.
        if v.get("request_id").is_none() {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            if let serde_json::Value::Object(ref mut o) = v {
                o.insert("request_id".to_string(), serde_json::Value::from(id));
            }
        }
        let mut w = self.writer.lock().await;
        let mut line = serde_json::to_vec(&v).context("encode mpv json")?;
        line.push(b'\n');
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")?;
        Ok(())
    }
}

#[async_trait]
impl VideoPlayer for MpvHandle {
    async fn load(&self, video: &VideoRef) -> anyhow::Result<()> {
        let url = self.target_url(video);
        debug!(%url, "mpv loadfile");
        self.telemetry.set_time(0.0);
        self.telemetry.set_duration(0.0);
        self.command(json!({"command":["loadfile", url, "replace"]})).await
    }

    async fn play(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", false]}))
            .await
    }

    async fn pause(&self) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "pause", true]}))
            .await
    }

    async fn seek_to(&self, seconds: f64) -> anyhow::Result<()> {
        self.command(json!({"command":["seek", seconds, "absolute"]}))
            .await
    }

    async fn set_volume(&self, volume_0_100: u8) -> anyhow::Result<()> {
        self.command(json!({"command":["set_property", "volume", volume_0_100]}))
            .await
    }

    fn current_time(&self) -> f64 {
        self.telemetry.time()
    }

    fn duration(&self) -> f64 {
        self.telemetry.duration()
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

async fn connect_with_retry(path: &PathBuf) -> anyhow::Result<UnixStream> {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
    loop {
        match UnixStream::connect(path).await {
            Ok(s) => return Ok(s),
            Err(e) => {
                if tokio::time::Instant::now() > deadline {
                    return Err(e).with_context(|| format!("connect to mpv ipc {}", path.display()));
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
        }
    }
}

async fn read_events_loop(
    reader: tokio::io::ReadHalf<UnixStream>,
    event_tx: mpsc::Sender<Event>,
    telemetry: Arc<Telemetry>,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        let event = match map_mpv_message(&v) {
            Some(MpvUpdate::Time(t)) => {
                telemetry.set_time(t);
                continue;
            }
            Some(MpvUpdate::Duration(d)) => {
                telemetry.set_duration(d);
                continue;
            }
            Some(MpvUpdate::FileLoaded) => PlayerEvent::Ready {
                duration: telemetry.duration(),
            },
            Some(MpvUpdate::Event(pe)) => pe,
            None => continue,
        };
        if let PlayerEvent::Error(msg) = &event {
            warn!("{msg}");
        }
        if event_tx.send(Event::Player(event)).await.is_err() {
            break;
        }
    }
}

fn map_mpv_message(v: &serde_json::Value) -> Option<MpvUpdate> {
    // mpv command replies: {"request_id":..., "error":"..."}
    if let (Some(_rid), Some(err)) = (v.get("request_id"), v.get("error"))
        && let Some(err_s) = err.as_str()
    {
        if err_s == "success" {
            return None;
        }
        return Some(MpvUpdate::Event(PlayerEvent::Error(format!(
            "mpv ipc error: {err_s}"
        ))));
    }

    match v.get("event")?.as_str()? {
        "property-change" => {
            let name = v.get("name")?.as_str()?;
            // data is null while nothing is loaded
            let data = v.get("data")?;
            match name {
                "time-pos" => data.as_f64().map(MpvUpdate::Time),
                "duration" => data.as_f64().map(MpvUpdate::Duration),
                "pause" => {
                    let paused = data.as_bool()?;
                    Some(MpvUpdate::Event(PlayerEvent::StateChanged(if paused {
                        PlaybackState::Paused
                    } else {
                        PlaybackState::Playing
                    })))
                }
                "eof-reached" => data
                    .as_bool()
                    .filter(|eof| *eof)
                    .map(|_| MpvUpdate::Event(PlayerEvent::StateChanged(PlaybackState::Ended))),
                _ => None,
            }
        }
        "file-loaded" => Some(MpvUpdate::FileLoaded),
        "end-file" => {
            // When mpv fails to play the stream, end-file comes with reason=error and an "error" string.
            match v.get("reason").and_then(|x| x.as_str()).unwrap_or("") {
                "error" => {
                    let err = v.get("error").and_then(|x| x.as_str()).unwrap_or("unknown");
                    Some(MpvUpdate::Event(PlayerEvent::Error(format!(
                        "mpv end-file error: {err}"
                    ))))
                }
                "eof" => Some(MpvUpdate::Event(PlayerEvent::StateChanged(
                    PlaybackState::Ended,
                ))),
                _ => None,
            }
        }
        "log-message" => {
            let level = v.get("level")?.as_str().unwrap_or("info");
            let text = v.get("text")?.as_str().unwrap_or("").trim();
            if (level == "warn" || level == "error") && !text.is_empty() {
                Some(MpvUpdate::Event(PlayerEvent::Error(format!(
                    "mpv {level}: {text}"
                ))))
            } else {
                None
            }
        }
        _ => None,
    }
}
