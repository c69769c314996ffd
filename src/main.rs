use anyhow::Context;
use clap::{Parser, Subcommand};
use singalong::lyrics::{self, CandidateSet, LrclibClient, LyricSequence};
use singalong::video::{OembedClient, VideoRef};
use singalong::{app, config, tui};
use std::path::Path;
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "singalong",
    version,
    about = "Play a YouTube video and follow its synced lyrics in the terminal"
)]
struct Cli {
    /// Override config file path.
    #[arg(long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log at DEBUG level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the interactive TUI (default).
    Tui {
        /// YouTube URL, video id or song name to start with.
        query: Option<String>,
    },
    /// Identify a video or search text and print its lyric candidates (headless).
    Resolve { query: String },
    /// Look up lyrics by title and print them (headless).
    Lyrics {
        title: String,
        #[arg(long, short)]
        artist: Option<String>,
        /// Also print which line is current at this many seconds.
        #[arg(long)]
        at: Option<f64>,
    },
    /// Print the config file location.
    ConfigPath,
    /// Audio output device management (mpv).
    Audio {
        #[command(subcommand)]
        cmd: AudioCommand,
    },
}

#[derive(Debug, Subcommand)]
enum AudioCommand {
    /// List mpv audio devices.
    List,
    /// Set mpv audio device (name as shown in list).
    Set { device: String },
    /// Clear mpv audio device override.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };

    match cli.command.unwrap_or(Command::Tui { query: None }) {
        Command::Tui { query } => {
            // The alternate screen owns stdout/stderr, so logs go to a file.
            let log_path = cfg.paths.data_dir.join("singalong.log");
            init_logging(cli.verbose, Some(&log_path))?;
            let mut terminal =
                tui::TerminalGuard::enter(cfg.input.mouse).context("init terminal")?;
            let mut app = app::App::new(cfg, cfg_path)?;
            app.run(terminal.terminal_mut(), query).await?;
        }
        Command::Resolve { query } => {
            init_logging(cli.verbose, None)?;
            let video = VideoRef::parse(&query).context("query is empty")?;
            let client = LrclibClient::new(&cfg.lyrics)?;
            let metadata = OembedClient::new(&cfg.video, cfg.lyrics.timeout_secs)?;
            let outcome = app::search::run_query(0, &video, &client, &metadata).await;
            if let Some(song) = &outcome.song {
                println!("Title:  {}", song.title);
                println!("Artist: {}", song.artist);
                if let Some(thumb) = &song.thumbnail_url {
                    println!("Cover:  {thumb}");
                }
                println!();
            }
            print_candidates(&outcome.candidates);
            print_lyrics(outcome.candidates.active_sequence(), None);
        }
        Command::Lyrics { title, artist, at } => {
            init_logging(cli.verbose, None)?;
            let client = LrclibClient::new(&cfg.lyrics)?;
            let set = lyrics::resolve(&client, &title, artist.as_deref().unwrap_or("")).await;
            print_candidates(&set);
            print_lyrics(set.active_sequence(), at);
        }
        Command::ConfigPath => println!("{}", cfg_path.display()),
        Command::Audio { cmd } => match cmd {
            AudioCommand::List => {
                let out = tokio::process::Command::new(&cfg.player.mpv_path)
                    .args(["--audio-device=help", "--no-video", "--idle=no"])
                    .output()
                    .await
                    .context("run mpv --audio-device=help")?;
                // mpv prints help to stdout.
                print!("{}", String::from_utf8_lossy(&out.stdout));
                eprint!("{}", String::from_utf8_lossy(&out.stderr));
            }
            AudioCommand::Set { device } => {
                let mut cfg = cfg;
                cfg.player.audio_device = Some(device);
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Updated audio device in config.");
            }
            AudioCommand::Clear => {
                let mut cfg = cfg;
                cfg.player.audio_device = None;
                config::save(&cfg, cli.config.as_deref()).context("save config")?;
                println!("Cleared audio device override.");
            }
        },
    }

    Ok(())
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level);

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create dir {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn print_candidates(set: &CandidateSet) {
    if set.is_empty() {
        println!("No candidates ({:?})", set.status());
        return;
    }
    for (i, c) in set.candidates().iter().enumerate() {
        let marker = if set.active_id() == Some(c.id) { "*" } else { " " };
        println!(
            "{marker} {:>2}. [{}] {} - {}  ({} lines)",
            i + 1,
            c.source,
            c.artist,
            c.title,
            c.sequence.len()
        );
    }
    println!();
}

fn print_lyrics(sequence: &LyricSequence, at: Option<f64>) {
    let timed = sequence.is_timed();
    let current = at.and_then(|t| lyrics::current_index(t, sequence.lines()));
    for (i, line) in sequence.lines().iter().enumerate() {
        let marker = if current == Some(i) { ">" } else { " " };
        if timed {
            let minutes = (line.time / 60.0).floor();
            let seconds = line.time - minutes * 60.0;
            println!("{marker} [{:02}:{:05.2}] {}", minutes as u64, seconds, line.text);
        } else {
            println!("{marker} {}", line.text);
        }
    }
    if let Some(t) = at {
        match current {
            Some(i) => println!("\nAt {t:.2}s: line {} of {}", i + 1, sequence.len()),
            None => println!("\nAt {t:.2}s: before the first line"),
        }
    }
}
