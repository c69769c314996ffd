//! Search pipeline: raw input -> song guess -> ranked lyrics
//!
//! Every outcome carries the generation token it was started with, so the app
//! can drop results from searches that were superseded while in flight.

use crate::lyrics::{CandidateSet, LyricsSource, ResolveStatus, resolve};
use crate::video::{VideoMetadata, VideoRef, normalize};
use tracing::{info, warn};

pub const UNIDENTIFIED: &str = "Couldn't identify song to fetch lyrics";
pub const PIPELINE_ERROR: &str = "Error processing video or lyrics";
const UNKNOWN_SONG: &str = "Unknown Song";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongInfo {
    pub title: String,
    pub artist: String,
    pub thumbnail_url: Option<String>,
}

impl SongInfo {
    fn unknown(video: &VideoRef) -> Self {
        Self {
            title: UNKNOWN_SONG.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            thumbnail_url: video.thumbnail_url(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub generation: u64,
    /// `None` leaves the current song info alone (manual lyric searches)
    pub song: Option<SongInfo>,
    pub candidates: CandidateSet,
}

/// Resolve lyrics for something the user typed or pasted.
pub async fn run_query(
    generation: u64,
    video: &VideoRef,
    lyrics: &dyn LyricsSource,
    metadata: &dyn VideoMetadata,
) -> SearchOutcome {
    let raw_title = match video {
        VideoRef::Id(id) => match metadata.title(id).await {
            Ok(Some(title)) => title,
            Ok(None) => {
                info!(video_id = %id, "no metadata for video");
                return SearchOutcome {
                    generation,
                    song: Some(SongInfo::unknown(video)),
                    candidates: CandidateSet::empty(ResolveStatus::Unidentified, UNIDENTIFIED),
                };
            }
            Err(e) => {
                warn!(video_id = %id, "metadata lookup failed: {e:#}");
                return SearchOutcome {
                    generation,
                    song: Some(SongInfo::unknown(video)),
                    candidates: CandidateSet::empty(
                        ResolveStatus::Failed(format!("{e:#}")),
                        PIPELINE_ERROR,
                    ),
                };
            }
        },
        VideoRef::Search(query) => query.clone(),
    };

    let guess = normalize(&raw_title);
    info!(raw = %raw_title, artist = %guess.artist, title = %guess.title, "title guess");
    let candidates = resolve(lyrics, &guess.title, &guess.artist).await;

    SearchOutcome {
        generation,
        song: Some(SongInfo {
            title: guess.title,
            artist: guess.artist,
            thumbnail_url: video.thumbnail_url(),
        }),
        candidates,
    }
}

/// Resolve lyrics for a user-supplied (title, artist) override.
pub async fn run_manual(
    generation: u64,
    title: &str,
    artist: &str,
    lyrics: &dyn LyricsSource,
) -> SearchOutcome {
    SearchOutcome {
        generation,
        song: None,
        candidates: resolve(lyrics, title.trim(), artist.trim()).await,
    }
}

/// Split manual prompt input: "Artist - Title" or just "Title".
pub fn split_manual_input(input: &str) -> (String, String) {
    match input.split_once(" - ") {
        Some((artist, title)) => (title.trim().to_string(), artist.trim().to_string()),
        None => (input.trim().to_string(), String::new()),
    }
}
