//! Lyric candidate resolution
//!
//! Asks a [`LyricsSource`] for lyrics with an exact lookup first and a fuzzy
//! search second, then ranks everything it got back into a [`CandidateSet`].
//! The candidate id doubles as the trust tier: lower ids come from stronger
//! strategies.

use super::lrclib::{LyricsRecord, LyricsSource};
use super::{LyricSequence, parser};
use tracing::{debug, info, warn};

pub const NO_TRACK_NAME: &str = "No track name to search for";
pub const NO_LYRICS_FOUND: &str = "No lyrics found for this song";
pub const LOAD_ERROR: &str = "Error loading lyrics";

const EXACT_SYNCED_ID: u32 = 1;
const EXACT_PLAIN_ID: u32 = 2;
const SEARCH_EXACT_SYNCED_ID: u32 = 10;
const SEARCH_SYNCED_ID: u32 = 20;
const ADDITIONAL_SYNCED_BASE: u32 = 30;
const SEARCH_PLAIN_BASE: u32 = 100;
/// Search results considered for ranking. Keeps `ADDITIONAL_SYNCED_BASE + i`
/// below `SEARCH_PLAIN_BASE` so ids stay unique.
const MAX_RANKED_RESULTS: usize = (SEARCH_PLAIN_BASE - ADDITIONAL_SYNCED_BASE) as usize;

/// One resolved lyrics result competing for the lyric view
#[derive(Debug, Clone, PartialEq)]
pub struct LyricCandidate {
    pub id: u32,
    /// Provenance label, e.g. "Exact match (synced)"
    pub source: String,
    pub artist: String,
    pub title: String,
    pub sequence: LyricSequence,
}

impl LyricCandidate {
    fn new(id: u32, source: &str, artist: &str, title: &str, payload: &str) -> Self {
        Self {
            id,
            source: source.to_string(),
            artist: artist.to_string(),
            title: title.to_string(),
            sequence: parser::parse(payload),
        }
    }

    fn same_track(&self, artist: &str, title: &str) -> bool {
        self.artist.to_lowercase() == artist.to_lowercase()
            && self.title.to_lowercase() == title.to_lowercase()
    }
}

/// Why a candidate set looks the way it does.
///
/// The placeholder line carries the same information for display; this lets
/// callers tell "nothing exists" apart from "the service failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveStatus {
    Found,
    NoTrackName,
    NotFound,
    /// The video could not be mapped to a track at all
    Unidentified,
    Failed(String),
}

/// Ranked candidates (best first) plus the active selection
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    candidates: Vec<LyricCandidate>,
    active: Option<u32>,
    status: ResolveStatus,
    placeholder: LyricSequence,
}

impl CandidateSet {
    /// Ranked set; the first candidate becomes active.
    pub fn ranked(candidates: Vec<LyricCandidate>) -> Self {
        if candidates.is_empty() {
            return Self::empty(ResolveStatus::NotFound, NO_LYRICS_FOUND);
        }
        let active = candidates.first().map(|c| c.id);
        Self {
            candidates,
            active,
            status: ResolveStatus::Found,
            placeholder: LyricSequence::sentinel(NO_LYRICS_FOUND),
        }
    }

    /// No candidates, only a placeholder line.
    pub fn empty(status: ResolveStatus, message: &str) -> Self {
        Self {
            candidates: Vec::new(),
            active: None,
            status,
            placeholder: LyricSequence::sentinel(message),
        }
    }

    pub fn candidates(&self) -> &[LyricCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn status(&self) -> &ResolveStatus {
        &self.status
    }

    pub fn active_id(&self) -> Option<u32> {
        self.active
    }

    pub fn active(&self) -> Option<&LyricCandidate> {
        let id = self.active?;
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn active_position(&self) -> Option<usize> {
        let id = self.active?;
        self.candidates.iter().position(|c| c.id == id)
    }

    /// Lines to display: the active candidate's, or the placeholder.
    pub fn active_sequence(&self) -> &LyricSequence {
        self.active()
            .map(|c| &c.sequence)
            .unwrap_or(&self.placeholder)
    }

    /// Make `id` active. Unknown ids leave the selection untouched.
    pub fn select(&mut self, id: u32) -> bool {
        if self.candidates.iter().any(|c| c.id == id) {
            self.active = Some(id);
            true
        } else {
            false
        }
    }

    /// Cycle to the next candidate in rank order.
    pub fn select_next(&mut self) -> bool {
        self.step(1)
    }

    /// Cycle to the previous candidate in rank order.
    pub fn select_prev(&mut self) -> bool {
        self.step(self.candidates.len().saturating_sub(1))
    }

    fn step(&mut self, by: usize) -> bool {
        let len = self.candidates.len();
        if len < 2 {
            return false;
        }
        let pos = self.active_position().unwrap_or(0);
        let id = self.candidates[(pos + by) % len].id;
        self.select(id)
    }
}

/// Resolve lyrics for `title` by `artist` (artist may be empty).
///
/// Never fails: misses and errors become an empty set with a placeholder.
pub async fn resolve(source: &dyn LyricsSource, title: &str, artist: &str) -> CandidateSet {
    if title.is_empty() {
        return CandidateSet::empty(ResolveStatus::NoTrackName, NO_TRACK_NAME);
    }

    match collect_candidates(source, title, artist).await {
        Ok(candidates) => {
            info!(title, artist, count = candidates.len(), "lyrics resolved");
            CandidateSet::ranked(candidates)
        }
        Err(e) => {
            warn!(title, artist, "lyrics resolution failed: {e:#}");
            CandidateSet::empty(ResolveStatus::Failed(format!("{e:#}")), LOAD_ERROR)
        }
    }
}

async fn collect_candidates(
    source: &dyn LyricsSource,
    title: &str,
    artist: &str,
) -> anyhow::Result<Vec<LyricCandidate>> {
    let mut candidates = Vec::new();
    let mut found_synced = false;

    if !artist.is_empty()
        && let Some(record) = source.get_exact(title, artist).await?
    {
        if let Some(synced) = record.synced() {
            candidates.push(LyricCandidate::new(
                EXACT_SYNCED_ID,
                "Exact match (synced)",
                artist,
                title,
                synced,
            ));
            found_synced = true;
        } else if let Some(plain) = record.plain() {
            candidates.push(LyricCandidate::new(
                EXACT_PLAIN_ID,
                "Exact match (plain)",
                artist,
                title,
                plain,
            ));
        }
    }

    if found_synced {
        return Ok(candidates);
    }

    let query = if artist.is_empty() {
        title.to_string()
    } else {
        format!("{title} {artist}")
    };
    let results = match source.search(&query).await? {
        Some(results) if !results.is_empty() => results,
        _ => {
            debug!(query, "search returned nothing");
            return Ok(candidates);
        }
    };

    // Both passes use the same predicate; the fallback only runs when the
    // first pass found nothing, so it never adds anything.
    if let Some(hit) = first_synced(&results) {
        push_synced(&mut candidates, SEARCH_EXACT_SYNCED_ID, "Search result - exact title match (synced)", hit);
    } else if let Some(hit) = first_synced(&results) {
        push_synced(&mut candidates, SEARCH_SYNCED_ID, "Search result (synced)", hit);
    }

    for (index, result) in results.iter().enumerate().take(MAX_RANKED_RESULTS) {
        let (r_artist, r_title) = (result.artist(), result.title());
        if candidates.iter().any(|c| c.same_track(r_artist, r_title)) {
            continue;
        }
        let index = index as u32;
        if let Some(synced) = result.synced() {
            candidates.push(LyricCandidate::new(
                ADDITIONAL_SYNCED_BASE + index,
                "Additional search result (synced)",
                r_artist,
                r_title,
                synced,
            ));
        } else if let Some(plain) = result.plain() {
            candidates.push(LyricCandidate::new(
                SEARCH_PLAIN_BASE + index,
                "Search result (plain)",
                r_artist,
                r_title,
                plain,
            ));
        }
    }

    Ok(candidates)
}

fn first_synced(results: &[LyricsRecord]) -> Option<&LyricsRecord> {
    results.iter().find(|r| r.synced().is_some())
}

fn push_synced(candidates: &mut Vec<LyricCandidate>, id: u32, source: &str, record: &LyricsRecord) {
    let payload = record.synced().unwrap_or_default();
    candidates.push(LyricCandidate::new(id, source, record.artist(), record.title(), payload));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted lyrics service that counts its calls
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub exact: Option<LyricsRecord>,
        pub results: Option<Vec<LyricsRecord>>,
        pub fail_search: bool,
        pub exact_calls: AtomicUsize,
        pub search_calls: AtomicUsize,
        pub queries: Mutex<Vec<String>>,
    }

    impl FakeSource {
        pub fn calls(&self) -> usize {
            self.exact_calls.load(Ordering::SeqCst) + self.search_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LyricsSource for FakeSource {
        async fn get_exact(&self, _: &str, _: &str) -> anyhow::Result<Option<LyricsRecord>> {
            self.exact_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.exact.clone())
        }

        async fn search(&self, query: &str) -> anyhow::Result<Option<Vec<LyricsRecord>>> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail_search {
                anyhow::bail!("connection reset");
            }
            Ok(self.results.clone())
        }
    }

    pub(crate) fn record(artist: &str, title: &str, synced: Option<&str>, plain: Option<&str>) -> LyricsRecord {
        LyricsRecord {
            track_name: Some(title.to_string()),
            artist_name: Some(artist.to_string()),
            synced_lyrics: synced.map(str::to_string),
            plain_lyrics: plain.map(str::to_string),
        }
    }

    fn ids(set: &CandidateSet) -> Vec<u32> {
        set.candidates().iter().map(|c| c.id).collect()
    }

    #[tokio::test]
    async fn empty_title_short_circuits() {
        let source = FakeSource::default();
        let set = resolve(&source, "", "X").await;
        assert!(set.is_empty());
        assert_eq!(set.status(), &ResolveStatus::NoTrackName);
        assert_eq!(set.active_sequence().lines()[0].text, NO_TRACK_NAME);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn exact_synced_skips_search() {
        let source = FakeSource {
            exact: Some(record("A", "B", Some("[00:01.00]hi"), Some("hi"))),
            ..Default::default()
        };
        let set = resolve(&source, "B", "A").await;
        assert_eq!(ids(&set), vec![1]);
        assert_eq!(set.active().unwrap().source, "Exact match (synced)");
        assert_eq!(set.active_sequence().lines()[0].time, 1.0);
        assert_eq!(source.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exact_plain_then_search_dedups_by_name() {
        let source = FakeSource {
            exact: Some(record("A", "B", None, Some("plain words"))),
            results: Some(vec![
                record("a", "b", Some("[00:02.00]dup"), None),
                record("C", "D", None, Some("other")),
            ]),
            ..Default::default()
        };
        let set = resolve(&source, "B", "A").await;
        // "a"/"b" matches exact-plain A/B case-insensitively, so the search hit is
        // only kept once as the synced search match.
        assert_eq!(ids(&set), vec![2, 10, 101]);
        assert_eq!(source.queries.lock().unwrap().as_slice(), ["B A"]);
        assert_eq!(set.active_id(), Some(2));
    }

    #[tokio::test]
    async fn synced_result_ranks_before_plain_results() {
        let source = FakeSource {
            results: Some(vec![
                record("P", "Plain0", None, Some("zero")),
                record("Q", "Nothing", None, None),
                record("S", "Synced2", Some("[00:03.00]two"), None),
                record("s", "SYNCED2", Some("[00:04.00]dup"), None),
                record("T", "Synced4", Some("[00:05.00]four"), None),
            ]),
            ..Default::default()
        };
        let set = resolve(&source, "Song", "").await;
        assert_eq!(source.exact_calls.load(Ordering::SeqCst), 0);
        assert_eq!(source.queries.lock().unwrap().as_slice(), ["Song"]);
        assert_eq!(ids(&set), vec![10, 100, 34]);
        assert_eq!(set.candidates()[0].artist, "S");
        assert_eq!(set.candidates()[1].source, "Search result (plain)");
        assert_eq!(set.candidates()[2].source, "Additional search result (synced)");
    }

    #[tokio::test]
    async fn long_result_lists_keep_ids_unique() {
        let results = (0..90)
            .map(|i| {
                let lyrics = format!("[00:01.00]line {i}");
                if i % 2 == 0 {
                    record(&format!("Artist {i}"), "Song", Some(&lyrics), None)
                } else {
                    record(&format!("Artist {i}"), "Song", None, Some("words"))
                }
            })
            .collect();
        let source = FakeSource {
            results: Some(results),
            ..Default::default()
        };
        let mut set = resolve(&source, "Song", "").await;

        let mut seen = ids(&set);
        assert_eq!(seen.len(), MAX_RANKED_RESULTS);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), MAX_RANKED_RESULTS);

        // Stepping visits every candidate once
        let first = set.active_id();
        for _ in 1..seen.len() {
            assert!(set.select_next());
            assert_ne!(set.active_id(), first);
        }
        assert!(set.select_next());
        assert_eq!(set.active_id(), first);
    }

    #[tokio::test]
    async fn nothing_found_gives_placeholder() {
        let source = FakeSource {
            results: Some(vec![record("Q", "Nothing", None, None)]),
            ..Default::default()
        };
        let set = resolve(&source, "Song", "Artist").await;
        assert!(set.is_empty());
        assert_eq!(set.status(), &ResolveStatus::NotFound);
        assert_eq!(set.active_sequence().lines()[0].text, NO_LYRICS_FOUND);
    }

    #[tokio::test]
    async fn error_discards_partial_results() {
        let source = FakeSource {
            exact: Some(record("A", "B", None, Some("plain"))),
            fail_search: true,
            ..Default::default()
        };
        let set = resolve(&source, "B", "A").await;
        assert!(set.is_empty());
        assert!(matches!(set.status(), ResolveStatus::Failed(_)));
        assert_eq!(set.active_sequence().lines()[0].text, LOAD_ERROR);
    }

    #[tokio::test]
    async fn selection_stays_within_the_set() {
        let source = FakeSource {
            results: Some(vec![
                record("A", "1", Some("[00:01.00]a"), None),
                record("B", "2", Some("[00:01.00]b"), None),
                record("C", "3", None, Some("c")),
            ]),
            ..Default::default()
        };
        let mut set = resolve(&source, "x", "").await;
        assert_eq!(ids(&set), vec![10, 31, 102]);
        assert!(!set.select(999));
        assert_eq!(set.active_id(), Some(10));
        assert!(set.select(102));
        assert_eq!(set.active_sequence().lines()[0].text, "c");
        assert!(set.select_next());
        assert_eq!(set.active_id(), Some(10));
        assert!(set.select_prev());
        assert_eq!(set.active_id(), Some(102));
    }
}
