//! Best-effort (artist, title) guess from a video title or search string.
//!
//! "Artist - Song (Official Video) [4K]" -> artist "Artist", title "Song".

use once_cell::sync::Lazy;
use regex::Regex;

/// Tried in order; the first one present splits the string.
const SEPARATORS: [&str; 3] = [" - ", " | ", ": "];

static PROMO_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\(Official Video\)|\(Official Music Video\)|\(Official Audio\)|\(Lyrics\)|\(Lyric Video\)",
    )
    .unwrap()
});

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTitle {
    /// Empty when the input had no recognizable structure
    pub artist: String,
    pub title: String,
}

pub fn normalize(raw: &str) -> NormalizedTitle {
    let (artist, title) = SEPARATORS
        .iter()
        .find_map(|sep| raw.split_once(sep))
        .unwrap_or(("", raw));

    let title = PROMO_MARKERS.replace_all(title, "");
    let title = BRACKETED.replace_all(&title, "");
    let title = PARENTHESIZED.replace_all(&title, "");

    NormalizedTitle {
        artist: artist.trim().to_string(),
        title: title.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(artist: &str, title: &str) -> NormalizedTitle {
        NormalizedTitle {
            artist: artist.into(),
            title: title.into(),
        }
    }

    #[test]
    fn test_dash_split_and_marker_strip() {
        assert_eq!(normalize("A - B (Official Video)"), nt("A", "B"));
        assert_eq!(
            normalize("Daft Punk - Get Lucky (official music video) [HD] (feat. Pharrell)"),
            nt("Daft Punk", "Get Lucky")
        );
    }

    #[test]
    fn test_no_separator_keeps_title() {
        assert_eq!(normalize("NoSeparatorHere"), nt("", "NoSeparatorHere"));
    }

    #[test]
    fn test_separator_priority() {
        // " - " wins even when " | " comes first in the string.
        assert_eq!(normalize("X | Y - Z"), nt("X | Y", "Z"));
        assert_eq!(normalize("Band | Song"), nt("Band", "Song"));
        assert_eq!(normalize("Band: Song (Lyrics)"), nt("Band", "Song"));
    }

    #[test]
    fn test_splits_on_first_occurrence_only() {
        assert_eq!(normalize("A - B - C"), nt("A", "B - C"));
    }

    #[test]
    fn test_bracket_strip_is_idempotent() {
        let once = normalize("Artist - Title [Live] (2019) extra");
        let twice = normalize(&once.title);
        assert_eq!(once.title, "Title   extra");
        assert_eq!(twice.title, once.title);
    }
}
