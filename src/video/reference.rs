use once_cell::sync::Lazy;
use regex::Regex;

/// URL shapes that carry a video id, tried in order. The last one accepts a bare id.
static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&]+)").unwrap(),
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?youtu\.be/([^?]+)").unwrap(),
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?youtube\.com/embed/([^?]+)").unwrap(),
        Regex::new(r"^([a-zA-Z0-9_-]{11})$").unwrap(),
    ]
});

/// What the user asked to play
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoRef {
    /// A known video id
    Id(String),
    /// Free text; the player searches for a video and the text is used as the title guess
    Search(String),
}

impl VideoRef {
    /// Classify raw input. Blank input is not a search.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        Some(match extract_video_id(raw) {
            Some(id) => VideoRef::Id(id),
            None => VideoRef::Search(raw.to_string()),
        })
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            VideoRef::Id(id) => Some(id),
            VideoRef::Search(_) => None,
        }
    }

    /// Cover image for a known video
    pub fn thumbnail_url(&self) -> Option<String> {
        self.id()
            .map(|id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
    }
}

pub fn extract_video_id(input: &str) -> Option<String> {
    VIDEO_ID_PATTERNS.iter().find_map(|re| {
        re.captures(input)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|id| !id.is_empty())
    })
}
