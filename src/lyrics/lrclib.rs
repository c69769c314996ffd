//! LRCLIB API client
//!
//! LRCLIB is a free lyrics API that provides synchronized (LRC format) lyrics.
//! API Documentation: https://lrclib.net/docs

use crate::config::LyricsConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// One LRCLIB record, as returned by both `/get` and `/search`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LyricsRecord {
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub plain_lyrics: Option<String>,
}

impl LyricsRecord {
    // LRCLIB sends both `null` and `""` for missing fields; both count as absent.

    pub fn synced(&self) -> Option<&str> {
        non_empty(&self.synced_lyrics)
    }

    pub fn plain(&self) -> Option<&str> {
        non_empty(&self.plain_lyrics)
    }

    pub fn artist(&self) -> &str {
        non_empty(&self.artist_name).unwrap_or("")
    }

    pub fn title(&self) -> &str {
        non_empty(&self.track_name).unwrap_or("")
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// A lyrics lookup service.
///
/// `Ok(None)` means the service answered but had nothing (non-OK status or an
/// empty body). `Err` is reserved for transport and decoding failures.
#[async_trait]
pub trait LyricsSource: Send + Sync {
    /// Exact lookup keyed by track and artist name
    async fn get_exact(&self, track_name: &str, artist_name: &str)
        -> anyhow::Result<Option<LyricsRecord>>;

    /// Free-text search, results in service order
    async fn search(&self, query: &str) -> anyhow::Result<Option<Vec<LyricsRecord>>>;
}

/// LRCLIB API client
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: reqwest::Client,
    base_url: String,
}

impl LrclibClient {
    /// Create a new LRCLIB client
    pub fn new(cfg: &LyricsConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_url(&self, track_name: &str, artist_name: &str) -> String {
        format!(
            "{}/get?track_name={}&artist_name={}",
            self.base_url,
            urlencoding::encode(track_name),
            urlencoding::encode(artist_name)
        )
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.base_url, urlencoding::encode(query))
    }
}

#[async_trait]
impl LyricsSource for LrclibClient {
    async fn get_exact(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> anyhow::Result<Option<LyricsRecord>> {
        let url = self.get_url(track_name, artist_name);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("send lrclib get request")?;

        if !response.status().is_success() {
            debug!(status = %response.status(), track_name, artist_name, "lrclib get: no match");
            return Ok(None);
        }

        let record: Option<LyricsRecord> =
            response.json().await.context("parse lrclib get json")?;
        Ok(record)
    }

    async fn search(&self, query: &str) -> anyhow::Result<Option<Vec<LyricsRecord>>> {
        let url = self.search_url(query);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("send lrclib search request")?;

        if !response.status().is_success() {
            debug!(status = %response.status(), query, "lrclib search: no results");
            return Ok(None);
        }

        let v: serde_json::Value = response.json().await.context("parse lrclib search json")?;
        parse_search_results(v)
    }
}

/// Anything other than a JSON array is treated as "no results".
fn parse_search_results(v: serde_json::Value) -> anyhow::Result<Option<Vec<LyricsRecord>>> {
    if !v.is_array() {
        return Ok(None);
    }
    let results: Vec<LyricsRecord> =
        serde_json::from_value(v).context("decode lrclib search results")?;
    Ok(Some(results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> LrclibClient {
        LrclibClient::new(&LyricsConfig {
            base_url: "https://lrclib.example/api/".into(),
            ..LyricsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_urls_are_encoded() {
        let c = client();
        assert_eq!(
            c.get_url("Bohemian Rhapsody", "Queen & Co"),
            "https://lrclib.example/api/get?track_name=Bohemian%20Rhapsody&artist_name=Queen%20%26%20Co"
        );
        assert_eq!(
            c.search_url("a b"),
            "https://lrclib.example/api/search?q=a%20b"
        );
    }

    #[test]
    fn test_record_treats_empty_strings_as_absent() {
        let r: LyricsRecord = serde_json::from_value(json!({
            "id": 7,
            "trackName": "Song",
            "artistName": "",
            "syncedLyrics": "",
            "plainLyrics": "la la",
            "duration": 180.0
        }))
        .unwrap();
        assert_eq!(r.title(), "Song");
        assert_eq!(r.artist(), "");
        assert_eq!(r.synced(), None);
        assert_eq!(r.plain(), Some("la la"));
    }

    #[test]
    fn test_search_results_require_array() {
        assert_eq!(parse_search_results(json!({"message": "x"})).unwrap(), None);
        let v = json!([{ "trackName": "A", "syncedLyrics": null }]);
        let results = parse_search_results(v).unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "A");
    }
}
