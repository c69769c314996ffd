use crate::config::VideoConfig;
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct OembedResponse {
    #[serde(default)]
    title: Option<String>,
}

/// Looks up a video's display title.
#[async_trait]
pub trait VideoMetadata: Send + Sync {
    /// `Ok(None)` when the endpoint answered with a non-OK status.
    async fn title(&self, video_id: &str) -> anyhow::Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct OembedClient {
    http: reqwest::Client,
    oembed_url: String,
    watch_url: String,
}

impl OembedClient {
    pub fn new(cfg: &VideoConfig, timeout_secs: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            http,
            oembed_url: cfg.oembed_url.clone(),
            watch_url: cfg.watch_url.clone(),
        })
    }

    fn request_url(&self, video_id: &str) -> String {
        let video_url = format!("{}?v={}", self.watch_url, video_id);
        format!(
            "{}?url={}&format=json",
            self.oembed_url,
            urlencoding::encode(&video_url)
        )
    }
}

#[async_trait]
impl VideoMetadata for OembedClient {
    async fn title(&self, video_id: &str) -> anyhow::Result<Option<String>> {
        let response = self
            .http
            .get(self.request_url(video_id))
            .send()
            .await
            .context("send oembed request")?;

        if !response.status().is_success() {
            debug!(status = %response.status(), video_id, "oembed lookup failed");
            return Ok(None);
        }

        let body: OembedResponse = response.json().await.context("parse oembed json")?;
        Ok(Some(body.title.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let c = OembedClient::new(&VideoConfig::default(), 5).unwrap();
        assert_eq!(
            c.request_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/oembed?url=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3DdQw4w9WgXcQ&format=json"
        );
    }
}
