use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::application::ports::embed_checker::EmbedChecker;
use crate::infrastructure::embed::cache::ProbeCache;

/// Identifies probe traffic in target-site access logs.
const PROBE_USER_AGENT: &str = "bouncer-embed-probe";

/// Live tier of the embed detector: fetch the page and look for the
/// client's embed markers in its HTML.
///
/// The probe fails open: any timeout, transport error, unexpected status or
/// content type degrades to "not embedded". Results, including
/// failures-as-negatives, go into the injected cache for one TTL; within
/// that window no second request is issued for the same URL.
pub struct ProbeEmbedChecker {
    client: reqwest::Client,
    markers: Vec<String>,
    max_lines: usize,
    cache: ProbeCache,
}

impl ProbeEmbedChecker {
    pub fn new(
        markers: Vec<String>,
        max_lines: usize,
        timeout: Duration,
        cache: ProbeCache,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(PROBE_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            markers,
            max_lines,
            cache,
        })
    }

    async fn probe(&self, url: &str) -> anyhow::Result<bool> {
        let resp = self.client.get(url).send().await?;
        if resp.status() != reqwest::StatusCode::OK {
            return Ok(false);
        }
        let is_html = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false);
        if !is_html {
            return Ok(false);
        }

        let mut stream = resp.bytes_stream();
        let mut pending = String::new();
        let mut scanned = 0usize;
        while let Some(chunk) = stream.next().await {
            pending.push_str(&String::from_utf8_lossy(&chunk?));
            while let Some(newline) = pending.find('\n') {
                let line: String = pending.drain(..=newline).collect();
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if self.line_has_marker(line) {
                    return Ok(true);
                }
                scanned += 1;
                if scanned >= self.max_lines {
                    return Ok(false);
                }
            }
        }
        let tail = pending.trim();
        Ok(!tail.is_empty() && self.line_has_marker(tail))
    }

    fn line_has_marker(&self, line: &str) -> bool {
        self.markers.iter().any(|marker| line.contains(marker.as_str()))
    }
}

#[async_trait]
impl EmbedChecker for ProbeEmbedChecker {
    async fn is_embedded(&self, url: &str) -> bool {
        if let Some(cached) = self.cache.get(url) {
            return cached;
        }
        let embedded = match self.probe(url).await {
            Ok(embedded) => embedded,
            Err(error) => {
                tracing::debug!(url, %error, "embed probe failed");
                false
            }
        };
        self.cache.put(url, embedded);
        embedded
    }
}
