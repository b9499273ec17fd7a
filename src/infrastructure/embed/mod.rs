use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use crate::application::ports::embed_checker::EmbedChecker;

pub mod cache;
pub mod patterns;
pub mod probe;

pub use cache::ProbeCache;
pub use patterns::{EmbedPatterns, PatternEmbedChecker};
pub use probe::ProbeEmbedChecker;

/// Composite detector: the static pattern tier first, then (when enabled)
/// the live probe tier. Non-http(s) URLs short-circuit to false without
/// ever reaching the probe.
pub struct TieredEmbedChecker {
    static_tier: PatternEmbedChecker,
    probe_tier: Option<Arc<dyn EmbedChecker>>,
}

impl TieredEmbedChecker {
    pub fn new(patterns: EmbedPatterns) -> Self {
        Self {
            static_tier: PatternEmbedChecker::new(patterns),
            probe_tier: None,
        }
    }

    pub fn with_probe(patterns: EmbedPatterns, probe: Arc<dyn EmbedChecker>) -> Self {
        Self {
            static_tier: PatternEmbedChecker::new(patterns),
            probe_tier: Some(probe),
        }
    }
}

#[async_trait]
impl EmbedChecker for TieredEmbedChecker {
    async fn is_embedded(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }
        if self.static_tier.url_matches(&parsed) {
            return true;
        }
        match &self.probe_tier {
            Some(probe) => probe.is_embedded(url).await,
            None => false,
        }
    }
}
