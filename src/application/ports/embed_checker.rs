use async_trait::async_trait;

/// Decides whether the page at `url` already embeds the annotation client.
///
/// Implementations never fail: anything short of positive evidence is
/// reported as `false`, so the caller falls back to offering the proxy link.
#[async_trait]
pub trait EmbedChecker: Send + Sync {
    async fn is_embedded(&self, url: &str) -> bool;
}
