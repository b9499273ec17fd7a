use async_trait::async_trait;
use regex::Regex;
use url::Url;

use crate::application::ports::embed_checker::EmbedChecker;

/// Hostname+path glob patterns compiled to anchored regexes at startup.
///
/// Globs use shell-style wildcards: '*' matches any run of characters, '?'
/// a single one. Only the host and path of a URL are tested; query string
/// and fragment are ignored, and an empty path counts as "/".
pub struct EmbedPatterns {
    compiled: Vec<Regex>,
}

impl EmbedPatterns {
    pub fn compile(patterns: &[String]) -> anyhow::Result<Self> {
        let compiled = patterns
            .iter()
            .map(|pattern| Regex::new(&translate_glob(pattern)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { compiled })
    }

    /// Whether the host+path of an already-parsed URL matches any pattern.
    pub fn matches(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let netloc = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let path = if url.path().is_empty() { "/" } else { url.path() };
        let candidate = format!("{netloc}{path}");
        self.compiled.iter().any(|re| re.is_match(&candidate))
    }
}

fn translate_glob(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

/// Static tier of the embed detector: instantaneous, network-free.
pub struct PatternEmbedChecker {
    patterns: EmbedPatterns,
}

impl PatternEmbedChecker {
    pub fn new(patterns: EmbedPatterns) -> Self {
        Self { patterns }
    }

    pub fn url_matches(&self, url: &Url) -> bool {
        self.patterns.matches(url)
    }
}

#[async_trait]
impl EmbedChecker for PatternEmbedChecker {
    async fn is_embedded(&self, url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => self.url_matches(&parsed),
            _ => false,
        }
    }
}
