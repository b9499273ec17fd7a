use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Hostname+path glob patterns for pages known to embed the client.
///
/// Only the hostname and path are matched; use "example.com/*" to cover a
/// whole domain. '*' matches any run of characters, '?' a single one.
const DEFAULT_EMBED_PATTERNS: &[&str] = &[
    // Hypothesis websites.
    "h.readthedocs.io/*",
    "web.hypothes.is/blog/*",
    // Publisher partners.
    "psycnet.apa.org/fulltext/*",
    "awspntest.apa.org/fulltext/*",
    "*.semanticscholar.org/reader/*",
];

/// Substrings whose presence in a page marks it as embedding the client.
const DEFAULT_EMBED_MARKERS: &[&str] = &[
    "https://hypothes.is/embed.js",
    "https://cdn.hypothes.is/hypothesis",
    "js-hypothesis-config",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub api_port: u16,
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    pub via_base_url: String,
    /// Authority whose annotations may be routed through via. Via relies on
    /// first-party authentication, so third-party authorities never qualify.
    pub first_party_authority: String,
    pub front_site_url: String,
    /// Per-authority browser extension ids. Always contains a "default" key.
    pub extension_ids: HashMap<String, String>,
    pub embed_patterns: Vec<String>,
    pub embed_markers: Vec<String>,
    pub embed_probe_enabled: bool,
    pub embed_probe_timeout: Duration,
    pub embed_probe_max_lines: usize,
    pub embed_cache_capacity: usize,
    pub embed_cache_ttl: Duration,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8000);
        let elasticsearch_url =
            env::var("ELASTICSEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".into());
        let elasticsearch_index =
            env::var("ELASTICSEARCH_INDEX").unwrap_or_else(|_| "hypothesis".into());
        let via_base_url = env::var("VIA_BASE_URL")
            .unwrap_or_else(|_| "https://via.hypothes.is".into())
            .trim_end_matches('/')
            .to_string();
        let first_party_authority =
            env::var("BOUNCER_AUTHORITY").unwrap_or_else(|_| "localhost".into());
        let front_site_url =
            env::var("FRONT_SITE_URL").unwrap_or_else(|_| "https://hypothes.is".into());

        let extension_ids = parse_extension_ids(
            &env::var("CHROME_EXTENSION_ID")
                .unwrap_or_else(|_| "bjfhmglciegochdpefhhlphglcehbmek".into()),
        )?;

        let embed_patterns = match env::var("EMBED_PATTERNS") {
            Ok(v) => v
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            Err(_) => DEFAULT_EMBED_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
        };
        let embed_markers = match env::var("EMBED_MARKERS") {
            Ok(v) => v
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            Err(_) => DEFAULT_EMBED_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };
        let embed_probe_enabled = matches!(
            env::var("EMBED_PROBE").ok().as_deref(),
            Some("1") | Some("true") | Some("yes")
        );
        let embed_probe_timeout = Duration::from_millis(
            env::var("EMBED_PROBE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1500),
        );
        let embed_probe_max_lines = env::var("EMBED_PROBE_MAX_LINES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);
        let embed_cache_capacity = env::var("EMBED_CACHE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(512);
        let embed_cache_ttl = Duration::from_secs(
            env::var("EMBED_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        );
        let is_production = matches!(
            env::var("RUST_ENV").ok().as_deref(),
            Some("production") | Some("prod")
        );

        if is_production && first_party_authority == "localhost" {
            anyhow::bail!("BOUNCER_AUTHORITY must be set in production");
        }

        Ok(Self {
            api_port,
            elasticsearch_url,
            elasticsearch_index,
            via_base_url,
            first_party_authority,
            front_site_url,
            extension_ids,
            embed_patterns,
            embed_markers,
            embed_probe_enabled,
            embed_probe_timeout,
            embed_probe_max_lines,
            embed_cache_capacity,
            embed_cache_ttl,
            is_production,
        })
    }
}

/// `CHROME_EXTENSION_ID` is either a bare extension id or a JSON object
/// mapping authority to extension id. The map form must carry a "default"
/// entry so every authority resolves to something.
fn parse_extension_ids(raw: &str) -> anyhow::Result<HashMap<String, String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        let map: HashMap<String, String> = serde_json::from_str(trimmed)?;
        if map.get("default").map(|v| !v.is_empty()) != Some(true) {
            anyhow::bail!("CHROME_EXTENSION_ID map must have a \"default\" key");
        }
        Ok(map)
    } else {
        Ok(HashMap::from([("default".to_string(), trimmed.to_string())]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_becomes_default_entry() {
        let ids = parse_extension_ids("abcdef").unwrap();
        assert_eq!(ids.get("default").map(String::as_str), Some("abcdef"));
    }

    #[test]
    fn json_map_is_accepted_with_default() {
        let ids = parse_extension_ids(r#"{"default": "aaa", "partner.org": "bbb"}"#).unwrap();
        assert_eq!(ids.get("partner.org").map(String::as_str), Some("bbb"));
        assert_eq!(ids.get("default").map(String::as_str), Some("aaa"));
    }

    #[test]
    fn json_map_without_default_is_rejected() {
        assert!(parse_extension_ids(r#"{"partner.org": "bbb"}"#).is_err());
    }
}
