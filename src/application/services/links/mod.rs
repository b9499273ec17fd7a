use url::Url;

/// Display length for shortened URLs in the interstitial page.
pub const PRETTY_URL_MAX_LEN: usize = 25;

/// Drop any fragment identifier (including a bare trailing '#') from `uri`.
/// A no-op for URIs that carry no fragment.
pub fn strip_fragment(uri: &str) -> &str {
    match uri.find('#') {
        Some(idx) => &uri[..idx],
        None => uri,
    }
}

/// True when `uri` parses and uses http or https (scheme case-insensitive).
pub fn is_http_url(uri: &str) -> bool {
    match Url::parse(uri) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Shortened display form of `uri`: the network location, cut to `max_len`
/// characters with an ellipsis when it doesn't fit. Unparseable input gives
/// an empty string rather than an error; the caller just shows nothing.
pub fn pretty_url(uri: &str, max_len: usize) -> String {
    let Ok(parsed) = Url::parse(uri) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let netloc = match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    if netloc.chars().count() > max_len {
        let mut shortened: String = netloc.chars().take(max_len).collect();
        shortened.push('…');
        shortened
    } else {
        netloc
    }
}
