use serde_json::Value;

use crate::application::services::links::{PRETTY_URL_MAX_LEN, pretty_url};
use crate::domain::annotation::ParsedAnnotation;

/// Shown when an annotation has no body text.
pub const ANNOTATION_BOILERPLATE_TEXT: &str =
    "Follow this link to see the annotation in context on the original page.";

/// Quote fallback when the annotation has no text quote and no usable URI.
const GENERIC_QUOTE: &str = "Hypothesis annotation";

const PDF_URN_PREFIX: &str = "urn:x-pdf:";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationParseError {
    /// Deleted annotations linger in the search index as `{"deleted": true}`
    /// stubs until a purge job removes them. Callers must report this as
    /// "not found", not as a malformed record.
    #[error("annotation not found")]
    Deleted,
    #[error("the annotation has no URI")]
    NoUri,
    #[error("the annotation has an invalid document URI")]
    InvalidUri,
}

impl AnnotationParseError {
    /// Stable machine-readable label, kept separate from the display
    /// message: the label feeds log fields and metric names, the message is
    /// user-facing.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Deleted => "annotation_deleted",
            Self::NoUri => "annotation_has_no_uri",
            Self::InvalidUri => "uri_not_a_string",
        }
    }
}

/// Turn a raw search-index annotation document into a `ParsedAnnotation`.
///
/// Preconditions: index documents always carry `_id` and `_source`, and
/// non-deleted sources always carry `authority`; records violating that are
/// a caller contract breach and come out with empty fields rather than an
/// error.
pub fn parse_annotation(document: &Value) -> Result<ParsedAnnotation, AnnotationParseError> {
    let annotation_id = document
        .get("_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let null = Value::Null;
    let source = document.get("_source").unwrap_or(&null);

    if source.get("deleted").and_then(Value::as_bool) == Some(true) {
        return Err(AnnotationParseError::Deleted);
    }

    let authority = source
        .get("authority")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let shared = source.get("shared").and_then(Value::as_bool) == Some(true);
    let show_metadata =
        source.get("group").and_then(Value::as_str) == Some("__world__") && shared;

    let first_target = source
        .get("target")
        .and_then(Value::as_array)
        .and_then(|targets| targets.first());

    let mut document_uri = first_target.and_then(|target| target.get("source")).cloned();

    // PDFs are indexed under a fingerprint URN; the web address, when the
    // indexer found one, sits on the nested document descriptor.
    if let Some(Value::String(uri)) = &document_uri {
        if uri.starts_with(PDF_URN_PREFIX) {
            match source.get("document").and_then(|doc| doc.get("web_uri")) {
                Some(Value::String(web_uri)) if !web_uri.is_empty() => {
                    document_uri = Some(Value::String(web_uri.clone()));
                }
                Some(Value::String(_)) | Some(Value::Null) | None => {}
                Some(_) => return Err(AnnotationParseError::InvalidUri),
            }
        }
    }

    let quote = first_target
        .and_then(|target| target.get("selector"))
        .and_then(Value::as_array)
        .and_then(|selectors| {
            selectors
                .iter()
                .find(|s| s.get("type").and_then(Value::as_str) == Some("TextQuoteSelector"))
        })
        .and_then(|selector| selector.get("exact"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| fallback_quote(document_uri.as_ref()));

    let text = source
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or(ANNOTATION_BOILERPLATE_TEXT)
        .to_string();

    let media_time = source.get("media_time").and_then(Value::as_f64);

    let document_uri = match document_uri {
        None => return Err(AnnotationParseError::NoUri),
        Some(Value::String(uri)) => uri,
        Some(_) => return Err(AnnotationParseError::InvalidUri),
    };

    Ok(ParsedAnnotation {
        annotation_id,
        authority,
        document_uri,
        show_metadata,
        quote: escape_quote_chars(&quote),
        text: escape_quote_chars(&text),
        media_time,
    })
}

fn fallback_quote(document_uri: Option<&Value>) -> String {
    match document_uri.and_then(Value::as_str) {
        Some(uri) => {
            let pretty = pretty_url(uri, PRETTY_URL_MAX_LEN);
            if pretty.is_empty() {
                GENERIC_QUOTE.to_string()
            } else {
                format!("Hypothesis annotation for {pretty}")
            }
        }
        None => GENERIC_QUOTE.to_string(),
    }
}

/// Replace quote characters with their unicode escape sequences so the
/// values survive embedding in the interstitial page's JSON/HTML unchanged.
fn escape_quote_chars(text: &str) -> String {
    text.replace('"', "\\u0022").replace('\'', "\\u0027")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn world_doc(source_extra: Value) -> Value {
        let mut source = json!({
            "authority": "example.com",
            "group": "__world__",
            "shared": true,
        });
        source
            .as_object_mut()
            .unwrap()
            .extend(source_extra.as_object().unwrap().clone());
        json!({"_id": "annotation_id", "_source": source})
    }

    #[test]
    fn deleted_stub_maps_to_deleted_regardless_of_other_fields() {
        let err = parse_annotation(&json!({
            "_id": "annotation_id",
            "_source": {"deleted": true},
        }))
        .unwrap_err();

        assert_eq!(err, AnnotationParseError::Deleted);
    }

    #[test]
    fn record_without_target_source_has_no_uri() {
        let err = parse_annotation(&world_doc(json!({
            "target": [{"selector": []}],
        })))
        .unwrap_err();

        assert_eq!(err, AnnotationParseError::NoUri);
        assert_eq!(err.reason(), "annotation_has_no_uri");
    }

    #[test]
    fn record_without_targets_has_no_uri() {
        let err = parse_annotation(&world_doc(json!({"target": []}))).unwrap_err();

        assert_eq!(err, AnnotationParseError::NoUri);
    }

    #[test]
    fn non_string_target_source_is_invalid() {
        let err = parse_annotation(&world_doc(json!({
            "target": [{"source": 52, "selector": []}],
        })))
        .unwrap_err();

        assert_eq!(err, AnnotationParseError::InvalidUri);
        assert_eq!(err.reason(), "uri_not_a_string");
    }

    #[test]
    fn returns_annotation_id_and_authority() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "http://example.com/example.html", "selector": []}],
        })))
        .unwrap();

        assert_eq!(parsed.annotation_id, "annotation_id");
        assert_eq!(parsed.authority, "example.com");
    }

    #[test]
    fn returns_document_uri_from_first_target() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [
                {"source": "http://example.com/example.html", "selector": []},
                {"source": "http://other.example.com/"},
            ],
        })))
        .unwrap();

        assert_eq!(parsed.document_uri, "http://example.com/example.html");
    }

    #[test]
    fn returns_quote_from_text_quote_selector() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{
                "source": "http://example.com/example.html",
                "selector": [
                    {"type": "RangeSelector"},
                    {"type": "TextQuoteSelector", "exact": "test_quote"},
                ],
            }],
        })))
        .unwrap();

        assert_eq!(parsed.quote, "test_quote");
    }

    #[test]
    fn quote_falls_back_to_site_reference() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "http://example.com/example.html"}],
        })))
        .unwrap();

        assert_eq!(parsed.quote, "Hypothesis annotation for example.com");
    }

    #[test]
    fn returns_annotation_text() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "http://example.com/example.html", "selector": [{}]}],
            "text": "test_text",
        })))
        .unwrap();

        assert_eq!(parsed.text, "test_text");
    }

    #[test]
    fn empty_text_falls_back_to_boilerplate() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "http://example.com/example.html", "selector": [{}]}],
            "text": "",
        })))
        .unwrap();

        assert_eq!(parsed.text, ANNOTATION_BOILERPLATE_TEXT);
    }

    #[test]
    fn show_metadata_requires_world_group_and_shared() {
        let shared_world = parse_annotation(&world_doc(json!({
            "target": [{"source": "http://example.com/example.html"}],
        })))
        .unwrap();
        assert!(shared_world.show_metadata);

        let private = parse_annotation(&json!({
            "_id": "annotation_id",
            "_source": {
                "authority": "example.com",
                "group": "__world__",
                "shared": false,
                "target": [{"source": "http://example.com/example.html"}],
            },
        }))
        .unwrap();
        assert!(!private.show_metadata);

        let group = parse_annotation(&json!({
            "_id": "annotation_id",
            "_source": {
                "authority": "example.com",
                "group": "abc123",
                "shared": true,
                "target": [{"source": "http://example.com/example.html"}],
            },
        }))
        .unwrap();
        assert!(!group.show_metadata);
    }

    #[test]
    fn pdf_urn_is_replaced_by_web_uri() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "urn:x-pdf:the-fingerprint", "selector": []}],
            "document": {"web_uri": "http://example.com/foo.pdf"},
        })))
        .unwrap();

        assert_eq!(parsed.document_uri, "http://example.com/foo.pdf");
    }

    #[test]
    fn pdf_urn_survives_when_web_uri_is_empty() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "urn:x-pdf:the-fingerprint", "selector": []}],
            "document": {"web_uri": ""},
        })))
        .unwrap();

        assert_eq!(parsed.document_uri, "urn:x-pdf:the-fingerprint");
    }

    #[test]
    fn non_string_web_uri_is_invalid_for_pdfs() {
        let err = parse_annotation(&world_doc(json!({
            "target": [{"source": "urn:x-pdf:the-fingerprint", "selector": []}],
            "document": {"web_uri": 52},
        })))
        .unwrap_err();

        assert_eq!(err, AnnotationParseError::InvalidUri);
        assert_eq!(err.reason(), "uri_not_a_string");
    }

    #[test]
    fn quote_and_text_have_quote_chars_escaped() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{
                "source": "http://example.com/example.html",
                "selector": [{"type": "TextQuoteSelector", "exact": "he said \"hi\""}],
            }],
            "text": "it's fine",
        })))
        .unwrap();

        assert_eq!(parsed.quote, "he said \\u0022hi\\u0022");
        assert_eq!(parsed.text, "it\\u0027s fine");
    }

    #[test]
    fn media_time_is_carried_when_present() {
        let parsed = parse_annotation(&world_doc(json!({
            "target": [{"source": "https://www.youtube.com/watch?v=abc"}],
            "media_time": 93.5,
        })))
        .unwrap();

        assert_eq!(parsed.media_time, Some(93.5));
    }
}
