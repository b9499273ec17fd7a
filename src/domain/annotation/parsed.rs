/// One annotation record reduced to the fields the redirector needs.
///
/// Built from a raw search-index document by
/// `application::services::annotation::parse_annotation`; either fully
/// populated or not produced at all. Request-scoped, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAnnotation {
    pub annotation_id: String,
    /// Tenant that owns the annotation. Drives per-tenant policy (via
    /// eligibility, extension id selection).
    pub authority: String,
    /// Resolved address of the annotated page. Non-empty; PDF indirection
    /// already applied.
    pub document_uri: String,
    /// Whether quote/text may be shown to third parties: true only for
    /// shared annotations in the public group.
    pub show_metadata: bool,
    /// Selector quote, or a generated fallback naming the site.
    pub quote: String,
    /// Annotation body, or boilerplate when absent.
    pub text: String,
    /// Playback position for video annotations, when the record carries one.
    pub media_time: Option<f64>,
}
