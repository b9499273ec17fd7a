use url::Url;

use crate::application::ports::embed_checker::EmbedChecker;
use crate::application::services::links::{
    PRETTY_URL_MAX_LEN, is_http_url, pretty_url, strip_fragment,
};
use crate::application::use_cases::links::LinkSettings;
use crate::domain::annotation::ParsedAnnotation;

/// YouTube videos with a media time need via's server-side player controls;
/// the extension path cannot seek on load.
const YOUTUBE_HOST: &str = "www.youtube.com";

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationLinks {
    /// Proxy link, absent when the tenant may not use via or the page
    /// already embeds the client.
    pub via_url: Option<String>,
    /// Direct link with the annotation fragment; activates the extension or
    /// an embedded client.
    pub extension_url: String,
    pub pretty_url: String,
    pub title: String,
    pub extension_id: String,
    /// When set, the caller must send the user through via without trying
    /// the extension path first.
    pub always_use_via: bool,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveAnnotationError {
    #[error(
        "Sorry, but it looks like this annotation was made on a document that \
         is not publicly available."
    )]
    NotPubliclyAvailable,
}

impl ResolveAnnotationError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotPubliclyAvailable => "not_an_http_or_https_document",
        }
    }
}

pub struct ResolveAnnotationLinks<'a, E: EmbedChecker + ?Sized> {
    pub embed: &'a E,
    pub settings: &'a LinkSettings,
}

impl<'a, E: EmbedChecker + ?Sized> ResolveAnnotationLinks<'a, E> {
    pub async fn execute(
        &self,
        annotation: &ParsedAnnotation,
    ) -> Result<AnnotationLinks, ResolveAnnotationError> {
        let uri = strip_fragment(&annotation.document_uri);
        if !is_http_url(uri) {
            return Err(ResolveAnnotationError::NotPubliclyAvailable);
        }

        let fragment = format!("annotations:{}", annotation.annotation_id);
        let extension_url = format!("{uri}#{fragment}");

        // Via relies on first-party authentication, so annotations from any
        // other authority can never be shown through it.
        let can_use_via = annotation.authority == self.settings.first_party_authority;
        let force_via = annotation.media_time.is_some() && host_is(uri, YOUTUBE_HOST);

        let via_url = if can_use_via && (force_via || !self.embed.is_embedded(uri).await) {
            Some(format!("{}/{uri}#{fragment}", self.settings.via_base_url))
        } else {
            None
        };
        let always_use_via = force_via && via_url.is_some();

        Ok(AnnotationLinks {
            via_url,
            extension_url,
            pretty_url: pretty_url(uri, PRETTY_URL_MAX_LEN),
            title: annotation.quote.clone(),
            extension_id: self.settings.extension_id(&annotation.authority).to_string(),
            always_use_via,
        })
    }
}

fn host_is(uri: &str, host: &str) -> bool {
    Url::parse(uri)
        .ok()
        .and_then(|parsed| parsed.host_str().map(|h| h == host))
        .unwrap_or(false)
}
