use crate::application::ports::embed_checker::EmbedChecker;
use crate::application::services::links::{
    PRETTY_URL_MAX_LEN, is_http_url, pretty_url, strip_fragment,
};
use crate::application::use_cases::links::LinkSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct UrlLinks {
    pub via_url: Option<String>,
    pub extension_url: String,
    pub pretty_url: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveUrlError {
    #[error("The 'url' parameter is missing or not an http(s) URL.")]
    InvalidInputUrl,
}

impl ResolveUrlError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidInputUrl => "invalid_input_url",
        }
    }
}

/// Ad-hoc redirect: no stored annotation, just a target URL plus an
/// optional group or search query to open the client with.
pub struct ResolveUrlLinks<'a, E: EmbedChecker + ?Sized> {
    pub embed: &'a E,
    pub settings: &'a LinkSettings,
}

impl<'a, E: EmbedChecker + ?Sized> ResolveUrlLinks<'a, E> {
    pub async fn execute(
        &self,
        url: Option<&str>,
        group: Option<&str>,
        query: Option<&str>,
    ) -> Result<UrlLinks, ResolveUrlError> {
        let uri = strip_fragment(url.ok_or(ResolveUrlError::InvalidInputUrl)?);
        if !is_http_url(uri) {
            return Err(ResolveUrlError::InvalidInputUrl);
        }

        // Group wins over query when both are supplied.
        let fragment = match group.filter(|g| !g.is_empty()) {
            Some(group) => format!("annotations:group:{group}"),
            None => format!(
                "annotations:query:{}",
                urlencoding::encode(query.unwrap_or(""))
            ),
        };

        let extension_url = format!("{uri}#{fragment}");
        let via_url = if self.embed.is_embedded(uri).await {
            None
        } else {
            Some(format!("{}/{uri}#{fragment}", self.settings.via_base_url))
        };

        Ok(UrlLinks {
            via_url,
            extension_url,
            pretty_url: pretty_url(uri, PRETTY_URL_MAX_LEN),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    struct StubChecker(bool);

    #[async_trait]
    impl EmbedChecker for StubChecker {
        async fn is_embedded(&self, _url: &str) -> bool {
            self.0
        }
    }

    fn settings() -> LinkSettings {
        LinkSettings {
            via_base_url: "https://via.hypothes.is".into(),
            first_party_authority: "hypothes.is".into(),
            extension_ids: HashMap::from([("default".to_string(), "ext-id".to_string())]),
        }
    }

    #[tokio::test]
    async fn builds_redirect_links_with_empty_query_fragment() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        let links = uc
            .execute(Some("https://example.com/"), None, None)
            .await
            .unwrap();

        assert_eq!(
            links.via_url.as_deref(),
            Some("https://via.hypothes.is/https://example.com/#annotations:query:")
        );
        assert_eq!(
            links.extension_url,
            "https://example.com/#annotations:query:"
        );
        assert_eq!(links.pretty_url, "example.com");
    }

    #[tokio::test]
    async fn query_is_percent_encoded_into_the_fragment() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        let links = uc
            .execute(
                Some("https://example.com/article.html"),
                None,
                Some("user:jsmith"),
            )
            .await
            .unwrap();

        let expected = "#annotations:query:user%3Ajsmith";
        assert!(links.via_url.unwrap().ends_with(expected));
        assert!(links.extension_url.ends_with(expected));
    }

    #[tokio::test]
    async fn group_takes_precedence_over_query() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        let links = uc
            .execute(
                Some("https://example.com/"),
                Some("abc123"),
                Some("user:jsmith"),
            )
            .await
            .unwrap();

        assert!(links.extension_url.ends_with("#annotations:group:abc123"));
    }

    #[tokio::test]
    async fn invalid_or_missing_urls_are_rejected() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        for url in [
            None,
            Some("ftp://foo.bar"),
            Some("doi:10.1.2/345"),
            Some("file://foo.bar"),
            Some("http://goo[g"),
        ] {
            let err = uc.execute(url, None, None).await.unwrap_err();
            assert_eq!(err, ResolveUrlError::InvalidInputUrl, "{url:?}");
        }
        assert_eq!(
            ResolveUrlError::InvalidInputUrl.reason(),
            "invalid_input_url"
        );
    }

    #[tokio::test]
    async fn uppercase_schemes_are_accepted() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        for url in ["HTTP://PUBLISHER.ORG", "HTTPS://example.com"] {
            assert!(uc.execute(Some(url), None, None).await.is_ok(), "{url}");
        }
    }

    #[tokio::test]
    async fn existing_fragment_is_stripped() {
        let checker = StubChecker(false);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        let links = uc
            .execute(Some("https://example.com/#foobar"), None, None)
            .await
            .unwrap();

        assert_eq!(
            links.via_url.as_deref(),
            Some("https://via.hypothes.is/https://example.com/#annotations:query:")
        );
        assert_eq!(
            links.extension_url,
            "https://example.com/#annotations:query:"
        );
    }

    #[tokio::test]
    async fn embedding_pages_suppress_the_via_link() {
        let checker = StubChecker(true);
        let settings = settings();
        let uc = ResolveUrlLinks {
            embed: &checker,
            settings: &settings,
        };

        let links = uc
            .execute(Some("https://example.com/"), None, None)
            .await
            .unwrap();

        assert_eq!(links.via_url, None);
    }
}
