use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::annotation_store::{
    AnnotationFetchError, AnnotationStore, ClusterHealth,
};

/// Annotation reads over Elasticsearch's HTTP API.
///
/// No retry policy here: the search index either answers or the request
/// fails, and the caller maps that to a user-facing status.
pub struct EsAnnotationStore {
    client: reqwest::Client,
    base_url: String,
    index: String,
}

impl EsAnnotationStore {
    pub fn new(base_url: &str, index: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
        }
    }
}

#[async_trait]
impl AnnotationStore for EsAnnotationStore {
    async fn get_annotation(&self, id: &str) -> Result<Value, AnnotationFetchError> {
        let url = format!(
            "{}/{}/_doc/{}",
            self.base_url,
            self.index,
            urlencoding::encode(id)
        );
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnnotationFetchError::Backend(e.into()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AnnotationFetchError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(AnnotationFetchError::Backend(anyhow::anyhow!(
                "search index returned status {}",
                resp.status()
            )));
        }

        let document: Value = resp
            .json()
            .await
            .map_err(|e| AnnotationFetchError::Backend(e.into()))?;
        // ES replies 200 with {"found": false} on some missing-doc paths.
        if document.get("found").and_then(Value::as_bool) == Some(false) {
            return Err(AnnotationFetchError::NotFound);
        }
        Ok(document)
    }

    async fn cluster_health(&self) -> anyhow::Result<ClusterHealth> {
        let url = format!("{}/_cluster/health", self.base_url);
        let body: Value = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        match body.get("status").and_then(Value::as_str) {
            Some("green") => Ok(ClusterHealth::Green),
            Some("yellow") => Ok(ClusterHealth::Yellow),
            Some("red") => Ok(ClusterHealth::Red),
            other => anyhow::bail!("unexpected cluster status {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn returns_the_raw_index_document() {
        let server = MockServer::start().await;
        let doc = json!({
            "_id": "abc123",
            "found": true,
            "_source": {"uri": "http://example.com/"},
        });
        Mock::given(method("GET"))
            .and(path("/hypothesis/_doc/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&doc))
            .mount(&server)
            .await;

        let store = EsAnnotationStore::new(&server.uri(), "hypothesis");
        let fetched = store.get_annotation("abc123").await.unwrap();

        assert_eq!(fetched, doc);
    }

    #[tokio::test]
    async fn missing_annotations_map_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hypothesis/_doc/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"found": false})))
            .mount(&server)
            .await;

        let store = EsAnnotationStore::new(&server.uri(), "hypothesis");
        let err = store.get_annotation("missing").await.unwrap_err();

        assert!(matches!(err, AnnotationFetchError::NotFound));
    }

    #[tokio::test]
    async fn backend_failures_are_distinct_from_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hypothesis/_doc/abc123"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = EsAnnotationStore::new(&server.uri(), "hypothesis");
        let err = store.get_annotation("abc123").await.unwrap_err();

        assert!(matches!(err, AnnotationFetchError::Backend(_)));
    }

    #[tokio::test]
    async fn cluster_health_parses_the_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/_cluster/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "green"})))
            .mount(&server)
            .await;

        let store = EsAnnotationStore::new(&server.uri(), "hypothesis");
        assert_eq!(
            store.cluster_health().await.unwrap(),
            ClusterHealth::Green
        );
    }
}
