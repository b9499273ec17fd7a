use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum AnnotationFetchError {
    #[error("annotation not found")]
    NotFound,
    #[error("annotation backend request failed")]
    Backend(#[source] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterHealth {
    Green,
    Yellow,
    Red,
}

/// Read side of the annotation search index.
///
/// Returns the raw index document; interpreting it is the job of
/// `services::annotation::parse_annotation`.
#[async_trait]
pub trait AnnotationStore: Send + Sync {
    async fn get_annotation(&self, id: &str) -> Result<serde_json::Value, AnnotationFetchError>;

    async fn cluster_health(&self) -> anyhow::Result<ClusterHealth>;
}
