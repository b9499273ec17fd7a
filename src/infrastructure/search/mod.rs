pub mod es_client;

pub use es_client::EsAnnotationStore;
