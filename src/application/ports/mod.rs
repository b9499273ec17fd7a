pub mod annotation_store;
pub mod embed_checker;
