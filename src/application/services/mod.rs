pub mod annotation;
pub mod links;
