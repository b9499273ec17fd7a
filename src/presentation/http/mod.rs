pub mod annotation;
pub mod goto_url;
pub mod health;
pub mod index;
pub mod page;
