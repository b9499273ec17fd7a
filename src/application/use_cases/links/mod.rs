use std::collections::HashMap;

use crate::bootstrap::config::Config;

pub mod resolve_annotation;
pub mod resolve_url;

/// Per-tenant link policy, carved out of the app config so the resolvers
/// can be driven directly in tests.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub via_base_url: String,
    pub first_party_authority: String,
    pub extension_ids: HashMap<String, String>,
}

impl LinkSettings {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            via_base_url: cfg.via_base_url.clone(),
            first_party_authority: cfg.first_party_authority.clone(),
            extension_ids: cfg.extension_ids.clone(),
        }
    }

    /// Extension id for `authority`, falling back to the mandatory
    /// "default" entry (presence enforced at config load).
    pub fn extension_id(&self, authority: &str) -> &str {
        self.extension_ids
            .get(authority)
            .or_else(|| self.extension_ids.get("default"))
            .map(String::as_str)
            .unwrap_or_default()
    }
}
