use std::sync::Arc;

use crate::application::ports::annotation_store::AnnotationStore;
use crate::application::ports::embed_checker::EmbedChecker;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

pub struct AppServices {
    annotation_store: Arc<dyn AnnotationStore>,
    embed_checker: Arc<dyn EmbedChecker>,
}

impl AppServices {
    pub fn new(
        annotation_store: Arc<dyn AnnotationStore>,
        embed_checker: Arc<dyn EmbedChecker>,
    ) -> Self {
        Self {
            annotation_store,
            embed_checker,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn annotation_store(&self) -> Arc<dyn AnnotationStore> {
        self.services.annotation_store.clone()
    }

    pub fn embed_checker(&self) -> Arc<dyn EmbedChecker> {
        self.services.embed_checker.clone()
    }
}
