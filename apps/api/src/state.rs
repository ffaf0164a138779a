use std::sync::Arc;

use crate::config::Config;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::tailoring::wording::WordingAdvisor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Immutable for the life of the process.
    pub taxonomy: Arc<SkillTaxonomy>,
    /// Present only when LLM wording is enabled and a key is configured.
    pub advisor: Option<Arc<dyn WordingAdvisor>>,
}
