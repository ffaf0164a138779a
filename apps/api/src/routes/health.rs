use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service and taxonomy versions.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "tailor-api",
        "taxonomyVersion": state.taxonomy.version(),
        "llmWording": state.config.enable_llm_wording && state.advisor.is_some()
    }))
}
