mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod skills;
mod state;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, RetryPolicy};
use crate::routes::build_router;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::state::AppState;
use crate::tailoring::advisor::LlmWordingAdvisor;
use crate::tailoring::wording::WordingAdvisor;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    let taxonomy = match &config.taxonomy_path {
        Some(path) => SkillTaxonomy::from_file(path)
            .with_context(|| format!("Failed to load taxonomy from {}", path.display()))?,
        None => SkillTaxonomy::builtin().context("Built-in taxonomy is invalid")?,
    };
    if taxonomy.is_empty() {
        warn!("Taxonomy {} has no skills; every skill will be treated literally", taxonomy.version());
    }
    info!(
        "Taxonomy {} loaded ({} skills, {} categories)",
        taxonomy.version(),
        taxonomy.len(),
        taxonomy.categories().len()
    );

    let advisor = build_advisor(&config)?;
    match &advisor {
        Some(_) => info!("LLM wording advisor enabled (model: {})", llm_client::MODEL),
        None => info!("LLM wording advisor disabled; deterministic wording only"),
    }

    let state = AppState {
        taxonomy: Arc::new(taxonomy),
        advisor,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once the frontend origin is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_advisor(config: &Config) -> Result<Option<Arc<dyn WordingAdvisor>>> {
    let Some(api_key) = config.wording_api_key() else {
        return Ok(None);
    };

    let policy = RetryPolicy {
        max_attempts: config.llm_max_attempts,
        attempt_timeout: Duration::from_millis(config.llm_timeout_ms),
        ..RetryPolicy::default()
    };
    let llm = LlmClient::new(api_key.to_string(), policy).context("Failed to build LLM client")?;

    Ok(Some(Arc::new(LlmWordingAdvisor::new(llm))))
}
