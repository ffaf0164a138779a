//! Axum route handlers for the Tailoring API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_description::ParsedJD;
use crate::models::resume::ParsedResume;
use crate::state::AppState;
use crate::tailoring::engine::{analyze, analyze_and_tailor, analyze_and_tailor_assisted, TailoringOutcome};
use crate::tailoring::fitting_level::{FittingLevel, FittingLevelSummary};
use crate::tailoring::gap_classifier::GapAnalysis;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub resume: ParsedResume,
    pub job_description: ParsedJD,
    /// Parsed wide so an out-of-range level is a validation error, not a body rejection.
    pub fitting_level: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisRequest {
    pub resume: ParsedResume,
    pub job_description: ParsedJD,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisResponse {
    pub gap_analysis: GapAnalysis,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyResponse {
    pub version: String,
    pub skill_count: usize,
    pub categories: Vec<String>,
    pub fitting_levels: Vec<FittingLevelSummary>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/tailor
///
/// Gap analysis plus a tailored resume and its document body, at the requested
/// fitting level. Uses the wording advisor when one is configured.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailoringOutcome>, AppError> {
    let span = info_span!("tailor", request_id = %Uuid::new_v4());
    tailor(state, request).instrument(span).await
}

async fn tailor(state: AppState, request: TailorRequest) -> Result<Json<TailoringOutcome>, AppError> {
    let level = FittingLevel::from_i64(request.fitting_level)?;
    info!(
        level = level.get(),
        jd_title = %request.job_description.title,
        assisted = state.advisor.is_some(),
        "Tailoring request received"
    );

    let outcome = match &state.advisor {
        Some(advisor) => {
            analyze_and_tailor_assisted(
                &state.taxonomy,
                &request.resume,
                &request.job_description,
                level,
                advisor.as_ref(),
            )
            .await?
        }
        None => {
            // CPU-bound and synchronous: keep it off the async workers.
            let taxonomy = Arc::clone(&state.taxonomy);
            let span = Span::current();
            tokio::task::spawn_blocking(move || {
                span.in_scope(|| {
                    analyze_and_tailor(&taxonomy, &request.resume, &request.job_description, level)
                })
            })
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in tailoring: {e}")))??
        }
    };

    info!(
        tool_gaps = outcome.gap_analysis.tool_gaps.len(),
        true_gaps = outcome.gap_analysis.true_gaps.len(),
        warnings = outcome.tailored_resume.warnings.len(),
        "Tailoring complete"
    );
    Ok(Json(outcome))
}

/// POST /api/v1/gap-analysis
///
/// Classification only; no tailoring.
pub async fn handle_gap_analysis(
    State(state): State<AppState>,
    Json(request): Json<GapAnalysisRequest>,
) -> Result<Json<GapAnalysisResponse>, AppError> {
    let span = info_span!("gap_analysis", request_id = %Uuid::new_v4());
    let taxonomy = Arc::clone(&state.taxonomy);

    tokio::task::spawn_blocking(move || {
        span.in_scope(|| -> Result<_, AppError> {
            let gap_analysis = analyze(&taxonomy, &request.resume, &request.job_description)?;
            info!(
                covered = gap_analysis.covered_count,
                required_gaps = gap_analysis.required_gap_count,
                "Gap analysis complete"
            );
            Ok(Json(GapAnalysisResponse { gap_analysis }))
        })
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in gap analysis: {e}")))?
}

/// GET /api/v1/taxonomy
///
/// Identifies the taxonomy the service is running with.
pub async fn handle_taxonomy(State(state): State<AppState>) -> Json<TaxonomyResponse> {
    let taxonomy = &state.taxonomy;
    Json(TaxonomyResponse {
        version: taxonomy.version().to_string(),
        skill_count: taxonomy.len(),
        categories: taxonomy.categories().into_iter().map(str::to_string).collect(),
        fitting_levels: FittingLevel::all().map(FittingLevelSummary::from).collect(),
    })
}
