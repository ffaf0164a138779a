//! Bundled operation: gap analysis and tailoring in one call.
//!
//! `analyze_and_tailor` is synchronous, pure and needs no network.
//! `analyze_and_tailor_assisted` additionally lets a `WordingAdvisor` pick
//! among the allow-listed swaps; any advisor failure falls back to the
//! deterministic choice and is reported as a warning.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::job_description::ParsedJD;
use crate::models::resume::ParsedResume;
use crate::skills::normalizer::normalize_resume;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::tailoring::assembler::{assemble, DocumentBody};
use crate::tailoring::content_selector::{plan_wording, tailor, tailor_with_choices, TailoredResume};
use crate::tailoring::error::EngineError;
use crate::tailoring::fitting_level::FittingLevel;
use crate::tailoring::gap_classifier::{classify, GapAnalysis};
use crate::tailoring::relevance::score;
use crate::tailoring::validation::{validate_job_description, validate_resume};
use crate::tailoring::wording::{resolve_choices, WordingAdvisor, WordingChoices};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoringOutcome {
    pub gap_analysis: GapAnalysis,
    pub tailored_resume: TailoredResume,
    pub document_body: DocumentBody,
}

fn validate(resume: &ParsedResume, jd: &ParsedJD) -> Result<(), EngineError> {
    validate_resume(resume)?;
    validate_job_description(jd)
}

/// Gap analysis only.
pub fn analyze(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
) -> Result<GapAnalysis, EngineError> {
    validate(resume, jd)?;
    let resume_skills = normalize_resume(taxonomy, resume);
    debug!(resume_skills = resume_skills.len(), "Resume skills normalized");
    classify(taxonomy, &resume_skills, jd)
}

pub fn analyze_and_tailor(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
    level: FittingLevel,
) -> Result<TailoringOutcome, EngineError> {
    let gap_analysis = analyze(taxonomy, resume, jd)?;
    let scored = score(taxonomy, resume, jd);
    let tailored_resume = tailor(taxonomy, resume, jd, &scored, level);
    Ok(finish(gap_analysis, tailored_resume))
}

pub async fn analyze_and_tailor_assisted(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
    level: FittingLevel,
    advisor: &dyn WordingAdvisor,
) -> Result<TailoringOutcome, EngineError> {
    let gap_analysis = analyze(taxonomy, resume, jd)?;

    let plan = plan_wording(taxonomy, resume, jd, level);
    let (choices, warnings) = if plan.is_empty() {
        (WordingChoices::new(), Vec::new())
    } else {
        match advisor.choose(&jd.title, &plan).await {
            Ok(advice) => {
                info!(bullets = plan.len(), picks = advice.len(), "Wording advice received");
                resolve_choices(&plan, advice)
            }
            Err(e) => {
                warn!("Wording advisor failed, using default wording: {e}");
                (
                    WordingChoices::new(),
                    vec![format!("Wording advisor unavailable ({e}); default wording used")],
                )
            }
        }
    };

    let scored = score(taxonomy, resume, jd);
    let mut tailored_resume = tailor_with_choices(taxonomy, resume, jd, &scored, level, &choices);
    tailored_resume.warnings = warnings;
    Ok(finish(gap_analysis, tailored_resume))
}

fn finish(gap_analysis: GapAnalysis, tailored_resume: TailoredResume) -> TailoringOutcome {
    let document_body = assemble(&tailored_resume);

    TailoringOutcome {
        gap_analysis,
        tailored_resume,
        document_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::tailoring::wording::{BulletCandidates, WordingChoice};
    use async_trait::async_trait;

    fn taxonomy() -> SkillTaxonomy {
        SkillTaxonomy::builtin().unwrap()
    }

    fn resume() -> ParsedResume {
        serde_json::from_str(
            r#"{
                "contactInfo": {"name": "Ada Lovelace", "email": "ada@example.com"},
                "summary": "Engineer who ships.",
                "experience": [{
                    "company": "Now Co", "title": "Engineer", "startDate": "2021-01",
                    "bullets": ["Built React dashboards", "Tuned Postgres queries", "Organized offsites"]
                }],
                "skills": ["React", "Python", "Figma"]
            }"#,
        )
        .unwrap()
    }

    fn jd() -> ParsedJD {
        serde_json::from_str(
            r#"{
                "title": "Frontend Engineer",
                "requiredSkills": ["Vue", "Python", "AWS"],
                "preferredSkills": ["PostgreSQL"]
            }"#,
        )
        .unwrap()
    }

    struct FailingAdvisor;

    #[async_trait]
    impl WordingAdvisor for FailingAdvisor {
        async fn choose(&self, _: &str, _: &[BulletCandidates]) -> Result<Vec<WordingChoice>, LlmError> {
            Err(LlmError::Timeout { attempts: 2 })
        }
    }

    struct DecliningAdvisor;

    #[async_trait]
    impl WordingAdvisor for DecliningAdvisor {
        async fn choose(&self, _: &str, bullets: &[BulletCandidates]) -> Result<Vec<WordingChoice>, LlmError> {
            Ok(bullets
                .iter()
                .map(|b| WordingChoice {
                    bullet_key: b.bullet_key.clone(),
                    candidate: None,
                })
                .collect())
        }
    }

    #[test]
    fn test_bundles_both_outputs() {
        let t = taxonomy();
        let outcome = analyze_and_tailor(&t, &resume(), &jd(), FittingLevel::new(3).unwrap()).unwrap();
        assert_eq!(outcome.gap_analysis.tool_gaps[0].jd_wants, "Vue");
        assert_eq!(outcome.gap_analysis.true_gaps[0].jd_requires, "AWS");
        assert_eq!(outcome.tailored_resume.fitting_level.get(), 3);
        assert_eq!(outcome.document_body.fitting_level.get(), 3);
    }

    #[test]
    fn test_is_deterministic() {
        let t = taxonomy();
        for level in FittingLevel::all() {
            let a = analyze_and_tailor(&t, &resume(), &jd(), level).unwrap();
            let b = analyze_and_tailor(&t, &resume(), &jd(), level).unwrap();
            assert_eq!(a, b);
            assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
        }
    }

    #[test]
    fn test_validation_runs_before_anything_else() {
        let t = taxonomy();
        let mut bad = resume();
        bad.contact_info.name = String::new();
        let err = analyze_and_tailor(&t, &bad, &jd(), FittingLevel::new(1).unwrap()).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let t = taxonomy();
        let outcome = analyze_and_tailor(&t, &resume(), &jd(), FittingLevel::new(2).unwrap()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json["gapAnalysis"]["toolGaps"].is_array());
        assert!(json["tailoredResume"]["experience"][0]["bullets"][0]["relevanceScore"].is_number());
        assert_eq!(json["tailoredResume"]["fittingLevel"], 2);
        assert!(json["documentBody"]["sections"].is_array());
    }

    #[tokio::test]
    async fn test_assisted_falls_back_with_warning() {
        let t = taxonomy();
        let level = FittingLevel::new(4).unwrap();
        let plain = analyze_and_tailor(&t, &resume(), &jd(), level).unwrap();
        let assisted = analyze_and_tailor_assisted(&t, &resume(), &jd(), level, &FailingAdvisor)
            .await
            .unwrap();

        assert_eq!(assisted.tailored_resume.experience, plain.tailored_resume.experience);
        assert_eq!(assisted.tailored_resume.warnings.len(), 1);
        assert!(assisted.tailored_resume.warnings[0].contains("default wording"));
    }

    #[tokio::test]
    async fn test_assisted_advisor_can_only_decline() {
        let t = taxonomy();
        let level = FittingLevel::new(5).unwrap();
        let outcome = analyze_and_tailor_assisted(&t, &resume(), &jd(), level, &DecliningAdvisor)
            .await
            .unwrap();
        let original = resume();
        for b in &outcome.tailored_resume.experience[0].bullets {
            assert!(b.substitution.is_none());
            assert_eq!(b.text, original.experience[0].bullets[b.original_index]);
        }
        assert!(outcome.tailored_resume.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_assisted_skips_advisor_at_level_one() {
        let t = taxonomy();
        let outcome =
            analyze_and_tailor_assisted(&t, &resume(), &jd(), FittingLevel::new(1).unwrap(), &FailingAdvisor)
                .await
                .unwrap();
        assert!(outcome.tailored_resume.warnings.is_empty());
    }
}
