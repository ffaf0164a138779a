//! Gap Classifier: compares normalized resume skills against the JD's
//! required and preferred skills.
//!
//! Every distinct JD skill ends up in exactly one bucket:
//! - covered: its key is in the resume's normalized set (not emitted)
//! - tool gap: the resume has a different canonical skill sharing a category
//! - true gap: nothing in the resume covers it

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::models::job_description::ParsedJD;
use crate::skills::normalizer::{is_literal_key, skill_key, NormalizedSkillSet};
use crate::skills::taxonomy::{CanonicalSkill, SkillTaxonomy};
use crate::tailoring::error::EngineError;

pub const UNCATEGORIZED: &str = "uncategorized";

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// The JD wants `jd_wants`; the candidate has `user_has` in the same category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolGap {
    pub user_has: String,
    pub jd_wants: String,
    pub category: String,
    pub recommendation: String,
}

/// A JD skill with no coverage anywhere in the resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrueGap {
    pub jd_requires: String,
    pub category: String,
    pub is_required: bool,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub tool_gaps: Vec<ToolGap>,
    pub true_gaps: Vec<TrueGap>,
    /// Distinct JD skills already present in the resume.
    #[serde(default)]
    pub covered_count: usize,
    /// True gaps on required skills.
    #[serde(default)]
    pub required_gap_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Classification
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Covered,
    Tool { resume_key: String, gap: ToolGap },
    True(TrueGap),
}

#[derive(Debug, Clone, PartialEq)]
struct Classification {
    jd_key: String,
    outcome: Outcome,
}

pub fn classify(
    taxonomy: &SkillTaxonomy,
    resume_skills: &NormalizedSkillSet,
    jd: &ParsedJD,
) -> Result<GapAnalysis, EngineError> {
    let support = category_support(resume_skills);
    let mut seen = HashSet::new();
    let mut classifications = Vec::new();

    for (raw, is_required) in jd.tagged_skills() {
        let Some(jd_key) = skill_key(taxonomy, raw) else {
            continue;
        };
        if !seen.insert(jd_key.clone()) {
            continue;
        }

        let outcome = if resume_skills.contains_key(&jd_key) {
            Outcome::Covered
        } else {
            let jd_skill = taxonomy.resolve(raw);
            let transferable = jd_skill.and_then(|s| {
                pick_transferable(taxonomy, resume_skills, &support, s).map(|picked| (s, picked))
            });
            match transferable {
                Some((wanted, (candidate, category))) => Outcome::Tool {
                    resume_key: candidate.id.clone(),
                    gap: ToolGap {
                        recommendation: tool_gap_recommendation(
                            &candidate.display_name,
                            &wanted.display_name,
                        ),
                        user_has: candidate.display_name.clone(),
                        jd_wants: wanted.display_name.clone(),
                        category,
                    },
                },
                None => Outcome::True(TrueGap {
                    recommendation: true_gap_recommendation(raw.trim(), is_required),
                    jd_requires: raw.trim().to_string(),
                    category: jd_skill
                        .map(|s| s.category.clone())
                        .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    is_required,
                }),
            }
        };

        classifications.push(Classification { jd_key, outcome });
    }

    verify(taxonomy, resume_skills, &classifications)?;

    let mut analysis = GapAnalysis::default();
    for c in classifications {
        match c.outcome {
            Outcome::Covered => analysis.covered_count += 1,
            Outcome::Tool { gap, .. } => analysis.tool_gaps.push(gap),
            Outcome::True(gap) => {
                if gap.is_required {
                    analysis.required_gap_count += 1;
                }
                analysis.true_gaps.push(gap);
            }
        }
    }

    debug!(
        covered = analysis.covered_count,
        tool_gaps = analysis.tool_gaps.len(),
        true_gaps = analysis.true_gaps.len(),
        "Gap classification complete"
    );

    Ok(analysis)
}

/// Number of resume canonical skills in each category.
fn category_support(resume_skills: &NormalizedSkillSet) -> BTreeMap<&str, usize> {
    let mut support = BTreeMap::new();
    for entry in resume_skills.values().filter(|e| e.matched) {
        for category in &entry.categories {
            *support.entry(category.as_str()).or_insert(0) += 1;
        }
    }
    support
}

/// Picks the resume skill to present as transferable, with the category that
/// links it to `jd_skill`.
///
/// Category choice among the shared ones: most supported by the resume, then
/// the JD skill's primary category, then lexicographic. Candidate choice:
/// highest support for its chosen category, then canonical id.
fn pick_transferable<'t>(
    taxonomy: &'t SkillTaxonomy,
    resume_skills: &NormalizedSkillSet,
    support: &BTreeMap<&str, usize>,
    jd_skill: &CanonicalSkill,
) -> Option<(&'t CanonicalSkill, String)> {
    let mut best: Option<(&CanonicalSkill, &str, usize)> = None;

    for key in resume_skills.keys().filter(|k| !is_literal_key(k)) {
        let Some(candidate) = taxonomy.get(key) else {
            continue;
        };
        if candidate.id == jd_skill.id || !taxonomy.same_category(jd_skill, candidate) {
            continue;
        }

        let category = taxonomy
            .shared_categories(jd_skill, candidate)
            .into_iter()
            .max_by(|a, b| {
                let sa = support.get(a).copied().unwrap_or(0);
                let sb = support.get(b).copied().unwrap_or(0);
                sa.cmp(&sb)
                    .then_with(|| (*a == jd_skill.category).cmp(&(*b == jd_skill.category)))
                    .then_with(|| b.cmp(a))
            });
        let Some(category) = category else {
            continue;
        };

        let score = support.get(category).copied().unwrap_or(0);
        // Keys iterate in id order, so only a strictly better score replaces.
        if best.map_or(true, |(_, _, s)| score > s) {
            best = Some((candidate, category, score));
        }
    }

    best.map(|(candidate, category, _)| (candidate, category.to_string()))
}

fn tool_gap_recommendation(user_has: &str, jd_wants: &str) -> String {
    format!("Highlight transferable experience with {user_has} when discussing {jd_wants}.")
}

fn true_gap_recommendation(jd_requires: &str, is_required: bool) -> String {
    if is_required {
        format!("Consider acquiring hands-on experience with {jd_requires}; it is a stated requirement.")
    } else {
        format!("Consider learning {jd_requires} to strengthen your application.")
    }
}

/// Checks the classification against the resume set: JD skills are
/// classified once each, tool gaps pair two distinct skills in the stated
/// category, and neither tool nor true gaps name a skill the resume covers.
fn verify(
    taxonomy: &SkillTaxonomy,
    resume_skills: &NormalizedSkillSet,
    classifications: &[Classification],
) -> Result<(), EngineError> {
    let mut keys = HashSet::new();

    for c in classifications {
        let fault = if !keys.insert(c.jd_key.as_str()) {
            Some(format!("JD skill '{}' classified more than once", c.jd_key))
        } else {
            match &c.outcome {
                Outcome::Covered if !resume_skills.contains_key(&c.jd_key) => {
                    Some(format!("'{}' marked covered but absent from resume", c.jd_key))
                }
                Outcome::Covered => None,
                Outcome::Tool { resume_key, gap } => {
                    let in_category = |key: &str| {
                        taxonomy.get(key).is_some_and(|s| s.in_category(&gap.category))
                    };
                    if resume_key == &c.jd_key {
                        Some(format!("tool gap pairs '{}' with itself", c.jd_key))
                    } else if resume_skills.contains_key(&c.jd_key) {
                        Some(format!("tool gap for covered skill '{}'", c.jd_key))
                    } else if !resume_skills.contains_key(resume_key) {
                        Some(format!("tool gap cites '{resume_key}' which the resume lacks"))
                    } else if !in_category(resume_key) || !in_category(&c.jd_key) {
                        Some(format!(
                            "tool gap '{resume_key}' -> '{}' not both in '{}'",
                            c.jd_key, gap.category
                        ))
                    } else {
                        None
                    }
                }
                Outcome::True(_) if resume_skills.contains_key(&c.jd_key) => {
                    Some(format!("true gap for covered skill '{}'", c.jd_key))
                }
                Outcome::True(_) => None,
            }
        };

        if let Some(msg) = fault {
            error!(%msg, "Gap analysis invariant violated");
            return Err(EngineError::InvariantViolation(msg));
        }
    }

    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::normalizer::normalize;

    fn taxonomy() -> SkillTaxonomy {
        SkillTaxonomy::builtin().unwrap()
    }

    fn jd(required: &[&str], preferred: &[&str]) -> ParsedJD {
        ParsedJD {
            title: "Engineer".to_string(),
            company: None,
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: preferred.iter().map(|s| s.to_string()).collect(),
            responsibilities: vec![],
            raw_requirements: vec![],
        }
    }

    fn run(resume: &[&str], required: &[&str], preferred: &[&str]) -> GapAnalysis {
        let t = taxonomy();
        let set = normalize(&t, resume.iter().copied());
        classify(&t, &set, &jd(required, preferred)).unwrap()
    }

    #[test]
    fn test_react_vue_python_aws_example() {
        let analysis = run(&["React", "Python", "Figma"], &["Vue", "Python", "AWS"], &[]);

        assert_eq!(analysis.tool_gaps.len(), 1);
        let tool = &analysis.tool_gaps[0];
        assert_eq!(tool.user_has, "React");
        assert_eq!(tool.jd_wants, "Vue");
        assert_eq!(tool.category, "frontend framework");
        assert!(tool.recommendation.contains("React"));
        assert!(tool.recommendation.contains("Vue"));

        assert_eq!(analysis.true_gaps.len(), 1);
        let gap = &analysis.true_gaps[0];
        assert_eq!(gap.jd_requires, "AWS");
        assert!(gap.is_required);
        assert_eq!(gap.category, "cloud platform");

        assert_eq!(analysis.covered_count, 1);
        assert_eq!(analysis.required_gap_count, 1);
    }

    #[test]
    fn test_tool_gap_names_jd_skill_canonically() {
        let analysis = run(&["React"], &["vue.js"], &[]);
        let tool = &analysis.tool_gaps[0];
        assert_eq!(tool.jd_wants, "Vue");
        assert_eq!(tool.user_has, "React");
        assert!(tool.recommendation.ends_with("when discussing Vue."));
    }

    #[test]
    fn test_near_named_tools_are_not_covered() {
        let analysis = run(&["Next.js", "React"], &["Nuxt.js", "Preact"], &[]);
        assert_eq!(analysis.covered_count, 0);
        assert!(analysis.tool_gaps.is_empty());
        let missing: Vec<&str> = analysis.true_gaps.iter().map(|g| g.jd_requires.as_str()).collect();
        assert_eq!(missing, vec!["Nuxt.js", "Preact"]);
    }

    #[test]
    fn test_synonym_counts_as_covered() {
        let analysis = run(&["k8s", "Postgres"], &["Kubernetes", "PostgreSQL"], &[]);
        assert!(analysis.tool_gaps.is_empty());
        assert!(analysis.true_gaps.is_empty());
        assert_eq!(analysis.covered_count, 2);
    }

    #[test]
    fn test_unresolved_jd_skill_is_uncategorized_true_gap() {
        let analysis = run(&["React"], &["Underwater Basket Weaving"], &[]);
        assert_eq!(analysis.true_gaps.len(), 1);
        assert_eq!(analysis.true_gaps[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_literal_in_both_is_covered() {
        let analysis = run(&["Underwater Basket Weaving"], &["underwater  basket weaving"], &[]);
        assert!(analysis.true_gaps.is_empty());
        assert_eq!(analysis.covered_count, 1);
    }

    #[test]
    fn test_preferred_gap_wording_and_flag() {
        let analysis = run(&[], &[], &["Terraform"]);
        let gap = &analysis.true_gaps[0];
        assert!(!gap.is_required);
        assert!(gap.recommendation.starts_with("Consider learning Terraform"));
        assert_eq!(analysis.required_gap_count, 0);
    }

    #[test]
    fn test_required_gap_wording() {
        let analysis = run(&[], &["Terraform"], &[]);
        assert!(analysis.true_gaps[0]
            .recommendation
            .starts_with("Consider acquiring hands-on experience with Terraform"));
    }

    #[test]
    fn test_duplicate_jd_skill_classified_once_at_first_occurrence() {
        let analysis = run(&[], &["AWS", "Amazon Web Services"], &["aws"]);
        assert_eq!(analysis.true_gaps.len(), 1);
        assert_eq!(analysis.true_gaps[0].jd_requires, "AWS");
        assert!(analysis.true_gaps[0].is_required);
    }

    #[test]
    fn test_output_preserves_jd_order_required_first() {
        let analysis = run(&[], &["Rust", "Go"], &["Terraform", "Ansible"]);
        let order: Vec<&str> = analysis.true_gaps.iter().map(|g| g.jd_requires.as_str()).collect();
        assert_eq!(order, vec!["Rust", "Go", "Terraform", "Ansible"]);
    }

    #[test]
    fn test_majority_vote_picks_most_supported_category() {
        // Kafka is messaging + data processing. The resume has two data tools
        // and one messaging tool, so data processing wins.
        let analysis = run(&["RabbitMQ", "Spark", "Airflow"], &["Kafka"], &[]);
        let tool = &analysis.tool_gaps[0];
        assert_eq!(tool.category, "data processing");
        assert_eq!(tool.user_has, "Airflow");
    }

    #[test]
    fn test_equal_support_falls_back_to_canonical_id() {
        // One messaging and one data tool, each with support 1.
        let analysis = run(&["RabbitMQ", "Spark"], &["Kafka"], &[]);
        let tool = &analysis.tool_gaps[0];
        assert_eq!(tool.category, "messaging");
        assert_eq!(tool.user_has, "RabbitMQ");
    }

    #[test]
    fn test_classification_is_resume_order_independent() {
        let a = run(&["Vue", "Angular", "Python"], &["React", "Django"], &[]);
        let b = run(&["Python", "Angular", "Vue"], &["React", "Django"], &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_disjointness_and_coverage_across_mixed_inputs() {
        let required = ["Vue", "Python", "AWS", "Kafka", "Made Up Thing", "vue.js"];
        let preferred = ["Docker", "Kubernetes", "Figma", "Sketch"];
        let analysis = run(&["React", "Python", "Figma", "Docker", "Spark"], &required, &preferred);

        let tool: HashSet<&str> = analysis.tool_gaps.iter().map(|g| g.jd_wants.as_str()).collect();
        let truth: HashSet<&str> = analysis.true_gaps.iter().map(|g| g.jd_requires.as_str()).collect();
        assert!(tool.is_disjoint(&truth));

        // 9 distinct JD skills ("vue.js" duplicates "Vue").
        assert_eq!(
            analysis.covered_count + analysis.tool_gaps.len() + analysis.true_gaps.len(),
            9
        );
        for gap in &analysis.tool_gaps {
            assert_ne!(gap.user_has, gap.jd_wants);
        }
    }

    #[test]
    fn test_verify_rejects_double_classification() {
        let t = taxonomy();
        let set = normalize(&t, ["React"]);
        let bad = vec![
            Classification {
                jd_key: "vue".to_string(),
                outcome: Outcome::True(TrueGap {
                    jd_requires: "Vue".to_string(),
                    category: "frontend framework".to_string(),
                    is_required: true,
                    recommendation: String::new(),
                }),
            },
            Classification {
                jd_key: "vue".to_string(),
                outcome: Outcome::Tool {
                    resume_key: "react".to_string(),
                    gap: ToolGap {
                        user_has: "React".to_string(),
                        jd_wants: "Vue".to_string(),
                        category: "frontend framework".to_string(),
                        recommendation: String::new(),
                    },
                },
            },
        ];
        assert!(matches!(
            verify(&t, &set, &bad),
            Err(EngineError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_verify_rejects_true_gap_for_covered_skill() {
        let t = taxonomy();
        let set = normalize(&t, ["React"]);
        let bad = vec![Classification {
            jd_key: "react".to_string(),
            outcome: Outcome::True(TrueGap {
                jd_requires: "React".to_string(),
                category: "frontend framework".to_string(),
                is_required: true,
                recommendation: String::new(),
            }),
        }];
        assert!(verify(&t, &set, &bad).is_err());
    }

    #[test]
    fn test_verify_rejects_tool_gap_outside_category() {
        let t = taxonomy();
        let set = normalize(&t, ["Python"]);
        let bad = vec![Classification {
            jd_key: "vue".to_string(),
            outcome: Outcome::Tool {
                resume_key: "python".to_string(),
                gap: ToolGap {
                    user_has: "Python".to_string(),
                    jd_wants: "Vue".to_string(),
                    category: "frontend framework".to_string(),
                    recommendation: String::new(),
                },
            },
        }];
        assert!(verify(&t, &set, &bad).is_err());
    }
}
