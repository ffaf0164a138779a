//! Wording substitution: the allow-list of swaps a bullet may receive.
//!
//! Every candidate is derived from the taxonomy and keeps the tool it names:
//! - `JdSpelling`: the mention is re-spelled the way the JD spelled the same
//!   skill (`Postgres` → `PostgreSQL`), only if that spelling is a declared form
//! - `CategoryQualifier`: a tool the JD does not ask for, in a category the JD
//!   does ask for, gains the category phrase (`React` → `React (frontend framework)`)
//!
//! A bullet receives at most one swap. The deterministic choice is the first
//! candidate in text order; a `WordingAdvisor` may pick a different candidate
//! from the same list, or none, but can never introduce its own text.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LlmError;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::tailoring::fitting_level::FittingLevel;
use crate::tailoring::relevance::{JdProfile, UnitRef};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwapKind {
    JdSpelling,
    CategoryQualifier,
}

/// A swap that can be applied to one bullet. `start..end` is the byte span of
/// `from` in the original bullet text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapCandidate {
    pub from: String,
    pub to: String,
    pub kind: SwapKind,
    pub start: usize,
    pub end: usize,
}

impl SwapCandidate {
    pub fn apply(&self, text: &str) -> String {
        format!("{}{}{}", &text[..self.start], self.to, &text[self.end..])
    }
}

/// Audit record attached to a tailored bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Substitution {
    pub from: String,
    pub to: String,
    pub kind: SwapKind,
    pub original_text: String,
}

impl Substitution {
    pub fn record(candidate: &SwapCandidate, original_text: &str) -> Self {
        Self {
            from: candidate.from.clone(),
            to: candidate.to.clone(),
            kind: candidate.kind,
            original_text: original_text.to_string(),
        }
    }
}

/// A bullet with at least one swap candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletCandidates {
    #[serde(skip)]
    pub unit: UnitRef,
    pub bullet_key: String,
    pub text: String,
    pub candidates: Vec<SwapCandidate>,
}

/// Which candidate to apply per bullet. `None` means leave the bullet as written.
/// Bullets absent from the map take the first candidate.
pub type WordingChoices = BTreeMap<UnitRef, Option<usize>>;

/// An advisor's pick for one bullet, as returned over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordingChoice {
    pub bullet_key: String,
    pub candidate: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate generation
// ────────────────────────────────────────────────────────────────────────────

/// All swaps allowed for `text` at `level`, in text order.
pub fn swap_candidates(
    taxonomy: &SkillTaxonomy,
    profile: &JdProfile,
    text: &str,
    level: FittingLevel,
) -> Vec<SwapCandidate> {
    if !level.allows_jd_spelling() {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    for mention in taxonomy.find_mentions(text) {
        let skill = mention.skill;
        let surface = &text[mention.start..mention.end];

        if let Some(spelling) = profile.spellings.get(&skill.id) {
            if spelling != surface && skill.declares_form(spelling) {
                candidates.push(SwapCandidate {
                    from: surface.to_string(),
                    to: spelling.clone(),
                    kind: SwapKind::JdSpelling,
                    start: mention.start,
                    end: mention.end,
                });
            }
            continue;
        }

        if !level.allows_category_qualifier() || profile.wants(&skill.id) {
            continue;
        }
        if text[mention.end..].trim_start().starts_with('(') {
            continue;
        }
        if let Some(category) = skill.categories().find(|c| profile.wants_category(c)) {
            candidates.push(SwapCandidate {
                from: surface.to_string(),
                to: format!("{surface} ({category})"),
                kind: SwapKind::CategoryQualifier,
                start: mention.start,
                end: mention.end,
            });
        }
    }

    candidates
}

/// Picks the candidate for one bullet under `choices`.
pub fn chosen<'c>(
    unit: UnitRef,
    candidates: &'c [SwapCandidate],
    choices: &WordingChoices,
) -> Option<&'c SwapCandidate> {
    match choices.get(&unit) {
        Some(None) => None,
        Some(Some(idx)) => candidates.get(*idx).or_else(|| candidates.first()),
        None => candidates.first(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Advisor
// ────────────────────────────────────────────────────────────────────────────

/// External collaborator that may prefer a different allow-listed swap.
#[async_trait]
pub trait WordingAdvisor: Send + Sync {
    async fn choose(
        &self,
        jd_title: &str,
        bullets: &[BulletCandidates],
    ) -> Result<Vec<WordingChoice>, LlmError>;
}

/// Maps advisor output back onto bullets. Unknown bullets, repeated bullets
/// and out-of-range indices are discarded with a warning each.
pub fn resolve_choices(
    bullets: &[BulletCandidates],
    advice: Vec<WordingChoice>,
) -> (WordingChoices, Vec<String>) {
    let by_key: BTreeMap<&str, &BulletCandidates> =
        bullets.iter().map(|b| (b.bullet_key.as_str(), b)).collect();
    let mut choices = WordingChoices::new();
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for choice in advice {
        let Some(bullet) = by_key.get(choice.bullet_key.as_str()) else {
            warnings.push(format!(
                "Wording advice for unknown bullet '{}' ignored",
                choice.bullet_key
            ));
            continue;
        };
        if !seen.insert(choice.bullet_key.clone()) {
            warnings.push(format!(
                "Repeated wording advice for '{}' ignored",
                choice.bullet_key
            ));
            continue;
        }
        if let Some(idx) = choice.candidate {
            if idx >= bullet.candidates.len() {
                warnings.push(format!(
                    "Wording advice for '{}' chose candidate {idx} of {}; using default",
                    choice.bullet_key,
                    bullet.candidates.len()
                ));
                continue;
            }
        }
        choices.insert(bullet.unit, choice.candidate);
    }

    for w in &warnings {
        warn!("{w}");
    }
    (choices, warnings)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_description::ParsedJD;

    fn taxonomy() -> SkillTaxonomy {
        SkillTaxonomy::builtin().unwrap()
    }

    fn profile(t: &SkillTaxonomy, required: &[&str]) -> JdProfile {
        let jd = ParsedJD {
            title: "Engineer".to_string(),
            company: None,
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            preferred_skills: vec![],
            responsibilities: vec![],
            raw_requirements: vec![],
        };
        JdProfile::new(t, &jd)
    }

    fn level(n: u8) -> FittingLevel {
        FittingLevel::new(n).unwrap()
    }

    #[test]
    fn test_no_candidates_at_level_one() {
        let t = taxonomy();
        let p = profile(&t, &["PostgreSQL"]);
        assert!(swap_candidates(&t, &p, "Tuned Postgres queries", level(1)).is_empty());
    }

    #[test]
    fn test_jd_spelling_uses_declared_form() {
        let t = taxonomy();
        let p = profile(&t, &["PostgreSQL"]);
        let text = "Tuned Postgres queries";
        let candidates = swap_candidates(&t, &p, text, level(2));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, SwapKind::JdSpelling);
        assert_eq!(candidates[0].apply(text), "Tuned PostgreSQL queries");
    }

    #[test]
    fn test_jd_spelling_skips_undeclared_form() {
        // "postgres sql" fuzzy-resolves to PostgreSQL but is not a declared spelling.
        let t = taxonomy();
        assert_eq!(t.resolve("postgres sql").unwrap().id, "postgresql");
        let p = profile(&t, &["postgres sql"]);
        assert!(swap_candidates(&t, &p, "Tuned Postgres queries", level(5)).is_empty());
    }

    #[test]
    fn test_same_spelling_is_not_a_candidate() {
        let t = taxonomy();
        let p = profile(&t, &["React"]);
        assert!(swap_candidates(&t, &p, "Built React dashboards", level(5)).is_empty());
    }

    #[test]
    fn test_category_qualifier_only_from_level_four() {
        let t = taxonomy();
        let p = profile(&t, &["Vue"]);
        let text = "Built React dashboards";
        assert!(swap_candidates(&t, &p, text, level(3)).is_empty());

        let candidates = swap_candidates(&t, &p, text, level(4));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, SwapKind::CategoryQualifier);
        assert_eq!(candidates[0].apply(text), "Built React (frontend framework) dashboards");
    }

    #[test]
    fn test_category_qualifier_not_repeated() {
        let t = taxonomy();
        let p = profile(&t, &["Vue"]);
        let text = "Built React (frontend framework) dashboards";
        assert!(swap_candidates(&t, &p, text, level(5)).is_empty());
    }

    #[test]
    fn test_unrelated_category_gets_no_qualifier() {
        let t = taxonomy();
        let p = profile(&t, &["Vue"]);
        assert!(swap_candidates(&t, &p, "Wrote Terraform modules", level(5)).is_empty());
    }

    #[test]
    fn test_chosen_defaults_to_first_and_honours_none() {
        let unit = UnitRef::ExperienceBullet { experience: 0, bullet: 0 };
        let candidates = vec![
            SwapCandidate {
                from: "a".to_string(),
                to: "b".to_string(),
                kind: SwapKind::JdSpelling,
                start: 0,
                end: 1,
            },
            SwapCandidate {
                from: "c".to_string(),
                to: "d".to_string(),
                kind: SwapKind::JdSpelling,
                start: 2,
                end: 3,
            },
        ];
        let mut choices = WordingChoices::new();
        assert_eq!(chosen(unit, &candidates, &choices).unwrap().to, "b");
        choices.insert(unit, Some(1));
        assert_eq!(chosen(unit, &candidates, &choices).unwrap().to, "d");
        choices.insert(unit, None);
        assert!(chosen(unit, &candidates, &choices).is_none());
    }

    #[test]
    fn test_resolve_choices_discards_invalid_advice() {
        let unit = UnitRef::ProjectBullet { project: 0, bullet: 1 };
        let bullets = vec![BulletCandidates {
            unit,
            bullet_key: unit.path(),
            text: "Used Postgres".to_string(),
            candidates: vec![SwapCandidate {
                from: "Postgres".to_string(),
                to: "PostgreSQL".to_string(),
                kind: SwapKind::JdSpelling,
                start: 5,
                end: 13,
            }],
        }];
        let advice = vec![
            WordingChoice {
                bullet_key: "projects[9].bullets[9]".to_string(),
                candidate: Some(0),
            },
            WordingChoice {
                bullet_key: unit.path(),
                candidate: Some(3),
            },
        ];
        let (choices, warnings) = resolve_choices(&bullets, advice);
        assert!(choices.is_empty());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_resolve_choices_accepts_decline() {
        let unit = UnitRef::ExperienceBullet { experience: 1, bullet: 0 };
        let bullets = vec![BulletCandidates {
            unit,
            bullet_key: unit.path(),
            text: "x".to_string(),
            candidates: vec![],
        }];
        let advice = vec![WordingChoice {
            bullet_key: unit.path(),
            candidate: None,
        }];
        let (choices, warnings) = resolve_choices(&bullets, advice);
        assert_eq!(choices.get(&unit), Some(&None));
        assert!(warnings.is_empty());
    }
}
