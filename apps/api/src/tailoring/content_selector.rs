//! Content Selector: turns scored units into a `TailoredResume`.
//!
//! The fitting level drives three knobs, each monotone in the level:
//! 1. Reorder strength: how many positive-score bullets are promoted ahead
//!    of author order, how skills are ordered, whether whole entries move
//! 2. Deprioritization: bullets under the level's threshold are flagged, never removed
//! 3. Wording: allow-listed swaps from `wording`, at most one per bullet
//!
//! Nothing here invents text. Employers, titles and dates are copied through
//! untouched, and bullet text only changes by an allow-listed swap.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::job_description::ParsedJD;
use crate::models::resume::{ContactInfo, Education, Experience, ParsedResume};
use crate::skills::normalizer::skill_key;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::tailoring::fitting_level::{FittingLevel, Promotion};
use crate::tailoring::relevance::{parse_end_date, parse_resume_date, EndDate, JdProfile, ScoredUnit, UnitRef};
use crate::tailoring::wording::{chosen, swap_candidates, BulletCandidates, Substitution, WordingChoices};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredBullet {
    pub text: String,
    /// Position in the input entry.
    pub original_index: usize,
    pub relevance_score: f64,
    pub deprioritized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substitution: Option<Substitution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredExperience {
    pub company: String,
    pub title: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub bullets: Vec<TailoredBullet>,
    pub tech_stack: Vec<String>,
    pub original_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredProject {
    pub name: String,
    pub description: String,
    pub bullets: Vec<TailoredBullet>,
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub original_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailoredResume {
    pub contact_info: ContactInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub experience: Vec<TailoredExperience>,
    pub projects: Vec<TailoredProject>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub fitting_level: FittingLevel,
    /// Non-fatal notes, e.g. wording advice that fell back to the default.
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Selection
// ────────────────────────────────────────────────────────────────────────────

/// Bullets that have at least one allowed swap at `level`, in document order.
pub fn plan_wording(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
    level: FittingLevel,
) -> Vec<BulletCandidates> {
    let profile = JdProfile::new(taxonomy, jd);
    bullet_texts(resume)
        .filter_map(|(unit, text)| {
            let candidates = swap_candidates(taxonomy, &profile, text, level);
            (!candidates.is_empty()).then(|| BulletCandidates {
                unit,
                bullet_key: unit.path(),
                text: text.to_string(),
                candidates,
            })
        })
        .collect()
}

fn bullet_texts(resume: &ParsedResume) -> impl Iterator<Item = (UnitRef, &str)> {
    let experience = resume.experience.iter().enumerate().flat_map(|(e, exp)| {
        exp.bullets
            .iter()
            .enumerate()
            .map(move |(b, text)| (UnitRef::ExperienceBullet { experience: e, bullet: b }, text.as_str()))
    });
    let projects = resume.projects.iter().enumerate().flat_map(|(p, project)| {
        project
            .bullets
            .iter()
            .enumerate()
            .map(move |(b, text)| (UnitRef::ProjectBullet { project: p, bullet: b }, text.as_str()))
    });
    experience.chain(projects)
}

/// Tailors with the deterministic wording choice for every bullet.
pub fn tailor(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
    scored: &[ScoredUnit],
    level: FittingLevel,
) -> TailoredResume {
    tailor_with_choices(taxonomy, resume, jd, scored, level, &WordingChoices::new())
}

/// Bullets absent from `choices` take their first swap candidate.
pub fn tailor_with_choices(
    taxonomy: &SkillTaxonomy,
    resume: &ParsedResume,
    jd: &ParsedJD,
    scored: &[ScoredUnit],
    level: FittingLevel,
    choices: &WordingChoices,
) -> TailoredResume {
    let profile = JdProfile::new(taxonomy, jd);
    let scores: HashMap<UnitRef, f64> = scored.iter().map(|s| (s.unit, s.relevance_score)).collect();
    let score_of = |unit: UnitRef| scores.get(&unit).copied().unwrap_or(0.0);

    let ctx = BulletContext {
        taxonomy,
        profile: &profile,
        level,
        choices,
    };

    let mut experience: Vec<TailoredExperience> = resume
        .experience
        .iter()
        .enumerate()
        .map(|(e, exp)| TailoredExperience {
            company: exp.company.clone(),
            title: exp.title.clone(),
            start_date: exp.start_date.clone(),
            end_date: exp.end_date.clone(),
            bullets: ctx.tailor_bullets(&exp.bullets, |b| {
                let unit = UnitRef::ExperienceBullet { experience: e, bullet: b };
                (unit, score_of(unit))
            }),
            tech_stack: exp.tech_stack.clone(),
            original_index: e,
        })
        .collect();

    let mut projects: Vec<TailoredProject> = resume
        .projects
        .iter()
        .enumerate()
        .map(|(p, project)| TailoredProject {
            name: project.name.clone(),
            description: project.description.clone(),
            bullets: ctx.tailor_bullets(&project.bullets, |b| {
                let unit = UnitRef::ProjectBullet { project: p, bullet: b };
                (unit, score_of(unit))
            }),
            tech_stack: project.tech_stack.clone(),
            url: project.url.clone(),
            original_index: p,
        })
        .collect();

    if level.reorders_entries() {
        let pinned = most_recent_role(&resume.experience);
        reorder_experience(&mut experience, pinned);
        projects.sort_by(|a, b| desc(top_score(&a.bullets), top_score(&b.bullets)));
    }

    let skills = order_skills(taxonomy, &profile, &resume.skills, level, |i| {
        score_of(UnitRef::Skill { index: i })
    });

    let tailored = TailoredResume {
        contact_info: resume.contact_info.clone(),
        summary: resume.summary.clone(),
        experience,
        projects,
        education: resume.education.clone(),
        skills,
        fitting_level: level,
        warnings: Vec::new(),
    };

    debug!(
        level = %level,
        deprioritized = count_deprioritized(&tailored),
        substitutions = count_substitutions(&tailored),
        "Content selection complete"
    );

    tailored
}

struct BulletContext<'a> {
    taxonomy: &'a SkillTaxonomy,
    profile: &'a JdProfile,
    level: FittingLevel,
    choices: &'a WordingChoices,
}

impl BulletContext<'_> {
    fn tailor_bullets<F>(&self, bullets: &[String], unit_of: F) -> Vec<TailoredBullet>
    where
        F: Fn(usize) -> (UnitRef, f64),
    {
        let units: Vec<(UnitRef, f64)> = (0..bullets.len()).map(unit_of).collect();
        let scores: Vec<f64> = units.iter().map(|(_, s)| *s).collect();
        let threshold = self.level.deprioritize_threshold();

        bullet_order(&scores, self.level.bullet_promotion())
            .into_iter()
            .map(|i| {
                let (unit, score) = units[i];
                let original = &bullets[i];
                let candidates = swap_candidates(self.taxonomy, self.profile, original, self.level);
                let swap = chosen(unit, &candidates, self.choices);
                TailoredBullet {
                    text: swap.map_or_else(|| original.clone(), |c| c.apply(original)),
                    original_index: i,
                    relevance_score: score,
                    deprioritized: score < threshold,
                    substitution: swap.map(|c| Substitution::record(c, original)),
                }
            })
            .collect()
    }
}

/// Descending by score; equal scores keep their relative order under a stable sort.
fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Promotes the top-`m` positive-score bullets (highest first) and leaves the
/// rest in author order. Growing `m` only adds inversions, so Kendall-tau
/// distance to author order never shrinks as the level rises.
pub fn bullet_order(scores: &[f64], promotion: Promotion) -> Vec<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] > 0.0).collect();
    ranked.sort_by(|&a, &b| desc(scores[a], scores[b]));

    let m = match promotion {
        Promotion::None => 0,
        Promotion::Top(k) => k.min(ranked.len()),
        Promotion::All => ranked.len(),
    };
    ranked.truncate(m);

    let mut order = ranked.clone();
    order.extend((0..scores.len()).filter(|i| !ranked.contains(i)));
    order
}

fn top_score(bullets: &[TailoredBullet]) -> f64 {
    bullets.iter().map(|b| b.relevance_score).fold(0.0, f64::max)
}

/// Index of the role that reverse-chronological convention puts first: the
/// latest ongoing role by start date, else the latest end date, else the first.
fn most_recent_role(experience: &[Experience]) -> Option<usize> {
    let rank = |exp: &Experience| match parse_end_date(exp.end_date.as_deref()) {
        EndDate::Ongoing => (2, parse_resume_date(&exp.start_date, 1)),
        EndDate::On(date) => (1, Some(date)),
        EndDate::Unknown => (0, None),
    };
    experience
        .iter()
        .enumerate()
        // Reverse so max_by_key keeps the earliest index on ties.
        .rev()
        .max_by_key(|&(_, exp)| rank(exp))
        .map(|(i, _)| i)
}

fn reorder_experience(experience: &mut Vec<TailoredExperience>, pinned: Option<usize>) {
    let pinned_entry = pinned
        .and_then(|p| experience.iter().position(|e| e.original_index == p))
        .map(|pos| experience.remove(pos));
    experience.sort_by(|a, b| desc(top_score(&a.bullets), top_score(&b.bullets)));
    if let Some(entry) = pinned_entry {
        experience.insert(0, entry);
    }
}

fn order_skills<F>(
    taxonomy: &SkillTaxonomy,
    profile: &JdProfile,
    skills: &[String],
    level: FittingLevel,
    score_of: F,
) -> Vec<String>
where
    F: Fn(usize) -> f64,
{
    let mut order: Vec<usize> = (0..skills.len()).collect();
    if level.sorts_skills_by_score() {
        order.sort_by(|&a, &b| desc(score_of(a), score_of(b)));
    } else {
        let matched = |i: usize| {
            skill_key(taxonomy, &skills[i]).is_some_and(|key| profile.wants(&key))
        };
        // false < true, so reverse to put matched skills first; sort is stable.
        order.sort_by_key(|&i| std::cmp::Reverse(matched(i)));
    }
    order.into_iter().map(|i| skills[i].clone()).collect()
}

pub fn count_deprioritized(tailored: &TailoredResume) -> usize {
    all_bullets(tailored).filter(|b| b.deprioritized).count()
}

pub fn count_substitutions(tailored: &TailoredResume) -> usize {
    all_bullets(tailored).filter(|b| b.substitution.is_some()).count()
}

fn all_bullets(tailored: &TailoredResume) -> impl Iterator<Item = &TailoredBullet> {
    tailored
        .experience
        .iter()
        .flat_map(|e| e.bullets.iter())
        .chain(tailored.projects.iter().flat_map(|p| p.bullets.iter()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
