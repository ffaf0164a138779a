//! Relevance Scorer: scores every bullet and skill against the JD.
//!
//! raw = 1.0·|required ∩ unit| + 0.6·|preferred ∩ unit| + 0.25·|responsibility keywords ∩ unit|
//!
//! Experience bullets are then multiplied by a recency factor, and the whole
//! resume is scaled so its best unit scores 1.0.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::job_description::ParsedJD;
use crate::models::resume::{Experience, ParsedResume};
use crate::skills::normalizer::{is_literal_key, skill_key, LITERAL_PREFIX};
use crate::skills::taxonomy::SkillTaxonomy;
use crate::skills::text::{keywords, normalize_key, tokenize};

const REQUIRED_WEIGHT: f64 = 1.0;
const PREFERRED_WEIGHT: f64 = 0.6;
const RESPONSIBILITY_WEIGHT: f64 = 0.25;

const RECENCY_HALF_LIFE_MONTHS: f64 = 24.0;
const RECENCY_FLOOR: f64 = 0.2;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Address of a scorable unit inside a `ParsedResume`. Indices are positions
/// in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UnitRef {
    ExperienceBullet { experience: usize, bullet: usize },
    ProjectBullet { project: usize, bullet: usize },
    Skill { index: usize },
}

impl UnitRef {
    /// JSON-path style address, e.g. `experience[0].bullets[2]`.
    pub fn path(&self) -> String {
        match self {
            UnitRef::ExperienceBullet { experience, bullet } => {
                format!("experience[{experience}].bullets[{bullet}]")
            }
            UnitRef::ProjectBullet { project, bullet } => format!("projects[{project}].bullets[{bullet}]"),
            UnitRef::Skill { index } => format!("skills[{index}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredUnit {
    pub unit: UnitRef,
    /// In `[0, 1]`; the best unit of the resume is 1.0 unless everything is 0.
    pub relevance_score: f64,
    /// JD skills and responsibility keywords found in the unit.
    pub matched_terms: Vec<String>,
}

/// The JD reduced to what scoring and wording need, built once per request.
#[derive(Debug, Clone, Default)]
pub struct JdProfile {
    /// Skill keys (canonical id or literal key) from `requiredSkills`.
    pub required: BTreeSet<String>,
    /// Keys from `preferredSkills` that are not also required.
    pub preferred: BTreeSet<String>,
    /// First spelling the JD used for each key.
    pub spellings: BTreeMap<String, String>,
    /// Primary and secondary categories of every resolved JD skill.
    pub categories: BTreeSet<String>,
    pub responsibility_keywords: BTreeSet<String>,
}

impl JdProfile {
    pub fn new(taxonomy: &SkillTaxonomy, jd: &ParsedJD) -> Self {
        let mut profile = JdProfile::default();

        for (raw, is_required) in jd.tagged_skills() {
            let Some(key) = skill_key(taxonomy, raw) else {
                continue;
            };
            if let Some(skill) = taxonomy.get(&key) {
                profile.categories.extend(skill.categories().map(str::to_string));
            }
            profile
                .spellings
                .entry(key.clone())
                .or_insert_with(|| raw.trim().to_string());
            if is_required {
                profile.required.insert(key);
            } else if !profile.required.contains(&key) {
                profile.preferred.insert(key);
            }
        }

        profile.responsibility_keywords = jd.responsibilities.iter().flat_map(|r| keywords(r)).collect();
        profile
    }

    pub fn wants(&self, key: &str) -> bool {
        self.required.contains(key) || self.preferred.contains(key)
    }

    pub fn wants_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring
// ────────────────────────────────────────────────────────────────────────────

/// Scores every unit in document order: experience bullets, project bullets, skills.
pub fn score(taxonomy: &SkillTaxonomy, resume: &ParsedResume, jd: &ParsedJD) -> Vec<ScoredUnit> {
    let profile = JdProfile::new(taxonomy, jd);
    let reference = recency_reference(&resume.experience);
    let mut units = Vec::new();

    for (e, exp) in resume.experience.iter().enumerate() {
        let recency = recency_factor(exp, reference);
        for (b, bullet) in exp.bullets.iter().enumerate() {
            let (raw, terms) = score_text(taxonomy, &profile, bullet);
            units.push(ScoredUnit {
                unit: UnitRef::ExperienceBullet { experience: e, bullet: b },
                relevance_score: raw * recency,
                matched_terms: terms,
            });
        }
    }

    for (p, project) in resume.projects.iter().enumerate() {
        for (b, bullet) in project.bullets.iter().enumerate() {
            let (raw, terms) = score_text(taxonomy, &profile, bullet);
            units.push(ScoredUnit {
                unit: UnitRef::ProjectBullet { project: p, bullet: b },
                relevance_score: raw,
                matched_terms: terms,
            });
        }
    }

    for (i, skill) in resume.skills.iter().enumerate() {
        let (raw, terms) = score_skill(taxonomy, &profile, skill);
        units.push(ScoredUnit {
            unit: UnitRef::Skill { index: i },
            relevance_score: raw,
            matched_terms: terms,
        });
    }

    let max = units.iter().map(|u| u.relevance_score).fold(0.0_f64, f64::max);
    if max > 0.0 {
        for unit in &mut units {
            unit.relevance_score = (unit.relevance_score / max).clamp(0.0, 1.0);
        }
    }

    debug!(units = units.len(), max_raw = max, "Relevance scoring complete");
    units
}

fn skill_weight(profile: &JdProfile, key: &str) -> f64 {
    if profile.required.contains(key) {
        REQUIRED_WEIGHT
    } else if profile.preferred.contains(key) {
        PREFERRED_WEIGHT
    } else {
        0.0
    }
}

/// Free text: taxonomy mentions plus literal JD skills appearing as a phrase.
fn score_text(taxonomy: &SkillTaxonomy, profile: &JdProfile, text: &str) -> (f64, Vec<String>) {
    let mut raw = 0.0;
    let mut terms = Vec::new();
    let mut counted = BTreeSet::new();

    for mention in taxonomy.find_mentions(text) {
        let key = mention.skill.id.as_str();
        if profile.wants(key) && counted.insert(key.to_string()) {
            raw += skill_weight(profile, key);
            terms.push(mention.skill.display_name.clone());
        }
    }

    let phrase = format!(
        " {} ",
        tokenize(text).into_iter().map(|t| t.text).collect::<Vec<_>>().join(" ")
    );
    for key in profile.required.iter().chain(profile.preferred.iter()) {
        if !is_literal_key(key) || counted.contains(key) {
            continue;
        }
        let literal = &key[LITERAL_PREFIX.len()..];
        if phrase.contains(&format!(" {literal} ")) {
            counted.insert(key.clone());
            raw += skill_weight(profile, key);
            terms.push(literal.to_string());
        }
    }

    let (kw_score, kw_terms) = keyword_overlap(profile, text);
    terms.extend(kw_terms);
    (raw + kw_score, terms)
}

fn score_skill(taxonomy: &SkillTaxonomy, profile: &JdProfile, skill: &str) -> (f64, Vec<String>) {
    let mut raw = 0.0;
    let mut terms = Vec::new();

    if let Some(key) = skill_key(taxonomy, skill) {
        let weight = skill_weight(profile, &key);
        if weight > 0.0 {
            raw += weight;
            terms.push(
                taxonomy
                    .get(&key)
                    .map(|s| s.display_name.clone())
                    .unwrap_or_else(|| normalize_key(skill)),
            );
        }
    }

    let (kw_score, kw_terms) = keyword_overlap(profile, skill);
    terms.extend(kw_terms);
    (raw + kw_score, terms)
}

fn keyword_overlap(profile: &JdProfile, text: &str) -> (f64, Vec<String>) {
    let shared: Vec<String> = keywords(text)
        .intersection(&profile.responsibility_keywords)
        .cloned()
        .collect();
    (RESPONSIBILITY_WEIGHT * shared.len() as f64, shared)
}

// ────────────────────────────────────────────────────────────────────────────
// Recency
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndDate {
    Ongoing,
    On(NaiveDate),
    Unknown,
}

pub fn parse_end_date(end: Option<&str>) -> EndDate {
    let Some(raw) = end.map(str::trim).filter(|s| !s.is_empty()) else {
        return EndDate::Ongoing;
    };
    if ["present", "current", "now"].contains(&raw.to_lowercase().as_str()) {
        return EndDate::Ongoing;
    }
    parse_resume_date(raw, 12).map_or(EndDate::Unknown, EndDate::On)
}

/// Parses `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `MM/YYYY`, `Mon YYYY` and
/// `Month YYYY`. A bare year resolves to `year_only_month`.
pub fn parse_resume_date(raw: &str, year_only_month: u32) -> Option<NaiveDate> {
    let s = raw.trim();

    if s.len() == 4 && s.chars().all(|c| c.is_ascii_digit()) {
        let year = s.parse::<i32>().ok()?;
        return NaiveDate::from_ymd_opt(year, year_only_month, 1);
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y"))
        .ok()
}

/// Latest point the resume itself vouches for: the latest parsed end date,
/// or the latest start date of an ongoing role, whichever is later.
fn recency_reference(experience: &[Experience]) -> Option<NaiveDate> {
    experience
        .iter()
        .filter_map(|exp| match parse_end_date(exp.end_date.as_deref()) {
            EndDate::On(date) => Some(date),
            EndDate::Ongoing => parse_resume_date(&exp.start_date, 1),
            EndDate::Unknown => None,
        })
        .max()
}

/// `max(0.5^(months / 24), 0.2)` where `months` is how far this role ended
/// before the reference. Ongoing roles and unparseable dates get 1.0.
pub fn recency_factor(exp: &Experience, reference: Option<NaiveDate>) -> f64 {
    let (EndDate::On(end), Some(reference)) = (parse_end_date(exp.end_date.as_deref()), reference) else {
        return 1.0;
    };
    let months = months_between(end, reference);
    if months <= 0.0 {
        return 1.0;
    }
    0.5_f64.powf(months / RECENCY_HALF_LIFE_MONTHS).max(RECENCY_FLOOR)
}

fn months_between(start: NaiveDate, end: NaiveDate) -> f64 {
    let years = end.year() - start.year();
    let months = end.month() as i32 - start.month() as i32;
    let total = years * 12 + months;
    let day_frac = (end.day() as f64 - start.day() as f64) / 30.0;
    (total as f64 + day_frac).max(0.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
