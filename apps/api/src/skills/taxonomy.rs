//! Skill Taxonomy: canonical skill identities, synonyms and category groupings.
//!
//! A `SkillTaxonomy` is an immutable, versioned value. It is built once at
//! startup (built-in table or JSON file) and shared read-only as
//! `Arc<SkillTaxonomy>`; nothing mutates it per request, so concurrent reads
//! need no synchronization.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::skills::builtin::{builtin_skills, BUILTIN_VERSION};
use crate::skills::text::{compact_key, normalize_key, similarity, tokenize, Token, FUZZY_THRESHOLD};

/// Longest phrase (in tokens) considered when scanning free text for mentions.
const MAX_MENTION_TOKENS: usize = 4;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalSkill {
    pub id: String,
    pub display_name: String,
    /// Primary category.
    pub category: String,
    /// Extra categories for entries that legitimately belong to more than one.
    #[serde(default)]
    pub secondary_categories: Vec<String>,
    #[serde(default)]
    pub synonyms: BTreeSet<String>,
}

impl CanonicalSkill {
    /// Primary category first, then secondary categories in declared order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.category.as_str())
            .chain(self.secondary_categories.iter().map(String::as_str))
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories().any(|c| c == category)
    }

    /// Display name followed by every declared synonym.
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.display_name.as_str()).chain(self.synonyms.iter().map(String::as_str))
    }

    /// True if `form` is this skill's display name or one of its declared synonyms
    /// (case-sensitive: this is the substitution allow-list).
    pub fn declares_form(&self, form: &str) -> bool {
        self.surface_forms().any(|f| f == form)
    }
}

/// On-disk taxonomy format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    pub version: String,
    pub skills: Vec<CanonicalSkill>,
}

/// An exact taxonomy mention found inside free text.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention<'a> {
    pub skill: &'a CanonicalSkill,
    /// Byte span of the mention in the scanned text.
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid taxonomy JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate skill id '{0}'")]
    DuplicateId(String),

    #[error("skill '{id}' has an empty {field}")]
    EmptyField { id: String, field: &'static str },

    #[error("taxonomy version must not be empty")]
    EmptyVersion,
}

// ────────────────────────────────────────────────────────────────────────────
// Taxonomy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SkillTaxonomy {
    version: String,
    skills: Vec<CanonicalSkill>,
    by_id: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
    by_compact: HashMap<String, usize>,
}

impl SkillTaxonomy {
    /// Builds and indexes a taxonomy. Surface forms claimed by more than one
    /// skill resolve to the first-declared skill.
    pub fn new(version: impl Into<String>, skills: Vec<CanonicalSkill>) -> Result<Self, TaxonomyError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(TaxonomyError::EmptyVersion);
        }

        let mut by_id: HashMap<String, usize> = HashMap::with_capacity(skills.len());
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut by_compact: HashMap<String, usize> = HashMap::new();

        for (idx, skill) in skills.iter().enumerate() {
            if skill.id.trim().is_empty() {
                return Err(TaxonomyError::EmptyField {
                    id: skill.display_name.clone(),
                    field: "id",
                });
            }
            if skill.display_name.trim().is_empty() {
                return Err(TaxonomyError::EmptyField {
                    id: skill.id.clone(),
                    field: "displayName",
                });
            }
            if skill.category.trim().is_empty() {
                return Err(TaxonomyError::EmptyField {
                    id: skill.id.clone(),
                    field: "category",
                });
            }
            if by_id.insert(skill.id.clone(), idx).is_some() {
                return Err(TaxonomyError::DuplicateId(skill.id.clone()));
            }

            for form in skill.surface_forms() {
                let key = normalize_key(form);
                if let Some(&owner) = by_key.get(&key) {
                    if owner != idx {
                        debug!(form, owner = %skills[owner].id, skipped = %skill.id, "Synonym already claimed");
                    }
                } else {
                    by_key.insert(key, idx);
                }
                let compact = compact_key(form);
                if !compact.is_empty() {
                    by_compact.entry(compact).or_insert(idx);
                }
            }
        }

        Ok(Self {
            version,
            skills,
            by_id,
            by_key,
            by_compact,
        })
    }

    /// The built-in taxonomy shipped with the service.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::new(BUILTIN_VERSION, builtin_skills())
    }

    pub fn from_json_str(json: &str) -> Result<Self, TaxonomyError> {
        let doc: TaxonomyDocument = serde_json::from_str(json)?;
        Self::new(doc.version, doc.skills)
    }

    pub fn from_file(path: &Path) -> Result<Self, TaxonomyError> {
        let json = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Every category used by any skill, sorted.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.skills.iter().flat_map(|s| s.categories()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalSkill> {
        self.by_id.get(id).map(|&idx| &self.skills[idx])
    }

    /// Exact lookup: normalized form first, then the compact alphanumeric form.
    pub fn resolve_exact(&self, text: &str) -> Option<&CanonicalSkill> {
        let key = normalize_key(text);
        if key.is_empty() {
            return None;
        }
        self.by_key
            .get(&key)
            .or_else(|| self.by_compact.get(&compact_key(text)))
            .map(|&idx| &self.skills[idx])
    }

    /// Exact lookup, then fuzzy fallback at `FUZZY_THRESHOLD`. Best similarity
    /// wins; ties go to the earliest-declared skill.
    pub fn resolve(&self, text: &str) -> Option<&CanonicalSkill> {
        if let Some(skill) = self.resolve_exact(text) {
            return Some(skill);
        }
        if text.trim().is_empty() {
            return None;
        }

        let mut best: Option<(f64, usize)> = None;
        for (idx, skill) in self.skills.iter().enumerate() {
            let score = skill
                .surface_forms()
                .map(|form| similarity(text, form))
                .fold(0.0_f64, f64::max);
            if score >= FUZZY_THRESHOLD && best.map_or(true, |(b, _)| score > b) {
                best = Some((score, idx));
            }
        }

        best.map(|(score, idx)| {
            let skill = &self.skills[idx];
            debug!(input = text, resolved = %skill.id, score, "Fuzzy skill match");
            skill
        })
    }

    pub fn same_category(&self, a: &CanonicalSkill, b: &CanonicalSkill) -> bool {
        a.categories().any(|c| b.in_category(c))
    }

    /// Categories both skills belong to, in `a`'s declared order.
    pub fn shared_categories<'a>(&self, a: &'a CanonicalSkill, b: &CanonicalSkill) -> Vec<&'a str> {
        a.categories().filter(|c| b.in_category(c)).collect()
    }

    /// Scans free text for exact taxonomy mentions, longest phrase first,
    /// non-overlapping, in text order. Fuzzy matching is never used here.
    pub fn find_mentions<'a>(&'a self, text: &str) -> Vec<Mention<'a>> {
        let tokens = tokenize(text);
        let mut mentions = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let longest = MAX_MENTION_TOKENS.min(tokens.len() - i);
            let found = (1..=longest).rev().find_map(|n| {
                let start = tokens[i].start;
                let end = tokens[i + n - 1].end;
                let slice = &text[start..end];
                self.resolve_exact(slice)
                    .filter(|skill| accepts_mention(skill, slice))
                    .map(|skill| (n, Mention { skill, start, end }))
            });

            match found {
                Some((n, mention)) => {
                    mentions.push(mention);
                    i += n;
                }
                None => {
                    self.slash_part_mentions(text, &tokens[i], &mut mentions);
                    i += 1;
                }
            }
        }

        mentions
    }

    /// `React/TypeScript` is one token; when it does not resolve as a whole,
    /// each `/`-separated part is tried on its own.
    fn slash_part_mentions<'a>(
        &'a self,
        text: &str,
        token: &Token,
        mentions: &mut Vec<Mention<'a>>,
    ) {
        let slice = &text[token.start..token.end];
        if !slice.contains('/') {
            return;
        }
        let mut offset = token.start;
        for part in slice.split('/') {
            let start = offset;
            let end = start + part.len();
            offset = end + 1;
            if part.is_empty() {
                continue;
            }
            if let Some(skill) = self
                .resolve_exact(part)
                .filter(|skill| accepts_mention(skill, part))
            {
                mentions.push(Mention { skill, start, end });
            }
        }
    }
}

/// Short forms (`Go`, `R`) and all-caps acronyms (`REST`, `AWS`) are ordinary
/// words in lowercase, so they only count as mentions when the case matches.
fn accepts_mention(skill: &CanonicalSkill, slice: &str) -> bool {
    let key = normalize_key(slice);
    let compact = compact_key(slice);
    skill
        .surface_forms()
        .filter(|form| normalize_key(form) == key || compact_key(form) == compact)
        .any(|form| !is_strict_form(form) || form == slice)
}

fn is_strict_form(form: &str) -> bool {
    let short = compact_key(form).chars().count() <= 2;
    let letters: Vec<char> = form.chars().filter(|c| c.is_alphabetic()).collect();
    let acronym = !letters.is_empty() && letters.iter().all(|c| c.is_uppercase());
    short || acronym
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
