//! Skill Normalizer: maps free-text skill strings onto taxonomy entries.
//!
//! Output is a `BTreeMap`, so the same multiset of input strings always yields
//! the same set regardless of input order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::resume::ParsedResume;
use crate::skills::taxonomy::SkillTaxonomy;
use crate::skills::text::normalize_key;

pub const LITERAL_PREFIX: &str = "literal:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSkill {
    /// `false` for strings the taxonomy could not resolve.
    pub matched: bool,
    /// Canonical display name, or the first-seen raw string for literals.
    pub display_name: String,
    pub categories: Vec<String>,
    pub source_strings: BTreeSet<String>,
}

pub type NormalizedSkillSet = BTreeMap<String, NormalizedSkill>;

/// Key for a single skill string: the canonical id when it resolves,
/// `literal:<normalized text>` otherwise. `None` for blank input.
pub fn skill_key(taxonomy: &SkillTaxonomy, raw: &str) -> Option<String> {
    let normalized = normalize_key(raw);
    if normalized.is_empty() {
        return None;
    }
    Some(match taxonomy.resolve(raw) {
        Some(skill) => skill.id.clone(),
        None => format!("{LITERAL_PREFIX}{normalized}"),
    })
}

pub fn is_literal_key(key: &str) -> bool {
    key.starts_with(LITERAL_PREFIX)
}

pub fn normalize<'a, I>(taxonomy: &SkillTaxonomy, skills: I) -> NormalizedSkillSet
where
    I: IntoIterator<Item = &'a str>,
{
    let mut set = NormalizedSkillSet::new();

    for raw in skills {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        match taxonomy.resolve(trimmed) {
            Some(skill) => {
                set.entry(skill.id.clone())
                    .or_insert_with(|| NormalizedSkill {
                        matched: true,
                        display_name: skill.display_name.clone(),
                        categories: skill.categories().map(str::to_string).collect(),
                        source_strings: BTreeSet::new(),
                    })
                    .source_strings
                    .insert(trimmed.to_string());
            }
            None => {
                let entry = set
                    .entry(format!("{LITERAL_PREFIX}{}", normalize_key(trimmed)))
                    .or_insert_with(|| NormalizedSkill {
                        matched: false,
                        display_name: trimmed.to_string(),
                        categories: Vec::new(),
                        source_strings: BTreeSet::new(),
                    });
                entry.source_strings.insert(trimmed.to_string());
                // Literal display names must not depend on which spelling came first.
                if let Some(first) = entry.source_strings.iter().next() {
                    entry.display_name = first.clone();
                }
            }
        }
    }

    set
}

/// Normalizes every skill the resume declares: the flat list plus every
/// experience and project tech stack.
pub fn normalize_resume(taxonomy: &SkillTaxonomy, resume: &ParsedResume) -> NormalizedSkillSet {
    normalize(taxonomy, resume.declared_skills())
}
