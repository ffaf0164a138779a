//! Fitting level: how aggressively a resume is tailored, 1 (near-verbatim)
//! through 5 (maximal reordering and wording). Every per-level knob lives here
//! so the tables can be read side by side.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tailoring::error::EngineError;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 5;

/// Bullets scoring strictly below this are flagged deprioritized.
const DEPRIORITIZE_THRESHOLDS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

/// Per-entry cap on bullets that reach the document body.
const BULLET_CAPS: [usize; 5] = [8, 7, 6, 5, 4];

/// How many bullets per entry are promoted ahead of original order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    Top(usize),
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FittingLevel(u8);

impl FittingLevel {
    pub fn new(level: u8) -> Result<Self, EngineError> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(EngineError::Validation(format!(
                "fittingLevel must be between {MIN_LEVEL} and {MAX_LEVEL}, got {level}"
            )))
        }
    }

    /// Accepts any integer from the wire; out-of-range values are validation errors.
    pub fn from_i64(level: i64) -> Result<Self, EngineError> {
        u8::try_from(level)
            .map_err(|_| {
                EngineError::Validation(format!(
                    "fittingLevel must be between {MIN_LEVEL} and {MAX_LEVEL}, got {level}"
                ))
            })
            .and_then(Self::new)
    }

    pub fn all() -> impl Iterator<Item = FittingLevel> {
        (MIN_LEVEL..=MAX_LEVEL).map(FittingLevel)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0 - MIN_LEVEL)
    }

    pub fn bullet_promotion(self) -> Promotion {
        match self.0 {
            1 => Promotion::None,
            2 => Promotion::Top(1),
            3 => Promotion::Top(2),
            _ => Promotion::All,
        }
    }

    /// Levels 1–2 only pull JD-matched skills forward; 3+ sort by score.
    pub fn sorts_skills_by_score(self) -> bool {
        self.0 >= 3
    }

    pub fn reorders_entries(self) -> bool {
        self.0 >= 5
    }

    pub fn deprioritize_threshold(self) -> f64 {
        DEPRIORITIZE_THRESHOLDS[self.index()]
    }

    pub fn allows_jd_spelling(self) -> bool {
        self.0 >= 2
    }

    pub fn allows_category_qualifier(self) -> bool {
        self.0 >= 4
    }

    pub fn bullet_cap(self) -> usize {
        BULLET_CAPS[self.index()]
    }
}

/// What a level does, as reported by the taxonomy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FittingLevelSummary {
    pub level: u8,
    pub deprioritize_threshold: f64,
    pub bullet_cap: usize,
    pub sorts_skills_by_score: bool,
    pub reorders_entries: bool,
    pub allows_jd_spelling: bool,
    pub allows_category_qualifier: bool,
}

impl From<FittingLevel> for FittingLevelSummary {
    fn from(level: FittingLevel) -> Self {
        Self {
            level: level.get(),
            deprioritize_threshold: level.deprioritize_threshold(),
            bullet_cap: level.bullet_cap(),
            sorts_skills_by_score: level.sorts_skills_by_score(),
            reorders_entries: level.reorders_entries(),
            allows_jd_spelling: level.allows_jd_spelling(),
            allows_category_qualifier: level.allows_category_qualifier(),
        }
    }
}

impl<'de> Deserialize<'de> for FittingLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::from_i64(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for FittingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
