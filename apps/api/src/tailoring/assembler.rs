//! Document Assembler: maps a `TailoredResume` onto the section sequence the
//! downstream renderer consumes.
//!
//! This is the only stage that omits content: when an entry has more bullets
//! than the level's cap, deprioritized bullets are dropped (lowest score first,
//! later position on ties) until it fits or none are left. Bullets that are
//! not deprioritized always survive.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::resume::{ContactInfo, Education};
use crate::tailoring::content_selector::{TailoredBullet, TailoredResume};
use crate::tailoring::fitting_level::FittingLevel;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentBody {
    pub fitting_level: FittingLevel,
    pub sections: Vec<Section>,
    /// Deprioritized bullets left out to respect the per-entry cap.
    pub omitted_bullets: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Section {
    Header(ContactInfo),
    Summary { text: String },
    Experience { entries: Vec<ExperienceBlock> },
    Projects { entries: Vec<ProjectBlock> },
    Education { entries: Vec<Education> },
    Skills { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceBlock {
    pub company: String,
    pub title: String,
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub bullets: Vec<String>,
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBlock {
    pub name: String,
    pub description: String,
    pub bullets: Vec<String>,
    pub tech_stack: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Assembly
// ────────────────────────────────────────────────────────────────────────────

/// Header, summary, experience, projects, education, skills. Sections with
/// nothing to show are left out; the header is always present.
pub fn assemble(tailored: &TailoredResume) -> DocumentBody {
    let cap = tailored.fitting_level.bullet_cap();
    let mut omitted = 0;
    let mut sections = vec![Section::Header(tailored.contact_info.clone())];

    if let Some(text) = tailored.summary.as_ref().filter(|s| !s.trim().is_empty()) {
        sections.push(Section::Summary { text: text.clone() });
    }

    if !tailored.experience.is_empty() {
        let entries = tailored
            .experience
            .iter()
            .map(|exp| {
                let (bullets, dropped) = fit_bullets(&exp.bullets, cap);
                omitted += dropped;
                ExperienceBlock {
                    company: exp.company.clone(),
                    title: exp.title.clone(),
                    start_date: exp.start_date.clone(),
                    end_date: exp.end_date.clone(),
                    bullets,
                    tech_stack: exp.tech_stack.clone(),
                }
            })
            .collect();
        sections.push(Section::Experience { entries });
    }

    if !tailored.projects.is_empty() {
        let entries = tailored
            .projects
            .iter()
            .map(|project| {
                let (bullets, dropped) = fit_bullets(&project.bullets, cap);
                omitted += dropped;
                ProjectBlock {
                    name: project.name.clone(),
                    description: project.description.clone(),
                    bullets,
                    tech_stack: project.tech_stack.clone(),
                    url: project.url.clone(),
                }
            })
            .collect();
        sections.push(Section::Projects { entries });
    }

    if !tailored.education.is_empty() {
        sections.push(Section::Education {
            entries: tailored.education.clone(),
        });
    }

    if !tailored.skills.is_empty() {
        sections.push(Section::Skills {
            items: tailored.skills.clone(),
        });
    }

    debug!(sections = sections.len(), omitted, cap, "Document assembled");

    DocumentBody {
        fitting_level: tailored.fitting_level,
        sections,
        omitted_bullets: omitted,
    }
}

/// Keeps bullets in tailored order, dropping deprioritized ones while the
/// entry exceeds `cap`. Returns the kept texts and how many were dropped.
fn fit_bullets(bullets: &[TailoredBullet], cap: usize) -> (Vec<String>, usize) {
    let mut keep = vec![true; bullets.len()];
    let mut included = bullets.len();

    while included > cap {
        let victim = bullets
            .iter()
            .enumerate()
            .filter(|(i, b)| keep[*i] && b.deprioritized)
            // Lowest score; on ties the later position.
            .min_by(|(ia, a), (ib, b)| {
                a.relevance_score
                    .partial_cmp(&b.relevance_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i);

        match victim {
            Some(i) => {
                keep[i] = false;
                included -= 1;
            }
            None => break,
        }
    }

    let kept = bullets
        .iter()
        .zip(&keep)
        .filter(|(_, k)| **k)
        .map(|(b, _)| b.text.clone())
        .collect();
    (kept, bullets.len() - included)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tailoring::content_selector::{TailoredExperience, TailoredProject};

    fn bullet(text: &str, score: f64, deprioritized: bool) -> TailoredBullet {
        TailoredBullet {
            text: text.to_string(),
            original_index: 0,
            relevance_score: score,
            deprioritized,
            substitution: None,
        }
    }

    fn tailored(level: u8, bullets: Vec<TailoredBullet>) -> TailoredResume {
        TailoredResume {
            contact_info: ContactInfo {
                name: "Ada".to_string(),
                ..Default::default()
            },
            summary: None,
            experience: vec![TailoredExperience {
                company: "C".to_string(),
                title: "T".to_string(),
                start_date: "2020".to_string(),
                end_date: None,
                bullets,
                tech_stack: vec![],
                original_index: 0,
            }],
            projects: vec![],
            education: vec![],
            skills: vec!["Rust".to_string()],
            fitting_level: FittingLevel::new(level).unwrap(),
            warnings: vec![],
        }
    }

    fn experience_bullets(body: &DocumentBody) -> Vec<String> {
        body.sections
            .iter()
            .find_map(|s| match s {
                Section::Experience { entries } => Some(entries[0].bullets.clone()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_sections_in_renderer_order() {
        let mut t = tailored(1, vec![bullet("a", 1.0, false)]);
        t.summary = Some("Engineer".to_string());
        t.projects.push(TailoredProject {
            name: "P".to_string(),
            description: String::new(),
            bullets: vec![],
            tech_stack: vec![],
            url: None,
            original_index: 0,
        });
        t.education.push(Education {
            institution: "U".to_string(),
            degree: "BSc".to_string(),
            field: None,
            start_date: None,
            end_date: None,
            gpa: None,
            relevant_coursework: vec![],
        });
        let body = assemble(&t);
        let kinds: Vec<&str> = body
            .sections
            .iter()
            .map(|s| match s {
                Section::Header(_) => "header",
                Section::Summary { .. } => "summary",
                Section::Experience { .. } => "experience",
                Section::Projects { .. } => "projects",
                Section::Education { .. } => "education",
                Section::Skills { .. } => "skills",
            })
            .collect();
        assert_eq!(kinds, vec!["header", "summary", "experience", "projects", "education", "skills"]);
    }

    #[test]
    fn test_empty_sections_omitted() {
        let mut t = tailored(1, vec![]);
        t.experience.clear();
        t.skills.clear();
        let body = assemble(&t);
        assert_eq!(body.sections.len(), 1);
        assert!(matches!(body.sections[0], Section::Header(_)));
    }

    #[test]
    fn test_under_cap_keeps_deprioritized() {
        let t = tailored(5, vec![bullet("a", 1.0, false), bullet("b", 0.0, true)]);
        let body = assemble(&t);
        assert_eq!(experience_bullets(&body), vec!["a", "b"]);
        assert_eq!(body.omitted_bullets, 0);
    }

    #[test]
    fn test_over_cap_drops_lowest_deprioritized_later_first() {
        // Level 5 caps entries at 4 bullets.
        let bullets = vec![
            bullet("keep1", 1.0, false),
            bullet("low-early", 0.0, true),
            bullet("keep2", 0.8, false),
            bullet("mid", 0.05, true),
            bullet("keep3", 0.5, false),
            bullet("low-late", 0.0, true),
        ];
        let body = assemble(&tailored(5, bullets));
        assert_eq!(experience_bullets(&body), vec!["keep1", "keep2", "mid", "keep3"]);
        assert_eq!(body.omitted_bullets, 2);
    }

    #[test]
    fn test_non_deprioritized_never_dropped() {
        let bullets: Vec<TailoredBullet> = (0..6).map(|i| bullet(&format!("b{i}"), 0.9, false)).collect();
        let body = assemble(&tailored(5, bullets));
        assert_eq!(experience_bullets(&body).len(), 6);
        assert_eq!(body.omitted_bullets, 0);
    }

    #[test]
    fn test_cap_loosens_at_lower_levels() {
        let bullets: Vec<TailoredBullet> = (0..6).map(|i| bullet(&format!("b{i}"), 0.0, true)).collect();
        assert_eq!(assemble(&tailored(1, bullets.clone())).omitted_bullets, 0);
        assert_eq!(assemble(&tailored(5, bullets)).omitted_bullets, 2);
    }

    #[test]
    fn test_assemble_is_pure() {
        let t = tailored(3, vec![bullet("a", 0.1, true), bullet("b", 0.9, false)]);
        assert_eq!(assemble(&t), assemble(&t));
    }

    #[test]
    fn test_section_serializes_with_type_tag() {
        let json = serde_json::to_value(Section::Skills {
            items: vec!["Rust".to_string()],
        })
        .unwrap();
        assert_eq!(json["type"], "skills");
        assert_eq!(json["items"][0], "Rust");
    }
}
