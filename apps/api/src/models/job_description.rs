use serde::{Deserialize, Serialize};

/// Structured job description as produced by the upstream parsing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedJD {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub raw_requirements: Vec<String>,
}

impl ParsedJD {
    /// Required skills tagged `true`, then preferred skills tagged `false`.
    pub fn tagged_skills(&self) -> impl Iterator<Item = (&str, bool)> {
        self.required_skills
            .iter()
            .map(|s| (s.as_str(), true))
            .chain(self.preferred_skills.iter().map(|s| (s.as_str(), false)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_jd_full_deserializes_correctly() {
        let json = r#"{
            "title": "Frontend Engineer",
            "company": "Acme",
            "requiredSkills": ["Vue", "Python"],
            "preferredSkills": ["AWS"],
            "responsibilities": ["Build dashboards"],
            "rawRequirements": ["3+ years Vue"]
        }"#;
        let jd: ParsedJD = serde_json::from_str(json).unwrap();
        assert_eq!(jd.company.as_deref(), Some("Acme"));
        assert_eq!(jd.required_skills.len(), 2);
        assert_eq!(jd.raw_requirements[0], "3+ years Vue");
    }

    #[test]
    fn test_tagged_skills_required_first() {
        let jd = ParsedJD {
            title: "T".to_string(),
            company: None,
            required_skills: vec!["A".to_string()],
            preferred_skills: vec!["B".to_string()],
            responsibilities: vec![],
            raw_requirements: vec![],
        };
        let tagged: Vec<_> = jd.tagged_skills().collect();
        assert_eq!(tagged, vec![("A", true), ("B", false)]);
    }
}
