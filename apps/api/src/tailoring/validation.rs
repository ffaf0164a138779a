//! Up-front input checks. Everything here runs before classification or
//! scoring; the first failure is reported.

use crate::models::job_description::ParsedJD;
use crate::models::resume::ParsedResume;
use crate::tailoring::error::EngineError;

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn reject(msg: String) -> Result<(), EngineError> {
    Err(EngineError::Validation(msg))
}

pub fn validate_resume(resume: &ParsedResume) -> Result<(), EngineError> {
    if blank(&resume.contact_info.name) {
        return reject("resume.contactInfo.name must not be empty".to_string());
    }

    for (i, exp) in resume.experience.iter().enumerate() {
        if blank(&exp.company) {
            return reject(format!("resume.experience[{i}].company must not be empty"));
        }
        if blank(&exp.title) {
            return reject(format!("resume.experience[{i}].title must not be empty"));
        }
        if let Some(j) = exp.bullets.iter().position(|b| blank(b)) {
            return reject(format!("resume.experience[{i}].bullets[{j}] must not be empty"));
        }
        if let Some(j) = exp.tech_stack.iter().position(|s| blank(s)) {
            return reject(format!("resume.experience[{i}].techStack[{j}] must not be empty"));
        }
    }

    for (i, project) in resume.projects.iter().enumerate() {
        if blank(&project.name) {
            return reject(format!("resume.projects[{i}].name must not be empty"));
        }
        if let Some(j) = project.bullets.iter().position(|b| blank(b)) {
            return reject(format!("resume.projects[{i}].bullets[{j}] must not be empty"));
        }
        if let Some(j) = project.tech_stack.iter().position(|s| blank(s)) {
            return reject(format!("resume.projects[{i}].techStack[{j}] must not be empty"));
        }
    }

    if let Some(i) = resume.skills.iter().position(|s| blank(s)) {
        return reject(format!("resume.skills[{i}] must not be empty"));
    }

    Ok(())
}

pub fn validate_job_description(jd: &ParsedJD) -> Result<(), EngineError> {
    if blank(&jd.title) {
        return reject("jobDescription.title must not be empty".to_string());
    }
    if let Some(i) = jd.required_skills.iter().position(|s| blank(s)) {
        return reject(format!("jobDescription.requiredSkills[{i}] must not be empty"));
    }
    if let Some(i) = jd.preferred_skills.iter().position(|s| blank(s)) {
        return reject(format!("jobDescription.preferredSkills[{i}] must not be empty"));
    }
    Ok(())
}
