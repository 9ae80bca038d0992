//! Data normalization. Turns a partial form submission into a total `ResumeRecord`.
//!
//! Defaults absorb absence, blank rows and blank highlights are dropped, and the
//! presence flags that drive the template's conditional sections are derived here.
//! This step never fails.

use crate::models::resume::{
    EducationEntry, ExperienceEntry, PersonalInfo, ProjectEntry, RawEducation, RawExperience,
    RawPersonalInfo, RawProject, RawResume, RawSkills, ResumeRecord, SkillSet,
};
use crate::render::handles::{derive_handle, ProfilePlatform};

pub fn normalize(raw: RawResume) -> ResumeRecord {
    let personal_info = normalize_personal_info(raw.personal_info);

    let education: Vec<EducationEntry> = raw
        .education
        .into_iter()
        .map(normalize_education)
        .filter(|entry| !is_blank_education(entry))
        .collect();

    let experience: Vec<ExperienceEntry> = raw
        .experience
        .into_iter()
        .map(normalize_experience)
        .filter(|entry| !is_blank_experience(entry))
        .collect();

    let projects: Vec<ProjectEntry> = raw
        .projects
        .into_iter()
        .map(normalize_project)
        .filter(|entry| !is_blank_project(entry))
        .collect();

    let technical_skills = normalize_skills(raw.technical_skills);

    let has_contact_info = [
        &personal_info.phone,
        &personal_info.email,
        &personal_info.linkedin_url,
        &personal_info.github_url,
    ]
    .iter()
    .any(|field| !field.is_empty());

    let has_skills = [
        &technical_skills.languages,
        &technical_skills.frameworks,
        &technical_skills.developer_tools,
        &technical_skills.libraries,
    ]
    .iter()
    .any(|field| !field.is_empty());

    ResumeRecord {
        has_education: !education.is_empty(),
        has_experience: !experience.is_empty(),
        has_projects: !projects.is_empty(),
        has_skills,
        has_contact_info,
        personal_info,
        education,
        experience,
        projects,
        technical_skills,
    }
}

/// Trimmed field value; absent becomes empty.
pub(crate) fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub(crate) fn non_blank_highlights(highlights: Vec<String>) -> Vec<String> {
    highlights
        .into_iter()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect()
}

fn normalize_personal_info(raw: RawPersonalInfo) -> PersonalInfo {
    let linkedin_url = text(raw.linkedin_url);
    let github_url = text(raw.github_url);

    PersonalInfo {
        name: text(raw.name),
        phone: text(raw.phone),
        email: text(raw.email),
        linkedin_profile: derive_handle(&linkedin_url, ProfilePlatform::LinkedIn),
        github_profile: derive_handle(&github_url, ProfilePlatform::GitHub),
        linkedin_url,
        github_url,
    }
}

fn normalize_education(raw: RawEducation) -> EducationEntry {
    EducationEntry {
        school: text(raw.school),
        location: text(raw.location),
        degree: text(raw.degree),
        date: text(raw.date),
    }
}

fn normalize_experience(raw: RawExperience) -> ExperienceEntry {
    let highlights = non_blank_highlights(raw.highlights);
    ExperienceEntry {
        title: text(raw.title),
        company: text(raw.company),
        location: text(raw.location),
        date: text(raw.date),
        has_highlights: !highlights.is_empty(),
        highlights,
    }
}

fn normalize_project(raw: RawProject) -> ProjectEntry {
    let highlights = non_blank_highlights(raw.highlights);
    ProjectEntry {
        name: text(raw.name),
        technologies: text(raw.technologies),
        date: text(raw.date),
        has_highlights: !highlights.is_empty(),
        highlights,
    }
}

fn normalize_skills(raw: RawSkills) -> SkillSet {
    SkillSet {
        languages: text(raw.languages),
        frameworks: text(raw.frameworks),
        developer_tools: text(raw.developer_tools),
        libraries: text(raw.libraries),
    }
}

fn is_blank_education(entry: &EducationEntry) -> bool {
    entry.school.is_empty()
        && entry.location.is_empty()
        && entry.degree.is_empty()
        && entry.date.is_empty()
}

fn is_blank_experience(entry: &ExperienceEntry) -> bool {
    entry.title.is_empty()
        && entry.company.is_empty()
        && entry.location.is_empty()
        && entry.date.is_empty()
        && entry.highlights.is_empty()
}

fn is_blank_project(entry: &ProjectEntry) -> bool {
    entry.name.is_empty()
        && entry.technologies.is_empty()
        && entry.date.is_empty()
        && entry.highlights.is_empty()
}
