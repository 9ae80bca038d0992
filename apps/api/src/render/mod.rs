// Résumé rendering: normalize → escape → template.
// Produces LaTeX source; compilation to PDF lives in `compile`.

pub mod deedy;
pub mod escape;
pub mod handlers;
pub mod handles;
pub mod normalize;

use anyhow::Context;
use askama::Template;

use crate::models::resume::{PersonalInfo, RawResume, ResumeRecord};
use crate::render::escape::{escape_record, escape_url};
use crate::render::normalize::normalize;

/// Link targets for `\href`, built from the unescaped record.
#[derive(Debug, Clone, Default)]
pub struct ProfileLinks {
    pub email: String,
    pub linkedin: String,
    pub github: String,
}

impl ProfileLinks {
    fn from_personal_info(info: &PersonalInfo) -> Self {
        Self {
            email: escape_url(&info.email),
            linkedin: escape_url(&info.linkedin_url),
            github: escape_url(&info.github_url),
        }
    }
}

/// The built-in résumé template (`templates/resume.tex`).
#[derive(Template)]
#[template(path = "resume.tex", syntax = "latex", escape = "none")]
pub struct ResumeView {
    /// Normalized and LaTeX-escaped.
    pub resume: ResumeRecord,
    pub links: ProfileLinks,
}

/// Runs the pure half of the pipeline and returns LaTeX source.
///
/// Escaping happens exactly once, here, between normalization and rendering.
pub fn render_source(raw: RawResume) -> anyhow::Result<String> {
    let record = normalize(raw);
    tracing::debug!(
        education = record.education.len(),
        experience = record.experience.len(),
        projects = record.projects.len(),
        has_skills = record.has_skills,
        has_contact_info = record.has_contact_info,
        "normalized resume"
    );

    let view = ResumeView {
        links: ProfileLinks::from_personal_info(&record.personal_info),
        resume: escape_record(&record).context("escape normalized resume")?,
    };
    let source = view.render().context("render resume template")?;

    if source.trim().is_empty() {
        anyhow::bail!("rendered LaTeX source is empty");
    }
    Ok(source)
}
