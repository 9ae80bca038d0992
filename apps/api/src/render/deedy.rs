//! Two-column "Deedy" CV. Own schema and template, compiled with xelatex
//! against the `deedy-resume-openfont` class supplied at deploy time.

use anyhow::Context;
use askama::Template;
use bytes::Bytes;

use crate::compile::{AuxResource, LatexCompiler, LatexSettings};
use crate::config::Config;
use crate::models::deedy::{
    Award, Coursework, DeedyEducation, DeedyExperience, DeedyLinks, DeedyPersonalInfo,
    DeedyRecord, DeedySkills, RawAward, RawDeedyEducation, RawDeedyExperience,
    RawDeedyPersonalInfo, RawDeedyResume, RawResearch, Research,
};
use crate::render::escape::{escape_latex, escape_record, escape_url};
use crate::render::normalize::{non_blank_highlights, text};

/// File name the template's `\documentclass` resolves to in the job directory.
pub const DEEDY_CLASS_FILE: &str = "deedy-resume-openfont.cls";

pub fn normalize_deedy(raw: RawDeedyResume) -> DeedyRecord {
    DeedyRecord {
        personal_info: normalize_personal_info(raw.personal_info),
        education: raw
            .education
            .into_iter()
            .map(normalize_education)
            .filter(|e| !(e.institution.is_empty() && e.degree.is_empty()))
            .collect(),
        links: DeedyLinks {
            facebook: text(raw.links.facebook),
            github: text(raw.links.github),
            linkedin: text(raw.links.linkedin),
            youtube: text(raw.links.youtube),
            twitter: text(raw.links.twitter),
            quora: text(raw.links.quora),
        },
        coursework: Coursework {
            graduate: non_blank_highlights(raw.coursework.graduate),
            undergraduate: non_blank_highlights(raw.coursework.undergraduate),
        },
        skills: DeedySkills {
            over_five_thousand: non_blank_highlights(raw.skills.over_five_thousand),
            over_thousand: non_blank_highlights(raw.skills.over_thousand),
            familiar: non_blank_highlights(raw.skills.familiar),
        },
        experience: raw
            .experience
            .into_iter()
            .map(normalize_experience)
            .filter(|e| !(e.company.is_empty() && e.role.is_empty() && e.highlights.is_empty()))
            .collect(),
        research: raw
            .research
            .into_iter()
            .map(normalize_research)
            .filter(|r| !(r.institution.is_empty() && r.role.is_empty() && r.description.is_empty()))
            .collect(),
        awards: raw
            .awards
            .into_iter()
            .map(normalize_award)
            .filter(|a| !a.competition.is_empty())
            .collect(),
    }
}

fn normalize_personal_info(raw: RawDeedyPersonalInfo) -> DeedyPersonalInfo {
    DeedyPersonalInfo {
        first_name: text(raw.first_name),
        last_name: text(raw.last_name),
        website: text(raw.website),
        facebook: text(raw.facebook),
        email: text(raw.email),
        phone: text(raw.phone),
        alternate_email: text(raw.alternate_email),
    }
}

fn normalize_education(raw: RawDeedyEducation) -> DeedyEducation {
    DeedyEducation {
        institution: text(raw.institution),
        degree: text(raw.degree),
        date: text(raw.date),
        location: text(raw.location),
        gpa: text(raw.gpa),
        major_gpa: text(raw.major_gpa),
        honors: non_blank_highlights(raw.honors),
    }
}

fn normalize_experience(raw: RawDeedyExperience) -> DeedyExperience {
    DeedyExperience {
        company: text(raw.company),
        role: text(raw.role),
        location: text(raw.location),
        date: text(raw.date),
        highlights: non_blank_highlights(raw.highlights),
    }
}

fn normalize_research(raw: RawResearch) -> Research {
    Research {
        institution: text(raw.institution),
        role: text(raw.role),
        location: text(raw.location),
        date: text(raw.date),
        description: text(raw.description),
    }
}

fn normalize_award(raw: RawAward) -> Award {
    Award {
        year: text(raw.year),
        rank: text(raw.rank),
        competition: text(raw.competition),
    }
}

/// One entry of the header's contact lines. An empty `href` renders as plain text.
#[derive(Debug, Clone)]
pub struct ContactItem {
    pub href: String,
    pub text: String,
}

impl ContactItem {
    fn link(target: String, shown: &str) -> Option<Self> {
        (!shown.is_empty()).then(|| ContactItem {
            href: escape_url(&target),
            text: escape_latex(shown),
        })
    }

    fn plain(shown: &str) -> Option<Self> {
        (!shown.is_empty()).then(|| ContactItem {
            href: String::new(),
            text: escape_latex(shown),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LinkItem {
    pub label: &'static str,
    pub href: String,
    pub text: String,
}

#[derive(Template)]
#[template(path = "deedy.tex", syntax = "latex", escape = "none")]
pub struct DeedyView {
    /// Normalized and LaTeX-escaped.
    pub resume: DeedyRecord,
    /// Website and Facebook.
    pub primary_contacts: Vec<ContactItem>,
    /// Email, phone and alternate email.
    pub secondary_contacts: Vec<ContactItem>,
    pub links: Vec<LinkItem>,
    pub has_skills: bool,
}

impl DeedyView {
    fn new(record: &DeedyRecord) -> anyhow::Result<Self> {
        let info = &record.personal_info;
        let primary_contacts = [
            ContactItem::link(info.website.clone(), &info.website),
            ContactItem::link(info.facebook.clone(), &info.facebook),
        ]
        .into_iter()
        .flatten()
        .collect();
        let secondary_contacts = [
            ContactItem::link(format!("mailto:{}", info.email), &info.email),
            ContactItem::plain(&info.phone),
            ContactItem::link(
                format!("mailto:{}", info.alternate_email),
                &info.alternate_email,
            ),
        ]
        .into_iter()
        .flatten()
        .collect();
        let links = record
            .links
            .labelled()
            .into_iter()
            .map(|(label, url)| LinkItem {
                label,
                href: escape_url(url),
                text: escape_latex(url),
            })
            .collect();

        let skills = &record.skills;
        Ok(DeedyView {
            primary_contacts,
            secondary_contacts,
            links,
            has_skills: !(skills.over_five_thousand.is_empty()
                && skills.over_thousand.is_empty()
                && skills.familiar.is_empty()),
            resume: escape_record(record).context("escape normalized deedy resume")?,
        })
    }
}

/// Normalize, escape and render a Deedy CV to LaTeX source.
pub fn render_deedy_source(raw: RawDeedyResume) -> anyhow::Result<String> {
    let record = normalize_deedy(raw);
    tracing::debug!(
        education = record.education.len(),
        experience = record.experience.len(),
        research = record.research.len(),
        awards = record.awards.len(),
        "normalized deedy resume"
    );

    let source = DeedyView::new(&record)?
        .render()
        .context("render deedy template")?;
    if source.trim().is_empty() {
        anyhow::bail!("rendered LaTeX source is empty");
    }
    Ok(source)
}

/// Builds the xelatex compiler for the Deedy style, or `None` when
/// `DEEDY_CLASS_PATH` is unset. A configured but unreadable class file is an error.
pub async fn deedy_compiler(config: &Config) -> anyhow::Result<Option<LatexCompiler>> {
    let Some(class_path) = &config.deedy_class_path else {
        return Ok(None);
    };
    let contents = tokio::fs::read(class_path)
        .await
        .with_context(|| format!("read Deedy class file {}", class_path.display()))?;

    let mut settings = LatexSettings::from_config(config);
    settings.engine = config.deedy_latex_engine.clone();
    settings.passes = 1;

    Ok(Some(LatexCompiler::new(settings).with_resource(AuxResource {
        file_name: DEEDY_CLASS_FILE.to_string(),
        contents: Bytes::from(contents),
    })))
}
