use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ────────────────────────────────────────────────────────────────────────────
// Request body (loosely typed)
// ────────────────────────────────────────────────────────────────────────────

/// Résumé as submitted by the form.
///
/// Every field is optional. Values of the wrong shape degrade to "absent"
/// rather than rejecting the request: scalars accept strings (numbers and
/// booleans are stringified), sequences drop elements they cannot read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawResume {
    #[serde(deserialize_with = "lenient_object")]
    pub personal_info: RawPersonalInfo,
    #[serde(deserialize_with = "lenient_seq")]
    pub education: Vec<RawEducation>,
    #[serde(deserialize_with = "lenient_seq")]
    pub experience: Vec<RawExperience>,
    #[serde(deserialize_with = "lenient_seq")]
    pub projects: Vec<RawProject>,
    #[serde(deserialize_with = "lenient_object")]
    pub technical_skills: RawSkills,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin_url: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub github_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawEducation {
    #[serde(deserialize_with = "lenient_string")]
    pub school: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawProject {
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub technologies: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSkills {
    #[serde(deserialize_with = "lenient_string")]
    pub languages: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub frameworks: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub developer_tools: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub libraries: Option<String>,
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

pub(crate) fn lenient_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized record (template view)
// ────────────────────────────────────────────────────────────────────────────

/// Fully populated résumé handed to the template. Built once per request by
/// `render::normalize`, never mutated afterwards, never persisted.
///
/// Serializes with the request's camelCase names, and round-trips through
/// `render::escape::escape_record`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub projects: Vec<ProjectEntry>,
    pub technical_skills: SkillSet,
    pub has_education: bool,
    pub has_experience: bool,
    pub has_projects: bool,
    pub has_skills: bool,
    pub has_contact_info: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub linkedin_url: String,
    pub github_url: String,
    /// Short handle derived from `linkedin_url`.
    pub linkedin_profile: String,
    /// Short handle derived from `github_url`.
    pub github_profile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub location: String,
    pub degree: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub date: String,
    pub highlights: Vec<String>,
    pub has_highlights: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub technologies: String,
    pub date: String,
    pub highlights: Vec<String>,
    pub has_highlights: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSet {
    pub languages: String,
    pub frameworks: String,
    pub developer_tools: String,
    pub libraries: String,
}
