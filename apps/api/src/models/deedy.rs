use serde::{Deserialize, Serialize};

use crate::models::resume::{lenient_object, lenient_seq, lenient_string};

// ────────────────────────────────────────────────────────────────────────────
// Request body (loosely typed)
// ────────────────────────────────────────────────────────────────────────────

/// Two-column "Deedy" CV as submitted by the form. Same leniency rules as
/// `RawResume`: every field optional, wrong shapes degrade to absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeedyResume {
    #[serde(deserialize_with = "lenient_object")]
    pub personal_info: RawDeedyPersonalInfo,
    #[serde(deserialize_with = "lenient_seq")]
    pub education: Vec<RawDeedyEducation>,
    #[serde(deserialize_with = "lenient_object")]
    pub links: RawDeedyLinks,
    #[serde(deserialize_with = "lenient_object")]
    pub coursework: RawCoursework,
    #[serde(deserialize_with = "lenient_object")]
    pub skills: RawDeedySkills,
    #[serde(deserialize_with = "lenient_seq")]
    pub experience: Vec<RawDeedyExperience>,
    #[serde(deserialize_with = "lenient_seq")]
    pub research: Vec<RawResearch>,
    #[serde(deserialize_with = "lenient_seq")]
    pub awards: Vec<RawAward>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeedyPersonalInfo {
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub website: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub facebook: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub alternate_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeedyEducation {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gpa: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub major_gpa: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDeedyLinks {
    #[serde(deserialize_with = "lenient_string")]
    pub facebook: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub github: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub youtube: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub twitter: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub quora: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCoursework {
    #[serde(deserialize_with = "lenient_seq")]
    pub graduate: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub undergraduate: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDeedySkills {
    #[serde(deserialize_with = "lenient_seq")]
    pub over_five_thousand: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub over_thousand: Vec<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub familiar: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawDeedyExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawResearch {
    #[serde(deserialize_with = "lenient_string")]
    pub institution: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAward {
    #[serde(deserialize_with = "lenient_string")]
    pub year: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub rank: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub competition: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Normalized record
// ────────────────────────────────────────────────────────────────────────────

/// Fully populated Deedy CV: trimmed strings, blank rows and list items dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedyRecord {
    pub personal_info: DeedyPersonalInfo,
    pub education: Vec<DeedyEducation>,
    pub links: DeedyLinks,
    pub coursework: Coursework,
    pub skills: DeedySkills,
    pub experience: Vec<DeedyExperience>,
    pub research: Vec<Research>,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedyPersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub website: String,
    pub facebook: String,
    pub email: String,
    pub phone: String,
    pub alternate_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedyEducation {
    pub institution: String,
    pub degree: String,
    pub date: String,
    pub location: String,
    pub gpa: String,
    pub major_gpa: String,
    pub honors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeedyLinks {
    pub facebook: String,
    pub github: String,
    pub linkedin: String,
    pub youtube: String,
    pub twitter: String,
    pub quora: String,
}

impl DeedyLinks {
    /// Non-empty links with their display labels, in template order.
    pub fn labelled(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", self.facebook.as_str()),
            ("Github", self.github.as_str()),
            ("LinkedIn", self.linkedin.as_str()),
            ("YouTube", self.youtube.as_str()),
            ("Twitter", self.twitter.as_str()),
            ("Quora", self.quora.as_str()),
        ]
        .into_iter()
        .filter(|(_, url)| !url.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coursework {
    pub graduate: Vec<String>,
    pub undergraduate: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedySkills {
    pub over_five_thousand: Vec<String>,
    pub over_thousand: Vec<String>,
    pub familiar: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeedyExperience {
    pub company: String,
    pub role: String,
    pub location: String,
    pub date: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Research {
    pub institution: String,
    pub role: String,
    pub location: String,
    pub date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub year: String,
    pub rank: String,
    pub competition: String,
}
