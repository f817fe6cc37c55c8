use serde::{Deserialize, Serialize};

use crate::models::{trim_in_place, Checks, FieldError};
use crate::pdf::templates::DocumentKind;

/// Resume payload accepted by `POST /api/pdf/generate`.
///
/// Required fields default to empty so that missing ones are reported by
/// `validate` alongside every other problem instead of failing deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperience {
    pub company: String,
    pub position: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Vec<String>,
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honors: Option<String>,
}

impl ResumeData {
    /// Trims the fields that are validated or end up in the filename, and
    /// fills in the default template.
    pub fn normalize(&mut self) {
        let info = &mut self.personal_info;
        trim_in_place(&mut info.first_name);
        trim_in_place(&mut info.last_name);
        trim_in_place(&mut info.email);

        if self.template.is_none() {
            self.template = Some(DocumentKind::Resume.default_template().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();
        let info = &self.personal_info;

        checks.require("personalInfo.firstName", &info.first_name);
        checks.require("personalInfo.lastName", &info.last_name);
        // Both names end up in the Content-Disposition filename.
        checks.no_control_chars("personalInfo.firstName", &info.first_name);
        checks.no_control_chars("personalInfo.lastName", &info.last_name);
        if !looks_like_email(&info.email) {
            checks.fail("personalInfo.email", "must be a valid email address");
        }
        checks.template(
            self.template.as_deref(),
            DocumentKind::Resume.known_templates(),
        );

        checks.finish()
    }

    pub fn template_name(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or(DocumentKind::Resume.default_template())
    }

    /// `{firstName}_{lastName}_Resume.pdf`, names used as given.
    pub fn download_file_name(&self) -> String {
        format!(
            "{}_{}_Resume.pdf",
            self.personal_info.first_name, self.personal_info.last_name
        )
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}
