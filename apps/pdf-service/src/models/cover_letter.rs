use serde::{Deserialize, Serialize};

use crate::models::{trim_in_place, Checks, FieldError};
use crate::pdf::templates::DocumentKind;

/// Cover-letter payload accepted by `POST /api/pdf/generate-cover-letter`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoverLetterData {
    pub company_name: String,
    pub job_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hiring_manager_name: Option<String>,
    pub content: CoverLetterContent,
    pub template: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverLetterContent {
    pub opening: String,
    pub body: Vec<String>,
    pub closing: String,
}

impl CoverLetterData {
    pub fn normalize(&mut self) {
        trim_in_place(&mut self.company_name);
        trim_in_place(&mut self.job_title);
        trim_in_place(&mut self.content.opening);
        trim_in_place(&mut self.content.closing);

        if self.template.is_none() {
            self.template = Some(DocumentKind::CoverLetter.default_template().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checks = Checks::default();

        checks.require("companyName", &self.company_name);
        checks.require("jobTitle", &self.job_title);
        checks.require("content.opening", &self.content.opening);
        if self.content.body.is_empty() {
            checks.fail("content.body", "must contain at least one paragraph");
        }
        checks.require("content.closing", &self.content.closing);
        checks.template(
            self.template.as_deref(),
            DocumentKind::CoverLetter.known_templates(),
        );

        checks.finish()
    }

    pub fn template_name(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or(DocumentKind::CoverLetter.default_template())
    }

    /// `{companyName}_{jobTitle}_Cover_Letter.pdf`, with every character outside
    /// `[A-Za-z0-9_-]` in the stem replaced by `_`.
    pub fn download_file_name(&self) -> String {
        let stem: String = format!("{}_{}_Cover_Letter", self.company_name, self.job_title)
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{stem}.pdf")
    }
}
