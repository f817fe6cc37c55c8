pub mod cover_letter;
pub mod resume;

use serde::Serialize;

/// One rejected request field, reported back in a 400 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Collects field errors for a request payload.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "must not be empty"));
        }
    }

    /// Rejects values that cannot be carried in a response header.
    pub fn no_control_chars(&mut self, field: &str, value: &str) {
        if value.chars().any(char::is_control) {
            self.errors
                .push(FieldError::new(field, "must not contain control characters"));
        }
    }

    pub fn template(&mut self, value: Option<&str>, allowed: &[&str]) {
        if let Some(name) = value {
            if !allowed.contains(&name) {
                self.errors.push(FieldError::new(
                    "template",
                    &format!("must be one of: {}", allowed.join(", ")),
                ));
            }
        }
    }

    pub fn fail(&mut self, field: &str, message: &str) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Trims a string in place without reallocating when nothing changes.
pub(crate) fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}
