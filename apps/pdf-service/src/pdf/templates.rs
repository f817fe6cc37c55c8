//! Template Resolver — maps `(kind, name)` to a template file with a single
//! fallback step to the kind's default template.
//!
//! Templates are re-read on every request; editing a file on disk takes effect
//! on the next render without a restart.

use std::fmt;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::pdf::error::TemplateError;

/// Which document family a template (and filename rule) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Template used when the requested one is unavailable.
    pub fn default_template(self) -> &'static str {
        match self {
            DocumentKind::Resume => "modern",
            DocumentKind::CoverLetter => "professional",
        }
    }

    /// Template names the HTTP layer accepts for this kind.
    pub fn known_templates(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Resume => &["modern", "classic", "creative", "minimal"],
            DocumentKind::CoverLetter => &["professional", "modern", "creative"],
        }
    }

    fn file_name(self, name: &str) -> String {
        match self {
            DocumentKind::Resume => format!("{name}.hbs"),
            DocumentKind::CoverLetter => format!("cover-letter-{name}.hbs"),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover-letter",
        })
    }
}

/// A template body as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    pub name: String,
    pub body: String,
}

/// Outcome of a template lookup.
#[derive(Debug)]
pub enum TemplateLookup {
    Found(DocumentTemplate),
    UsedFallback {
        requested: String,
        template: DocumentTemplate,
    },
    Fatal(TemplateError),
}

#[derive(Debug, Clone)]
pub struct TemplateResolver {
    root: PathBuf,
}

impl TemplateResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads `name` for `kind`, falling back once to the kind's default.
    pub async fn resolve(&self, kind: DocumentKind, name: &str) -> TemplateLookup {
        let requested = match self.load(kind, name).await {
            Ok(template) => return TemplateLookup::Found(template),
            Err(err) => err,
        };

        let default = kind.default_template();
        if name == default {
            return TemplateLookup::Fatal(requested);
        }

        warn!(
            "{kind} template '{name}' unavailable ({requested}), using '{default}' template"
        );

        match self.load(kind, default).await {
            Ok(template) => TemplateLookup::UsedFallback {
                requested: name.to_string(),
                template,
            },
            Err(err) => TemplateLookup::Fatal(err),
        }
    }

    async fn load(&self, kind: DocumentKind, name: &str) -> Result<DocumentTemplate, TemplateError> {
        if !is_safe_name(name) {
            return Err(TemplateError::InvalidName(name.to_string()));
        }

        let path = self.root.join(kind.file_name(name));
        debug!("Reading template {}", path.display());

        let body = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::Unreadable {
                kind,
                name: name.to_string(),
                source,
            })?;

        Ok(DocumentTemplate {
            name: name.to_string(),
            body,
        })
    }
}

/// Only plain stems may reach the filesystem; anything else could address a
/// file outside the template directory.
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn template_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("modern.hbs"), "MODERN {{name}}").unwrap();
        fs::write(dir.path().join("classic.hbs"), "CLASSIC {{name}}").unwrap();
        fs::write(
            dir.path().join("cover-letter-professional.hbs"),
            "PROFESSIONAL {{companyName}}",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn test_resolve_existing_template_returns_exact_body() {
        let dir = template_dir();
        let resolver = TemplateResolver::new(dir.path());

        match resolver.resolve(DocumentKind::Resume, "classic").await {
            TemplateLookup::Found(t) => {
                assert_eq!(t.body, "CLASSIC {{name}}");
                assert_eq!(t.name, "classic");
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_missing_template_falls_back_to_default() {
        let dir = template_dir();
        let resolver = TemplateResolver::new(dir.path());

        match resolver.resolve(DocumentKind::Resume, "bogus").await {
            TemplateLookup::UsedFallback {
                requested,
                template,
            } => {
                assert_eq!(requested, "bogus");
                assert_eq!(template.name, "modern");
                assert_eq!(template.body, "MODERN {{name}}");
            }
            other => panic!("expected UsedFallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cover_letter_uses_prefixed_file_and_own_default() {
        let dir = template_dir();
        let resolver = TemplateResolver::new(dir.path());

        match resolver.resolve(DocumentKind::CoverLetter, "creative").await {
            TemplateLookup::UsedFallback { template, .. } => {
                assert_eq!(template.name, "professional");
                assert_eq!(template.body, "PROFESSIONAL {{companyName}}");
            }
            other => panic!("expected UsedFallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resume_name_does_not_resolve_cover_letter_file() {
        let dir = template_dir();
        fs::write(dir.path().join("cover-letter-modern.hbs"), "CL MODERN").unwrap();
        let resolver = TemplateResolver::new(dir.path());

        match resolver.resolve(DocumentKind::Resume, "modern").await {
            TemplateLookup::Found(template) => assert_eq!(template.body, "MODERN {{name}}"),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_default_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TemplateResolver::new(dir.path());

        assert!(matches!(
            resolver.resolve(DocumentKind::Resume, "classic").await,
            TemplateLookup::Fatal(TemplateError::Unreadable { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_default_requested_directly_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = TemplateResolver::new(dir.path());

        assert!(matches!(
            resolver.resolve(DocumentKind::CoverLetter, "professional").await,
            TemplateLookup::Fatal(_)
        ));
    }

    #[tokio::test]
    async fn test_path_like_names_fall_back() {
        let dir = template_dir();
        let resolver = TemplateResolver::new(dir.path());

        for name in ["../modern", "classic.hbs", "", "a/b"] {
            match resolver.resolve(DocumentKind::Resume, name).await {
                TemplateLookup::UsedFallback { template, .. } => {
                    assert_eq!(template.name, "modern")
                }
                other => panic!("expected fallback for {name:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_kind_display_matches_wire_names() {
        assert_eq!(DocumentKind::Resume.to_string(), "resume");
        assert_eq!(DocumentKind::CoverLetter.to_string(), "cover-letter");
    }
}
