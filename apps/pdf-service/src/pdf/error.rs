use std::time::Duration;

use thiserror::Error;

use crate::pdf::templates::DocumentKind;

/// Failure to read a template from the template directory.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template name '{0}' is not a valid file stem")]
    InvalidName(String),

    #[error("{kind} template '{name}' could not be read: {source}")]
    Unreadable {
        kind: DocumentKind,
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure owned by the browser process or its pages.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("failed to open page: {0}")]
    Page(String),
}

/// Failure while turning HTML into PDF bytes.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("content did not finish loading within {0:?}")]
    ContentLoadTimeout(Duration),

    #[error("failed to load content: {0}")]
    ContentLoad(String),

    #[error("PDF print failed: {0}")]
    Print(String),

    #[error("failed to close page: {0}")]
    Close(String),

    #[error("render task aborted: {0}")]
    Aborted(String),
}

/// Top-level error for one render request.
#[derive(Debug, Error)]
pub enum PdfError {
    /// Neither the requested template nor the kind's default could be read.
    #[error("no usable template: {0}")]
    TemplateLoad(#[source] TemplateError),

    #[error("document could not be converted to a render context: {0}")]
    Context(#[from] serde_json::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
