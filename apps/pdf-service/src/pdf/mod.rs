// PDF pipeline: resolve template → render HTML → export through the shared browser.
// Browser ownership lives in `browser::BrowserSession`; nothing here holds global state.

pub mod browser;
pub mod chrome;
pub mod error;
pub mod export;
pub mod handlers;
pub mod helpers;
pub mod renderer;
pub mod templates;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::pdf::browser::BrowserSession;
use crate::pdf::error::PdfError;
use crate::pdf::export::{DocumentExporter, RenderedDocument};
use crate::pdf::renderer::{RenderContext, Renderer};
use crate::pdf::templates::{DocumentKind, TemplateLookup, TemplateResolver};

pub struct PdfGenerator {
    resolver: TemplateResolver,
    renderer: Renderer,
    exporter: DocumentExporter,
}

impl PdfGenerator {
    pub fn new(
        resolver: TemplateResolver,
        session: Arc<BrowserSession>,
        render_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            renderer: Renderer::new(),
            exporter: DocumentExporter::new(session, render_timeout),
        }
    }

    /// Runs the whole pipeline for one document.
    pub async fn generate<T: Serialize>(
        &self,
        kind: DocumentKind,
        template_name: &str,
        document: &T,
    ) -> Result<RenderedDocument, PdfError> {
        let span = info_span!("render", id = %Uuid::new_v4(), %kind, template = template_name);
        self.run(kind, template_name, document).instrument(span).await
    }

    async fn run<T: Serialize>(
        &self,
        kind: DocumentKind,
        template_name: &str,
        document: &T,
    ) -> Result<RenderedDocument, PdfError> {
        let template = match self.resolver.resolve(kind, template_name).await {
            TemplateLookup::Found(template) => template,
            TemplateLookup::UsedFallback {
                requested,
                template,
            } => {
                info!("Rendering with '{}' in place of '{requested}'", template.name);
                template
            }
            TemplateLookup::Fatal(err) => return Err(PdfError::TemplateLoad(err)),
        };

        let context = RenderContext::from_document(document, helpers::today())?;
        let html = self.renderer.render(&template, &context)?;

        let rendered = self.exporter.export(kind, html).await?;
        info!("PDF ready ({} bytes)", rendered.bytes.len());
        Ok(rendered)
    }
}
