//! Document Export Service — HTML in, PDF bytes out.

use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::pdf::browser::{BrowserSession, PdfOptions, PdfPage};
use crate::pdf::error::ExportError;
use crate::pdf::templates::DocumentKind;

/// Finished PDF, handed straight back to the caller.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Bytes,
}

/// A page checked out for one request. Dropping the lease closes the page,
/// so every exit path (including a panic on the blocking thread) releases it
/// exactly once.
struct PageLease {
    page: ManuallyDrop<Box<dyn PdfPage>>,
}

impl PageLease {
    fn new(page: Box<dyn PdfPage>) -> Self {
        Self {
            page: ManuallyDrop::new(page),
        }
    }

    fn page(&mut self) -> &mut dyn PdfPage {
        &mut **self.page
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        // SAFETY: `page` is taken only here and the lease is never touched again.
        let page = unsafe { ManuallyDrop::take(&mut self.page) };
        if let Err(e) = page.close() {
            warn!("Failed to close render page: {e}");
        }
    }
}

pub struct DocumentExporter {
    session: Arc<BrowserSession>,
    options: PdfOptions,
    load_timeout: Duration,
}

impl DocumentExporter {
    pub fn new(session: Arc<BrowserSession>, load_timeout: Duration) -> Self {
        Self {
            session,
            options: PdfOptions::a4(),
            load_timeout,
        }
    }

    /// Renders `html` to PDF on a fresh page of the shared browser.
    pub async fn export(
        &self,
        kind: DocumentKind,
        html: String,
    ) -> Result<RenderedDocument, ExportError> {
        let browser = self.session.ensure_started().await?;
        let options = self.options.clone();
        let timeout = self.load_timeout;

        let pdf = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ExportError> {
            let mut lease = PageLease::new(browser.new_page()?);
            lease.page().load_html(&html, timeout)?;
            lease.page().print_pdf(&options)
        })
        .await
        .map_err(|e| ExportError::Aborted(e.to_string()))??;

        debug!("Exported {kind} PDF ({} bytes)", pdf.len());

        Ok(RenderedDocument {
            bytes: Bytes::from(pdf),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::error::BrowserError;
    use crate::pdf::testing::{FakeLauncher, PageFailure};

    fn exporter(launcher: &Arc<FakeLauncher>) -> DocumentExporter {
        let session = Arc::new(BrowserSession::new(launcher.clone()));
        DocumentExporter::new(session, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_export_returns_pdf_and_closes_page() {
        let launcher = FakeLauncher::new();
        let doc = exporter(&launcher)
            .export(DocumentKind::Resume, "<p>hello</p>".to_string())
            .await
            .unwrap();

        assert!(doc.bytes.starts_with(b"%PDF"));
        assert_eq!(launcher.pages_opened(), 1);
        assert_eq!(launcher.pages_closed(), 1);
    }

    #[tokio::test]
    async fn test_export_uses_a4_half_inch_margins() {
        let launcher = FakeLauncher::new();
        exporter(&launcher)
            .export(DocumentKind::CoverLetter, "<p/>".to_string())
            .await
            .unwrap();

        assert_eq!(launcher.last_print_options(), Some(PdfOptions::a4()));
    }

    #[tokio::test]
    async fn test_load_failure_still_closes_page() {
        let launcher = FakeLauncher::with_page_failure(PageFailure::LoadTimeout);
        let result = exporter(&launcher)
            .export(DocumentKind::Resume, "<p/>".to_string())
            .await;

        assert!(matches!(result, Err(ExportError::ContentLoadTimeout(_))));
        assert_eq!(launcher.pages_opened(), 1);
        assert_eq!(launcher.pages_closed(), 1);
    }

    #[tokio::test]
    async fn test_print_failure_still_closes_page() {
        let launcher = FakeLauncher::with_page_failure(PageFailure::Print);
        let result = exporter(&launcher)
            .export(DocumentKind::Resume, "<p/>".to_string())
            .await;

        assert!(matches!(result, Err(ExportError::Print(_))));
        assert_eq!(launcher.pages_closed(), 1);
    }

    #[tokio::test]
    async fn test_panicking_page_is_closed_once() {
        let launcher = FakeLauncher::with_page_failure(PageFailure::Panic);
        let result = exporter(&launcher)
            .export(DocumentKind::Resume, "<p/>".to_string())
            .await;

        assert!(matches!(result, Err(ExportError::Aborted(_))));
        assert_eq!(launcher.pages_closed(), 1);
    }

    #[tokio::test]
    async fn test_browser_unavailable_opens_no_page() {
        let launcher = FakeLauncher::failing_launch();
        let result = exporter(&launcher)
            .export(DocumentKind::Resume, "<p/>".to_string())
            .await;

        assert!(matches!(
            result,
            Err(ExportError::Browser(BrowserError::Launch(_)))
        ));
        assert_eq!(launcher.pages_opened(), 0);
    }

    #[tokio::test]
    async fn test_pages_are_released_across_many_requests() {
        let launcher = FakeLauncher::new();
        let exporter = exporter(&launcher);
        for i in 0..5 {
            exporter
                .export(DocumentKind::Resume, format!("<p>{i}</p>"))
                .await
                .unwrap();
        }

        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.pages_opened(), 5);
        assert_eq!(launcher.pages_closed(), 5);
    }
}
