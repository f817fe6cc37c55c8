use std::sync::Arc;

use crate::pdf::browser::BrowserSession;
use crate::pdf::PdfGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pdf: Arc<PdfGenerator>,
    /// Same session the generator renders through; exposed for health reporting.
    pub browser: Arc<BrowserSession>,
}
