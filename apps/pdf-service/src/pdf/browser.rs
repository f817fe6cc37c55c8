//! Render Process Manager — owns the one headless browser shared by every
//! render request.
//!
//! The browser API is blocking, so the traits here are synchronous and every
//! call into them is made from `spawn_blocking`. `BrowserSession` is the only
//! writer of the shared instance: it launches lazily, hands out the running
//! instance, and closes it on shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::pdf::error::{BrowserError, ExportError};

/// Print settings applied to every exported document.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_in: f64,
    pub print_background: bool,
    pub prefer_css_page_size: bool,
}

impl PdfOptions {
    /// A4, backgrounds on, half-inch margins, template `@page` rules honored.
    pub fn a4() -> Self {
        Self {
            paper_width_in: 8.27,
            paper_height_in: 11.7,
            margin_in: 0.5,
            print_background: true,
            prefer_css_page_size: true,
        }
    }
}

/// Starts a browser process.
pub trait BrowserLauncher: Send + Sync {
    fn launch(&self) -> Result<Arc<dyn BrowserInstance>, BrowserError>;
}

/// A running browser process.
pub trait BrowserInstance: Send + Sync {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, BrowserError>;

    /// Cheap round-trip to the process; false once it has gone away.
    fn is_alive(&self) -> bool;

    fn close(&self);
}

/// One page, owned by a single render request.
pub trait PdfPage: Send {
    /// Loads `html` and waits until it has settled, bounded by `timeout`.
    fn load_html(&mut self, html: &str, timeout: Duration) -> Result<(), ExportError>;

    fn print_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, ExportError>;

    /// Consumes the page so it cannot be closed twice.
    fn close(self: Box<Self>) -> Result<(), ExportError>;
}

/// Shared ownership of the (at most one) browser process.
pub struct BrowserSession {
    launcher: Arc<dyn BrowserLauncher>,
    instance: Mutex<Option<Arc<dyn BrowserInstance>>>,
}

impl BrowserSession {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            instance: Mutex::new(None),
        }
    }

    /// Returns the running browser, launching one if none is held or the held
    /// one stopped responding. Concurrent callers share a single launch.
    ///
    /// The liveness probe runs outside the lock, so a slow browser delays
    /// only the callers probing it.
    pub async fn ensure_started(&self) -> Result<Arc<dyn BrowserInstance>, BrowserError> {
        let held = self.instance.lock().await.clone();

        let Some(existing) = held else {
            let mut guard = self.instance.lock().await;
            if let Some(current) = guard.as_ref() {
                return Ok(Arc::clone(current));
            }
            return self.launch_into(&mut guard).await;
        };

        let probe = Arc::clone(&existing);
        let alive = tokio::task::spawn_blocking(move || probe.is_alive())
            .await
            .unwrap_or(false);
        if alive {
            return Ok(existing);
        }

        let mut guard = self.instance.lock().await;
        // Another caller may already have replaced the dead instance.
        let replaced = guard
            .as_ref()
            .filter(|current| !Arc::ptr_eq(current, &existing))
            .cloned();
        if let Some(current) = replaced {
            return Ok(current);
        }
        if let Some(stale) = guard.take() {
            warn!("Browser stopped responding, relaunching");
            close_blocking(stale).await;
        }
        self.launch_into(&mut guard).await
    }

    async fn launch_into(
        &self,
        slot: &mut Option<Arc<dyn BrowserInstance>>,
    ) -> Result<Arc<dyn BrowserInstance>, BrowserError> {
        let launcher = Arc::clone(&self.launcher);
        let browser = tokio::task::spawn_blocking(move || launcher.launch())
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))??;

        info!("Headless browser launched");
        *slot = Some(Arc::clone(&browser));
        Ok(browser)
    }

    /// Closes the browser if one is running. Safe to call repeatedly.
    pub async fn shutdown(&self) {
        let taken = self.instance.lock().await.take();
        if let Some(browser) = taken {
            close_blocking(browser).await;
            info!("Headless browser closed");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.instance.lock().await.is_some()
    }
}

async fn close_blocking(browser: Arc<dyn BrowserInstance>) {
    if let Err(e) = tokio::task::spawn_blocking(move || browser.close()).await {
        warn!("Browser close task failed: {e}");
    }
}
