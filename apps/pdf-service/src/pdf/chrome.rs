//! Chrome/Chromium implementation of the browser traits via `headless_chrome`.

use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::pdf::browser::{BrowserInstance, BrowserLauncher, PdfOptions, PdfPage};
use crate::pdf::error::{BrowserError, ExportError};

/// Flags for running inside containers and other constrained hosts.
const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--no-zygote",
    "--disable-gpu",
];

/// Resolves once web fonts referenced by the page have loaded.
const FONTS_READY: &str = "document.fonts.ready.then(() => true)";

pub struct ChromeLauncher {
    chrome_path: Option<PathBuf>,
    idle_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>, idle_timeout: Duration) -> Self {
        Self {
            chrome_path,
            idle_timeout,
        }
    }
}

impl BrowserLauncher for ChromeLauncher {
    fn launch(&self) -> Result<Arc<dyn BrowserInstance>, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .path(self.chrome_path.clone())
            .args(CHROME_ARGS.iter().map(OsStr::new).collect())
            .idle_browser_timeout(self.idle_timeout)
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| BrowserError::Launch(e.to_string()))?;

        Ok(Arc::new(ChromeInstance {
            browser: Mutex::new(Some(browser)),
        }))
    }
}

/// Dropping the `Browser` kills the Chrome process.
struct ChromeInstance {
    browser: Mutex<Option<Browser>>,
}

impl ChromeInstance {
    fn browser(&self) -> Option<Browser> {
        self.browser.lock().ok().and_then(|guard| guard.clone())
    }
}

impl BrowserInstance for ChromeInstance {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, BrowserError> {
        let browser = self
            .browser()
            .ok_or_else(|| BrowserError::Page("browser has been closed".to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::Page(e.to_string()))?;

        Ok(Box::new(ChromePage { tab, staged: None }))
    }

    fn is_alive(&self) -> bool {
        self.browser()
            .is_some_and(|browser| browser.get_version().is_ok())
    }

    fn close(&self) {
        if let Ok(mut guard) = self.browser.lock() {
            guard.take();
        }
    }
}

struct ChromePage {
    tab: Arc<Tab>,
    /// The HTML is served from a temp file; it must outlive the print.
    staged: Option<NamedTempFile>,
}

impl ChromePage {
    fn stage(&mut self, html: &str) -> Result<String, ExportError> {
        let mut file = tempfile::Builder::new()
            .prefix("render-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| ExportError::ContentLoad(e.to_string()))?;
        file.write_all(html.as_bytes())
            .map_err(|e| ExportError::ContentLoad(e.to_string()))?;

        let url = format!("file://{}", file.path().display());
        self.staged = Some(file);
        Ok(url)
    }
}

/// One budget shared by every step of a content load.
struct LoadDeadline {
    started: Instant,
    timeout: Duration,
}

impl LoadDeadline {
    fn start(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            timeout,
        }
    }

    fn remaining(&self) -> Result<Duration, ExportError> {
        match self.timeout.checked_sub(self.started.elapsed()) {
            Some(left) if !left.is_zero() => Ok(left),
            _ => Err(ExportError::ContentLoadTimeout(self.timeout)),
        }
    }

    /// Runs `step` with the tab's timeout set to what is left of the budget.
    fn step(
        &self,
        tab: &Tab,
        step: impl FnOnce(&Tab) -> anyhow::Result<()>,
    ) -> Result<(), ExportError> {
        tab.set_default_timeout(self.remaining()?);
        step(tab).map_err(|e| match self.remaining() {
            Ok(_) => ExportError::ContentLoad(e.to_string()),
            Err(timed_out) => timed_out,
        })
    }
}

impl PdfPage for ChromePage {
    fn load_html(&mut self, html: &str, timeout: Duration) -> Result<(), ExportError> {
        let url = self.stage(html)?;
        let deadline = LoadDeadline::start(timeout);

        deadline.step(&self.tab, |tab| tab.navigate_to(&url).map(|_| ()))?;
        deadline.step(&self.tab, |tab| tab.wait_until_navigated().map(|_| ()))?;
        deadline.step(&self.tab, |tab| tab.evaluate(FONTS_READY, true).map(|_| ()))?;

        // Printing gets its own full budget.
        self.tab.set_default_timeout(timeout);
        debug!("Page content settled in {:?}", deadline.started.elapsed());
        Ok(())
    }

    fn print_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        let print = PrintToPdfOptions {
            print_background: Some(options.print_background),
            paper_width: Some(options.paper_width_in),
            paper_height: Some(options.paper_height_in),
            margin_top: Some(options.margin_in),
            margin_bottom: Some(options.margin_in),
            margin_left: Some(options.margin_in),
            margin_right: Some(options.margin_in),
            prefer_css_page_size: Some(options.prefer_css_page_size),
            ..Default::default()
        };

        self.tab
            .print_to_pdf(Some(print))
            .map_err(|e| ExportError::Print(e.to_string()))
    }

    fn close(self: Box<Self>) -> Result<(), ExportError> {
        self.tab
            .close(false)
            .map(|_| ())
            .map_err(|e| ExportError::Close(e.to_string()))
    }
}
