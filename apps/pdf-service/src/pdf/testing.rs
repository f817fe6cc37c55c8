//! In-memory browser used by unit and router tests. The "PDF" it prints is a
//! PDF header followed by the loaded HTML, so tests can check what was rendered.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::pdf::browser::{BrowserInstance, BrowserLauncher, PdfOptions, PdfPage};
use crate::pdf::error::{BrowserError, ExportError};

pub const FAKE_PDF_HEADER: &[u8] = b"%PDF-1.4\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFailure {
    LoadTimeout,
    Print,
    Panic,
}

#[derive(Default)]
struct Counters {
    launches: AtomicUsize,
    browsers_closed: AtomicUsize,
    pages_opened: AtomicUsize,
    pages_closed: AtomicUsize,
    last_options: Mutex<Option<PdfOptions>>,
    browsers: Mutex<Vec<Arc<FakeBrowser>>>,
}

pub struct FakeLauncher {
    fail_launch: bool,
    page_failure: Option<PageFailure>,
    liveness_delay: Duration,
    counters: Arc<Counters>,
}

impl FakeLauncher {
    pub fn new() -> Arc<Self> {
        Self::build(false, None)
    }

    pub fn failing_launch() -> Arc<Self> {
        Self::build(true, None)
    }

    pub fn with_page_failure(failure: PageFailure) -> Arc<Self> {
        Self::build(false, Some(failure))
    }

    /// Browsers whose liveness check blocks for `delay`, like a busy Chrome.
    pub fn with_slow_liveness(delay: Duration) -> Arc<Self> {
        let mut launcher = Self::unshared(false, None);
        launcher.liveness_delay = delay;
        Arc::new(launcher)
    }

    fn build(fail_launch: bool, page_failure: Option<PageFailure>) -> Arc<Self> {
        Arc::new(Self::unshared(fail_launch, page_failure))
    }

    fn unshared(fail_launch: bool, page_failure: Option<PageFailure>) -> Self {
        Self {
            fail_launch,
            page_failure,
            liveness_delay: Duration::ZERO,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn browsers_closed(&self) -> usize {
        self.counters.browsers_closed.load(Ordering::SeqCst)
    }

    pub fn pages_opened(&self) -> usize {
        self.counters.pages_opened.load(Ordering::SeqCst)
    }

    pub fn pages_closed(&self) -> usize {
        self.counters.pages_closed.load(Ordering::SeqCst)
    }

    pub fn last_print_options(&self) -> Option<PdfOptions> {
        self.counters.last_options.lock().unwrap().clone()
    }

    /// Makes every browser launched so far stop answering liveness probes.
    pub fn kill_browsers(&self) {
        for browser in self.counters.browsers.lock().unwrap().iter() {
            browser.alive.store(false, Ordering::SeqCst);
        }
    }
}

impl BrowserLauncher for FakeLauncher {
    fn launch(&self) -> Result<Arc<dyn BrowserInstance>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no chrome binary".to_string()));
        }
        // Widen the window for racing launches in concurrency tests.
        std::thread::sleep(Duration::from_millis(20));
        self.counters.launches.fetch_add(1, Ordering::SeqCst);

        let browser = Arc::new(FakeBrowser {
            alive: AtomicBool::new(true),
            liveness_delay: self.liveness_delay,
            page_failure: self.page_failure,
            counters: Arc::clone(&self.counters),
        });
        self.counters
            .browsers
            .lock()
            .unwrap()
            .push(Arc::clone(&browser));
        Ok(browser)
    }
}

struct FakeBrowser {
    alive: AtomicBool,
    liveness_delay: Duration,
    page_failure: Option<PageFailure>,
    counters: Arc<Counters>,
}

impl BrowserInstance for FakeBrowser {
    fn new_page(&self) -> Result<Box<dyn PdfPage>, BrowserError> {
        self.counters.pages_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakePage {
            html: None,
            failure: self.page_failure,
            counters: Arc::clone(&self.counters),
        }))
    }

    fn is_alive(&self) -> bool {
        std::thread::sleep(self.liveness_delay);
        self.alive.load(Ordering::SeqCst)
    }

    fn close(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.counters.browsers_closed.fetch_add(1, Ordering::SeqCst);
    }
}

struct FakePage {
    html: Option<String>,
    failure: Option<PageFailure>,
    counters: Arc<Counters>,
}

impl PdfPage for FakePage {
    fn load_html(&mut self, html: &str, timeout: Duration) -> Result<(), ExportError> {
        if self.failure == Some(PageFailure::LoadTimeout) {
            return Err(ExportError::ContentLoadTimeout(timeout));
        }
        self.html = Some(html.to_string());
        Ok(())
    }

    fn print_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        match self.failure {
            Some(PageFailure::Print) => {
                return Err(ExportError::Print("printer on fire".to_string()))
            }
            Some(PageFailure::Panic) => panic!("renderer crashed"),
            _ => {}
        }
        *self.counters.last_options.lock().unwrap() = Some(options.clone());

        let mut pdf = FAKE_PDF_HEADER.to_vec();
        pdf.extend_from_slice(self.html.as_deref().unwrap_or_default().as_bytes());
        Ok(pdf)
    }

    fn close(self: Box<Self>) -> Result<(), ExportError> {
        self.counters.pages_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
