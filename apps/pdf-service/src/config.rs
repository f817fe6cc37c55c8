use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Service configuration loaded from environment variables.
/// Every variable has a default; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory holding the `.hbs` resume and cover-letter templates.
    pub templates_dir: PathBuf,
    /// Single origin allowed by CORS (the frontend).
    pub client_url: String,
    /// Explicit Chrome/Chromium binary. Auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    /// Upper bound on content load and PDF print for one page.
    pub render_timeout: Duration,
    /// How long the browser connection may stay silent before it is considered dead.
    pub browser_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "3003")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            templates_dir: PathBuf::from(env_or("TEMPLATES_DIR", "templates")),
            client_url: env_or("CLIENT_URL", "http://localhost:5173"),
            chrome_path: std::env::var("CHROME_PATH").ok().map(PathBuf::from),
            render_timeout: secs_env("RENDER_TIMEOUT_SECS", 30)?,
            browser_idle_timeout: secs_env("BROWSER_IDLE_TIMEOUT_SECS", 600)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn secs_env(key: &str, default: u64) -> Result<Duration> {
    match std::env::var(key) {
        Ok(raw) => parse_secs(&raw)
            .with_context(|| format!("{key} must be a positive number of seconds")),
        Err(_) => Ok(Duration::from_secs(default)),
    }
}

fn parse_secs(raw: &str) -> Result<Duration> {
    let secs = raw.trim().parse::<u64>()?;
    anyhow::ensure!(secs > 0, "zero is not a usable timeout");
    Ok(Duration::from_secs(secs))
}
