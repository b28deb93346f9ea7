use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_SETTLE_TIMEOUT_SECS: u64 = 30;

/// Which rendering strategy the batch uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererKind {
    /// Built-in template (canonical).
    Inline,
    /// External theme command: resume JSON on stdin, HTML on stdout.
    Theme { program: String, args: Vec<String> },
}

/// Run configuration loaded from environment variables (and `.env` if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Running under continuous integration; disables the browser sandbox.
    pub ci: bool,
    /// Base directory the job input/output paths are resolved against.
    pub workdir: PathBuf,
    pub renderer: RendererKind,
    /// Explicit Chrome/Chromium binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    /// Upper bound on waiting for a loaded page to go quiet before printing.
    pub settle_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let renderer = match get("RESUME_RENDERER").as_deref().map(str::trim) {
            None | Some("inline") => RendererKind::Inline,
            Some("theme") => parse_theme_command(
                &get("RESUME_THEME_COMMAND")
                    .context("RESUME_THEME_COMMAND is required when RESUME_RENDERER=theme")?,
            )?,
            Some(other) => bail!("RESUME_RENDERER must be 'inline' or 'theme', got '{other}'"),
        };

        let settle_secs = match get("RESUME_SETTLE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .with_context(|| {
                    format!("RESUME_SETTLE_TIMEOUT_SECS must be a positive integer, got '{raw}'")
                })?,
            None => DEFAULT_SETTLE_TIMEOUT_SECS,
        };

        Ok(Config {
            ci: get("CI").map(|v| is_truthy(&v)).unwrap_or(false),
            workdir: get("RESUME_WORKDIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            renderer,
            chrome_executable: get("CHROME_EXECUTABLE").map(PathBuf::from),
            settle_timeout: Duration::from_secs(settle_secs),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no"
    )
}

fn parse_theme_command(raw: &str) -> Result<RendererKind> {
    let mut parts = raw.split_whitespace().map(str::to_string);
    let program = parts
        .next()
        .context("RESUME_THEME_COMMAND must name a program")?;
    Ok(RendererKind::Theme {
        program,
        args: parts.collect(),
    })
}
