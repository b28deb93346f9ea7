use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::error::CdpError;
use thiserror::Error;

/// Input file missing, unreadable, or not a resume-shaped JSON document.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read resume data from '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse resume data in '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Only the theme renderer can fail; the inline template is total.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode resume for theme: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to start theme command '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Theme I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Theme command exited with {status}: {stderr}")]
    ThemeFailed { status: String, stderr: String },

    #[error("Theme produced non UTF-8 output: {0}")]
    InvalidOutput(#[from] std::string::FromUtf8Error),

    #[error("Theme produced no HTML")]
    EmptyOutput,
}

/// Browser launch, page lifecycle, print or output-file failures.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Invalid browser configuration: {0}")]
    Config(String),

    #[error("Failed to launch browser: {0}")]
    Launch(#[source] CdpError),

    #[error("Page error: {0}")]
    Page(#[source] CdpError),

    #[error("Page did not settle within {0:?}")]
    SettleTimeout(Duration),

    #[error("Print to PDF failed: {0}")]
    Print(#[source] CdpError),

    #[error("Failed to write PDF to '{}': {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level error for one batch run. Every variant is fatal.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}
