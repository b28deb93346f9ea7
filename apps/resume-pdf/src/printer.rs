//! PDF Printer — loads an HTML string into a throwaway browser page and prints it.
//!
//! One `ChromePrinter` owns one Chromium process for the whole batch. Each
//! print opens a fresh page, waits for it to settle, prints with the fixed
//! page options and closes the page on every exit path. Output is written to
//! a temp file next to the target and renamed into place, so a failed print
//! never leaves a truncated PDF behind.

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::BrowserError;

// ────────────────────────────────────────────────────────────────────────────
// Page options
// ────────────────────────────────────────────────────────────────────────────

/// A4 paper, (width, height) in inches.
pub const A4_IN: (f64, f64) = (8.27, 11.69);

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Fixed per-run print settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageOptions {
    /// (width, height) in inches.
    pub paper: (f64, f64),
    pub margins: Margins,
    /// Print CSS backgrounds and borders.
    pub print_background: bool,
}

impl Default for PageOptions {
    /// A4, 0.4in top/bottom, 0.5in left/right, backgrounds on.
    fn default() -> Self {
        Self {
            paper: A4_IN,
            margins: Margins {
                top: 0.4,
                right: 0.5,
                bottom: 0.4,
                left: 0.5,
            },
            print_background: true,
        }
    }
}

impl PageOptions {
    /// CDP `Page.printToPDF` parameters. CSS `@page` sizes are ignored so these options win.
    pub fn to_params(&self) -> PrintToPdfParams {
        let (width, height) = self.paper;
        PrintToPdfParams {
            paper_width: Some(width),
            paper_height: Some(height),
            margin_top: Some(self.margins.top),
            margin_right: Some(self.margins.right),
            margin_bottom: Some(self.margins.bottom),
            margin_left: Some(self.margins.left),
            print_background: Some(self.print_background),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Printer trait
// ────────────────────────────────────────────────────────────────────────────

/// Turns a complete HTML document into a PDF file at `output`, overwriting it.
#[async_trait]
pub trait DocumentPrinter: Send + Sync {
    async fn print_to_pdf(&self, html: &str, output: &Path) -> Result<(), BrowserError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Chromium implementation
// ────────────────────────────────────────────────────────────────────────────

/// Browser launch settings derived from `Config`.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// CI containers usually lack the privileges Chromium's sandbox needs.
    pub no_sandbox: bool,
    pub executable: Option<PathBuf>,
    pub settle_timeout: Duration,
}

impl BrowserSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            no_sandbox: config.ci,
            executable: config.chrome_executable.clone(),
            settle_timeout: config.settle_timeout,
        }
    }
}

/// A headless Chromium process plus the task driving its CDP connection.
pub struct ChromePrinter {
    browser: Browser,
    handler: JoinHandle<()>,
    options: PageOptions,
    settle_timeout: Duration,
}

impl ChromePrinter {
    pub async fn launch(
        settings: &BrowserSettings,
        options: PageOptions,
    ) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder();
        if settings.no_sandbox {
            // Adds --no-sandbox and --disable-setuid-sandbox.
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(BrowserError::Config)?;

        let (browser, mut events) = Browser::launch(browser_config)
            .await
            .map_err(BrowserError::Launch)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    debug!("Browser connection event error: {err}");
                }
            }
        });

        info!(
            "Browser launched (sandbox {})",
            if settings.no_sandbox { "disabled" } else { "enabled" }
        );

        Ok(Self {
            browser,
            handler,
            options,
            settle_timeout: settings.settle_timeout,
        })
    }

    /// Shuts the browser process down. Must be called exactly once.
    pub async fn close(mut self) -> Result<(), BrowserError> {
        let closed = self.browser.close().await.map(|_| ());
        if let Err(err) = self.browser.wait().await {
            warn!("Failed waiting for browser process to exit: {err}");
        }
        self.handler.abort();
        info!("Browser closed");
        closed.map_err(BrowserError::Page)
    }

    /// Loads the HTML, waits for navigation and web fonts, then prints.
    /// Loading and settling share one settle-timeout budget.
    async fn render_page(&self, page: &Page, html: &str) -> Result<Vec<u8>, BrowserError> {
        let load = async {
            page.set_content(html).await?;
            page.wait_for_navigation().await?;
            page.evaluate("document.fonts.ready.then(() => true)").await?;
            Ok::<_, CdpError>(())
        };
        within_settle_timeout(self.settle_timeout, load).await?;

        page.pdf(self.options.to_params())
            .await
            .map_err(BrowserError::Print)
    }
}

async fn within_settle_timeout<T>(
    limit: Duration,
    step: impl Future<Output = Result<T, CdpError>>,
) -> Result<T, BrowserError> {
    match tokio::time::timeout(limit, step).await {
        Ok(result) => result.map_err(BrowserError::Page),
        Err(_) => Err(BrowserError::SettleTimeout(limit)),
    }
}

#[async_trait]
impl DocumentPrinter for ChromePrinter {
    async fn print_to_pdf(&self, html: &str, output: &Path) -> Result<(), BrowserError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(BrowserError::Page)?;

        let printed = self.render_page(&page, html).await;
        let closed = page.close().await;

        let pdf = printed?;
        closed.map_err(BrowserError::Page)?;
        debug!("Printed {} bytes for {}", pdf.len(), output.display());

        write_pdf(output, pdf).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

/// Writes the PDF next to `output` and renames it into place.
pub async fn write_pdf(output: &Path, bytes: Vec<u8>) -> Result<(), BrowserError> {
    let target = output.to_path_buf();
    let written = tokio::task::spawn_blocking(move || write_atomically(&target, &bytes))
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result);

    written.map_err(|source| BrowserError::Output {
        path: output.to_path_buf(),
        source,
    })
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if bytes.is_empty() {
        return Err(std::io::Error::other("browser returned an empty PDF"));
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page_options() {
        let params = PageOptions::default().to_params();
        assert_eq!(params.paper_width, Some(8.27));
        assert_eq!(params.paper_height, Some(11.69));
        assert_eq!(params.margin_top, Some(0.4));
        assert_eq!(params.margin_right, Some(0.5));
        assert_eq!(params.margin_bottom, Some(0.4));
        assert_eq!(params.margin_left, Some(0.5));
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.prefer_css_page_size, Some(false));
    }

    #[test]
    fn test_settings_follow_ci_flag() {
        let mut config = Config::from_lookup(|_| None).unwrap();
        assert!(!BrowserSettings::from_config(&config).no_sandbox);
        config.ci = true;
        assert!(BrowserSettings::from_config(&config).no_sandbox);
    }

    #[tokio::test]
    async fn test_write_pdf_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("public/resume/resume.pdf");

        write_pdf(&out, b"%PDF-1.4 test".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-1.4 test");
    }

    #[tokio::test]
    async fn test_write_pdf_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("resume.pdf");
        std::fs::write(&out, b"old").unwrap();

        write_pdf(&out, b"%PDF-new".to_vec()).await.unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"%PDF-new");
    }

    #[tokio::test]
    async fn test_empty_pdf_leaves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("resume.pdf");
        std::fs::write(&out, b"previous").unwrap();

        let err = write_pdf(&out, Vec::new()).await.unwrap_err();
        assert!(matches!(err, BrowserError::Output { .. }));
        assert_eq!(std::fs::read(&out).unwrap(), b"previous");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome/Chromium install"]
    async fn test_prints_a4_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.pdf");
        let settings = BrowserSettings {
            no_sandbox: true,
            executable: std::env::var("CHROME_EXECUTABLE").ok().map(PathBuf::from),
            settle_timeout: Duration::from_secs(30),
        };

        let printer = ChromePrinter::launch(&settings, PageOptions::default())
            .await
            .unwrap();
        let printed = printer
            .print_to_pdf("<!DOCTYPE html><html><body><h1>Hello</h1></body></html>", &out)
            .await;
        printer.close().await.unwrap();
        printed.unwrap();

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_a4(&media_box(&bytes).unwrap());
    }

    /// First `/MediaBox [x0 y0 x1 y1]` in the file.
    fn media_box(pdf: &[u8]) -> Option<Vec<f64>> {
        let text = String::from_utf8_lossy(pdf);
        let rest = &text[text.find("/MediaBox")? + "/MediaBox".len()..];
        let inner = &rest[rest.find('[')? + 1..rest.find(']')?];
        inner.split_whitespace().map(|n| n.parse().ok()).collect()
    }

    /// A4 is 595.44 x 841.68 points; Chrome rounds to its own device units.
    fn assert_a4(mbox: &[f64]) {
        assert_eq!(mbox.len(), 4, "bad MediaBox {mbox:?}");
        let (width, height) = (mbox[2] - mbox[0], mbox[3] - mbox[1]);
        assert!((width - A4_IN.0 * 72.0).abs() < 2.0, "width {width}");
        assert!((height - A4_IN.1 * 72.0).abs() < 2.0, "height {height}");
    }

    #[test]
    fn test_media_box_geometry() {
        let page = b"3 0 obj\n<< /Type /Page /MediaBox [0 0 594.95996 841.91998] >>\nendobj";
        let mbox = media_box(page).unwrap();
        assert_eq!(mbox, vec![0.0, 0.0, 594.95996, 841.91998]);
        assert_a4(&mbox);
        assert!(media_box(b"%PDF-1.4 no pages").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_load_hits_settle_timeout() {
        let limit = Duration::from_secs(30);
        let err = within_settle_timeout(limit, std::future::pending::<Result<(), CdpError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::SettleTimeout(d) if d == limit));
    }

    #[tokio::test]
    async fn test_settled_load_passes_through() {
        let value = within_settle_timeout(Duration::from_secs(1), async { Ok::<_, CdpError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }
}
