//! Batch Driver — runs every render job, in order, against a single browser.
//!
//! Flow per job: load_resume → renderer.render → printer.print_to_pdf → notice.
//! The first error stops the batch; the browser is closed exactly once either way.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{error, info};

use crate::config::Config;
use crate::errors::GenerateError;
use crate::loader::load_resume;
use crate::printer::{BrowserSettings, ChromePrinter, DocumentPrinter, PageOptions};
use crate::render::{build_renderer, ResumeRenderer};

/// One input data file and the PDF it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl RenderJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// The fixed job list: one resume per language, resolved against `root`.
pub fn default_jobs(root: &Path) -> Vec<RenderJob> {
    [
        ("resume.json", "public/resume/resume.pdf"),
        ("resume.ja.json", "public/resume/resume-ja.pdf"),
    ]
    .into_iter()
    .map(|(input, output)| RenderJob::new(root.join(input), root.join(output)))
    .collect()
}

/// Launches the browser, runs the default jobs and always closes the browser.
///
/// A job error takes precedence over a close error; the latter is only logged then.
pub async fn run_batch(config: &Config) -> Result<Vec<PathBuf>, GenerateError> {
    let jobs = default_jobs(&config.workdir);
    let renderer = build_renderer(&config.renderer);
    info!(
        "Rendering {} resume(s) with the {} renderer",
        jobs.len(),
        renderer.name()
    );

    let printer = ChromePrinter::launch(
        &BrowserSettings::from_config(config),
        PageOptions::default(),
    )
    .await?;

    let outcome = run_jobs(&jobs, renderer.as_ref(), &printer).await;
    let closed = printer.close().await;

    match (outcome, closed) {
        (Ok(outputs), Ok(())) => Ok(outputs),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), closed) => {
            if let Err(close_err) = closed {
                error!("Failed to close browser after job error: {close_err}");
            }
            Err(err)
        }
    }
}

/// Runs jobs strictly one after another, stopping at the first failure.
/// Returns the output paths written.
pub async fn run_jobs(
    jobs: &[RenderJob],
    renderer: &dyn ResumeRenderer,
    printer: &dyn DocumentPrinter,
) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(jobs.len());

    for job in jobs {
        let started = Instant::now();

        let resume = load_resume(&job.input).await?;
        let html = renderer.render(&resume).await?;
        drop(resume);
        printer.print_to_pdf(&html, &job.output).await?;

        info!(
            "Rendered {} -> {} in {:?}",
            job.input.display(),
            job.output.display(),
            started.elapsed()
        );
        println!("Generated {}", job.output.display());
        written.push(job.output.clone());
    }

    Ok(written)
}
