//! HTML rendering — pluggable strategy turning a resume into a complete HTML document.
//!
//! Default: `InlineRenderer` (embedded template + stylesheet, total, deterministic).
//! Alternative: `ThemeRenderer` (external theme command, resume JSON in, HTML out).
//!
//! The batch driver only sees `dyn ResumeRenderer`, chosen once from config.

pub mod escape;
pub mod inline;
pub mod theme;

use async_trait::async_trait;

use crate::config::RendererKind;
use crate::errors::RenderError;
use crate::models::resume::ResumeDocument;

pub use inline::InlineRenderer;
pub use theme::ThemeRenderer;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// A rendering strategy. Implementations must return a self-contained HTML
/// document (no external stylesheets or assets).
#[async_trait]
pub trait ResumeRenderer: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn render(&self, doc: &ResumeDocument) -> Result<String, RenderError>;
}

/// Builds the renderer selected by configuration.
pub fn build_renderer(kind: &RendererKind) -> Box<dyn ResumeRenderer> {
    match kind {
        RendererKind::Inline => Box::new(InlineRenderer),
        RendererKind::Theme { program, args } => {
            Box::new(ThemeRenderer::new(program.clone(), args.clone()))
        }
    }
}
