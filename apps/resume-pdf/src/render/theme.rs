use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::errors::RenderError;
use crate::models::resume::ResumeDocument;
use crate::render::ResumeRenderer;

/// Delegates rendering to an external theme command.
///
/// The whole resume (unknown keys included) is written to the command's
/// stdin as JSON; the command must print a complete HTML document on stdout.
/// The theme's own styling is authoritative.
pub struct ThemeRenderer {
    program: String,
    args: Vec<String>,
}

impl ThemeRenderer {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait]
impl ResumeRenderer for ThemeRenderer {
    fn name(&self) -> &'static str {
        "theme"
    }

    async fn render(&self, doc: &ResumeDocument) -> Result<String, RenderError> {
        let payload = serde_json::to_vec(doc)?;
        debug!(
            "Running theme command '{}' with {} byte payload",
            self.program,
            payload.len()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("theme stdin was not captured"))?;

        // Feed stdin while draining stdout so a chatty theme cannot block on a full pipe.
        let feed = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(RenderError::ThemeFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        match fed {
            // Theme exited successfully without reading all of stdin.
            Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("Theme command closed stdin early");
            }
            other => other?,
        }

        let html = String::from_utf8(output.stdout)?;
        if html.trim().is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(html)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;

    fn sh(script: &str) -> ThemeRenderer {
        ThemeRenderer::new("sh".to_string(), vec!["-c".to_string(), script.to_string()])
    }

    fn sample() -> ResumeDocument {
        serde_json::from_value(json!({
            "basics": { "name": "Ada Lovelace", "email": "ada@example.com" },
            "projects": [{ "name": "Engine" }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_theme_receives_whole_document() {
        let out = ThemeRenderer::new("cat".to_string(), vec![])
            .render(&sample())
            .await
            .unwrap();

        let echoed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(echoed["basics"]["email"], "ada@example.com");
        assert_eq!(echoed["projects"][0]["name"], "Engine");
    }

    #[tokio::test]
    async fn test_theme_html_returned_verbatim() {
        let html = sh("cat >/dev/null; printf '<html><body>themed</body></html>'")
            .render(&sample())
            .await
            .unwrap();
        assert_eq!(html, "<html><body>themed</body></html>");
    }

    #[tokio::test]
    async fn test_theme_ignoring_stdin_still_succeeds() {
        let mut resume = sample();
        resume.basics.as_mut().unwrap().summary = Some("x".repeat(1 << 20));

        let html = sh("printf '<html><body>static</body></html>'")
            .render(&resume)
            .await
            .unwrap();
        assert_eq!(html, "<html><body>static</body></html>");
    }

    #[tokio::test]
    async fn test_theme_failure_carries_stderr() {
        let err = sh("cat >/dev/null; echo 'bad theme' >&2; exit 3")
            .render(&sample())
            .await
            .unwrap_err();
        match err {
            RenderError::ThemeFailed { stderr, .. } => assert_eq!(stderr, "bad theme"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_theme_empty_output() {
        let err = sh("cat >/dev/null").render(&sample()).await.unwrap_err();
        assert!(matches!(err, RenderError::EmptyOutput));
    }

    #[tokio::test]
    async fn test_missing_theme_program() {
        let err = ThemeRenderer::new("definitely-not-a-theme-binary".to_string(), vec![])
            .render(&sample())
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Spawn { .. }));
    }
}
