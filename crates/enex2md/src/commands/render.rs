//! `enex2md render` command implementation.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use enex_core::EnmlRenderer;

use crate::error::CliError;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Path to an ENML document (`<en-note>` root).
    file: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid ENML.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let enml = std::fs::read_to_string(&self.file)?;
        tracing::info!(file = %self.file.display(), bytes = enml.len(), "Rendering");

        let markdown = EnmlRenderer::new().render(&enml)?;

        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{markdown}")?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enex_core::RenderError;
    use tempfile::TempDir;

    fn args(file: PathBuf) -> RenderArgs {
        RenderArgs {
            file,
            verbose: false,
        }
    }

    #[test]
    fn test_render_missing_file() {
        let err = args(PathBuf::from("/nonexistent/note.enml"))
            .execute()
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_render_invalid_root() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("note.html");
        std::fs::write(&file, "<html>Hi</html>").unwrap();

        let err = args(file).execute().unwrap_err();
        assert!(matches!(
            err,
            CliError::Render(RenderError::UnexpectedRootElement(_))
        ));
    }

    #[test]
    fn test_render_valid_document() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("note.enml");
        std::fs::write(&file, "<en-note><div>Hi</div></en-note>").unwrap();

        args(file).execute().unwrap();
    }
}
