//! `enex2md convert` command implementation.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use enex_config::{CliSettings, Config};
use enex_core::{EnexParser, ParseSummary};
use enex_writer::{NoteWriter, WriterOptions};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the `.enex` export.
    input: PathBuf,

    /// Output directory (overrides config, default: notes/).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Do not write attachment files (links are still emitted).
    #[arg(long)]
    no_attachments: bool,

    /// Write note bodies as raw ENML instead of rendering them.
    #[arg(long)]
    raw: bool,

    /// Write all notes to stdout instead of a directory.
    #[arg(long, conflicts_with_all = ["output_dir", "dry_run"])]
    stdout: bool,

    /// List the files that would be written without writing them.
    #[arg(long)]
    dry_run: bool,

    /// Path to configuration file (default: auto-discover enex2md.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded, the export is
    /// malformed, or a note cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        if !self.input.is_file() {
            return Err(CliError::Validation(format!(
                "Input file not found: {}",
                self.input.display()
            )));
        }

        let cli_settings = CliSettings {
            output_dir: self.output_dir.clone(),
            extract_attachments: self.no_attachments.then_some(false),
            render_enabled: self.raw.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let options = WriterOptions {
            extract_attachments: config.output_resolved.extract_attachments,
            render: config.render.enabled,
            dry_run: self.dry_run,
        };

        if self.stdout {
            let stdout = io::stdout().lock();
            let mut writer = NoteWriter::to_stream(stdout).with_options(options);
            parse(&self.input, &mut writer)?;
            if let Some(mut stdout) = writer.into_inner() {
                stdout.flush()?;
            }
            return Ok(());
        }

        let output_dir = &config.output_resolved.dir;
        output.field("Input", self.input.display());
        output.field("Output", output_dir.display());

        let mut writer = NoteWriter::to_dir(output_dir).with_options(options);
        let summary = parse(&self.input, &mut writer)?;

        if self.dry_run {
            output.notice("Dry run, no files written:");
            for path in writer.written_files() {
                output.planned(path);
            }
        }

        if summary.notes == 0 {
            output.notice("No notes found in export");
            return Ok(());
        }

        let verb = if self.dry_run { "Would convert" } else { "Converted" };
        output.done(&format!(
            "{verb} {} notes ({} attachments) to {}",
            summary.notes,
            summary.attachments,
            output_dir.display()
        ));
        Ok(())
    }
}

fn parse<W: Write>(input: &Path, writer: &mut NoteWriter<W>) -> Result<ParseSummary, CliError> {
    let summary = EnexParser::new().parse_file(input, writer)?;
    tracing::info!(
        notes = summary.notes,
        attachments = summary.attachments,
        "Export converted"
    );
    Ok(summary)
}
