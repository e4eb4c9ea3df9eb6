//! Status reporting on stderr.
//!
//! stdout is reserved for markdown (`render`, `convert --stdout`).

use std::fmt::Display;
use std::path::Path;

use console::{Style, Term};

pub(crate) struct Output {
    term: Term,
    label: Style,
    path: Style,
    done: Style,
    notice: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            label: Style::new().bold(),
            path: Style::new().dim(),
            done: Style::new().green(),
            notice: Style::new().yellow(),
            failure: Style::new().red(),
        }
    }

    /// `Label: value` line, e.g. the input and output locations.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    /// Indented file path, as listed by a dry run.
    pub(crate) fn planned(&self, path: &Path) {
        self.line(&format!("  {}", self.path.apply_to(path.display())));
    }

    pub(crate) fn done(&self, msg: &str) {
        self.line(&self.done.apply_to(msg).to_string());
    }

    pub(crate) fn notice(&self, msg: &str) {
        self.line(&self.notice.apply_to(msg).to_string());
    }

    pub(crate) fn failure(&self, msg: &str) {
        self.line(&self.failure.apply_to(msg).to_string());
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }
}
