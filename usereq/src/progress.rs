//! `--verbose` progress lines (`  OK    <path>` and friends) written to stderr.
//!
//! These are product output, not diagnostics, so they bypass `tracing`.

use std::fmt::Display;
use std::io::Write;

/// Optional sink for progress lines. Quiet when constructed without one.
pub struct Progress<'a> {
    sink: Option<&'a mut dyn Write>,
}

impl<'a> Progress<'a> {
    pub fn quiet() -> Self {
        Self { sink: None }
    }

    pub fn new(verbose: bool, sink: &'a mut dyn Write) -> Self {
        Self {
            sink: verbose.then_some(sink),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.sink.is_some()
    }

    pub fn line(&mut self, message: impl Display) {
        if let Some(sink) = self.sink.as_mut() {
            // Progress output is best effort.
            let _ = writeln!(sink, "{message}");
        }
    }

    pub fn ok(&mut self, path: impl Display) {
        self.line(format_args!("  OK    {path}"));
    }

    pub fn skip(&mut self, path: impl Display, reason: impl Display) {
        self.line(format_args!("  SKIP  {path} ({reason})"));
    }

    pub fn fail(&mut self, path: impl Display, reason: impl Display) {
        self.line(format_args!("  FAIL  {path} ({reason})"));
    }
}
