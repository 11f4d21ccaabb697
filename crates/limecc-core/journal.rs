//! Diagnostics accumulated while compiling a grammar, grounded on
//! `sherpa-core`'s `journal` module: a shared scratch pad of reports that
//! non-fatal passes (principally the LIME front end) append to instead of
//! aborting on the first problem. Simplified to single-threaded use -- this
//! crate never compiles more than one grammar concurrently per `Journal` --
//! but keeping the `Arc<RwLock<_>>` shape so a caller can clone a `Journal`
//! and still see diagnostics recorded by a compile running elsewhere.

use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
  Warning,
  Error,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub severity: Severity,
  pub message:  String,
}

impl Diagnostic {
  pub fn warning(message: impl Into<String>) -> Self {
    Self { severity: Severity::Warning, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { severity: Severity::Error, message: message.into() }
  }
}

impl std::fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let tag = match self.severity {
      Severity::Warning => "warning",
      Severity::Error => "error",
    };
    write!(f, "{tag}: {}", self.message)
  }
}

/// A named group of diagnostics produced by one compilation pass (e.g.
/// "lime parse", "lr(k) construction"), grounded on `Report`.
#[derive(Debug, Default, Clone)]
pub struct Report {
  pub name:        String,
  pub diagnostics: Vec<Diagnostic>,
}

impl Report {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), diagnostics: Vec::new() }
  }

  pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(|d| d.severity == Severity::Error)
  }
}

#[derive(Default)]
struct ScratchPad {
  reports: Vec<Report>,
}

/// Accumulates [`Report`]s across one or more compile passes. Cheap to
/// clone: clones share the same underlying pad.
#[derive(Clone, Default)]
pub struct Journal {
  pad: Arc<RwLock<ScratchPad>>,
}

impl Journal {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, report: Report) {
    self.pad.write().unwrap().reports.push(report);
  }

  pub fn warn(&self, pass: &str, message: impl Into<String>) {
    self.push_single(pass, Diagnostic::warning(message));
  }

  pub fn error(&self, pass: &str, message: impl Into<String>) {
    self.push_single(pass, Diagnostic::error(message));
  }

  fn push_single(&self, pass: &str, diagnostic: Diagnostic) {
    self.pad.write().unwrap().reports.push(Report { name: pass.to_string(), diagnostics: vec![diagnostic] });
  }

  pub fn has_errors(&self) -> bool {
    self.pad.read().unwrap().reports.iter().any(Report::has_errors)
  }

  pub fn reports(&self) -> Vec<Report> {
    self.pad.read().unwrap().reports.clone()
  }

  pub fn clear(&self) {
    self.pad.write().unwrap().reports.clear();
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn clones_share_the_same_pad() {
    let journal = Journal::new();
    let clone = journal.clone();
    clone.warn("lime parse", "unused token 'foo'");
    assert_eq!(journal.reports().len(), 1);
    assert!(!journal.has_errors());
  }

  #[test]
  fn an_error_report_is_detected() {
    let journal = Journal::new();
    journal.error("lr(k) construction", "shift/reduce conflict in state 3");
    assert!(journal.has_errors());
  }
}
