//! Source-position tracking, carried by LIME/regex AST nodes purely for
//! diagnostics. Never hashed into any of the core algorithm's keys (rules,
//! items, FA states) — see SPEC_FULL.md §3.

use super::istring::{IString, IStringStore};

/// A span of LIME or regex source text, with a resolved line/column for the
/// start of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Token {
  pub source:      Option<IString>,
  pub byte_offset: u32,
  pub byte_len:    u32,
  pub line:        u32,
  pub column:      u32,
}

impl Token {
  pub fn new(source: IString, byte_offset: u32, byte_len: u32, line: u32, column: u32) -> Self {
    Self { source: Some(source), byte_offset, byte_len, line, column }
  }

  /// A token with no known source location, used for synthetic nodes
  /// (e.g. the augmented start rule) that never surface in diagnostics.
  pub fn synthetic() -> Self {
    Self::default()
  }

  pub fn path_string(&self, store: &IStringStore) -> String {
    match self.source {
      Some(id) => id.to_string(store),
      None => "<synthetic>".to_string(),
    }
  }
}

impl std::fmt::Display for Token {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

/// Tracks line/column while scanning a source buffer, the way the LIME
/// classifier and regex lexer both need to as they produce `Token`s.
pub struct LineTracker {
  line:   u32,
  column: u32,
}

impl LineTracker {
  pub fn new() -> Self {
    Self { line: 1, column: 1 }
  }

  pub fn advance(&mut self, ch: char) {
    if ch == '\n' {
      self.line += 1;
      self.column = 1;
    } else {
      self.column += 1;
    }
  }

  pub fn line(&self) -> u32 {
    self.line
  }

  pub fn column(&self) -> u32 {
    self.column
  }
}

impl Default for LineTracker {
  fn default() -> Self {
    Self::new()
  }
}
