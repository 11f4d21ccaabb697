//! The crate's top-level error type, grounded on radlr's flat
//! `SherpaError` enum aggregated via `#[from]`: every front-end and
//! construction error funnels into one type that `compile()` can return.

use crate::{lexer_assembly::LexerAssemblyError, lime::parser::LimeParseError, lr::LrConflict, regex::RegexError, types::Token};

#[derive(Debug, thiserror::Error)]
pub enum LimeError {
  #[error("parsing grammar source: {0}")]
  Parse(#[from] LimeParseError),

  #[error("compiling a lexical pattern: {0}")]
  Regex(#[from] RegexError),

  #[error("assembling the lexer: {0}")]
  LexerAssembly(#[from] LexerAssemblyError),

  #[error("{0}")]
  LrConflict(#[from] LrConflict),

  #[error("grammar has no root: at least one rule is required")]
  EmptyGrammar,

  #[error("{pos}: symbol '{name}' is never defined by a rule or a lexical rule")]
  UndefinedSymbol { name: String, pos: Token },

  #[error("{pos}: non-terminal '{name}' is never reachable from the root")]
  UnreachableNonterm { name: String, pos: Token },

  #[error("symbol '{name}' is declared both as a lexical token and as the left side of a grammar rule")]
  TokenNontermCollision { name: String },
}

impl LimeError {
  pub fn undefined_symbol(name: impl Into<String>, pos: Token) -> Self {
    Self::UndefinedSymbol { name: name.into(), pos }
  }

  pub fn unreachable_nonterm(name: impl Into<String>, pos: Token) -> Self {
    Self::UnreachableNonterm { name: name.into(), pos }
  }
}
