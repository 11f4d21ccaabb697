//! The finished output of compiling one `.lime` grammar: an LR(k) table
//! plus its lexer DFA(s) and the symbol metadata needed to interpret them,
//! bundled as a plain `serde`-able value so a caller (this crate's own CLI
//! debug dumps, or an external emitter) never has to re-run construction.
//! Grounded on §4.8/§10.3's description of the assembled result as "the
//! second half of this crate's output, alongside the LR table".

use crate::{
  fa::Fa,
  lime::{LexPattern, ParsedGrammar},
  lr::LrTable,
  types::Symbol,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How a given token is matched, mirroring the token table's `TokenKind`
/// from SPEC_FULL.md §4.6: a literal or regex pattern owned by a lex rule,
/// or a bare terminal with no lexical definition of its own, expected to be
/// supplied by an externally implemented scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TokenKind {
  Literal(String),
  Regex(String),
  Named,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenInfo {
  pub symbol: Symbol,
  pub name:   String,
  pub kind:   TokenKind,
  pub discard: bool,
}

/// Either one DFA shared by the whole parser, or one per admissible-token
/// equivalence class with a per-LR-state assignment, mirroring §4.6/§4.8.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LexerTable {
  Global(Fa<usize>),
  Context { lexers: Vec<Fa<usize>>, state_lexer: Vec<usize> },
}

/// The complete compiled artifact: grammar, LR table, lexer table(s), and
/// enough symbol metadata to print or re-derive target-language bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledGrammar {
  pub lr:     LrTableData,
  pub lexer:  LexerTable,
  pub tokens: Vec<TokenInfo>,
}

/// `LrTable` itself isn't `Serialize` (it embeds `Grammar`, which already
/// derives it) -- this wraps the pieces callers actually want to dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LrTableData {
  pub grammar:         crate::types::Grammar,
  pub state_count:     usize,
  pub accepting_state: usize,
  pub k:                usize,
}

impl From<&LrTable> for LrTableData {
  fn from(lr: &LrTable) -> Self {
    Self { grammar: lr.grammar.clone(), state_count: lr.states.len(), accepting_state: lr.accepting_state, k: lr.k }
  }
}

impl CompiledGrammar {
  pub fn assemble(lr: &LrTable, lexer: LexerTable, parsed: &ParsedGrammar, store: &crate::types::IStringStore) -> Self {
    let discard: std::collections::HashSet<Symbol, rustc_hash::FxBuildHasher> =
      parsed.sym_annot.iter().filter(|(_, a)| matches!(a, crate::lime::SymAnnotation::Discard)).map(|(&s, _)| s).collect();

    let mut by_symbol: FxHashMap<Symbol, &crate::lime::LexRule> = FxHashMap::default();
    for rule in &parsed.lex_rules {
      by_symbol.insert(rule.token, rule);
    }

    let mut tokens = Vec::new();
    for &symbol in lr.grammar.terminals().collect::<std::collections::BTreeSet<_>>().iter() {
      let name = symbol.name(store);
      let kind = match by_symbol.get(&symbol) {
        Some(rule) => match &rule.pattern {
          LexPattern::Literal(s) => TokenKind::Literal(s.clone()),
          LexPattern::Regex(s) => TokenKind::Regex(s.clone()),
        },
        None => TokenKind::Named,
      };
      tokens.push(TokenInfo { symbol, name, kind, discard: discard.contains(&symbol) });
    }

    Self { lr: LrTableData::from(lr), lexer, tokens }
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{config::GeneratorConfig, types::IStringStore};

  #[test]
  fn assembling_a_small_grammar_round_trips_through_json() {
    let store = IStringStore::new();
    let source = "expr ::= 'x'.\n";
    // `'x'` is lifted to an anonymous literal token; no explicit lex rule needed.
    let parsed = crate::lime::parse_str(source, "<test>", &store).expect("valid lime source");
    let compiled = crate::compile(&store, parsed, GeneratorConfig::default()).expect("grammar should compile");
    let json = compiled.to_json().expect("serializable");
    assert!(json.contains("\"k\""));
  }
}
