//! The LIME grammar front end: tokenizer (`classify`) and recursive-descent
//! parser (`parser`) that together turn `.lime` source text into a
//! [`ParsedGrammar`], grounded on `lime_grammar.py`.

pub mod classify;
pub mod parser;

use crate::types::{Action, IStringStore, Rule, Symbol, Token};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LexPattern {
  Literal(String),
  Regex(String),
}

#[derive(Debug, Clone)]
pub struct LexRule {
  pub token:        Symbol,
  pub token_name:   Option<String>,
  pub pattern:      LexPattern,
  pub pattern_name: Option<String>,
  pub action:       Option<Action>,
  pub tok:          Token,
}

#[derive(Debug, Clone)]
pub enum SymAnnotation {
  /// `%% LHS :: { type }`: the target-language type produced by LHS.
  Type(String),
  /// `LHS :: discard`: tokens of this kind never reach the parser.
  Discard,
  /// `LHS :: void`: no value is carried by this symbol.
  Void,
}

/// The result of parsing one `.lime` source file: rules, lexical rules,
/// directives and annotations, still in declaration order and not yet
/// validated against each other (that happens when a [`Grammar`] is built
/// from this). Grounded on `lime_grammar.py`'s `_ParsedGrammar`.
#[derive(Debug, Clone, Default)]
pub struct ParsedGrammar {
  pub rules:         Vec<Rule>,
  pub extra_symbols: Vec<Symbol>,
  pub context_lexer: bool,
  pub lex_rules:      Vec<LexRule>,
  pub sym_annot:     FxHashMap<Symbol, SymAnnotation>,
  pub user_include:  Option<String>,
  pub token_type:    Option<String>,
  /// `%test LHS ::= w1 w2 ... .`: a grammar-level acceptance case, consumed
  /// by the test tooling layer rather than by table construction.
  pub tests:         Vec<GrammarTest>,
  /// `%root A.` or `%root A(v) ::= ...`: an explicitly declared start
  /// symbol, with the position of the declaration for diagnostics. `None`
  /// falls back to the first rule's LHS, matching `Grammar::new`'s default.
  pub root:          Option<(Symbol, Token)>,
}

#[derive(Debug, Clone)]
pub struct GrammarTest {
  pub left:  Symbol,
  pub right: Vec<Symbol>,
  pub tok:   Token,
}

impl ParsedGrammar {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_discard(&self, symbol: Symbol) -> bool {
    matches!(self.sym_annot.get(&symbol), Some(SymAnnotation::Discard))
  }
}

pub fn parse_str(source: &str, path: &str, store: &IStringStore) -> Result<ParsedGrammar, parser::LimeParseError> {
  let path_id = store.intern(path);
  let tokens = classify::tokenize(source, &path_id, store).map_err(parser::LimeParseError::Classify)?;
  parser::Parser::new(&tokens, store).parse_grammar()
}
