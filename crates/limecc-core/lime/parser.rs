//! Recursive-descent parser from a tokenized `.lime` source to a
//! [`ParsedGrammar`], grounded on `lime_grammar.py`'s `LimeGrammar` class
//! (there driven by the project's own bootstrapped LR parser; here a
//! hand-written descent, since the statement-level grammar is a small,
//! unambiguous fixed set of shapes that reads more directly this way).

use super::{
  classify::{ClassifyError, LimeToken, LimeTokenKind},
  GrammarTest, LexPattern, LexRule, ParsedGrammar, SymAnnotation,
};
use crate::types::{Action, IStringStore, Rule, Symbol, Token};
use rustc_hash::FxHashMap;

#[derive(Debug, thiserror::Error)]
pub enum LimeParseError {
  #[error(transparent)]
  Classify(#[from] ClassifyError),
  #[error("{0}: unexpected end of input")]
  UnexpectedEof(String),
  #[error("{pos}: expected {expected}, found {found:?} {text:?}")]
  Unexpected { pos: Token, expected: &'static str, found: LimeTokenKind, text: String },
  #[error("{pos}: unknown directive '{name}'")]
  UnknownDirective { pos: Token, name: String },
  #[error("{pos}: expected 'discard' or 'void' after '::'")]
  InvalidTypeAnnotation { pos: Token },
}

pub struct Parser<'a> {
  tokens:          &'a [LimeToken],
  cursor:          usize,
  store:           &'a IStringStore,
  implicit_tokens: FxHashMap<LexPattern, Symbol>,
  grammar:         ParsedGrammar,
}

impl<'a> Parser<'a> {
  pub fn new(tokens: &'a [LimeToken], store: &'a IStringStore) -> Self {
    Self { tokens, cursor: 0, store, implicit_tokens: FxHashMap::default(), grammar: ParsedGrammar::new() }
  }

  fn peek(&self) -> Option<&LimeToken> {
    self.tokens.get(self.cursor)
  }

  fn peek_at(&self, offset: usize) -> Option<&LimeToken> {
    self.tokens.get(self.cursor + offset)
  }

  fn bump(&mut self) -> Option<&'a LimeToken> {
    let tok = self.tokens.get(self.cursor);
    if tok.is_some() {
      self.cursor += 1;
    }
    tok
  }

  fn eof_err(&self) -> LimeParseError {
    LimeParseError::UnexpectedEof(self.tokens.last().map(|t| t.pos.to_string()).unwrap_or_default())
  }

  fn expect_kind(&mut self, kind: LimeTokenKind, expected: &'static str) -> Result<&'a LimeToken, LimeParseError> {
    match self.bump() {
      Some(tok) if tok.kind == kind => Ok(tok),
      Some(tok) => Err(LimeParseError::Unexpected { pos: tok.pos, expected, found: tok.kind, text: tok.text.clone() }),
      None => Err(self.eof_err()),
    }
  }

  fn expect_text(&mut self, kind: LimeTokenKind, text: &str, expected: &'static str) -> Result<&'a LimeToken, LimeParseError> {
    match self.bump() {
      Some(tok) if tok.kind == kind && tok.text == text => Ok(tok),
      Some(tok) => Err(LimeParseError::Unexpected { pos: tok.pos, expected, found: tok.kind, text: tok.text.clone() }),
      None => Err(self.eof_err()),
    }
  }

  fn at_punct(&self, ch: char) -> bool {
    matches!(self.peek(), Some(tok) if tok.kind == LimeTokenKind::Punct && tok.text == ch.to_string())
  }

  fn at_op(&self, text: &str) -> bool {
    matches!(self.peek(), Some(tok) if tok.kind == LimeTokenKind::Op && tok.text == text)
  }

  /// Parses an optional `(ID)` name-binding suffix, shared by `lex_lhs` and
  /// the LHS of `rule_stmt`.
  fn parse_optional_paren_name(&mut self) -> Result<Option<String>, LimeParseError> {
    if !self.at_punct('(') {
      return Ok(None);
    }
    self.bump();
    let name = self.expect_kind(LimeTokenKind::Id, "a name")?.text.clone();
    self.expect_text(LimeTokenKind::Punct, ")", "')'")?;
    Ok(Some(name))
  }

  pub fn parse_grammar(mut self) -> Result<ParsedGrammar, LimeParseError> {
    while let Some(tok) = self.peek() {
      if tok.kind == LimeTokenKind::Id && tok.text.starts_with('%') {
        self.parse_directive()?;
        continue;
      }
      self.parse_statement()?;
    }
    Ok(self.grammar)
  }

  fn parse_directive(&mut self) -> Result<(), LimeParseError> {
    let tok = self.bump().unwrap();
    let pos = tok.pos;
    match tok.text.as_str() {
      "%include" => {
        let snippet = self.expect_kind(LimeTokenKind::Snippet, "a { } snippet")?;
        self.grammar.user_include = Some(snippet.text.clone());
      }
      "%token_type" => {
        let snippet = self.expect_kind(LimeTokenKind::Snippet, "a { } snippet")?;
        self.grammar.token_type = Some(snippet.text.clone());
      }
      "%context_lexer" => {
        self.grammar.context_lexer = true;
      }
      "%test" => return self.parse_test_stmt(pos),
      "%root" => return self.parse_root_stmt(pos),
      "%discard" => return self.parse_discard_stmt(pos),
      other => return Err(LimeParseError::UnknownDirective { pos, name: other.to_string() }),
    }
    Ok(())
  }

  fn parse_statement(&mut self) -> Result<(), LimeParseError> {
    let lhs_tok = self.expect_kind(LimeTokenKind::Id, "a non-terminal or token name")?;
    let lhs_text = lhs_tok.text.clone();
    let lhs_pos = lhs_tok.pos;
    let lhs = Symbol::intern(self.store, &lhs_text);

    if self.at_op("::") {
      self.bump();
      return self.parse_type_stmt(lhs, lhs_pos);
    }

    let name = self.parse_optional_paren_name()?;

    if self.at_op("~=") {
      self.bump();
      return self.parse_lex_stmt(lhs, name, lhs_pos);
    }
    if self.at_op("::=") {
      self.bump();
      return self.parse_rule_stmt(lhs, lhs_pos);
    }

    match self.peek() {
      Some(tok) => Err(LimeParseError::Unexpected { pos: tok.pos, expected: "'::', '~=' or '::='", found: tok.kind, text: tok.text.clone() }),
      None => Err(self.eof_err()),
    }
  }

  fn parse_type_stmt(&mut self, lhs: Symbol, pos: Token) -> Result<(), LimeParseError> {
    let annot = match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let text = tok.text.clone();
        self.bump();
        SymAnnotation::Type(text)
      }
      Some(tok) if tok.kind == LimeTokenKind::Id && tok.text == "discard" => {
        self.bump();
        SymAnnotation::Discard
      }
      Some(tok) if tok.kind == LimeTokenKind::Id && tok.text == "void" => {
        self.bump();
        SymAnnotation::Void
      }
      _ => return Err(LimeParseError::InvalidTypeAnnotation { pos }),
    };
    self.grammar.sym_annot.insert(lhs, annot);
    Ok(())
  }

  fn parse_lex_stmt(&mut self, lhs: Symbol, token_name: Option<String>, pos: Token) -> Result<(), LimeParseError> {
    let (pattern, pattern_name) = match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let text = tok.text.clone();
        self.bump();
        (LexPattern::Regex(text), self.parse_optional_paren_name()?)
      }
      Some(tok) if tok.kind == LimeTokenKind::Ql => {
        let text = tok.text.clone();
        self.bump();
        (LexPattern::Literal(text), self.parse_optional_paren_name()?)
      }
      _ => return Err(LimeParseError::Unexpected { pos, expected: "a regex snippet or a quoted literal", found: LimeTokenKind::Id, text: String::new() }),
    };

    let action = match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let a = Some(Action::snippet(0, tok.text.clone(), tok.pos));
        self.bump();
        a
      }
      _ => None,
    };

    self.grammar.extra_symbols.push(lhs);
    self.grammar.lex_rules.push(LexRule { token: lhs, token_name, pattern, pattern_name, action, tok: pos });
    Ok(())
  }

  /// `%test LHS ::= w1 w2 ... .`: reuses rule-body syntax but records the
  /// result as a grammar-level acceptance case rather than a production.
  fn parse_test_stmt(&mut self, pos: Token) -> Result<(), LimeParseError> {
    let left = Symbol::intern(self.store, &self.expect_kind(LimeTokenKind::Id, "a non-terminal name")?.text.clone());
    self.expect_text(LimeTokenKind::Op, "::=", "'::='")?;
    let mut right = Vec::new();
    while !self.at_op(".") {
      right.push(self.parse_named_item()?);
    }
    self.bump(); // '.'
    self.grammar.tests.push(GrammarTest { left, right, tok: pos });
    Ok(())
  }

  /// `%root A.` declares `A` as the start symbol with no accompanying
  /// production; `%root A(v) ::= X Y Z.` declares it inline as part of a
  /// full rule (the root for the whole grammar, not just this production).
  /// Either way the trailing `.` is the same rule-terminating period used
  /// elsewhere, since a directive here is really just a tagged statement.
  fn parse_root_stmt(&mut self, pos: Token) -> Result<(), LimeParseError> {
    let lhs_tok = self.expect_kind(LimeTokenKind::Id, "a non-terminal name")?;
    let lhs = Symbol::intern(self.store, &lhs_tok.text.clone());
    let lhs_pos = lhs_tok.pos;
    self.grammar.root = Some((lhs, pos));

    self.parse_optional_paren_name()?;
    if self.at_op("::=") {
      self.bump();
      return self.parse_rule_stmt(lhs, lhs_pos);
    }
    match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Op && tok.text == "." => {
        self.bump();
        Ok(())
      }
      Some(tok) => Err(LimeParseError::Unexpected { pos: tok.pos, expected: "'.' or '::='", found: tok.kind, text: tok.text.clone() }),
      None => Err(self.eof_err()),
    }
  }

  /// `%discard "lit"` or `%discard {regex}`: lifts an anonymous token the
  /// same way an inline RHS literal/regex would, then marks it discarded,
  /// equivalent in effect to declaring a named token and annotating it
  /// `:: discard` but with no name of its own to reference.
  fn parse_discard_stmt(&mut self, pos: Token) -> Result<(), LimeParseError> {
    let sym = match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Ql => {
        let text = tok.text.clone();
        self.bump();
        self.lift_implicit(LexPattern::Literal(text), pos)
      }
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let text = tok.text.clone();
        self.bump();
        self.lift_implicit(LexPattern::Regex(text), pos)
      }
      Some(tok) => return Err(LimeParseError::Unexpected { pos: tok.pos, expected: "a quoted literal or a regex snippet", found: tok.kind, text: tok.text.clone() }),
      None => return Err(self.eof_err()),
    };
    self.grammar.sym_annot.insert(sym, SymAnnotation::Discard);
    Ok(())
  }

  fn parse_rule_stmt(&mut self, lhs: Symbol, pos: Token) -> Result<(), LimeParseError> {
    let mut right = Vec::new();
    while !self.at_op(".") {
      right.push(self.parse_named_item()?);
    }
    self.bump(); // '.'

    let action = match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let a = Action::snippet(0, tok.text.clone(), tok.pos);
        self.bump();
        a
      }
      _ => Action::default_unbox(0),
    };

    self.grammar.rules.push(Rule::new(lhs, right, action, pos));
    Ok(())
  }

  fn parse_named_item(&mut self) -> Result<Symbol, LimeParseError> {
    match self.peek() {
      Some(tok) if tok.kind == LimeTokenKind::Id => {
        let text = tok.text.clone();
        self.bump();
        self.parse_optional_paren_name()?;
        Ok(Symbol::intern(self.store, &text))
      }
      Some(tok) if tok.kind == LimeTokenKind::Ql => {
        let text = tok.text.clone();
        let pos = tok.pos;
        self.bump();
        Ok(self.lift_implicit(LexPattern::Literal(text), pos))
      }
      Some(tok) if tok.kind == LimeTokenKind::Snippet => {
        let text = tok.text.clone();
        let pos = tok.pos;
        self.bump();
        Ok(self.lift_implicit(LexPattern::Regex(text), pos))
      }
      Some(tok) => Err(LimeParseError::Unexpected { pos: tok.pos, expected: "a symbol, literal, or inline regex", found: tok.kind, text: tok.text.clone() }),
      None => Err(self.eof_err()),
    }
  }

  /// Returns the anonymous token for an inline literal/regex RHS item,
  /// minting a fresh `_implicit_N` token and a matching lexical rule the
  /// first time this exact pattern is seen. Grounded on `_lex_rhs`.
  fn lift_implicit(&mut self, pattern: LexPattern, pos: Token) -> Symbol {
    if let Some(&sym) = self.implicit_tokens.get(&pattern) {
      return sym;
    }
    let name = format!("_implicit_{}", self.implicit_tokens.len());
    let sym = Symbol::intern(self.store, &name);
    self.implicit_tokens.insert(pattern.clone(), sym);
    self.grammar.extra_symbols.push(sym);
    self.grammar.lex_rules.push(LexRule { token: sym, token_name: None, pattern, pattern_name: None, action: None, tok: pos });
    sym
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::{lime::classify::tokenize, types::IStringStore};

  fn parse(store: &IStringStore, source: &str) -> ParsedGrammar {
    let path = store.intern("<test>");
    let tokens = tokenize(source, &path, store).expect("valid lime tokens");
    Parser::new(&tokens, store).parse_grammar().expect("valid lime source")
  }

  #[test]
  fn bare_root_directive_records_the_named_symbol() {
    let store = IStringStore::new();
    let g = parse(&store, "num ~= {[0-9]+}\nexpr ::= num.\n%root expr.\n");
    let root = g.root.expect("root directive should be recorded");
    assert_eq!(root.0.name(&store), "expr");
  }

  #[test]
  fn inline_root_directive_also_pushes_a_rule() {
    let store = IStringStore::new();
    let g = parse(&store, "num ~= {[0-9]+}\n%root expr ::= num.\n");
    assert_eq!(g.root.expect("root recorded").0.name(&store), "expr");
    assert_eq!(g.rules.len(), 1);
    assert_eq!(g.rules[0].left.name(&store), "expr");
  }

  #[test]
  fn discard_directive_with_a_quoted_literal_lifts_an_anonymous_discard_token() {
    let store = IStringStore::new();
    let g = parse(&store, "%discard ' '\nnum ~= {[0-9]+}\nexpr ::= num.\n");
    assert_eq!(g.lex_rules.len(), 2); // the discard token plus `num`
    let discard_rule = g.lex_rules.iter().find(|r| matches!(&r.pattern, LexPattern::Literal(s) if s == " ")).expect("discard literal rule");
    assert!(g.is_discard(discard_rule.token));
  }

  #[test]
  fn discard_directive_with_a_regex_lifts_an_anonymous_discard_token() {
    let store = IStringStore::new();
    let g = parse(&store, "%discard {\\s+}\nnum ~= {[0-9]+}\nexpr ::= num.\n");
    let discard_rule = g.lex_rules.iter().find(|r| matches!(&r.pattern, LexPattern::Regex(s) if s == "\\s+")).expect("discard regex rule");
    assert!(g.is_discard(discard_rule.token));
  }
}
