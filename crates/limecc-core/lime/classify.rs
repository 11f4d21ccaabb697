//! Character classification and grouping for LIME source text, grounded on
//! `lime_grammar.py`'s `_LimeLexerClassify` plus `simple_lexer.py`'s
//! grouping loop. Produces a fully materialized token vector; the parser
//! in `super::parser` then works against it with ordinary lookahead
//! instead of a coroutine-style token stream.

use crate::types::{LineTracker, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimeTokenKind {
  Id,
  Ql,
  Snippet,
  Op,
  /// A single punctuation character with no other classification (e.g.
  /// `(`, `)`, `|`); its own text doubles as its symbol name.
  Punct,
}

#[derive(Debug, Clone)]
pub struct LimeToken {
  pub kind: LimeTokenKind,
  pub text: String,
  pub pos:  Token,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
  #[error("unterminated snippet starting at {0}")]
  UnterminatedSnippet(Token),
  #[error("unterminated quoted literal starting at {0}")]
  UnterminatedQuote(Token),
}

enum Class {
  Comment,
  Drop,
  Immediate,
  Group(LimeTokenKind),
}

struct Classifier {
  quote:   Option<char>,
  comment: bool,
  snippet: u32,
}

impl Classifier {
  fn new() -> Self {
    Self { quote: None, comment: false, snippet: 0 }
  }

  fn classify(&mut self, ch: char) -> Class {
    if self.snippet != 0 {
      if ch == '}' {
        self.snippet -= 1;
      } else if ch == '{' {
        self.snippet += 1;
      }
      return Class::Group(LimeTokenKind::Snippet);
    }

    if self.comment {
      if ch == '\n' {
        self.comment = false;
      }
      return Class::Comment;
    }

    if Some(ch) == self.quote {
      self.quote = None;
      return Class::Drop;
    }
    if self.quote.is_some() {
      return Class::Group(LimeTokenKind::Ql);
    }
    if ch == '\'' || ch == '"' {
      self.quote = Some(ch);
      return Class::Drop;
    }

    if ch == '{' {
      self.snippet = 1;
      return Class::Drop;
    }

    if ch == '#' {
      self.comment = true;
      return Class::Drop;
    }

    if ch.is_whitespace() {
      return Class::Drop;
    }

    if ch.is_alphanumeric() || ch == '_' || ch == '-' || ch == '%' {
      return Class::Group(LimeTokenKind::Id);
    }

    if "~:=.".contains(ch) {
      return Class::Group(LimeTokenKind::Op);
    }

    Class::Immediate
  }
}

/// Tokenizes `source`, filed under `path` (used only in diagnostics),
/// returning every token with its snippet/quote delimiters already
/// stripped. A trailing open snippet or quote is reported as an error
/// rather than silently truncated.
pub fn tokenize(source: &str, path: &crate::types::IString, store: &crate::types::IStringStore) -> Result<Vec<LimeToken>, ClassifyError> {
  let _ = store;
  let mut classifier = Classifier::new();
  let mut tracker = LineTracker::new();
  let mut tokens = Vec::new();

  let mut lit = String::new();
  let mut last_kind: Option<LimeTokenKind> = None;
  let mut group_start = Token::new(*path, 0, 0, 1, 1);

  let mut byte_offset = 0u32;
  for ch in source.chars() {
    let here = Token::new(*path, byte_offset, ch.len_utf8() as u32, tracker.line(), tracker.column());
    let class = classifier.classify(ch);

    match class {
      Class::Comment => {}
      Class::Drop => {
        if !lit.is_empty() {
          tokens.push(finish_group(last_kind.unwrap(), std::mem::take(&mut lit), group_start));
        }
        last_kind = None;
      }
      Class::Immediate => {
        if !lit.is_empty() {
          tokens.push(finish_group(last_kind.unwrap(), std::mem::take(&mut lit), group_start));
        }
        last_kind = None;
        tokens.push(LimeToken { kind: LimeTokenKind::Punct, text: ch.to_string(), pos: here });
      }
      Class::Group(kind) => {
        if !lit.is_empty() && last_kind != Some(kind) {
          tokens.push(finish_group(last_kind.unwrap(), std::mem::take(&mut lit), group_start));
        }
        if lit.is_empty() {
          group_start = here;
        }
        last_kind = Some(kind);
        lit.push(ch);
      }
    }

    tracker.advance(ch);
    byte_offset += ch.len_utf8() as u32;
  }

  if !lit.is_empty() {
    if let Some(LimeTokenKind::Snippet) = last_kind {
      return Err(ClassifyError::UnterminatedSnippet(group_start));
    }
    if classifier.quote.is_some() {
      return Err(ClassifyError::UnterminatedQuote(group_start));
    }
    tokens.push(finish_group(last_kind.unwrap(), lit, group_start));
  }

  Ok(tokens)
}

fn finish_group(kind: LimeTokenKind, mut text: String, pos: Token) -> LimeToken {
  if kind == LimeTokenKind::Snippet {
    // The trailing '}' is part of the grouped text (it still reports as
    // SNIPPET the instant the depth counter reaches zero); strip it here
    // the way `_lime_lexer` strips `tok.value[:-1]`.
    text.pop();
  }
  LimeToken { kind, text, pos }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::IStringStore;

  fn toks(src: &str) -> Vec<LimeToken> {
    let store = IStringStore::new();
    let path = store.intern("<test>");
    tokenize(src, &path, &store).unwrap()
  }

  #[test]
  fn splits_id_and_punct_and_op() {
    let t = toks("expr ::= mul.");
    let kinds: Vec<_> = t.iter().map(|x| (x.kind, x.text.as_str())).collect();
    assert_eq!(kinds, vec![
      (LimeTokenKind::Id, "expr"),
      (LimeTokenKind::Op, "::="),
      (LimeTokenKind::Id, "mul"),
      (LimeTokenKind::Op, "."),
    ]);
  }

  #[test]
  fn strips_quotes_from_literal() {
    let t = toks("'+'");
    assert_eq!(t.len(), 1);
    assert_eq!(t[0].kind, LimeTokenKind::Ql);
    assert_eq!(t[0].text, "+");
  }

  #[test]
  fn strips_comment_to_end_of_line() {
    let t = toks("a # comment\nb");
    let texts: Vec<_> = t.iter().map(|x| x.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b"]);
  }

  #[test]
  fn snippet_tracks_nested_braces_and_strips_trailing_close() {
    let t = toks("{ return { 1 }; }");
    assert_eq!(t.len(), 1);
    assert_eq!(t[0].kind, LimeTokenKind::Snippet);
    assert_eq!(t[0].text, " return { 1 }; ");
  }

  #[test]
  fn directive_keyword_is_an_id_starting_with_percent() {
    let t = toks("%token_type");
    assert_eq!(t.len(), 1);
    assert_eq!(t[0].kind, LimeTokenKind::Id);
    assert_eq!(t[0].text, "%token_type");
  }
}
