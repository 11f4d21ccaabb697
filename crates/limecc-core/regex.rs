//! A small regex dialect and its compiler to ε-NFA fragments, grounded on
//! `limecc`'s `regex_parser.py`. The grammar there is parsed with the
//! project's own LR engine bootstrapped on itself; here it is a
//! hand-written recursive-descent parser instead, since the regex
//! dialect's precedence (alternation < concatenation < repetition) reads
//! more directly that way than through a second LR instantiation.

use crate::{
  charlabel::CharLabel,
  fa::{Fa, StateId},
};

/// `\d`, `\s`, `\w` expand to these character sets, matching
/// `regex_parser.py`'s `_escape_map`. Any other escaped character
/// (`\.`, `\\`, `\n` meaning a literal backslash-n is NOT special --
/// only the three above are) stands for itself.
fn escape_chars(ch: char) -> CharLabel {
  match ch {
    'd' => CharLabel::set('0'..='9'),
    's' => CharLabel::set([' ', '\n', '\r', '\t', '\x0b', '\x0c']),
    'w' => CharLabel::set(('a'..='z').chain('A'..='Z').chain('0'..='9').chain(['_'])),
    other => CharLabel::single(other),
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Regex {
  Lit(CharLabel),
  Cat(Vec<Regex>),
  Alt(Vec<Regex>),
  Rep(Box<Regex>),
  /// The empty word, distinct from `Cat(vec![])` only in that it never
  /// appears after AST construction flattens concatenations -- kept for
  /// parity with `regex_parser.py`'s `None` placeholder.
  Empty,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum RegexError {
  #[error("unexpected end of regex pattern")]
  UnexpectedEnd,
  #[error("expected '{expected}' at position {position}, found '{found}'")]
  Expected { expected: char, found: char, position: usize },
  #[error("expected ']' to close a character class starting at position {position}")]
  UnclosedClass { position: usize },
  #[error("dangling '\\' at the end of the pattern")]
  DanglingEscape,
}

struct Parser<'a> {
  chars: std::iter::Peekable<std::iter::Enumerate<std::str::Chars<'a>>>,
}

impl<'a> Parser<'a> {
  fn new(input: &'a str) -> Self {
    Self { chars: input.chars().enumerate().peekable() }
  }

  fn peek(&mut self) -> Option<char> {
    self.chars.peek().map(|&(_, c)| c)
  }

  fn pos(&mut self) -> usize {
    self.chars.peek().map(|&(i, _)| i).unwrap_or(usize::MAX)
  }

  fn bump(&mut self) -> Option<char> {
    self.chars.next().map(|(_, c)| c)
  }

  fn eat(&mut self, expected: char) -> Result<(), RegexError> {
    match self.bump() {
      Some(c) if c == expected => Ok(()),
      Some(c) => Err(RegexError::Expected { expected, found: c, position: self.pos() }),
      None => Err(RegexError::UnexpectedEnd),
    }
  }

  /// `alt := cat ('|' cat)*`
  fn alt(&mut self) -> Result<Regex, RegexError> {
    let mut terms = vec![self.cat()?];
    while self.peek() == Some('|') {
      self.bump();
      terms.push(self.cat()?);
    }
    Ok(if terms.len() == 1 { terms.pop().unwrap() } else { Regex::Alt(terms) })
  }

  /// `cat := rep*`
  fn cat(&mut self) -> Result<Regex, RegexError> {
    let mut terms = Vec::new();
    while let Some(c) = self.peek() {
      if c == '|' || c == ')' {
        break;
      }
      terms.push(self.rep()?);
    }
    Ok(match terms.len() {
      0 => Regex::Empty,
      1 => terms.pop().unwrap(),
      _ => Regex::Cat(terms),
    })
  }

  /// `rep := atom ('*' | '+' | '?')?`
  fn rep(&mut self) -> Result<Regex, RegexError> {
    let atom = self.atom()?;
    Ok(match self.peek() {
      Some('*') => {
        self.bump();
        Regex::Rep(Box::new(atom))
      }
      Some('+') => {
        self.bump();
        Regex::Cat(vec![atom.clone(), Regex::Rep(Box::new(atom))])
      }
      Some('?') => {
        self.bump();
        Regex::Alt(vec![Regex::Empty, atom])
      }
      _ => atom,
    })
  }

  /// `atom := '(' alt ')' | '.' | c | esc | '[' range ']' | '[' '^' range ']'`
  fn atom(&mut self) -> Result<Regex, RegexError> {
    match self.bump().ok_or(RegexError::UnexpectedEnd)? {
      '(' => {
        let inner = self.alt()?;
        self.eat(')')?;
        Ok(inner)
      }
      '.' => Ok(Regex::Lit(CharLabel::any())),
      '[' => {
        let start = self.pos();
        let inv = self.peek() == Some('^');
        if inv {
          self.bump();
        }
        let set = self.char_class(start)?;
        self.eat(']')?;
        Ok(Regex::Lit(CharLabel::new(set, inv)))
      }
      '\\' => {
        let esc = self.bump().ok_or(RegexError::DanglingEscape)?;
        Ok(Regex::Lit(escape_chars(esc)))
      }
      ch => Ok(Regex::Lit(CharLabel::single(ch))),
    }
  }

  /// `range := range_elem*`, where `range_elem` is a literal char, a
  /// `lo-hi` span, or an escape.
  fn char_class(&mut self, start: usize) -> Result<Vec<char>, RegexError> {
    let mut chars = Vec::new();
    loop {
      match self.peek() {
        None => return Err(RegexError::UnclosedClass { position: start }),
        Some(']') => break,
        Some('\\') => {
          self.bump();
          let esc = self.bump().ok_or(RegexError::DanglingEscape)?;
          chars.extend(escape_chars(esc).explicit_chars());
        }
        Some(c) => {
          self.bump();
          if self.peek() == Some('-') {
            self.bump();
            let hi = self.bump().ok_or(RegexError::UnexpectedEnd)?;
            chars.extend((c..=hi).collect::<Vec<_>>());
          } else {
            chars.push(c);
          }
        }
      }
    }
    Ok(chars)
  }
}

/// Parses a regex pattern into its AST.
pub fn parse(input: &str) -> Result<Regex, RegexError> {
  let mut parser = Parser::new(input);
  let regex = parser.alt()?;
  if let Some(c) = parser.peek() {
    return Err(RegexError::Expected { expected: ')', found: c, position: parser.pos() });
  }
  Ok(regex)
}

/// Builds an ε-NFA fragment for `regex`, wiring its single initial and
/// final state into `fa`, labeling the final state with `accept`.
/// Grounded on `regex_parser.py`'s `make_enfa_from_regex`.
pub fn to_enfa<L: Clone + Eq + std::hash::Hash>(regex: &Regex, accept: L) -> Fa<L> {
  let mut fa = Fa::new();
  let initial = fa.new_state();
  let finalst = fa.new_state();
  fa.initial.insert(initial);
  fa.set_accept(finalst, accept);

  add_regex_edge(&mut fa, initial, finalst, regex);
  fa
}

fn add_regex_edge<L: Clone + Eq + std::hash::Hash>(fa: &mut Fa<L>, src: StateId, sink: StateId, regex: &Regex) {
  match regex {
    Regex::Empty => fa.connect(src, sink, None),
    Regex::Lit(label) => fa.connect(src, sink, Some(label.clone())),
    Regex::Alt(terms) => {
      for term in terms {
        let mid = fa.new_state();
        add_regex_edge(fa, src, mid, term);
        fa.connect(mid, sink, None);
      }
    }
    Regex::Rep(term) => {
      let mid = fa.new_state();
      fa.connect(src, mid, None);
      fa.connect(mid, sink, None);
      add_regex_edge(fa, mid, mid, term);
    }
    Regex::Cat(terms) => {
      if let Some((last, rest)) = terms.split_last() {
        let mut cur = src;
        for term in rest {
          let mid = fa.new_state();
          add_regex_edge(fa, cur, mid, term);
          cur = mid;
        }
        add_regex_edge(fa, cur, sink, last);
      } else {
        fa.connect(src, sink, None);
      }
    }
  }
}

/// Builds an ε-NFA fragment for an exact literal string: a chain of `n+1`
/// states connected by single-character edges. Grounded on
/// `regex_parser.py`'s `make_dfa_from_literal`.
pub fn literal_enfa<L: Clone + Eq + std::hash::Hash>(literal: &str, accept: L) -> Fa<L> {
  let mut fa = Fa::new();
  let mut cur = fa.new_state();
  fa.initial.insert(cur);
  for ch in literal.chars() {
    let next = fa.new_state();
    fa.connect(cur, next, Some(CharLabel::single(ch)));
    cur = next;
  }
  fa.set_accept(cur, accept);
  fa
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn parses_alternation_concatenation_and_repetition() {
    let re = parse("ab*|c+").unwrap();
    match re {
      Regex::Alt(terms) => assert_eq!(terms.len(), 2),
      other => panic!("expected Alt, got {other:?}"),
    }
  }

  #[test]
  fn parses_character_class_and_range() {
    let re = parse("[a-z_]").unwrap();
    match re {
      Regex::Lit(label) => {
        assert!(label.contains('m'));
        assert!(label.contains('_'));
        assert!(!label.contains('5'));
      }
      other => panic!("expected Lit, got {other:?}"),
    }
  }

  #[test]
  fn dot_matches_everything() {
    let re = parse(".").unwrap();
    match re {
      Regex::Lit(label) => assert!(label.is_inverted()),
      other => panic!("expected Lit, got {other:?}"),
    }
  }

  #[test]
  fn unclosed_paren_is_an_error() {
    assert!(parse("(ab").is_err());
  }

  #[test]
  fn compiled_nfa_of_ab_star_accepts_a_and_abab() {
    let re = parse("(ab)*").unwrap();
    let fa = to_enfa(&re, 1u32);
    let dfa = fa.minimize(|a, _b| *a);
    for word in ["", "ab", "abab"] {
      let mut cur = *dfa.initial.iter().next().unwrap();
      let mut ok = true;
      for ch in word.chars() {
        match dfa.state(cur).edges.iter().find(|(_, l)| l.as_ref().unwrap().contains(ch)) {
          Some(&(t, _)) => cur = t,
          None => {
            ok = false;
            break;
          }
        }
      }
      assert!(ok && dfa.state(cur).accept == Some(1), "expected {word:?} to be accepted");
    }
  }
}
