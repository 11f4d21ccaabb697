//! Assembles the lexical rules gathered by the LIME front end into one or
//! more DFAs, grounded on `lime_grammar.py`'s `_build_multidfa` and the
//! context-lexer partitioning in `make_lime_parser`.

use crate::{
  fa::Fa,
  lime::{LexPattern, LexRule, ParsedGrammar, SymAnnotation},
  lr::LrTable,
  regex,
  types::Symbol,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;

/// Two lexical rules of equal priority both matched the same longest
/// prefix and neither is preferred over the other -- grounded on
/// `LexerConflictError`.
#[derive(Debug, thiserror::Error)]
#[error("lexical ambiguity between rule {rule1} and rule {rule2}: both match with equal priority")]
pub struct LexerConflict {
  pub rule1: usize,
  pub rule2: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LexerAssemblyError {
  #[error(transparent)]
  Regex(#[from] regex::RegexError),
  #[error(transparent)]
  Conflict(#[from] LexerConflict),
}

/// A regex pattern may match any length; a literal match is always
/// unambiguous at that length, so literals outrank regexes on a tie --
/// grounded on `_build_multidfa`'s `priorities` map (`0` for regex, `1`
/// for literal).
fn priority(pattern: &LexPattern) -> u8 {
  match pattern {
    LexPattern::Regex(_) => 0,
    LexPattern::Literal(_) => 1,
  }
}

/// Builds one DFA whose accept labels are indices into `lex_rules`,
/// optionally restricted to rules whose token is in `allowed`.
pub fn build_multidfa(lex_rules: &[LexRule], allowed: Option<&FxHashSet<Symbol>>) -> Result<Fa<usize>, LexerAssemblyError> {
  let mut fas = Vec::new();
  let mut priorities: FxHashMap<usize, u8> = FxHashMap::default();

  for (i, rule) in lex_rules.iter().enumerate() {
    if let Some(allowed) = allowed {
      if !allowed.contains(&rule.token) {
        continue;
      }
    }
    priorities.insert(i, priority(&rule.pattern));
    let fa = match &rule.pattern {
      LexPattern::Regex(src) => regex::to_enfa(&regex::parse(src)?, i),
      LexPattern::Literal(text) => regex::literal_enfa(text, i),
    };
    fas.push(fa);
  }

  let union = Fa::union(&fas);

  let conflict: RefCell<Option<(usize, usize)>> = RefCell::new(None);
  let combine = |&a: &usize, &b: &usize| -> usize {
    let (pa, pb) = (priorities[&a], priorities[&b]);
    if pa == pb {
      conflict.borrow_mut().get_or_insert((a.min(b), a.max(b)));
      a
    } else if pa > pb {
      a
    } else {
      b
    }
  };

  let dfa = union.minimize(combine);
  if let Some((rule1, rule2)) = conflict.into_inner() {
    return Err(LexerAssemblyError::Conflict(LexerConflict { rule1, rule2 }));
  }
  Ok(dfa)
}

/// A single DFA shared by every LR state, used when the grammar does not
/// request a context-sensitive lexer.
pub fn build_global_lexer(grammar: &ParsedGrammar) -> Result<Fa<usize>, LexerAssemblyError> {
  build_multidfa(&grammar.lex_rules, None)
}

/// A single lexeme produced by [`run`]: which rule matched, at what byte
/// offset, and the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
  pub rule:        usize,
  pub byte_offset: usize,
  pub text:        String,
}

#[derive(Debug, thiserror::Error)]
#[error("no lexical rule matches at byte offset {byte_offset}")]
pub struct LexError {
  pub byte_offset: usize,
}

/// Greedy longest-match tokenization of `input` against `dfa`, the way a
/// generated scanner would drive the assembled lexer at runtime. This is
/// the lexer's own job (in scope); driving the *parser* over the resulting
/// token stream is not (SPEC_FULL.md §1).
pub fn run(dfa: &Fa<usize>, input: &str) -> Result<Vec<Lexeme>, LexError> {
  let chars: Vec<(usize, char)> = input.char_indices().collect();
  let mut lexemes = Vec::new();
  let mut pos = 0;

  while pos < chars.len() {
    let start_byte = chars[pos].0;
    let mut cur: std::collections::BTreeSet<_> = dfa.initial.clone();
    let mut best: Option<(usize, usize)> = None; // (end index into `chars`, rule)
    let mut i = pos;

    loop {
      if let Some(&rule) = cur.iter().find_map(|&s| dfa.state(s).accept.as_ref()) {
        best = Some((i, rule));
      }
      if i >= chars.len() {
        break;
      }
      let ch = chars[i].1;
      let next: std::collections::BTreeSet<_> =
        cur.iter().flat_map(|&s| dfa.state(s).edges.iter()).filter(|(_, l)| l.as_ref().is_some_and(|l| l.contains(ch))).map(|&(t, _)| t).collect();
      if next.is_empty() {
        break;
      }
      cur = next;
      i += 1;
    }

    match best {
      Some((end, rule)) if end > pos => {
        let end_byte = chars.get(end).map(|&(b, _)| b).unwrap_or(input.len());
        lexemes.push(Lexeme { rule, byte_offset: start_byte, text: input[start_byte..end_byte].to_string() });
        pos = end;
      }
      _ => return Err(LexError { byte_offset: start_byte }),
    }
  }

  Ok(lexemes)
}

/// One DFA per distinct set of admissible tokens, with each LR state
/// mapped to the DFA it should use while in that state. Grounded on
/// `make_lime_parser`'s per-state `lexer_id` assignment.
pub struct ContextLexers {
  pub lexers:      Vec<Fa<usize>>,
  pub state_lexer: Vec<usize>,
}

pub fn build_context_lexers(lr: &LrTable, grammar: &ParsedGrammar) -> Result<ContextLexers, LexerAssemblyError> {
  let discard: FxHashSet<Symbol> =
    grammar.sym_annot.iter().filter(|(_, a)| matches!(a, SymAnnotation::Discard)).map(|(&s, _)| s).collect();

  let mut lex_map: FxHashMap<Vec<Symbol>, usize> = FxHashMap::default();
  let mut term_lists: Vec<FxHashSet<Symbol>> = Vec::new();
  let mut state_lexer = vec![0usize; lr.states.len()];

  for (state_id, state) in lr.states.iter().enumerate() {
    let mut terms: FxHashSet<Symbol> = state.goto.keys().copied().filter(|s| lr.grammar.is_terminal(*s)).collect();
    terms.extend(discard.iter().copied());
    for lookahead in state.action.keys() {
      terms.extend(lookahead.iter().copied());
    }

    let mut canonical: Vec<Symbol> = terms.iter().copied().collect();
    canonical.sort();

    let idx = *lex_map.entry(canonical).or_insert_with(|| {
      let id = term_lists.len();
      term_lists.push(terms.clone());
      id
    });
    state_lexer[state_id] = idx;
  }

  let mut lexers = Vec::with_capacity(term_lists.len());
  for term_list in &term_lists {
    lexers.push(build_multidfa(&grammar.lex_rules, Some(term_list))?);
  }

  Ok(ContextLexers { lexers, state_lexer })
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::{IStringStore, Token};

  fn lex_rule(store: &IStringStore, name: &str, pattern: LexPattern) -> LexRule {
    LexRule { token: Symbol::intern(store, name), token_name: None, pattern, pattern_name: None, action: None, tok: Token::synthetic() }
  }

  #[test]
  fn literal_outranks_regex_on_overlapping_match() {
    let store = IStringStore::new();
    let rules = vec![
      lex_rule(&store, "id", LexPattern::Regex("[a-z]+".to_string())),
      lex_rule(&store, "kw_if", LexPattern::Literal("if".to_string())),
    ];
    let dfa = build_multidfa(&rules, None).expect("literal vs regex overlap is resolved by priority, not a conflict");
    let mut cur = *dfa.initial.iter().next().unwrap();
    for ch in "if".chars() {
      let next = dfa.state(cur).edges.iter().find(|(_, l)| l.as_ref().unwrap().contains(ch)).map(|(t, _)| *t);
      cur = next.unwrap();
    }
    assert_eq!(dfa.state(cur).accept, Some(1));
  }

  #[test]
  fn two_literals_of_equal_priority_conflict_only_if_ambiguous() {
    let store = IStringStore::new();
    let rules = vec![lex_rule(&store, "a", LexPattern::Literal("x".to_string())), lex_rule(&store, "b", LexPattern::Literal("y".to_string()))];
    assert!(build_multidfa(&rules, None).is_ok());
  }

  #[test]
  fn run_splits_input_into_greedy_longest_matches() {
    let store = IStringStore::new();
    let rules = vec![
      lex_rule(&store, "ws", LexPattern::Regex(r"\s+".to_string())),
      lex_rule(&store, "id", LexPattern::Regex("[a-z]+".to_string())),
      lex_rule(&store, "kw_if", LexPattern::Literal("if".to_string())),
    ];
    let dfa = build_multidfa(&rules, None).unwrap();
    let lexemes = run(&dfa, "if foo").expect("every char belongs to some rule");
    let texts: Vec<_> = lexemes.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["if", " ", "foo"]);
    assert_eq!(lexemes[0].rule, 2); // kw_if outranks id's regex on "if"
  }

  #[test]
  fn run_reports_the_offset_of_an_unmatched_character() {
    let store = IStringStore::new();
    let rules = vec![lex_rule(&store, "id", LexPattern::Regex("[a-z]+".to_string()))];
    let dfa = build_multidfa(&rules, None).unwrap();
    let err = run(&dfa, "ab!cd").expect_err("'!' matches no rule");
    assert_eq!(err.byte_offset, 2);
  }
}
