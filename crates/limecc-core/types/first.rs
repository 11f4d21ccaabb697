//! FIRST_k set construction, grounded on `limecc`'s `first.py`.
//!
//! A "word" here is a `Vec<Symbol>` of length at most `k`. `First` builds the
//! FIRST_k table for every non-terminal of a grammar by iterating to a fixed
//! point, then answers `FIRST_k(word)` queries against that table.

use super::{grammar::Grammar, symbol::Symbol};
use rustc_hash::FxHashSet;

pub type Word = Vec<Symbol>;

/// `FIRST_k(word)`: the first `k` symbols of `word`, or all of it if shorter.
fn truncate(word: &[Symbol], k: usize) -> Word {
  word[..word.len().min(k)].to_vec()
}

/// `{ FIRST_k(vw) | v in left, w in right }`, plus the length of its
/// shortest member (`k` itself if the result set is empty).
fn oplus(left: &FxHashSet<Word>, right: &FxHashSet<Word>, k: usize) -> (FxHashSet<Word>, usize) {
  let mut res = FxHashSet::default();
  let mut min_len = k;
  for lword in left {
    for rword in right {
      let mut cat = lword.clone();
      cat.extend(rword.iter().copied());
      let w = truncate(&cat, k);
      min_len = min_len.min(w.len());
      res.insert(w);
    }
  }
  (res, min_len)
}

/// The FIRST_k table for a grammar, built once and queried many times during
/// LR(k) closure.
#[derive(Debug)]
pub struct First {
  k:     usize,
  table: rustc_hash::FxHashMap<Symbol, FxHashSet<Word>>,
}

impl First {
  /// Builds the FIRST_k table via the standard Dragon-book fixed-point
  /// iteration: every non-terminal starts with an empty set, and rules are
  /// repeatedly applied until no table entry grows.
  pub fn new(grammar: &Grammar, k: usize) -> Self {
    let mut table: rustc_hash::FxHashMap<Symbol, FxHashSet<Word>> =
      grammar.nonterms().iter().map(|&nt| (nt, FxHashSet::default())).collect();

    let mut this = Self { k, table: std::mem::take(&mut table) };

    let mut done = false;
    while !done {
      done = true;
      for rule in grammar.iter() {
        let words = this.call(&rule.right);
        let entry = this.table.entry(rule.left).or_default();
        for word in words {
          if entry.insert(word) {
            done = false;
          }
        }
      }
    }

    this
  }

  /// `FIRST_k(word)` with respect to the grammar this table was built from.
  /// Symbols absent from the table (i.e. terminals) contribute the
  /// one-element set `{(symbol,)}`.
  pub fn call(&self, word: &[Symbol]) -> FxHashSet<Word> {
    let mut res: FxHashSet<Word> = FxHashSet::default();
    res.insert(Vec::new());

    for &symbol in word {
      let rset = match self.table.get(&symbol) {
        Some(set) => set.clone(),
        None => {
          let mut s = FxHashSet::default();
          s.insert(vec![symbol]);
          s
        }
      };
      let (next, shortest) = oplus(&res, &rset, self.k);
      res = next;
      if shortest == self.k {
        break;
      }
    }

    res
  }

  pub fn k(&self) -> usize {
    self.k
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::{istring::IStringStore, rule::Rule};

  #[test]
  fn first_of_terminal_word_is_itself_truncated() {
    let store = IStringStore::new();
    let list = Symbol::intern(&store, "list");
    let item = Symbol::intern(&store, "item");
    let g = Grammar::new(vec![Rule::bare(list, vec![]), Rule::bare(list, vec![list, item])], None, []);
    let f = First::new(&g, 2);

    let word = vec![item, item, item];
    let result = f.call(&word);
    assert_eq!(result.len(), 1);
    assert!(result.contains(&vec![item, item]));
  }

  #[test]
  fn first_of_nullable_nonterm_includes_empty_word() {
    let store = IStringStore::new();
    let list = Symbol::intern(&store, "list");
    let item = Symbol::intern(&store, "item");
    let g = Grammar::new(vec![Rule::bare(list, vec![]), Rule::bare(list, vec![list, item])], None, []);
    let f = First::new(&g, 2);

    let result = f.call(&[list]);
    assert!(result.contains(&Vec::new()));
    assert!(result.contains(&vec![item]));
    assert!(result.contains(&vec![item, item]));
  }

  #[test]
  fn first_of_empty_word_is_singleton_empty_set() {
    let store = IStringStore::new();
    let list = Symbol::intern(&store, "list");
    let g = Grammar::new(vec![Rule::bare(list, vec![])], None, []);
    let f = First::new(&g, 1);
    let result = f.call(&[]);
    assert_eq!(result.len(), 1);
    assert!(result.contains(&Vec::new()));
  }

  /// A random rule over a fixed 5-symbol pool: indices 0..3 are
  /// non-terminals `A`,`B`,`C`, indices 3..5 are terminals `x`,`y`.
  fn rule_strategy() -> impl proptest::strategy::Strategy<Value = (usize, Vec<usize>)> {
    (0usize..3, proptest::collection::vec(0usize..5, 0..3))
  }

  proptest::proptest! {
    /// §8.1: for every rule `A -> alpha`, `FIRST_k(alpha) ⊆ FIRST_k(A)` --
    /// whatever words a rule's right side can start with, its left side's
    /// table entry (built from every rule with that LHS) already contains.
    #[test]
    fn first_k_of_a_rules_rhs_is_a_subset_of_first_k_of_its_lhs(
      k in 1usize..=3,
      rule_specs in proptest::collection::vec(rule_strategy(), 1..6),
    ) {
      let store = IStringStore::new();
      let pool: Vec<Symbol> = ["A", "B", "C", "x", "y"].iter().map(|n| Symbol::intern(&store, n)).collect();
      let rules: Vec<Rule> = rule_specs
        .iter()
        .map(|(lhs, rhs)| Rule::bare(pool[*lhs], rhs.iter().map(|&i| pool[i]).collect()))
        .collect();

      let grammar = Grammar::new(rules.clone(), None, []);
      let first = First::new(&grammar, k);

      for rule in &rules {
        let rhs_first = first.call(&rule.right);
        let lhs_first = first.call(&[rule.left]);
        for word in &rhs_first {
          proptest::prop_assert!(lhs_first.contains(word), "FIRST_{}({:?}) missing word from its rule's RHS", k, rule.left);
        }
      }
    }
  }
}
