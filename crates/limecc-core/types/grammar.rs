//! Grounded on `limecc`'s `grammar.py`: an ordered sequence of rules that
//! memoizes symbol sets and rule-by-LHS indexes.

use super::{rule::Rule, symbol::Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grammar {
  rules:      Vec<Rule>,
  root:       Option<Symbol>,
  nonterms:   FxHashSet<Symbol>,
  symbols:    FxHashSet<Symbol>,
  rule_cache: FxHashMap<Symbol, Vec<usize>>,
}

impl Grammar {
  /// Builds a grammar from its rules. `root`, if `None`, defaults to the
  /// first rule's LHS, matching limecc's own default. `extra_symbols` are
  /// symbols declared but never used on any LHS (e.g. terminals that only
  /// ever appear on a RHS).
  pub fn new(rules: Vec<Rule>, root: Option<Symbol>, extra_symbols: impl IntoIterator<Item = Symbol>) -> Self {
    let nonterms: FxHashSet<Symbol> = rules.iter().map(|r| r.left).collect();

    let mut symbols: FxHashSet<Symbol> = FxHashSet::default();
    for rule in &rules {
      symbols.insert(rule.left);
      symbols.extend(rule.right.iter().copied());
    }
    symbols.extend(extra_symbols);

    let root = root.or_else(|| rules.first().map(|r| r.left));

    let mut rule_cache: FxHashMap<Symbol, Vec<usize>> = FxHashMap::default();
    for (i, rule) in rules.iter().enumerate() {
      rule_cache.entry(rule.left).or_default().push(i);
    }

    Self { rules, root, nonterms, symbols, rule_cache }
  }

  pub fn len(&self) -> usize {
    self.rules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  pub fn get(&self, index: usize) -> &Rule {
    &self.rules[index]
  }

  pub fn iter(&self) -> impl Iterator<Item = &Rule> {
    self.rules.iter()
  }

  pub fn iter_indexed(&self) -> impl Iterator<Item = (usize, &Rule)> {
    self.rules.iter().enumerate()
  }

  /// All rules whose LHS is `left`, in declaration order. Empty slice if
  /// `left` never appears as a LHS.
  pub fn rules(&self, left: Symbol) -> &[usize] {
    self.rule_cache.get(&left).map(|v| v.as_slice()).unwrap_or(&[])
  }

  pub fn is_terminal(&self, symbol: Symbol) -> bool {
    !self.nonterms.contains(&symbol)
  }

  pub fn nonterms(&self) -> &FxHashSet<Symbol> {
    &self.nonterms
  }

  pub fn symbols(&self) -> &FxHashSet<Symbol> {
    &self.symbols
  }

  pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
    self.symbols.iter().copied().filter(move |s| !self.nonterms.contains(s))
  }

  pub fn root(&self) -> Option<Symbol> {
    self.root
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::{istring::IStringStore, rule::Rule};

  fn sym(store: &IStringStore, name: &str) -> Symbol {
    Symbol::intern(store, name)
  }

  #[test]
  fn root_defaults_to_first_rule_lhs() {
    let store = IStringStore::new();
    let list = sym(&store, "list");
    let item = sym(&store, "item");
    let g = Grammar::new(vec![Rule::bare(list, vec![]), Rule::bare(list, vec![list, item])], None, []);
    assert_eq!(g.root(), Some(list));
  }

  #[test]
  fn terminality_follows_lhs_membership() {
    let store = IStringStore::new();
    let a = sym(&store, "a");
    let b = sym(&store, "b");
    let c = sym(&store, "c");
    let g = Grammar::new(vec![Rule::bare(a, vec![b]), Rule::bare(b, vec![c])], None, []);
    assert!(!g.is_terminal(a));
    assert!(!g.is_terminal(b));
    assert!(g.is_terminal(c));
  }

  #[test]
  fn rules_by_lhs_preserve_declaration_order() {
    let store = IStringStore::new();
    let a = sym(&store, "a");
    let b = sym(&store, "b");
    let g = Grammar::new(vec![Rule::bare(a, vec![b]), Rule::bare(b, vec![]), Rule::bare(b, vec![b, a])], None, []);
    assert_eq!(g.rules(b).len(), 2);
    assert_eq!(g.rules(a).len(), 1);
    assert!(g.rules(sym(&store, "unreferenced")).is_empty());
  }
}
