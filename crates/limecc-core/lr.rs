//! LR(k) item sets, state construction, and action/goto table population,
//! grounded on `limecc`'s `lrparser.py`. Only table *construction* lives
//! here -- executing the table against an input stream is the generated
//! parser's job, not this crate's (see SPEC_FULL.md §1).

use crate::types::{first::Word, symbol::AUGMENTED_START_NAME, First, Grammar, Rule, Symbol};
use rustc_hash::FxHashMap;

/// `(rule, dot position, lookahead word)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
  pub rule:      usize,
  pub index:     usize,
  pub lookahead: Word,
}

impl Item {
  pub fn is_final(&self, grammar: &Grammar) -> bool {
    self.index >= grammar.get(self.rule).right.len()
  }

  pub fn next_token(&self, grammar: &Grammar) -> Option<Symbol> {
    grammar.get(self.rule).right.get(self.index).copied()
  }

  /// `FIRST_k(suffix-after-dot-and-next-symbol ++ lookahead)`, i.e. the
  /// lookaheads that should seed closure items produced by this item.
  fn next_lookaheads(&self, grammar: &Grammar, first: &First) -> std::collections::HashSet<Word, rustc_hash::FxBuildHasher> {
    let right = &grammar.get(self.rule).right;
    let mut word: Word = right[(self.index + 1).min(right.len())..].to_vec();
    word.extend(self.lookahead.iter().copied());
    first.call(&word)
  }

  /// `FIRST_k(suffix-from-dot ++ lookahead)`, the set of lookahead words
  /// under which this item's next terminal should trigger a shift.
  fn lookaheads(&self, grammar: &Grammar, first: &First) -> std::collections::HashSet<Word, rustc_hash::FxBuildHasher> {
    let right = &grammar.get(self.rule).right;
    let mut word: Word = right[self.index.min(right.len())..].to_vec();
    word.extend(self.lookahead.iter().copied());
    first.call(&word)
  }

  pub fn print(&self, grammar: &Grammar, store: &crate::types::IStringStore) -> String {
    let rule = grammar.get(self.rule);
    let mut parts: Vec<String> = rule.right.iter().map(|s| s.name(store)).collect();
    if parts.is_empty() {
      parts.push(". ".to_string());
    } else if self.index == 0 {
      parts[0] = format!(". {}", parts[0]);
    } else if self.index >= parts.len() {
      let last = parts.len() - 1;
      parts[last] = format!("{} . ", parts[last]);
    } else {
      parts[self.index - 1] = format!("{} . {}", parts[self.index - 1], parts[self.index]);
      parts.remove(self.index);
    }
    let la = if self.lookahead.is_empty() {
      String::new()
    } else {
      format!(" ({})", self.lookahead.iter().map(|s| s.name(store)).collect::<Vec<_>>().join(", "))
    };
    format!("{} = {};{}", rule.left.name(store), parts.join(", "), la)
  }
}

/// Action table entry. `Shift` also represents "accept" when the owning
/// state is the table's `accepting_state` -- the same encoding
/// `lrparser.py` uses (`None` means both "shift" and "accept").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Shift,
  Reduce(usize),
}

#[derive(Debug, Clone)]
pub struct State {
  pub itemlist:      Vec<Item>,
  pub goto:          FxHashMap<Symbol, usize>,
  pub action:        FxHashMap<Word, Action>,
  pub action_origin: FxHashMap<Word, usize>,
  pub parent_id:     Option<usize>,
  pub parent_symbol: Option<Symbol>,
}

impl State {
  fn close(kernel: Vec<Item>, grammar: &Grammar, first: &First) -> Self {
    let mut itemlist = kernel;
    let mut itemset: std::collections::HashSet<Item, rustc_hash::FxBuildHasher> = itemlist.iter().cloned().collect();

    let mut i = 0;
    while i < itemlist.len() {
      let cur = itemlist[i].clone();
      if let Some(nt) = cur.next_token(grammar) {
        let next_lookaheads = cur.next_lookaheads(grammar, first);
        for la in &next_lookaheads {
          for &rule_idx in grammar.rules(nt) {
            let new_item = Item { rule: rule_idx, index: 0, lookahead: la.clone() };
            if itemset.insert(new_item.clone()) {
              itemlist.push(new_item);
            }
          }
        }
      }
      i += 1;
    }

    State { itemlist, goto: FxHashMap::default(), action: FxHashMap::default(), action_origin: FxHashMap::default(), parent_id: None, parent_symbol: None }
  }

  fn canonical_key(&self) -> Vec<Item> {
    let mut v = self.itemlist.clone();
    v.sort();
    v
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
  ShiftReduce,
  ReduceReduce,
}

impl std::fmt::Display for ConflictKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(match self {
      ConflictKind::ShiftReduce => "shift/reduce",
      ConflictKind::ReduceReduce => "reduce/reduce",
    })
  }
}

/// A grammar failed to be LR(k): two distinct actions were demanded for the
/// same state and lookahead. Carries enough of the construction to
/// reconstruct a counterexample sentence and print the offending states.
#[derive(Debug, thiserror::Error)]
#[error("{kind} conflict during LR({k}) parser construction, in state {conflicting_state}")]
pub struct LrConflict {
  pub kind:              ConflictKind,
  pub k:                 usize,
  pub conflicting_state: usize,
  pub item1:             usize,
  pub item2:             usize,
  pub counterexample:    Vec<Symbol>,
}

pub struct LrTable {
  pub grammar:         Grammar,
  pub states:          Vec<State>,
  pub accepting_state: usize,
  pub k:               usize,
}

/// The synthetic `left` of the augmented start rule always sits at index 0
/// of the augmented grammar built by [`build`].
const AUGMENTED_RULE_INDEX: usize = 0;

pub fn build(store: &crate::types::IStringStore, grammar: Grammar, k: usize) -> Result<LrTable, LrConflict> {
  let root = grammar.root().expect("grammar must have a root symbol to build an LR table");
  let start_symbol = Symbol::intern(store, AUGMENTED_START_NAME);

  let mut aug_rules = vec![Rule::bare(start_symbol, vec![root])];
  aug_rules.extend(grammar.iter().cloned());
  let aug_grammar = Grammar::new(aug_rules, None, []);

  let first = First::new(&aug_grammar, k);

  let start_item = Item { rule: AUGMENTED_RULE_INDEX, index: 0, lookahead: Vec::new() };
  let mut states = vec![State::close(vec![start_item], &aug_grammar, &first)];
  let mut state_map: FxHashMap<Vec<Item>, usize> = FxHashMap::default();
  state_map.insert(states[0].canonical_key(), 0);

  let all_symbols: Vec<Symbol> = {
    let mut v: Vec<Symbol> = aug_grammar.symbols().iter().copied().collect();
    v.sort();
    v
  };

  let mut i = 0;
  while i < states.len() {
    for &symbol in &all_symbols {
      let kernel: Vec<Item> = states[i]
        .itemlist
        .iter()
        .filter(|it| it.next_token(&aug_grammar) == Some(symbol))
        .map(|it| Item { rule: it.rule, index: it.index + 1, lookahead: it.lookahead.clone() })
        .collect();
      if kernel.is_empty() {
        continue;
      }

      let mut newstate = State::close(kernel, &aug_grammar, &first);
      let key = newstate.canonical_key();
      let target = match state_map.get(&key) {
        Some(&id) => id,
        None => {
          let id = states.len();
          newstate.parent_id = Some(i);
          newstate.parent_symbol = Some(symbol);
          state_map.insert(key, id);
          states.push(newstate);
          id
        }
      };
      states[i].goto.insert(symbol, target);
    }
    i += 1;
  }

  let mut accepting_state = None;

  for state_id in 0..states.len() {
    let itemlist = states[state_id].itemlist.clone();
    for (item_index, item) in itemlist.iter().enumerate() {
      match item.next_token(&aug_grammar) {
        None => {
          if item.rule == AUGMENTED_RULE_INDEX {
            accepting_state = Some(state_id);
            add_action(&mut states, &aug_grammar, k, state_id, item.lookahead.clone(), Action::Shift, item_index)?;
          } else {
            add_action(&mut states, &aug_grammar, k, state_id, item.lookahead.clone(), Action::Reduce(item.rule), item_index)?;
          }
        }
        Some(nt) if aug_grammar.is_terminal(nt) => {
          for la in item.lookaheads(&aug_grammar, &first) {
            add_action(&mut states, &aug_grammar, k, state_id, la, Action::Shift, item_index)?;
          }
        }
        _ => {}
      }
    }
  }

  Ok(LrTable { grammar: aug_grammar, states, accepting_state: accepting_state.expect("augmented grammar always has an accepting state"), k })
}

fn add_action(
  states: &mut [State],
  grammar: &Grammar,
  k: usize,
  state_id: usize,
  lookahead: Word,
  action: Action,
  new_item_index: usize,
) -> Result<(), LrConflict> {
  let state = &mut states[state_id];
  if let Some(&existing) = state.action.get(&lookahead) {
    if existing != action {
      let kind = if matches!(existing, Action::Shift) || matches!(action, Action::Shift) { ConflictKind::ShiftReduce } else { ConflictKind::ReduceReduce };
      let item1 = new_item_index;
      let item2 = state.action_origin[&lookahead];
      let counterexample = build_counterexample(states, state_id);
      return Err(LrConflict { kind, k, conflicting_state: state_id, item1, item2, counterexample });
    }
    return Ok(());
  }
  state.action.insert(lookahead.clone(), action);
  state.action_origin.insert(lookahead, new_item_index);
  let _ = grammar;
  Ok(())
}

fn build_counterexample(states: &[State], conflicting_state: usize) -> Vec<Symbol> {
  let mut trace = Vec::new();
  let mut st = conflicting_state;
  while let Some(parent_id) = states[st].parent_id {
    trace.push(states[st].parent_symbol.expect("a state with a parent always records the transition symbol"));
    st = parent_id;
  }
  trace.reverse();
  trace
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::types::{istring::IStringStore, rule::Rule};

  #[test]
  fn lr0_grammar_without_conflicts_builds_a_table() {
    let store = IStringStore::new();
    let list = Symbol::intern(&store, "list");
    let item = Symbol::intern(&store, "item");
    let grammar = Grammar::new(vec![Rule::bare(list, vec![]), Rule::bare(list, vec![list, item])], Some(list), [item]);

    let table = build(&store, grammar, 0).expect("this grammar is LR(0)");
    assert!(table.states.len() > 1);
  }

  #[test]
  fn ambiguous_grammar_reports_a_conflict_with_a_counterexample() {
    let store = IStringStore::new();
    let root = Symbol::intern(&store, "root");
    let header = Symbol::intern(&store, "header");
    let list = Symbol::intern(&store, "list");
    let item = Symbol::intern(&store, "item");

    let grammar = Grammar::new(
      vec![
        Rule::bare(root, vec![header, list]),
        Rule::bare(list, vec![]),
        Rule::bare(list, vec![item]),
        Rule::bare(list, vec![list, item]),
      ],
      Some(root),
      [header, item],
    );

    let err = build(&store, grammar, 0).expect_err("list -> . | item is a classic shift/reduce conflict at k=0");
    assert_eq!(err.kind, ConflictKind::ShiftReduce);
    assert!(!err.counterexample.is_empty());
  }
}
