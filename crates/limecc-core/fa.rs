//! Finite automata, grounded on `limecc`'s `fa.py`: arena-indexed states
//! (rather than a reference graph), epsilon-closure/subset construction
//! (ε-NFA → DFA), Hopcroft-style partition-refinement minimization, and
//! automaton union — all operating on [`CharLabel`]-labeled edges rather
//! than an enumerated alphabet.

use crate::charlabel::CharLabel;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub usize);

/// An automaton state: its outgoing edges (`None` label means epsilon) and
/// an optional accept label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaState<L> {
  pub edges:  Vec<(StateId, Option<CharLabel>)>,
  pub accept: Option<L>,
}

impl<L> Default for FaState<L> {
  fn default() -> Self {
    Self { edges: Vec::new(), accept: None }
  }
}

/// A finite automaton: an arena of states plus a set of initial states.
/// States may have zero, one, or several outgoing edges per state, and the
/// automaton may have any number of initial states (so it doubles as both
/// NFA and DFA storage -- `is_dfa` tells them apart structurally).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fa<L> {
  states:  Vec<FaState<L>>,
  pub initial: BTreeSet<StateId>,
}

impl<L> Default for Fa<L> {
  fn default() -> Self {
    Self { states: Vec::new(), initial: BTreeSet::new() }
  }
}

impl<L: Clone + Eq + std::hash::Hash> Fa<L> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn new_state(&mut self) -> StateId {
    let id = StateId(self.states.len());
    self.states.push(FaState::default());
    id
  }

  pub fn state(&self, id: StateId) -> &FaState<L> {
    &self.states[id.0]
  }

  pub fn state_mut(&mut self, id: StateId) -> &mut FaState<L> {
    &mut self.states[id.0]
  }

  pub fn set_accept(&mut self, id: StateId, label: L) {
    self.states[id.0].accept = Some(label);
  }

  pub fn connect(&mut self, from: StateId, to: StateId, label: Option<CharLabel>) {
    self.states[from.0].edges.push((to, label));
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  /// All states reachable from `seed` by any edge (epsilon or labeled).
  pub fn reachable_states(&self, seed: &BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut res: BTreeSet<StateId> = seed.clone();
    let mut stack: Vec<StateId> = seed.iter().copied().collect();
    while let Some(s) = stack.pop() {
      for &(target, _) in &self.state(s).edges {
        if res.insert(target) {
          stack.push(target);
        }
      }
    }
    res
  }

  /// The epsilon closure of `states`: `states` plus every state reachable
  /// using only `None`-labeled edges.
  pub fn epsilon_closure(&self, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut res: BTreeSet<StateId> = states.clone();
    let mut stack: Vec<StateId> = states.iter().copied().collect();
    while let Some(s) = stack.pop() {
      for &(target, ref label) in &self.state(s).edges {
        if label.is_none() && res.insert(target) {
          stack.push(target);
        }
      }
    }
    res
  }

  /// Subset construction: converts an automaton that may contain epsilon
  /// edges and nondeterminism into an equivalent DFA. `combine` resolves
  /// ties when two merged ε-NFA states disagree on their accept label
  /// (e.g. two token rules both matching the same lexeme -- the caller
  /// picks the earlier-declared one).
  pub fn to_dfa(&self, combine: impl Fn(&L, &L) -> L) -> Fa<L> {
    let mut dfa: Fa<L> = Fa::new();
    let mut state_map: FxHashMap<BTreeSet<StateId>, StateId> = FxHashMap::default();
    let mut inv_state_map: FxHashMap<StateId, BTreeSet<StateId>> = FxHashMap::default();

    let mut get_state = |dfa: &mut Fa<L>, states: BTreeSet<StateId>| -> StateId {
      if let Some(&id) = state_map.get(&states) {
        return id;
      }
      let id = dfa.new_state();
      state_map.insert(states.clone(), id);
      inv_state_map.insert(id, states);
      id
    };

    let initial_closure = self.epsilon_closure(&self.initial);
    let initial = get_state(&mut dfa, initial_closure);
    dfa.initial.insert(initial);

    let mut queue = vec![initial];
    let mut processed: BTreeSet<StateId> = BTreeSet::from([initial]);

    while let Some(current) = queue.pop() {
      let state_set = inv_state_map[&current].clone();

      let mut edges: Vec<(StateId, CharLabel)> = Vec::new();
      for &src in &state_set {
        for &(target, ref label) in &self.state(src).edges {
          if let Some(label) = label {
            if let Some(entry) = edges.iter_mut().find(|(t, _)| *t == target) {
              entry.1 = entry.1.intersect(label);
            } else {
              edges.push((target, label.clone()));
            }
          }
        }
      }

      for (targets, charset) in maximal_charsets(edges) {
        let closure = self.epsilon_closure(&targets.into_iter().collect());
        let dfa_target = get_state(&mut dfa, closure);
        dfa.connect(current, dfa_target, Some(charset));
        if processed.insert(dfa_target) {
          queue.push(dfa_target);
        }
      }
    }

    let ids: Vec<StateId> = dfa.states.iter().enumerate().map(|(i, _)| StateId(i)).collect();
    for id in ids {
      let members = &inv_state_map[&id];
      let mut accept: Option<L> = None;
      for &m in members {
        if let Some(label) = &self.state(m).accept {
          accept = Some(match accept {
            None => label.clone(),
            Some(existing) if existing == *label => existing,
            Some(existing) => combine(&existing, label),
          });
        }
      }
      dfa.state_mut(id).accept = accept;
    }

    dfa
  }

  /// Converts to a DFA, then collapses equivalent states via
  /// partition-refinement (Hopcroft-style, operating on [`CharLabel`]
  /// overlap rather than single symbols).
  pub fn minimize(&self, combine: impl Fn(&L, &L) -> L) -> Fa<L>
  where
    L: Ord,
  {
    let dfa = self.to_dfa(combine);

    let mut no_accept: BTreeSet<StateId> = BTreeSet::new();
    let mut accept_groups: FxHashMap<L, BTreeSet<StateId>> = FxHashMap::default();
    for (i, state) in dfa.states.iter().enumerate() {
      let id = StateId(i);
      match &state.accept {
        None => {
          no_accept.insert(id);
        }
        Some(label) => {
          accept_groups.entry(label.clone()).or_default().insert(id);
        }
      }
    }

    let mut partition: Vec<BTreeSet<StateId>> = Vec::new();
    if !no_accept.is_empty() {
      partition.push(no_accept);
    }
    for (_, group) in accept_groups {
      partition.push(group);
    }

    loop {
      let mut partition_map: FxHashMap<StateId, usize> = FxHashMap::default();
      for (i, class) in partition.iter().enumerate() {
        for &s in class {
          partition_map.insert(s, i);
        }
      }

      let mut new_partition: Vec<BTreeSet<StateId>> = Vec::new();
      for class in &partition {
        let mut siblings: FxHashMap<StateId, BTreeSet<StateId>> =
          class.iter().map(|&s| (s, class.clone())).collect();

        let mut edge_map: Vec<((StateId, StateId), CharLabel)> = Vec::new();
        for &s in class {
          for &(target, ref label) in &dfa.state(s).edges {
            if let Some(label) = label {
              edge_map.push(((s, target), label.clone()));
            }
          }
        }

        for (edges, _charset) in maximal_charsets(edge_map) {
          let mut target_map: FxHashMap<usize, BTreeSet<StateId>> = FxHashMap::default();
          for (source, target) in edges {
            target_map.entry(partition_map[&target]).or_default().insert(source);
          }
          for (_, source_set) in target_map {
            for (&source, sibling_set) in siblings.iter_mut() {
              if source_set.contains(&source) {
                *sibling_set = sibling_set.intersection(&source_set).copied().collect();
              } else {
                *sibling_set = sibling_set.difference(&source_set).copied().collect();
              }
            }
          }
        }

        let mut seen: std::collections::HashSet<BTreeSet<StateId>> = std::collections::HashSet::new();
        for (_, sibling_set) in siblings {
          if seen.insert(sibling_set.clone()) {
            new_partition.push(sibling_set);
          }
        }
      }

      new_partition.sort();
      let mut sorted_partition = partition.clone();
      sorted_partition.sort();
      if sorted_partition == new_partition {
        break;
      }
      partition = new_partition;
    }

    let partition_map: FxHashMap<StateId, usize> = {
      let mut m = FxHashMap::default();
      for (i, class) in partition.iter().enumerate() {
        for &s in class {
          m.insert(s, i);
        }
      }
      m
    };

    let mut result: Fa<L> = Fa::new();
    let mut new_ids: Vec<StateId> = Vec::with_capacity(partition.len());
    for class in &partition {
      let representative = *class.iter().next().unwrap();
      let id = result.new_state();
      result.state_mut(id).accept = dfa.state(representative).accept.clone();
      new_ids.push(id);
    }

    for (class_idx, class) in partition.iter().enumerate() {
      let mut target_labels: FxHashMap<usize, CharLabel> = FxHashMap::default();
      for &s in class {
        for &(target, ref label) in &dfa.state(s).edges {
          if let Some(label) = label {
            let target_class = partition_map[&target];
            target_labels
              .entry(target_class)
              .and_modify(|existing| *existing = existing.union(label))
              .or_insert_with(|| label.clone());
          }
        }
      }
      for (target_class, label) in target_labels {
        result.connect(new_ids[class_idx], new_ids[target_class], Some(label));
      }
    }

    let initial_class = partition_map[dfa.initial.iter().next().unwrap()];
    result.initial.insert(new_ids[initial_class]);
    result
  }

  /// Merges several automata into one whose language is the union of
  /// theirs, without altering any state's reachable structure -- the
  /// result simply has every input automaton's initial states as its own.
  pub fn union(fas: &[Fa<L>]) -> Fa<L> {
    let mut result: Fa<L> = Fa::new();
    for fa in fas {
      let offset = result.states.len();
      for state in &fa.states {
        let edges = state.edges.iter().map(|(t, l)| (StateId(t.0 + offset), l.clone())).collect();
        result.states.push(FaState { edges, accept: state.accept.clone() });
      }
      for &id in &fa.initial {
        result.initial.insert(StateId(id.0 + offset));
      }
    }
    result
  }
}

/// Greedily partitions a set of `(key, CharLabel)` pairs into disjoint
/// `(keys, charset)` groups such that each group's charset is the maximal
/// overlap shared by all keys in that group -- grounded on
/// `fa.py`'s `_get_maximum_charsets`.
fn maximal_charsets<K: Clone + Eq>(mut items: Vec<(K, CharLabel)>) -> Vec<(Vec<K>, CharLabel)> {
  let mut result = Vec::new();
  while !items.is_empty() {
    let (first_key, first_charset) = items[0].clone();
    let mut group = vec![first_key];
    let mut current = first_charset;
    for (key, charset) in items.iter().skip(1) {
      let inter = current.intersect(charset);
      if !inter.is_empty() {
        current = inter;
        group.push(key.clone());
      }
    }

    let mut remaining = Vec::new();
    for (key, charset) in items {
      let reduced = charset.difference(&current);
      if !reduced.is_empty() {
        remaining.push((key, reduced));
      }
    }

    result.push((group, current));
    items = remaining;
  }
  result
}

#[cfg(test)]
mod test {
  use super::*;

  fn linear_fa(chars: &[char], accept: u32) -> Fa<u32> {
    let mut fa = Fa::new();
    let mut cur = fa.new_state();
    fa.initial.insert(cur);
    for &ch in chars {
      let next = fa.new_state();
      fa.connect(cur, next, Some(CharLabel::single(ch)));
      cur = next;
    }
    fa.set_accept(cur, accept);
    fa
  }

  #[test]
  fn dfa_of_linear_nfa_accepts_only_exact_string() {
    let fa = linear_fa(&['a', 'b', 'c'], 1);
    let dfa = fa.to_dfa(|a, _b| *a);
    assert_eq!(dfa.initial.len(), 1);
    // walk "abc"
    let mut cur = *dfa.initial.iter().next().unwrap();
    for ch in "abc".chars() {
      let next = dfa.state(cur).edges.iter().find(|(_, l)| l.as_ref().unwrap().contains(ch)).map(|(t, _)| *t);
      cur = next.expect("dfa should have a transition for each char of the literal");
    }
    assert_eq!(dfa.state(cur).accept, Some(1));
  }

  #[test]
  fn union_of_two_automata_has_both_initial_states_and_all_states() {
    let a = linear_fa(&['a'], 1);
    let b = linear_fa(&['b'], 2);
    let u = Fa::union(&[a, b]);
    assert_eq!(u.len(), 4);
    assert_eq!(u.initial.len(), 2);
  }

  #[test]
  fn minimize_merges_equivalent_accepting_states() {
    // NFA for "a*" style loop on two states that should collapse to one.
    let mut fa: Fa<u32> = Fa::new();
    let s0 = fa.new_state();
    let s1 = fa.new_state();
    fa.initial.insert(s0);
    fa.connect(s0, s1, Some(CharLabel::single('a')));
    fa.connect(s1, s1, Some(CharLabel::single('a')));
    fa.set_accept(s1, 1);

    let min = fa.minimize(|a, _b| *a);
    // the minimized DFA should still accept "aaa"
    let mut cur = *min.initial.iter().next().unwrap();
    for _ in 0..3 {
      let next = min.state(cur).edges.iter().find(|(_, l)| l.as_ref().unwrap().contains('a')).map(|(t, _)| *t);
      cur = next.expect("should accept repeated a");
    }
    assert_eq!(min.state(cur).accept, Some(1));
  }

  /// Walks `word` from `start` following edges whose label contains the
  /// next character; `None` on any dead end, the state's accept label
  /// (possibly `None`) once `word` is exhausted.
  fn walk(fa: &Fa<u32>, start: StateId, word: &str) -> Option<u32> {
    let mut cur = start;
    for ch in word.chars() {
      match fa.state(cur).edges.iter().find(|(_, l)| l.as_ref().is_some_and(|l| l.contains(ch))) {
        Some(&(target, _)) => cur = target,
        None => return None,
      }
    }
    fa.state(cur).accept
  }

  proptest::proptest! {
    /// §8.2: every reachable DFA state has pairwise-disjoint outgoing
    /// labels -- two edges out of the same state never agree on a character.
    #[test]
    fn dfa_transitions_out_of_any_state_are_pairwise_disjoint(words in proptest::collection::vec("[a-c]{1,4}", 1..6)) {
      let fas: Vec<Fa<u32>> = words.iter().enumerate().map(|(i, w)| linear_fa(&w.chars().collect::<Vec<_>>(), i as u32)).collect();
      let dfa = Fa::union(&fas).to_dfa(|a, _b| *a);

      for i in 0..dfa.len() {
        let edges = &dfa.state(StateId(i)).edges;
        for a in 0..edges.len() {
          for b in (a + 1)..edges.len() {
            if let (Some(l1), Some(l2)) = (&edges[a].1, &edges[b].1) {
              proptest::prop_assert!(l1.intersect(l2).is_empty());
            }
          }
        }
      }
    }

    /// §8.4: minimization preserves language and accept tags -- every word
    /// that built the union still reaches the same accept label afterwards.
    #[test]
    fn minimization_preserves_acceptance_of_every_source_word(words in proptest::collection::vec("[a-c]{1,4}", 1..6)) {
      let words: Vec<String> = words.into_iter().collect::<std::collections::BTreeSet<_>>().into_iter().collect();
      let fas: Vec<Fa<u32>> = words.iter().enumerate().map(|(i, w)| linear_fa(&w.chars().collect::<Vec<_>>(), i as u32)).collect();
      let nfa = Fa::union(&fas);
      let dfa = nfa.to_dfa(|a, _b| *a);
      let minimized = nfa.minimize(|a, _b| *a);

      let dfa_start = *dfa.initial.iter().next().unwrap();
      let min_start = *minimized.initial.iter().next().unwrap();
      for (i, word) in words.iter().enumerate() {
        proptest::prop_assert_eq!(walk(&dfa, dfa_start, word), Some(i as u32));
        proptest::prop_assert_eq!(walk(&minimized, min_start, word), Some(i as u32));
      }
    }
  }
}
