//! `CharLabel`: a finite-automaton edge label denoting either an explicit set
//! of characters or its complement, grounded on `limecc`'s `regex_parser.py`
//! `Lit` class. Representing `.` as "every char except {}" rather than
//! enumerating all of Unicode is the entire reason this type exists.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharLabel {
  charset: FxHashSet<char>,
  inv:     bool,
}

impl CharLabel {
  pub fn new(charset: impl IntoIterator<Item = char>, inv: bool) -> Self {
    Self { charset: charset.into_iter().collect(), inv }
  }

  pub fn single(ch: char) -> Self {
    Self::new([ch], false)
  }

  pub fn set(chars: impl IntoIterator<Item = char>) -> Self {
    Self::new(chars, false)
  }

  /// `.`: every Unicode scalar value, i.e. the complement of the empty set.
  pub fn any() -> Self {
    Self::new([], true)
  }

  pub fn is_inverted(&self) -> bool {
    self.inv
  }

  pub fn explicit_chars(&self) -> impl Iterator<Item = char> + '_ {
    self.charset.iter().copied()
  }

  pub fn contains(&self, ch: char) -> bool {
    self.inv != self.charset.contains(&ch)
  }

  /// True iff this label denotes the empty set of characters.
  pub fn is_empty(&self) -> bool {
    !self.inv && self.charset.is_empty()
  }

  pub fn difference(&self, other: &Self) -> Self {
    match (self.inv, other.inv) {
      (false, false) => Self::new(self.charset.difference(&other.charset).copied(), false),
      (true, false) => Self::new(self.charset.union(&other.charset).copied(), true),
      (false, true) => Self::new(self.charset.intersection(&other.charset).copied(), false),
      (true, true) => Self::new(other.charset.difference(&self.charset).copied(), false),
    }
  }

  pub fn intersect(&self, other: &Self) -> Self {
    match (self.inv, other.inv) {
      (false, false) => Self::new(self.charset.intersection(&other.charset).copied(), false),
      (true, false) => Self::new(other.charset.difference(&self.charset).copied(), false),
      (false, true) => Self::new(self.charset.difference(&other.charset).copied(), false),
      (true, true) => Self::new(self.charset.union(&other.charset).copied(), true),
    }
  }

  pub fn union(&self, other: &Self) -> Self {
    match (self.inv, other.inv) {
      (false, false) => Self::new(self.charset.union(&other.charset).copied(), false),
      (true, false) => Self::new(self.charset.difference(&other.charset).copied(), true),
      (false, true) => Self::new(other.charset.difference(&self.charset).copied(), true),
      (true, true) => Self::new(self.charset.intersection(&other.charset).copied(), true),
    }
  }
}

impl std::ops::Sub for &CharLabel {
  type Output = CharLabel;
  fn sub(self, other: &CharLabel) -> CharLabel {
    self.difference(other)
  }
}
impl std::ops::BitAnd for &CharLabel {
  type Output = CharLabel;
  fn bitand(self, other: &CharLabel) -> CharLabel {
    self.intersect(other)
  }
}
impl std::ops::BitOr for &CharLabel {
  type Output = CharLabel;
  fn bitor(self, other: &CharLabel) -> CharLabel {
    self.union(other)
  }
}

impl fmt::Display for CharLabel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut chars: Vec<char> = self.charset.iter().copied().collect();
    chars.sort_unstable();
    let body: String = chars.into_iter().collect();
    if self.inv {
      write!(f, "[^{body}]")
    } else {
      write!(f, "[{body}]")
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn membership_respects_inversion() {
    let digits = CharLabel::set('0'..='9');
    assert!(digits.contains('5'));
    assert!(!digits.contains('a'));

    let not_newline = CharLabel::new(['\n'], true);
    assert!(!not_newline.contains('\n'));
    assert!(not_newline.contains('a'));
  }

  #[test]
  fn any_contains_every_char() {
    let any = CharLabel::any();
    assert!(any.contains('a'));
    assert!(any.contains('\u{1F600}'));
    assert!(!any.is_empty() || any.is_inverted());
  }

  #[test]
  fn difference_of_two_explicit_sets() {
    let ab = CharLabel::set(['a', 'b']);
    let b = CharLabel::set(['b']);
    let result = ab.difference(&b);
    assert!(result.contains('a'));
    assert!(!result.contains('b'));
  }

  #[test]
  fn intersect_of_inverted_and_explicit_matches_python_lit_and() {
    // Lit(inv=True) & Lit(explicit) == Lit(explicit - inv.charset)
    let not_digit = CharLabel::new('0'..='9', true);
    let ab = CharLabel::set(['a', 'b', '5']);
    let result = not_digit.intersect(&ab);
    assert!(result.contains('a'));
    assert!(result.contains('b'));
    assert!(!result.contains('5'));
  }

  #[test]
  fn union_of_two_inverted_sets_is_inverted_intersection() {
    let not_a = CharLabel::new(['a'], true);
    let not_b = CharLabel::new(['b'], true);
    let result = not_a.union(&not_b);
    assert!(result.is_inverted());
    // complement of {a} ∩ {b} == complement of {} since a != b
    assert!(result.contains('a'));
    assert!(result.contains('b'));
    assert!(result.contains('z'));
  }

  #[test]
  fn empty_set_is_empty_but_any_is_not() {
    let empty = CharLabel::set([]);
    assert!(empty.is_empty());
    assert!(!CharLabel::any().is_empty());
  }
}
