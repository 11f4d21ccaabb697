//! A single production rule, grounded on `limecc`'s own `rule.py`: a left
//! non-terminal, an ordered tuple of right symbols, and an opaque semantic
//! action payload.

use super::{symbol::Symbol, token::Token};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The LIME action snippet associated with a rule: its raw target-language
/// source text and the position it was read from. Two `Action`s are
/// considered equal only if they are the *same* snippet instance (identity),
/// never by comparing their text -- see SPEC_FULL.md §9 "Equality and
/// hashing".
#[derive(Debug, Clone)]
pub struct Action {
  id:    u32,
  text:  Option<Arc<str>>,
  pub tok: Token,
}

impl Action {
  /// The default action: no snippet was given, the parser's own unboxing
  /// convention (identical in spirit to limecc's `_unbox_onetuples`) applies.
  pub fn default_unbox(id: u32) -> Self {
    Self { id, text: None, tok: Token::synthetic() }
  }

  pub fn snippet(id: u32, text: impl Into<Arc<str>>, tok: Token) -> Self {
    Self { id, text: Some(text.into()), tok }
  }

  pub fn text(&self) -> Option<&str> {
    self.text.as_deref()
  }

  pub fn is_default(&self) -> bool {
    self.text.is_none()
  }
}

impl PartialEq for Action {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}
impl Eq for Action {}
impl std::hash::Hash for Action {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.id.hash(state)
  }
}

impl Serialize for Action {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    self.text.as_deref().unwrap_or("").serialize(serializer)
  }
}
impl<'de> Deserialize<'de> for Action {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let text = String::deserialize(deserializer)?;
    Ok(if text.is_empty() { Action::default_unbox(0) } else { Action::snippet(0, text, Token::synthetic()) })
  }
}

/// `(left: Symbol, right: [Symbol], action: opaque)`. Immutable. Two rules
/// are equal iff all three components are equal; `tok` is source position
/// only and never participates in equality or hashing, so the same rule
/// parsed at two different positions still compares equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
  pub left:   Symbol,
  pub right:  Vec<Symbol>,
  pub action: Action,
  /// Source position of the rule, for diagnostics only.
  pub tok:    Token,
}

impl PartialEq for Rule {
  fn eq(&self, other: &Self) -> bool {
    self.left == other.left && self.right == other.right && self.action == other.action
  }
}
impl Eq for Rule {}
impl std::hash::Hash for Rule {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.left.hash(state);
    self.right.hash(state);
    self.action.hash(state);
  }
}

impl Rule {
  pub fn new(left: Symbol, right: Vec<Symbol>, action: Action, tok: Token) -> Self {
    Self { left, right, action, tok }
  }

  /// A bare rule with the default unboxing action, useful for tests and for
  /// the synthetic augmented-start rule.
  pub fn bare(left: Symbol, right: Vec<Symbol>) -> Self {
    Self { left, right, action: Action::default_unbox(0), tok: Token::synthetic() }
  }

  pub fn print(&self, store: &super::istring::IStringStore) -> String {
    let right = self.right.iter().map(|s| s.name(store)).collect::<Vec<_>>().join(", ");
    format!("{} = {};", self.left.name(store), right)
  }
}
