//! `Symbol`: an opaque, hashable value. Terminal vs non-terminal is a
//! property of a `Grammar` (§3), not of the symbol itself.

use super::istring::{IString, IStringStore};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(IString);

impl Symbol {
  pub fn new(name: IString) -> Self {
    Self(name)
  }

  pub fn intern(store: &IStringStore, name: &str) -> Self {
    Self(store.intern(name))
  }

  pub fn name(self, store: &IStringStore) -> String {
    self.0.to_string(store)
  }

  pub fn istring(self) -> IString {
    self.0
  }
}

/// The sentinel LHS of the augmented start rule `S' -> root_symbols`,
/// guaranteed distinct from any user symbol: `$` is not a legal character in
/// a LIME identifier, quoted literal delimiter, or operator (see the LIME
/// classifier in `lime::lexer`), so no source grammar can ever produce it.
pub const AUGMENTED_START_NAME: &str = "$start";

// `IString` handles are arena indices, stable only within the `IStringStore`
// that minted them. `CompiledGrammar` dumps (§10.3) are produced and
// consumed within the same process run, against the same store, so
// round-tripping the raw index is sound; this is not a portable wire format.
impl Serialize for Symbol {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    self.0.as_u32().serialize(serializer)
  }
}

impl<'de> Deserialize<'de> for Symbol {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    Ok(Symbol(IString::from_u32(u32::deserialize(deserializer)?)))
  }
}
