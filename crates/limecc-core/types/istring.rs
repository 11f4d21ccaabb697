//! A small string interner.
//!
//! `Symbol`s, token names, and source paths are all handled through here so
//! that equality and hashing on the hot paths of LR/DFA construction (item
//! set kernels, state maps) never touch string data directly.

use std::{
  collections::HashMap,
  sync::{Arc, RwLock},
};

/// A handle to an interned string. Cheap to copy, compare, and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IString(u32);

impl IString {
  pub fn to_string(self, store: &IStringStore) -> String {
    store.get(self).to_string()
  }

  /// Raw arena index, stable only for the lifetime of one `IStringStore`.
  /// Used exclusively by `Symbol`'s `serde` impls (see `types::symbol`).
  pub fn as_u32(self) -> u32 {
    self.0
  }

  pub fn from_u32(id: u32) -> Self {
    Self(id)
  }
}

#[derive(Default)]
struct Inner {
  strings: Vec<Arc<str>>,
  lookup:  HashMap<Arc<str>, u32>,
}

/// The arena backing every `IString` handed out by this crate.
///
/// Cloning an `IStringStore` is cheap; clones share the same underlying
/// table, matching the way the teacher's own `IStringStore` is threaded
/// through construction as a shared, append-only arena.
#[derive(Clone, Default)]
pub struct IStringStore {
  inner: Arc<RwLock<Inner>>,
}

impl IStringStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn intern(&self, s: &str) -> IString {
    if let Some(id) = self.inner.read().unwrap().lookup.get(s) {
      return IString(*id);
    }

    let mut inner = self.inner.write().unwrap();
    if let Some(id) = inner.lookup.get(s) {
      return IString(*id);
    }
    let id = inner.strings.len() as u32;
    let arc: Arc<str> = Arc::from(s);
    inner.strings.push(arc.clone());
    inner.lookup.insert(arc, id);
    IString(id)
  }

  pub fn get(&self, id: IString) -> Arc<str> {
    self.inner.read().unwrap().strings[id.0 as usize].clone()
  }
}

impl std::fmt::Debug for IStringStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IStringStore").field("len", &self.inner.read().unwrap().strings.len()).finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn interns_equal_strings_to_the_same_handle() {
    let store = IStringStore::new();
    let a = store.intern("list");
    let b = store.intern("list");
    let c = store.intern("item");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(&*a.to_string(&store), "list");
  }
}
