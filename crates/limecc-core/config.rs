//! Knobs controlling how a grammar is compiled, grounded on radlr's
//! `ParserConfig` builder pattern: a plain-data struct with a `Default`
//! impl and a chain of `self -> Self` setters instead of a separate
//! builder type.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
  /// The `k` in LR(k): how many lookahead tokens the table builder may
  /// consult to resolve a conflict.
  pub k: usize,
  /// Forces a single DFA shared by every LR state even if the grammar
  /// requests `%context_lexer`.
  pub force_global_lexer: bool,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self { k: 1, force_global_lexer: false }
  }
}

impl GeneratorConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_k(mut self, k: usize) -> Self {
    self.k = k;
    self
  }

  pub fn use_global_lexer(mut self, enable: bool) -> Self {
    self.force_global_lexer = enable;
    self
  }

  /// `lr1`: the common case, one lookahead token.
  pub fn lr1() -> Self {
    Self::new().set_k(1)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn default_is_lr1() {
    let cfg = GeneratorConfig::default();
    assert_eq!(cfg.k, 1);
    assert!(!cfg.force_global_lexer);
  }

  #[test]
  fn builder_chain_overrides_defaults() {
    let cfg = GeneratorConfig::new().set_k(3).use_global_lexer(true);
    assert_eq!(cfg.k, 3);
    assert!(cfg.force_global_lexer);
  }
}
