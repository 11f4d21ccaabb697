//! `limecc_core`: regex/DFA and LR(k) table construction for the LIME
//! parser-generator front end. Turns a `.lime` grammar source into a
//! [`compiled::CompiledGrammar`] -- an LR(k) action/goto table plus one or
//! more lexer DFAs -- without emitting any target-language code; that is
//! an explicit collaborator's job (SPEC_FULL.md §1, §6).

pub mod charlabel;
pub mod compiled;
pub mod config;
pub mod error;
pub mod fa;
pub mod journal;
pub mod lexer_assembly;
pub mod lime;
pub mod lr;
pub mod regex;
pub mod types;

pub use compiled::CompiledGrammar;
pub use config::GeneratorConfig;
pub use error::LimeError;
pub use journal::Journal;
pub use types::{Grammar, IStringStore};

use lime::ParsedGrammar;
use rustc_hash::FxHashSet;
use types::Symbol;

/// Checks a parsed grammar for the error taxonomy named in SPEC_FULL.md §7
/// ("Invalid grammar"): a symbol used on some rule's right side but never
/// defined as either a rule LHS or a lexical token, a non-terminal that no
/// rule reachable from the root ever derives, and a symbol declared both as
/// a lexical token and as a rule LHS. Runs before any table construction,
/// since none of these can be recovered from mid-construction.
fn validate(store: &IStringStore, parsed: &ParsedGrammar) -> Result<(), LimeError> {
  let lhs_set: FxHashSet<Symbol> = parsed.rules.iter().map(|r| r.left).collect();
  let token_set: FxHashSet<Symbol> =
    parsed.lex_rules.iter().map(|lex| lex.token).chain(parsed.extra_symbols.iter().copied()).collect();

  for token in &token_set {
    if lhs_set.contains(token) {
      return Err(LimeError::TokenNontermCollision { name: token.name(store) });
    }
  }

  for rule in &parsed.rules {
    for &sym in &rule.right {
      if !lhs_set.contains(&sym) && !token_set.contains(&sym) {
        return Err(LimeError::undefined_symbol(sym.name(store), rule.tok));
      }
    }
  }

  if let Some((root, tok)) = parsed.root {
    if !lhs_set.contains(&root) {
      return Err(LimeError::undefined_symbol(root.name(store), tok));
    }
  }

  if let Some(root) = parsed.root.map(|(sym, _)| sym).or_else(|| parsed.rules.first().map(|r| r.left)) {
    let mut seen: FxHashSet<Symbol> = FxHashSet::default();
    let mut stack = vec![root];
    seen.insert(root);
    while let Some(sym) = stack.pop() {
      for rule in parsed.rules.iter().filter(|r| r.left == sym) {
        for &rsym in &rule.right {
          if lhs_set.contains(&rsym) && seen.insert(rsym) {
            stack.push(rsym);
          }
        }
      }
    }
    for &lhs in &lhs_set {
      if !seen.contains(&lhs) {
        let tok = parsed.rules.iter().find(|r| r.left == lhs).map(|r| r.tok).unwrap_or_else(types::Token::synthetic);
        return Err(LimeError::unreachable_nonterm(lhs.name(store), tok));
      }
    }
  }

  Ok(())
}

/// Runs the full pipeline over an already-parsed grammar: validates it,
/// builds the [`Grammar`], constructs the LR(k) table, assembles the
/// lexer(s), and bundles everything into a [`CompiledGrammar`]. Logs phase
/// timings at `debug` level, matching the teacher's own phase-tracing
/// convention (there through `Journal::report_mut().start_timer`, here
/// through `log::debug!` per SPEC_FULL.md §10.2).
pub fn compile(store: &IStringStore, parsed: ParsedGrammar, config: GeneratorConfig) -> Result<CompiledGrammar, LimeError> {
  if parsed.rules.is_empty() {
    return Err(LimeError::EmptyGrammar);
  }
  validate(store, &parsed)?;

  log::debug!("building grammar: {} rules, {} lexical rules", parsed.rules.len(), parsed.lex_rules.len());
  let grammar = Grammar::new(parsed.rules.clone(), parsed.root.map(|(sym, _)| sym), parsed.extra_symbols.iter().copied());

  log::debug!("constructing LR({}) table", config.k);
  let lr = lr::build(store, grammar, config.k)?;
  log::debug!("LR table has {} states", lr.states.len());

  let use_context_lexer = parsed.context_lexer && !config.force_global_lexer;
  let lexer = if use_context_lexer {
    log::debug!("assembling context-sensitive lexer");
    let context = lexer_assembly::build_context_lexers(&lr, &parsed)?;
    compiled::LexerTable::Context { lexers: context.lexers, state_lexer: context.state_lexer }
  } else {
    log::debug!("assembling global lexer");
    compiled::LexerTable::Global(lexer_assembly::build_global_lexer(&parsed)?)
  };

  Ok(CompiledGrammar::assemble(&lr, lexer, &parsed, store))
}

/// Parses `.lime` source text and compiles it in one step, the entry point
/// the CLI (`limecc-cli`) drives.
pub fn compile_source(source: &str, path: &str, store: &IStringStore, config: GeneratorConfig) -> Result<CompiledGrammar, LimeError> {
  let parsed = lime::parse_str(source, path, store)?;
  compile(store, parsed, config)
}
