//! `limecc`: compiles one or more `.lime` grammar files into an LR(k)
//! table and lexer DFA(s), grounded on the teacher's own `radlr-cli` thin
//! wrapper around its core crate. Target-language emission is out of
//! scope (SPEC_FULL.md §6.1): `--output` dumps the compiled grammar as
//! JSON instead of generated source.

use clap::Parser;
use limecc_core::{compiled::LexerTable, config::GeneratorConfig, lexer_assembly, IStringStore};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "limecc", about = "LR(k) table and lexer DFA construction for LIME grammars")]
struct Cli {
  /// `.lime` grammar source files to compile.
  #[arg(required = true)]
  inputs: Vec<std::path::PathBuf>,

  /// Writes a JSON dump of the compiled grammar (LR table + lexer DFAs)
  /// to this file instead of target-language source, which this crate
  /// does not generate.
  #[arg(long)]
  output: Option<std::path::PathBuf>,

  /// Prints every LR state's item set to stderr after construction.
  #[arg(long)]
  print_states: bool,

  /// Prints the assembled lexer DFA(s) to stderr after construction.
  #[arg(long)]
  print_dfas: bool,

  /// Prints the parsed LIME grammar (rules, lex rules, annotations) to
  /// stderr before table construction.
  #[arg(long)]
  print_lime_grammar: bool,

  /// Runs the assembled lexer over a file and prints the resulting token
  /// stream. Driving the parser itself over that stream is out of scope
  /// (this crate builds tables, not a runtime).
  #[arg(long)]
  parse: Option<std::path::PathBuf>,

  /// Skips reporting `%test` acceptance cases found in the grammar.
  #[arg(long)]
  no_tests: bool,

  /// Only reports `%test` acceptance cases found in the grammar; skips
  /// LR/lexer construction.
  #[arg(long)]
  tests_only: bool,

  /// LR lookahead depth. Overrides the default of 1.
  #[arg(short = 'k', long, default_value_t = 1)]
  k: usize,
}

fn main() -> ExitCode {
  env_logger::init();
  let cli = Cli::parse();

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
  let store = IStringStore::new();
  let config = GeneratorConfig::new().set_k(cli.k);

  for path in &cli.inputs {
    log::info!("compiling {}", path.display());
    let source = std::fs::read_to_string(path)?;
    let path_str = path.display().to_string();

    let parsed = limecc_core::lime::parse_str(&source, &path_str, &store)?;

    if cli.print_lime_grammar {
      eprintln!("{:#?}", parsed);
    }
    if !cli.no_tests && !parsed.tests.is_empty() {
      println!("{} acceptance case(s) declared in {}", parsed.tests.len(), path.display());
    }
    if cli.tests_only {
      continue;
    }

    let compiled = limecc_core::compile(&store, parsed, config)?;

    if cli.print_states {
      eprintln!("LR table: {} states, k={}", compiled.lr.state_count, compiled.lr.k);
    }
    if cli.print_dfas {
      eprintln!("{:#?}", compiled.lexer);
    }

    if let Some(parse_target) = &cli.parse {
      let input = std::fs::read_to_string(parse_target)?;
      let dfa = match &compiled.lexer {
        LexerTable::Global(dfa) => dfa,
        LexerTable::Context { lexers, .. } => lexers.first().ok_or("context lexer produced no DFAs")?,
      };
      let lexemes = lexer_assembly::run(dfa, &input)?;
      for lexeme in lexemes {
        println!("{}\t{:?}", lexeme.rule, lexeme.text);
      }
    }

    if let Some(output) = &cli.output {
      std::fs::write(output, compiled.to_json()?)?;
      log::info!("wrote compiled grammar to {}", output.display());
    }
  }

  Ok(())
}
