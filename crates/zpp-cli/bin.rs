//! CLI front end (spec §6, external collaborator): argument parsing,
//! logging init, and exit codes around `zpp_core::Pipeline`. Carries no
//! pipeline logic of its own.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use zpp_core::Pipeline;

/// A source-to-source preprocessor expanding static reflection and
/// meta-class extensions to ordinary declarations.
#[derive(Parser, Debug)]
#[command(name = "zpp", version, about)]
struct Args {
  /// Directory to search for `#include`d sources. Repeatable.
  #[arg(short = 'I', long = "include-dir")]
  include_dirs: Vec<PathBuf>,

  /// Root directory the mirrored output tree is written under.
  #[arg(short = 'o', long = "out-dir")]
  out_dir: PathBuf,

  /// Path to the meta-evaluator subprocess executable. Required only
  /// if any input declares meta-class instantiations.
  #[arg(long = "evaluator")]
  evaluator: Option<String>,

  /// Input source files.
  #[arg(required = true)]
  inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
  simple_logger::SimpleLogger::new().init().expect("logger already initialized");
  let args = Args::parse();

  let pipeline = Pipeline::new(args.include_dirs, args.out_dir, args.evaluator);

  for input in &args.inputs {
    if let Err(err) = pipeline.preprocess_source(input) {
      let name = input.to_string_lossy();
      zpp_core::report::report_error(&name, &err);
      return ExitCode::FAILURE;
    }
  }
  ExitCode::SUCCESS
}
