use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use fa_workbench::analysis::Classification;
use fa_workbench::revision::Revision;
use fa_workbench::view::TableView;
use fa_workbench::view::to_dot;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fa")]
#[command(about = "Define, determinize, prune and run finite automata", long_about = None)]
struct Cli {
	/// Definition file (`states:`, `alphabet:`, `initial:`, `accepting:` headers and `from, symbol -> to` lines)
	definition: PathBuf,

	/// Replace the automaton by its subset construction
	#[arg(long)]
	determinize: bool,

	/// Remove unreachable and dead states; applied after --determinize
	#[arg(long)]
	prune: bool,

	/// Print Graphviz source instead of the transition table
	#[arg(long)]
	dot: bool,

	/// Words to run against the final automaton
	words: Vec<String>,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	let cli: Cli = Cli::parse();

	let text: String = match std::fs::read_to_string(&cli.definition) {
		Ok(text) => text,
		Err(err) => {
			eprintln!("{}: {err}", cli.definition.display());
			return ExitCode::FAILURE;
		},
	};
	let mut revision: Revision = match Revision::load(&text) {
		Ok(revision) => revision,
		Err(err) => {
			eprintln!("{}: {err}", cli.definition.display());
			return ExitCode::FAILURE;
		},
	};

	if cli.determinize {
		revision = revision.determinize();
	}
	if cli.prune {
		revision = revision.prune();
	}

	if cli.dot {
		print!("{}", to_dot(revision.automaton()));
	} else {
		println!("revision {} ({:?})", revision.version(), revision.stage());
		println!("{}", TableView::of(revision.automaton()));
		let classification: Classification = revision.classify();
		if classification.deterministic {
			println!("deterministic");
		} else {
			println!("not deterministic:");
			for violation in classification.violations.iter() {
				println!("  {}", violation.describe(revision.automaton()));
			}
		}
	}

	let mut status: ExitCode = ExitCode::SUCCESS;
	for word in cli.words.iter() {
		match revision.simulate(word) {
			Ok(verdict) if verdict.accepted => println!("{word:?}: accepted"),
			Ok(_) => println!("{word:?}: rejected"),
			Err(err) => {
				println!("{word:?}: {err}");
				status = ExitCode::from(2);
			},
		}
	}
	status
}
