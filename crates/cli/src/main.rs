//! tsprobe: checks that compiled tree-sitter grammars load.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use cli::{Cli, Command};

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let manifest = commands::resolve_manifest(cli.manifest.as_deref())?;

	let passed = match cli.command {
		Command::Check {
			names,
			library,
			symbol,
			json,
		} => {
			let outcomes = commands::check(&manifest, &names, library.as_deref(), symbol.as_deref())?;
			commands::render_outcomes(&mut std::io::stdout().lock(), &outcomes, json)?;
			commands::all_passed(&outcomes)
		}
		Command::Build { only, out } => commands::build(&manifest, only.as_deref(), out.as_deref())?,
		Command::List => {
			commands::list(&mut std::io::stdout().lock(), &manifest)?;
			true
		}
	};

	Ok(if passed {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("tsprobe=debug,tsprobe_grammar=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
