//! CLI schema for the tsprobe binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default manifest file name, looked up in the current directory.
pub const DEFAULT_MANIFEST: &str = "grammars.kdl";

#[derive(Parser, Debug)]
#[command(name = "tsprobe")]
#[command(about = "Verify that compiled tree-sitter grammars load")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Grammar manifest (defaults to ./grammars.kdl when present)
	#[arg(long, short = 'm', global = true, value_name = "FILE")]
	pub manifest: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
	/// Load grammars and check their handles
	Check {
		/// Grammars to check (all manifest grammars if omitted)
		names: Vec<String>,

		/// Load a single grammar from this library instead of the search paths
		#[arg(long, value_name = "PATH")]
		library: Option<PathBuf>,

		/// Entry point symbol override (with --library)
		#[arg(long, requires = "library")]
		symbol: Option<String>,

		/// Print reports as JSON
		#[arg(long)]
		json: bool,
	},
	/// Compile grammar sources into shared libraries
	Build {
		/// Only build specific grammars (comma-separated)
		#[arg(long, value_delimiter = ',')]
		only: Option<Vec<String>>,

		/// Output directory (defaults to the first grammar search path)
		#[arg(long, value_name = "DIR")]
		out: Option<PathBuf>,
	},
	/// List manifest grammars and where their libraries resolve
	List,
}

#[cfg(test)]
mod tests;
