//! Grammar compilation.
//!
//! Turns a grammar's generated C sources into a shared library that the
//! [`loader`](crate::loader) can open. Generating `parser.c` itself is left to
//! the tree-sitter CLI.

mod compile;
mod parallel;

use std::path::PathBuf;

pub use compile::{BuildStatus, build_grammar, grammar_src_dir};
pub use parallel::{ProgressCallback, build_all_grammars};
use thiserror::Error;

/// Errors that can occur while building a grammar.
#[derive(Debug, Error)]
pub enum BuildError {
	#[error("grammar {0} has no source directory configured")]
	NoSource(String),
	#[error("no parser.c found in {0}")]
	NoParserSource(PathBuf),
	#[error("no {0} compiler found; install one or set CC/CXX")]
	NoCompiler(&'static str),
	#[error("compilation failed: {0}")]
	Compilation(String),
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;
