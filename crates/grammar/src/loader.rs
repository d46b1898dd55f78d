//! Dynamic loading of compiled grammars from shared libraries.

use std::path::{Path, PathBuf};

use libloading::Library;
use thiserror::Error;
use tracing::{debug, info};

use crate::binding::{GrammarBinding, RawLanguageFn};
use crate::language::Language;
use crate::paths::{grammar_library_name, grammar_search_paths, grammar_symbol_name};
use crate::verify::{AbiRange, LoadError, VerifyReport, load_language_with};

/// Errors that can occur when loading a grammar library.
#[derive(Error, Debug)]
pub enum GrammarError {
	/// Grammar library not found in any search path.
	#[error("grammar not found: {0}")]
	NotFound(String),

	/// Failed to open the dynamic library.
	#[error("failed to load grammar library {path}: {source}")]
	Library {
		path: PathBuf,
		#[source]
		source: libloading::Error,
	},

	/// Library exists but doesn't export the expected symbol.
	#[error("grammar library {path} missing language function {symbol}")]
	MissingSymbol { path: PathBuf, symbol: String },

	/// The entry point resolved but produced no usable language.
	#[error(transparent)]
	Load(#[from] LoadError),

	/// Filesystem I/O error.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

/// A grammar shared library kept open together with its entry point.
#[derive(Debug)]
pub struct LoadedGrammar {
	name: String,
	path: PathBuf,
	entry: RawLanguageFn,
	// Keeps `entry` mapped. Dropped last.
	_library: Library,
}

impl LoadedGrammar {
	/// Opens `path` and resolves the grammar entry point.
	///
	/// `symbol` defaults to `tree_sitter_<name>`.
	///
	/// # Safety
	///
	/// Loading a library runs its initialisers, and the resolved symbol is
	/// trusted to have the tree-sitter language function signature.
	pub unsafe fn open(name: &str, path: &Path, symbol: Option<&str>) -> Result<Self, GrammarError> {
		let symbol = symbol.map_or_else(|| grammar_symbol_name(name), String::from);
		debug!(grammar = name, path = %path.display(), %symbol, "Opening grammar library");

		let library = unsafe { Library::new(path) }.map_err(|source| GrammarError::Library {
			path: path.to_path_buf(),
			source,
		})?;

		let entry: RawLanguageFn = unsafe {
			*library
				.get::<RawLanguageFn>(symbol.as_bytes())
				.map_err(|_| GrammarError::MissingSymbol {
					path: path.to_path_buf(),
					symbol: symbol.clone(),
				})?
		};

		info!(grammar = name, path = %path.display(), "Loaded grammar library");
		Ok(Self {
			name: name.to_string(),
			path: path.to_path_buf(),
			entry,
			_library: library,
		})
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Returns a binding whose entry point lives as long as this library.
	pub fn binding(&self) -> GrammarBinding<'_> {
		// SAFETY: the library stays loaded while `self` is borrowed.
		unsafe { GrammarBinding::from_raw(self.name.clone(), self.entry) }
	}

	/// Builds the language handle, checking it against `abi`.
	pub fn language(&self, abi: AbiRange) -> Result<Language<'_>, GrammarError> {
		Ok(load_language_with(&self.binding(), abi)?)
	}
}

/// Returns the first existing library for `name` under `search_paths`.
pub fn find_grammar_library(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
	let lib_name = grammar_library_name(name);
	search_paths
		.iter()
		.map(|dir| dir.join(&lib_name))
		.find(|path| path.exists())
}

/// Loads a grammar by name from the default search paths.
pub fn load_grammar(name: &str) -> Result<LoadedGrammar, GrammarError> {
	let path = find_grammar_library(name, &grammar_search_paths())
		.ok_or_else(|| GrammarError::NotFound(name.to_string()))?;

	// SAFETY: loading a tree-sitter grammar from a dynamic library.
	unsafe { LoadedGrammar::open(name, &path, None) }
}

/// Opens and verifies a grammar library in one step.
pub fn verify_library(
	name: &str,
	path: &Path,
	symbol: Option<&str>,
	abi: AbiRange,
) -> Result<VerifyReport, GrammarError> {
	// SAFETY: loading a tree-sitter grammar from a dynamic library.
	let grammar = unsafe { LoadedGrammar::open(name, path, symbol)? };
	let language = grammar.language(abi)?;
	Ok(VerifyReport::new(name, &language))
}
