// Library code reports through tracing; the CLI owns the terminal.
#![deny(clippy::print_stderr)]

//! Loading and verification of compiled tree-sitter grammars.
//!
//! A compiled grammar exports one C function, `tree_sitter_<name>`, returning a
//! pointer to its rule tables. This crate checks that chain end to end: call
//! the entry point, hand the pointer to the tree-sitter runtime through a
//! [`Language`] handle and reject grammars the runtime cannot use.
//!
//! # Architecture
//!
//! - [`binding`]: Named grammar entry points (linked or resolved from a library)
//! - [`language`]: Borrowed handle over a runtime language
//! - [`verify`]: Load verification and reports
//! - [`loader`]: Shared library loading
//! - [`paths`]: Library naming and search paths
//! - [`config`]: Grammar manifest parsing from KDL
//! - [`build`]: Compiling grammar sources into shared libraries
//! - [`node_types`]: `node-types.json` summaries

pub mod binding;
pub mod build;
pub mod config;
pub mod language;
pub mod loader;
pub mod node_types;
pub mod paths;
pub mod verify;

pub use binding::{GrammarBinding, RawLanguageFn};
pub use config::{ConfigError, GrammarConfig, Manifest, load_manifest, parse_manifest};
pub use language::Language;
pub use loader::{GrammarError, LoadedGrammar, find_grammar_library, load_grammar, verify_library};
pub use paths::{grammar_library_name, grammar_search_paths, grammar_symbol_name};
pub use verify::{AbiRange, LoadError, VerifyReport, load_language, load_language_with, verify};
