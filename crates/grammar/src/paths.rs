//! Grammar library naming and search path configuration.
//!
//! Compiled grammars are looked up, in order, under:
//! - `$TSPROBE_RUNTIME/grammars`
//! - `<workspace>/target/grammars` (when run through cargo)
//! - `$XDG_CACHE_HOME/tsprobe/grammars`
//! - `$XDG_DATA_HOME/tsprobe/grammars`

use std::path::PathBuf;

/// Environment variable naming a runtime directory searched before the
/// per-user ones.
pub const RUNTIME_ENV: &str = "TSPROBE_RUNTIME";

#[derive(Debug, Clone, Copy)]
enum UserDir {
	Cache,
	Data,
}

/// `<user cache or data dir>/tsprobe/grammars` for the current platform.
fn user_grammar_dir(kind: UserDir) -> Option<PathBuf> {
	#[cfg(unix)]
	{
		let (xdg, home_relative) = match kind {
			UserDir::Cache => ("XDG_CACHE_HOME", ".cache"),
			UserDir::Data => ("XDG_DATA_HOME", ".local/share"),
		};
		let root = std::env::var_os(xdg)
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(home_relative)))?;
		Some(root.join("tsprobe").join("grammars"))
	}
	#[cfg(windows)]
	{
		let root = PathBuf::from(std::env::var_os("LOCALAPPDATA")?).join("tsprobe");
		Some(match kind {
			UserDir::Cache => root.join("cache").join("grammars"),
			UserDir::Data => root.join("grammars"),
		})
	}
	#[cfg(not(any(unix, windows)))]
	{
		let _ = kind;
		None
	}
}

/// Returns directories to search for compiled grammar libraries.
pub fn grammar_search_paths() -> Vec<PathBuf> {
	let runtime = std::env::var_os(RUNTIME_ENV).map(|dir| PathBuf::from(dir).join("grammars"));
	let workspace = std::env::var_os("CARGO_MANIFEST_DIR").and_then(|manifest| {
		PathBuf::from(manifest)
			.ancestors()
			.nth(2)
			.map(|root| root.join("target").join("grammars"))
	});

	[
		runtime,
		workspace,
		user_grammar_dir(UserDir::Cache),
		user_grammar_dir(UserDir::Data),
	]
	.into_iter()
	.flatten()
	.collect()
}

/// Directory `build` writes libraries to when no `--out` is given: the first
/// search path, or `./grammars` when there is none.
pub fn grammar_lib_dir() -> PathBuf {
	grammar_search_paths()
		.into_iter()
		.next()
		.unwrap_or_else(|| PathBuf::from("grammars"))
}

/// Returns the platform-specific library filename for a grammar.
pub fn grammar_library_name(name: &str) -> String {
	let safe_name = name.replace('-', "_");
	#[cfg(target_os = "macos")]
	{
		format!("lib{safe_name}.dylib")
	}
	#[cfg(target_os = "windows")]
	{
		format!("{safe_name}.dll")
	}
	#[cfg(not(any(target_os = "macos", target_os = "windows")))]
	{
		format!("lib{safe_name}.so")
	}
}

/// Returns the entry point symbol a grammar named `name` exports.
pub fn grammar_symbol_name(name: &str) -> String {
	format!("tree_sitter_{}", name.replace('-', "_"))
}
