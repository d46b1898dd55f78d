//! Grammar compilation into dynamic libraries.

use std::{fs, io};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use super::{BuildError, Result};
use crate::config::GrammarConfig;
use crate::paths::grammar_library_name;

/// Status of a build operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
	/// Library was newer than every source file.
	AlreadyBuilt,
	/// Library was (re)compiled.
	Built,
}

const SOURCE_FILES: [&str; 3] = ["parser.c", "scanner.c", "scanner.cc"];

/// Directory holding a grammar's generated `parser.c`.
pub fn grammar_src_dir(grammar: &GrammarConfig) -> Result<PathBuf> {
	grammar
		.source
		.as_ref()
		.map(|root| root.join("src"))
		.ok_or_else(|| BuildError::NoSource(grammar.name.clone()))
}

/// Returns true if the library is missing or older than any source file.
fn needs_recompile(src_dir: &Path, lib_path: &Path) -> bool {
	let Ok(lib_mtime) = fs::metadata(lib_path).and_then(|m| m.modified()) else {
		return true;
	};

	SOURCE_FILES.iter().any(|file| {
		fs::metadata(src_dir.join(file))
			.and_then(|m| m.modified())
			.is_ok_and(|src_mtime| src_mtime > lib_mtime)
	})
}

/// Compiles a grammar's C sources into `lib_dir`.
///
/// # Errors
///
/// * [`BuildError::NoParserSource`] if `src/parser.c` is missing.
/// * [`BuildError::NoCompiler`] if no compiler is found or the configured one cannot be run.
/// * [`BuildError::Compilation`] if the compiler exits unsuccessfully.
pub fn build_grammar(grammar: &GrammarConfig, lib_dir: &Path) -> Result<BuildStatus> {
	let src_dir = grammar_src_dir(grammar)?;
	if !src_dir.join("parser.c").exists() {
		return Err(BuildError::NoParserSource(src_dir));
	}

	fs::create_dir_all(lib_dir)?;
	let lib_path = lib_dir.join(grammar_library_name(&grammar.name));

	if !needs_recompile(&src_dir, &lib_path) {
		debug!(grammar = %grammar.name, lib_path = %lib_path.display(), "Grammar up to date");
		return Ok(BuildStatus::AlreadyBuilt);
	}

	info!(grammar = %grammar.name, lib_path = %lib_path.display(), "Compiling grammar");

	let needs_cxx = src_dir.join("scanner.cc").exists();
	let scratch_dir = lib_dir.join("obj").join(&grammar.name);
	fs::create_dir_all(&scratch_dir)?;
	let compiler = find_compiler(needs_cxx, &scratch_dir)?;
	link_shared_library(compiler, &src_dir, &lib_path, needs_cxx)?;

	if !lib_path.exists() {
		return Err(BuildError::Compilation(format!(
			"compiler succeeded but library not found at {}",
			lib_path.display()
		)));
	}

	debug!(grammar = %grammar.name, "Successfully compiled grammar");
	Ok(BuildStatus::Built)
}

fn host_target() -> String {
	std::env::var("TARGET").unwrap_or_else(|_| {
		let arch = std::env::consts::ARCH;
		if cfg!(target_os = "windows") {
			format!("{arch}-pc-windows-msvc")
		} else if cfg!(target_os = "macos") {
			format!("{arch}-apple-darwin")
		} else {
			format!("{arch}-unknown-linux-gnu")
		}
	})
}

/// A compiler invocation ready for source and output arguments.
struct Compiler {
	cmd: Command,
	msvc: bool,
	language: &'static str,
}

/// Returns true if `program` can be spawned at all.
fn compiler_runs(program: &Path) -> bool {
	Command::new(program)
		.arg("--version")
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.status()
		.is_ok()
}

/// Resolves the system compiler through `cc`, which honours `CC`/`CXX`,
/// falling back to common compiler names on `PATH`.
fn find_compiler(needs_cxx: bool, scratch_dir: &Path) -> Result<Compiler> {
	let language = if needs_cxx { "C++" } else { "C" };
	let target = host_target();
	let tool = cc::Build::new()
		.cargo_metadata(false)
		.cargo_warnings(false)
		.opt_level(3)
		.debug(false)
		.host(&target)
		.target(&target)
		.out_dir(scratch_dir)
		.cpp(needs_cxx)
		.try_get_compiler();

	match tool {
		Ok(tool) if compiler_runs(tool.path()) => Ok(Compiler {
			msvc: tool.is_like_msvc(),
			cmd: tool.to_command(),
			language,
		}),
		Ok(tool) => {
			warn!(compiler = %tool.path().display(), "Configured compiler cannot be run");
			Err(BuildError::NoCompiler(language))
		}
		Err(e) => {
			debug!(error = %e, "cc compiler lookup failed, searching PATH");
			let candidates: &[&str] = if needs_cxx {
				&["c++", "clang++", "g++"]
			} else {
				&["cc", "clang", "gcc"]
			};
			candidates
				.iter()
				.copied()
				.find(|name| compiler_runs(Path::new(name)))
				.map(|name| {
					let mut cmd = Command::new(name);
					cmd.arg("-O3");
					Compiler {
						cmd,
						msvc: false,
						language,
					}
				})
				.ok_or(BuildError::NoCompiler(language))
		}
	}
}

fn link_shared_library(compiler: Compiler, src_dir: &Path, lib_path: &Path, needs_cxx: bool) -> Result<()> {
	let scanner_cc = src_dir.join("scanner.cc");
	let scanner_c = src_dir.join("scanner.c");
	let Compiler {
		mut cmd,
		msvc,
		language,
	} = compiler;

	if msvc {
		cmd.args(["/nologo", "/LD", "/utf-8"])
			.arg(format!("/I{}", src_dir.display()))
			.arg(format!("/Fe:{}", lib_path.display()))
			.arg(src_dir.join("parser.c"));

		if needs_cxx {
			cmd.arg(&scanner_cc);
		} else if scanner_c.exists() {
			cmd.arg(&scanner_c);
		}
	} else {
		cmd.args(["-shared", "-fPIC"])
			.arg("-I")
			.arg(src_dir)
			.arg("-o")
			.arg(lib_path);

		if needs_cxx {
			// parser.c must stay C even when driven by a C++ compiler
			cmd.args(["-x", "c"]).arg(src_dir.join("parser.c"));
			cmd.args(["-x", "c++", "-std=c++14"]).arg(&scanner_cc).arg("-lstdc++");
		} else {
			cmd.arg(src_dir.join("parser.c"));
			if scanner_c.exists() {
				cmd.arg(&scanner_c);
			}
		}

		#[cfg(target_os = "linux")]
		cmd.arg("-Wl,-z,relro,-z,now");
	}

	run_compiler(cmd, language)
}

fn run_compiler(mut cmd: Command, language: &'static str) -> Result<()> {
	debug!(command = ?cmd, "Running compiler");
	let output = cmd.output().map_err(|e| match e.kind() {
		io::ErrorKind::NotFound => BuildError::NoCompiler(language),
		_ => BuildError::Compilation(e.to_string()),
	})?;

	if output.status.success() {
		Ok(())
	} else {
		Err(BuildError::Compilation(
			String::from_utf8_lossy(&output.stderr).into(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_missing_source_dir() {
		let err = build_grammar(&GrammarConfig::named("sql"), Path::new("unused")).unwrap_err();
		assert!(matches!(err, BuildError::NoSource(ref n) if n == "sql"));
	}

	#[test]
	fn test_missing_parser_c() {
		let dir = tempfile::tempdir().unwrap();
		let grammar = GrammarConfig {
			source: Some(dir.path().to_path_buf()),
			..GrammarConfig::named("sql")
		};

		let err = build_grammar(&grammar, &dir.path().join("out")).unwrap_err();
		assert!(matches!(err, BuildError::NoParserSource(ref p) if *p == dir.path().join("src")));
	}

	#[test]
	fn test_needs_recompile() {
		let dir = tempfile::tempdir().unwrap();
		let src = dir.path().join("src");
		fs::create_dir_all(&src).unwrap();
		let lib = dir.path().join("libsql.so");

		fs::write(src.join("parser.c"), "").unwrap();
		assert!(needs_recompile(&src, &lib), "missing library");

		fs::write(&lib, "").unwrap();
		let past = std::time::SystemTime::now() - std::time::Duration::from_secs(60);
		fs::File::options()
			.write(true)
			.open(src.join("parser.c"))
			.unwrap()
			.set_modified(past)
			.unwrap();
		assert!(!needs_recompile(&src, &lib), "library newer than sources");
	}

	#[test]
	fn test_compiler_that_cannot_spawn() {
		let missing = Path::new("/nonexistent/bin/cc");
		assert!(!compiler_runs(missing));

		let err = run_compiler(Command::new(missing), "C").unwrap_err();
		assert!(matches!(err, BuildError::NoCompiler("C")));
	}
}
