//! Parallel grammar building.

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use super::Result;
use super::compile::{BuildStatus, build_grammar};
use crate::config::GrammarConfig;

/// Callback type for progress reporting: `(grammar, status)`.
pub type ProgressCallback = Box<dyn Fn(&str, &str) + Send + Sync>;

/// Build all grammars in parallel, writing libraries into `lib_dir`.
pub fn build_all_grammars(
	grammars: Vec<GrammarConfig>,
	lib_dir: &Path,
	on_progress: Option<ProgressCallback>,
) -> Vec<(GrammarConfig, Result<BuildStatus>)> {
	let num_jobs = thread::available_parallelism()
		.map(|n| n.get())
		.unwrap_or(4)
		.min(8);
	let chunk_size = grammars.len().div_ceil(num_jobs).max(1);

	let (tx, rx) = mpsc::channel();
	thread::scope(|scope| {
		for chunk in grammars.chunks(chunk_size) {
			let tx = tx.clone();
			scope.spawn(move || {
				for grammar in chunk {
					let result = build_grammar(grammar, lib_dir);
					let _ = tx.send((grammar.clone(), result));
				}
			});
		}
		drop(tx);

		let mut results = Vec::with_capacity(grammars.len());
		for (grammar, result) in rx {
			if let Some(ref cb) = on_progress {
				let status = match &result {
					Ok(BuildStatus::AlreadyBuilt) => "up to date",
					Ok(BuildStatus::Built) => "built",
					Err(_) => "error",
				};
				cb(&grammar.name, status);
			}
			results.push((grammar, result));
		}
		results
	})
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use super::*;
	use crate::build::BuildError;

	#[test]
	fn test_every_grammar_reports_once() {
		let dir = tempfile::tempdir().unwrap();
		let grammars: Vec<_> = ["a", "b", "c"].into_iter().map(GrammarConfig::named).collect();

		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = Arc::clone(&seen);
		let progress: ProgressCallback = Box::new(move |name: &str, status: &str| {
			sink.lock().unwrap().push(format!("{name}:{status}"));
		});

		let results = build_all_grammars(grammars, dir.path(), Some(progress));
		assert_eq!(results.len(), 3);
		assert!(
			results
				.iter()
				.all(|(_, r)| matches!(r, Err(BuildError::NoSource(_))))
		);

		let mut seen = seen.lock().unwrap().clone();
		seen.sort();
		assert_eq!(seen, ["a:error", "b:error", "c:error"]);
	}

	#[test]
	fn test_empty_input() {
		let dir = tempfile::tempdir().unwrap();
		assert!(build_all_grammars(Vec::new(), dir.path(), None).is_empty());
	}
}
