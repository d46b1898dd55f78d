//! Subcommand implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Serialize;
use tracing::{debug, info, warn};
use tsprobe_grammar::build::{BuildStatus, ProgressCallback, build_all_grammars};
use tsprobe_grammar::paths::grammar_lib_dir;
use tsprobe_grammar::{
	GrammarConfig, GrammarError, Manifest, VerifyReport, find_grammar_library, grammar_search_paths,
	load_manifest, node_types, verify_library,
};

use crate::cli::DEFAULT_MANIFEST;

/// Loads the manifest named on the command line, `./grammars.kdl`, or nothing.
pub fn resolve_manifest(path: Option<&Path>) -> anyhow::Result<Manifest> {
	if let Some(path) = path {
		return load_manifest(path).with_context(|| format!("loading {}", path.display()));
	}

	let default = Path::new(DEFAULT_MANIFEST);
	if default.exists() {
		return load_manifest(default).with_context(|| format!("loading {DEFAULT_MANIFEST}"));
	}

	debug!("No manifest found, using defaults");
	Ok(Manifest::default())
}

/// Result of checking one grammar.
#[derive(Debug, Serialize)]
pub struct CheckOutcome {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub library: Option<PathBuf>,
	#[serde(flatten)]
	pub result: CheckResult,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckResult {
	Ok { report: VerifyReport },
	Failed { error: String },
}

impl CheckOutcome {
	pub fn passed(&self) -> bool {
		matches!(self.result, CheckResult::Ok { .. })
	}
}

/// Checks the named grammars (all manifest grammars when `names` is empty).
pub fn check(
	manifest: &Manifest,
	names: &[String],
	library: Option<&Path>,
	symbol: Option<&str>,
) -> anyhow::Result<Vec<CheckOutcome>> {
	if let Some(library) = library {
		let [name] = names else {
			bail!("--library needs exactly one grammar name");
		};
		let config = override_config(manifest, name, library, symbol);
		return Ok(vec![check_one(manifest, &config)]);
	}

	let configs: Vec<GrammarConfig> = if names.is_empty() {
		manifest.grammars.clone()
	} else {
		names.iter().map(|name| manifest_config(manifest, name)).collect()
	};

	if configs.is_empty() {
		bail!("no grammars to check; pass names or a manifest");
	}

	Ok(configs.iter().map(|config| check_one(manifest, config)).collect())
}

fn manifest_config(manifest: &Manifest, name: &str) -> GrammarConfig {
	manifest
		.grammar(name)
		.cloned()
		.unwrap_or_else(|| GrammarConfig::named(name))
}

/// Applies `--library`/`--symbol` on top of the manifest entry for `name`.
fn override_config(manifest: &Manifest, name: &str, library: &Path, symbol: Option<&str>) -> GrammarConfig {
	let base = manifest_config(manifest, name);
	GrammarConfig {
		library: Some(library.to_path_buf()),
		symbol: symbol.map(String::from).or(base.symbol),
		..base
	}
}

/// True when every checked grammar loaded.
pub fn all_passed(outcomes: &[CheckOutcome]) -> bool {
	outcomes.iter().all(CheckOutcome::passed)
}

fn check_one(manifest: &Manifest, config: &GrammarConfig) -> CheckOutcome {
	let library = config
		.library
		.clone()
		.or_else(|| find_grammar_library(&config.name, &grammar_search_paths()));

	let result = match &library {
		None => Err(GrammarError::NotFound(config.name.clone())),
		Some(path) => verify_library(&config.name, path, config.symbol.as_deref(), manifest.abi),
	};

	let result = match result {
		Ok(report) => {
			info!(grammar = %config.name, abi = report.abi_version, "Grammar loaded");
			CheckResult::Ok {
				report: attach_node_types(report, config),
			}
		}
		Err(e) => {
			warn!(grammar = %config.name, error = %e, "Grammar check failed");
			CheckResult::Failed {
				error: e.to_string(),
			}
		}
	};

	CheckOutcome {
		name: config.name.clone(),
		library,
		result,
	}
}

fn attach_node_types(report: VerifyReport, config: &GrammarConfig) -> VerifyReport {
	let Some(source) = &config.source else {
		return report;
	};
	match node_types::summarize_source(source) {
		Ok(summary) => report.with_node_types(summary),
		Err(e) => {
			debug!(grammar = %config.name, error = %e, "No node types summary");
			report
		}
	}
}

/// Writes outcomes as text or JSON.
pub fn render_outcomes(out: &mut impl Write, outcomes: &[CheckOutcome], json: bool) -> anyhow::Result<()> {
	if json {
		serde_json::to_writer_pretty(&mut *out, outcomes)?;
		writeln!(out)?;
		return Ok(());
	}

	for outcome in outcomes {
		match &outcome.result {
			CheckResult::Ok { report } => {
				write!(
					out,
					"ok    {}  abi {}, {} node kinds, {} states, {} fields",
					report.name,
					report.abi_version,
					report.node_kind_count,
					report.parse_state_count,
					report.field_count
				)?;
				if let Some(types) = &report.node_types {
					write!(out, ", {} named nodes", types.named)?;
				}
				writeln!(out)?;
			}
			CheckResult::Failed { error } => writeln!(out, "FAIL  {}  {error}", outcome.name)?,
		}
	}
	Ok(())
}

/// Builds manifest grammars that have a source directory.
pub fn build(manifest: &Manifest, only: Option<&[String]>, out: Option<&Path>) -> anyhow::Result<bool> {
	let grammars: Vec<GrammarConfig> = manifest
		.grammars
		.iter()
		.filter(|g| g.source.is_some())
		.filter(|g| only.is_none_or(|only| only.contains(&g.name)))
		.cloned()
		.collect();

	if grammars.is_empty() {
		bail!("no buildable grammars selected");
	}

	let lib_dir = out.map_or_else(grammar_lib_dir, Path::to_path_buf);
	info!(count = grammars.len(), lib_dir = %lib_dir.display(), "Building grammars");

	let progress: ProgressCallback = Box::new(|name: &str, status: &str| println!("{status:>10}  {name}"));
	let results = build_all_grammars(grammars, &lib_dir, Some(progress));

	let mut ok = true;
	for (grammar, result) in &results {
		match result {
			Ok(BuildStatus::Built | BuildStatus::AlreadyBuilt) => {}
			Err(e) => {
				ok = false;
				eprintln!("error: {}: {e}", grammar.name);
			}
		}
	}
	Ok(ok)
}

/// Prints manifest grammars and the library each resolves to.
pub fn list(out: &mut impl Write, manifest: &Manifest) -> anyhow::Result<()> {
	let search_paths = grammar_search_paths();
	writeln!(out, "abi {}..={}", manifest.abi.min, manifest.abi.max)?;

	for grammar in &manifest.grammars {
		let library = grammar
			.library
			.clone()
			.or_else(|| find_grammar_library(&grammar.name, &search_paths));
		match library {
			Some(path) => writeln!(out, "{}  {}", grammar.name, path.display())?,
			None => writeln!(out, "{}  (not built)", grammar.name)?,
		}
	}
	Ok(())
}
