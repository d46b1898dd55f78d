//! Grammar manifest parsing from KDL.
//!
//! # KDL Format
//!
//! ```kdl
//! abi min=13 max=15
//!
//! grammar postgres {
//!     symbol tree_sitter_postgres
//!     library "target/grammars/libpostgres.so"
//!     source "grammars/postgres"
//! }
//! ```
//!
//! Relative `library` and `source` paths resolve against the manifest's directory.

use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode};
use thiserror::Error;

use crate::verify::AbiRange;

/// Errors that can occur when parsing a manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse KDL: {0}")]
	Kdl(#[from] kdl::KdlError),

	#[error("I/O error reading {path}: {error}")]
	Io {
		path: PathBuf,
		error: std::io::Error,
	},

	#[error("missing required field: {0}")]
	MissingField(String),

	#[error("unknown node '{0}'")]
	UnknownNode(String),

	#[error("node '{0}' given more than once")]
	DuplicateNode(String),

	#[error("invalid value for {field}: {value}")]
	InvalidValue { field: String, value: String },

	#[error("invalid ABI range: min {min} is greater than max {max}")]
	InvalidAbiRange { min: u32, max: u32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// One grammar entry of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarConfig {
	pub name: String,
	/// Entry point override; defaults to `tree_sitter_<name>`.
	pub symbol: Option<String>,
	/// Explicit library path; otherwise the search paths are used.
	pub library: Option<PathBuf>,
	/// Grammar root containing `src/parser.c`.
	pub source: Option<PathBuf>,
}

impl GrammarConfig {
	pub fn named(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			symbol: None,
			library: None,
			source: None,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
	pub abi: AbiRange,
	pub grammars: Vec<GrammarConfig>,
}

impl Manifest {
	pub fn grammar(&self, name: &str) -> Option<&GrammarConfig> {
		self.grammars.iter().find(|g| g.name == name)
	}
}

/// Reads a manifest file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
	let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
		path: path.to_path_buf(),
		error,
	})?;
	let base = path.parent().unwrap_or_else(|| Path::new("."));
	parse_manifest(&input, base)
}

/// Parses a manifest, resolving relative paths against `base`.
pub fn parse_manifest(input: &str, base: &Path) -> Result<Manifest> {
	let doc: KdlDocument = input.parse()?;
	let mut manifest = Manifest::default();

	for node in doc.nodes() {
		match node.name().value() {
			"abi" => manifest.abi = parse_abi(node)?,
			"grammar" => manifest.grammars.push(parse_grammar(node, base)?),
			other => return Err(ConfigError::UnknownNode(other.to_string())),
		}
	}

	Ok(manifest)
}

fn parse_abi(node: &KdlNode) -> Result<AbiRange> {
	let default = AbiRange::default();
	let min = integer_prop(node, "min")?.unwrap_or(default.min);
	let max = integer_prop(node, "max")?.unwrap_or(default.max);

	if min > max {
		return Err(ConfigError::InvalidAbiRange { min, max });
	}
	Ok(AbiRange { min, max })
}

fn integer_prop(node: &KdlNode, key: &str) -> Result<Option<u32>> {
	let Some(entry) = node.entry(key) else {
		return Ok(None);
	};
	entry
		.value()
		.as_integer()
		.and_then(|v| u32::try_from(v).ok())
		.map(Some)
		.ok_or_else(|| ConfigError::InvalidValue {
			field: format!("abi.{key}"),
			value: entry.value().to_string(),
		})
}

fn parse_grammar(node: &KdlNode, base: &Path) -> Result<GrammarConfig> {
	let name = node
		.entry(0)
		.filter(|e| e.name().is_none())
		.and_then(|e| e.value().as_string())
		.map(String::from)
		.ok_or_else(|| ConfigError::MissingField("grammar name".into()))?;

	let (mut symbol, mut library, mut source) = (None, None, None);
	for child in node.children().map(KdlDocument::nodes).unwrap_or_default() {
		let key = child.name().value();
		let field = format!("{name}.{key}");
		let slot = match key {
			"symbol" => &mut symbol,
			"library" => &mut library,
			"source" => &mut source,
			_ => return Err(ConfigError::UnknownNode(field)),
		};
		if slot.is_some() {
			return Err(ConfigError::DuplicateNode(field));
		}
		*slot = Some(string_value(child, &field)?);
	}

	Ok(GrammarConfig {
		symbol,
		library: library.map(|p| base.join(p)),
		source: source.map(|p| base.join(p)),
		name,
	})
}

/// The single string argument of `node`.
fn string_value(node: &KdlNode, field: &str) -> Result<String> {
	let entry = node
		.entry(0)
		.ok_or_else(|| ConfigError::MissingField(field.to_string()))?;
	entry
		.value()
		.as_string()
		.map(String::from)
		.ok_or_else(|| ConfigError::InvalidValue {
			field: field.to_string(),
			value: entry.value().to_string(),
		})
}
