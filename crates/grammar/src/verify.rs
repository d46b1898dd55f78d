//! Grammar load verification.
//!
//! Calls a binding's entry point, wraps the result in a [`Language`] and
//! rejects absent handles and anything the runtime cannot use.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::binding::GrammarBinding;
use crate::language::Language;
use crate::node_types::NodeTypesSummary;

/// Oldest table ABI the runtime accepts.
pub const MIN_COMPATIBLE_ABI_VERSION: u32 = tree_sitter::MIN_COMPATIBLE_LANGUAGE_VERSION as u32;

/// Newest table ABI the runtime accepts.
pub const ABI_VERSION: u32 = tree_sitter::LANGUAGE_VERSION as u32;

/// Errors raised while turning a binding into a language handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
	/// The entry point returned a null grammar.
	#[error("Error loading {name} grammar")]
	LoadFailure { name: String },

	/// The grammar was generated for an ABI outside the accepted range.
	#[error(
		"Error loading {name} grammar: incompatible ABI version {version} (supported {min}..={max})"
	)]
	IncompatibleVersion {
		name: String,
		version: u32,
		min: u32,
		max: u32,
	},

	/// The runtime accepted the grammar but it declares no node kinds or no
	/// parse states.
	#[error("Error loading {name} grammar: empty parse tables")]
	EmptyTables { name: String },
}

/// Inclusive range of accepted ABI versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AbiRange {
	pub min: u32,
	pub max: u32,
}

impl Default for AbiRange {
	fn default() -> Self {
		Self {
			min: MIN_COMPATIBLE_ABI_VERSION,
			max: ABI_VERSION,
		}
	}
}

impl AbiRange {
	pub fn contains(&self, version: u32) -> bool {
		(self.min..=self.max).contains(&version)
	}
}

/// Loads the language behind `binding`, checking it against the default ABI range.
pub fn load_language<'lib>(binding: &GrammarBinding<'lib>) -> Result<Language<'lib>, LoadError> {
	load_language_with(binding, AbiRange::default())
}

/// Loads the language behind `binding`.
///
/// The runtime decides which ABI versions it can read; `abi` can only narrow
/// that further.
pub fn load_language_with<'lib>(
	binding: &GrammarBinding<'lib>,
	abi: AbiRange,
) -> Result<Language<'lib>, LoadError> {
	let name = binding.name();

	// SAFETY: a binding's entry point returns null or a language valid for `'lib`.
	let Some(language) = (unsafe { Language::from_raw(binding.raw()) }) else {
		warn!(grammar = %name, "Grammar entry point returned null");
		return Err(LoadError::LoadFailure {
			name: name.to_string(),
		});
	};

	let version = language.abi_version();
	let incompatible = |min: u32, max: u32| {
		warn!(grammar = %name, version, min, max, "Incompatible grammar ABI");
		LoadError::IncompatibleVersion {
			name: name.to_string(),
			version,
			min,
			max,
		}
	};

	if let Err(err) = language.parser() {
		debug!(grammar = %name, %err, "Runtime rejected grammar");
		return Err(incompatible(MIN_COMPATIBLE_ABI_VERSION, ABI_VERSION));
	}

	if language.node_kind_count() == 0 || language.parse_state_count() == 0 {
		warn!(grammar = %name, "Grammar has empty parse tables");
		return Err(LoadError::EmptyTables {
			name: name.to_string(),
		});
	}

	if !abi.contains(version) {
		return Err(incompatible(abi.min, abi.max));
	}

	debug!(
		grammar = %name,
		version,
		kinds = language.node_kind_count(),
		"Loaded grammar"
	);
	Ok(language)
}

/// Summary of a successfully verified grammar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
	pub name: String,
	pub abi_version: u32,
	pub node_kind_count: usize,
	pub parse_state_count: usize,
	pub field_count: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub node_types: Option<NodeTypesSummary>,
}

impl VerifyReport {
	pub fn new(name: impl Into<String>, language: &Language<'_>) -> Self {
		Self {
			name: name.into(),
			abi_version: language.abi_version(),
			node_kind_count: language.node_kind_count(),
			parse_state_count: language.parse_state_count(),
			field_count: language.field_count(),
			node_types: None,
		}
	}

	pub fn with_node_types(mut self, summary: NodeTypesSummary) -> Self {
		self.node_types = Some(summary);
		self
	}
}

/// Verifies `binding` and summarises the resulting language.
pub fn verify(binding: &GrammarBinding<'_>, abi: AbiRange) -> Result<VerifyReport, LoadError> {
	let language = load_language_with(binding, abi)?;
	Ok(VerifyReport::new(binding.name(), &language))
}
