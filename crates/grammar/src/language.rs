//! Borrowed handle over a compiled grammar, backed by the tree-sitter runtime.

use std::fmt;
use std::marker::PhantomData;

/// A non-null grammar handed to the tree-sitter runtime.
///
/// The lifetime ties the handle to whatever owns the grammar memory:
/// `'static` for grammars linked into the binary, the owning
/// [`LoadedGrammar`](crate::loader::LoadedGrammar) for shared libraries.
pub struct Language<'lib> {
	inner: tree_sitter::Language,
	_owner: PhantomData<&'lib ()>,
}

impl<'lib> Language<'lib> {
	/// Wraps a raw grammar pointer, returning `None` if it is null.
	///
	/// # Safety
	///
	/// A non-null `ptr` must point to a compiled tree-sitter language that
	/// stays valid for `'lib`.
	pub unsafe fn from_raw(ptr: *const ()) -> Option<Self> {
		if ptr.is_null() {
			return None;
		}
		// SAFETY: non-null and valid for `'lib` per the caller.
		let inner = unsafe { tree_sitter::Language::from_raw(ptr.cast()) };
		Some(Self {
			inner,
			_owner: PhantomData,
		})
	}

	pub fn as_ptr(&self) -> *const () {
		self.inner.clone().into_raw().cast()
	}

	/// ABI version the grammar was generated for.
	pub fn abi_version(&self) -> u32 {
		self.inner.abi_version() as u32
	}

	/// Named and anonymous node kinds, aliases included.
	pub fn node_kind_count(&self) -> usize {
		self.inner.node_kind_count()
	}

	pub fn parse_state_count(&self) -> usize {
		self.inner.parse_state_count()
	}

	pub fn field_count(&self) -> usize {
		self.inner.field_count()
	}

	/// Builds a parser for this grammar.
	///
	/// Fails when the runtime refuses the grammar's ABI version.
	pub fn parser(&self) -> Result<tree_sitter::Parser, tree_sitter::LanguageError> {
		let mut parser = tree_sitter::Parser::new();
		parser.set_language(&self.inner)?;
		Ok(parser)
	}
}

impl Clone for Language<'_> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
			_owner: PhantomData,
		}
	}
}

impl fmt::Debug for Language<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Language")
			.field("ptr", &self.as_ptr())
			.field("abi_version", &self.abi_version())
			.field("node_kind_count", &self.node_kind_count())
			.finish()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	/// Leading fields of a generated language struct, zero padded past the
	/// header so the runtime never reads beyond the static.
	#[allow(dead_code)]
	#[repr(C)]
	pub(crate) struct TableHeader {
		pub(crate) abi_version: u32,
		pub(crate) symbol_count: u32,
		pub(crate) alias_count: u32,
		pub(crate) token_count: u32,
		pub(crate) external_token_count: u32,
		pub(crate) state_count: u32,
		pub(crate) large_state_count: u32,
		pub(crate) production_id_count: u32,
		pub(crate) field_count: u32,
		pub(crate) max_alias_sequence_length: u16,
		pub(crate) tables: [usize; 64],
	}

	impl TableHeader {
		pub(crate) const fn new(abi_version: u32, symbols: u32, states: u32, fields: u32) -> Self {
			Self {
				abi_version,
				symbol_count: symbols,
				alias_count: 0,
				token_count: 0,
				external_token_count: 0,
				state_count: states,
				large_state_count: 0,
				production_id_count: 0,
				field_count: fields,
				max_alias_sequence_length: 0,
				tables: [0; 64],
			}
		}
	}

	pub(crate) static FIXTURE: TableHeader = TableHeader::new(14, 312, 4096, 12);

	#[test]
	fn test_null_pointer_yields_none() {
		let language = unsafe { Language::from_raw(std::ptr::null()) };
		assert!(language.is_none());
	}

	#[test]
	fn test_counts_come_from_runtime() {
		let ptr = std::ptr::from_ref(&FIXTURE).cast::<()>();
		let language = unsafe { Language::from_raw(ptr) }.expect("non-null pointer");

		assert_eq!(language.abi_version(), 14);
		assert_eq!(language.node_kind_count(), 312);
		assert_eq!(language.parse_state_count(), 4096);
		assert_eq!(language.field_count(), 12);
		assert_eq!(language.as_ptr(), ptr);
	}

	#[test]
	fn test_real_grammar_parses() {
		let language: Language<'static> =
			unsafe { Language::from_raw(tree_sitter_json::LANGUAGE.into_raw()()) }.unwrap();
		let mut parser = language.parser().unwrap();
		let tree = parser.parse(r#"{"a": [1, 2]}"#, None).unwrap();

		assert_eq!(tree.root_node().kind(), "document");
		assert!(!tree.root_node().has_error());
	}
}
