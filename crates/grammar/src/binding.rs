//! Grammar bindings: named entry points that produce raw grammar pointers.

use std::marker::PhantomData;

use tree_sitter_language::LanguageFn;

/// Signature of the `tree_sitter_<name>` function exported by a compiled grammar.
pub type RawLanguageFn = unsafe extern "C" fn() -> *const ();

/// A grammar entry point paired with the grammar's name.
///
/// `'lib` bounds how long the entry point may be called. Bindings built from a
/// [`LanguageFn`] are `'static`; bindings resolved from a shared library borrow
/// the [`LoadedGrammar`](crate::loader::LoadedGrammar) that owns it.
#[derive(Debug, Clone)]
pub struct GrammarBinding<'lib> {
	name: String,
	entry: RawLanguageFn,
	_library: PhantomData<&'lib ()>,
}

impl GrammarBinding<'static> {
	/// Wraps a grammar linked into the current binary.
	pub fn new(name: impl Into<String>, language: LanguageFn) -> Self {
		Self {
			name: name.into(),
			entry: language.into_raw(),
			_library: PhantomData,
		}
	}
}

impl<'lib> GrammarBinding<'lib> {
	/// Wraps a raw entry point.
	///
	/// # Safety
	///
	/// `entry` must be callable for all of `'lib` and return either null or a
	/// pointer to a compiled tree-sitter language valid for `'lib`.
	pub unsafe fn from_raw(name: impl Into<String>, entry: RawLanguageFn) -> Self {
		Self {
			name: name.into(),
			entry,
			_library: PhantomData,
		}
	}

	/// Grammar name, as used in error messages.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Calls the entry point. The result may be null.
	pub fn raw(&self) -> *const () {
		// SAFETY: guaranteed callable for `'lib` by the constructors.
		unsafe { (self.entry)() }
	}
}
