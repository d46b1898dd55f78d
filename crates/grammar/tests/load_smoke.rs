#![allow(unused_crate_dependencies)]

use tree_sitter_language::LanguageFn;
use tsprobe_grammar::{AbiRange, GrammarBinding, LoadError, load_language, verify};

// Only ever read through the raw pointer.
#[allow(dead_code)]
#[repr(C)]
struct TableHeader {
	abi_version: u32,
	counts: [u32; 8],
	max_alias_sequence_length: u16,
	tables: [usize; 64],
}

static CORRUPT_TABLES: TableHeader = TableHeader {
	abi_version: 0,
	counts: [0; 8],
	max_alias_sequence_length: 0,
	tables: [0; 64],
};

static BLANK_TABLES: TableHeader = TableHeader {
	abi_version: 14,
	counts: [0; 8],
	max_alias_sequence_length: 0,
	tables: [0; 64],
};

unsafe extern "C" fn tree_sitter_missing() -> *const () {
	std::ptr::null()
}

unsafe extern "C" fn tree_sitter_corrupt() -> *const () {
	std::ptr::from_ref(&CORRUPT_TABLES).cast()
}

unsafe extern "C" fn tree_sitter_blank() -> *const () {
	std::ptr::from_ref(&BLANK_TABLES).cast()
}

const MISSING: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_missing) };
const CORRUPT: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_corrupt) };
const BLANK: LanguageFn = unsafe { LanguageFn::from_raw(tree_sitter_blank) };

#[test]
fn test_can_load_grammar() {
	let binding = GrammarBinding::new("json", tree_sitter_json::LANGUAGE);
	let language = load_language(&binding).expect("Error loading json grammar");

	assert!(!language.as_ptr().is_null());
	assert!(language.node_kind_count() > 0);
	assert!(language.field_count() > 0);

	let mut parser = language.parser().unwrap();
	let tree = parser.parse("[true, null]", None).unwrap();
	assert_eq!(tree.root_node().child(0).unwrap().kind(), "array");
}

#[test]
fn test_loading_is_repeatable() {
	let binding = GrammarBinding::new("json", tree_sitter_json::LANGUAGE);
	let first = load_language(&binding).unwrap();
	let second = load_language(&binding).unwrap();
	assert_eq!(first.as_ptr(), second.as_ptr());
}

#[test]
fn test_null_grammar_fails_with_message() {
	let binding = GrammarBinding::new("missing", MISSING);
	let err = load_language(&binding).unwrap_err();
	assert_eq!(err.to_string(), "Error loading missing grammar");
}

#[test]
fn test_corrupt_grammar_is_rejected() {
	let binding = GrammarBinding::new("corrupt", CORRUPT);
	let err = load_language(&binding).unwrap_err();
	assert!(matches!(err, LoadError::IncompatibleVersion { version: 0, .. }));
}

#[test]
fn test_header_without_tables_is_rejected() {
	let binding = GrammarBinding::new("blank", BLANK);
	let err = load_language(&binding).unwrap_err();
	assert_eq!(
		err,
		LoadError::EmptyTables {
			name: "blank".into()
		}
	);
}

#[test]
fn test_report_serializes() {
	let binding = GrammarBinding::new("json", tree_sitter_json::LANGUAGE);
	let report = verify(&binding, AbiRange::default()).unwrap();
	let json = serde_json::to_value(&report).unwrap();

	assert_eq!(json["name"], "json");
	assert_eq!(json["abi_version"], report.abi_version);
	assert!(json["parse_state_count"].as_u64().unwrap() > 0);
	assert!(json.get("node_types").is_none());
}
