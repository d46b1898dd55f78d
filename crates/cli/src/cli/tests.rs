use clap::CommandFactory;

use super::*;

#[test]
fn cli_schema_is_valid() {
	Cli::command().debug_assert();
}

#[test]
fn parse_check_with_names() {
	let cli = Cli::parse_from(["tsprobe", "check", "postgres", "json", "--json"]);
	let Command::Check {
		names,
		library,
		symbol,
		json,
	} = cli.command
	else {
		panic!("expected check");
	};
	assert_eq!(names, ["postgres", "json"]);
	assert!(library.is_none());
	assert!(symbol.is_none());
	assert!(json);
}

#[test]
fn parse_check_with_library() {
	let cli = Cli::parse_from([
		"tsprobe",
		"check",
		"pgls",
		"--library",
		"target/grammars/libpgls.so",
		"--symbol",
		"tree_sitter_postgres",
	]);
	let Command::Check { library, symbol, .. } = cli.command else {
		panic!("expected check");
	};
	assert_eq!(library, Some(PathBuf::from("target/grammars/libpgls.so")));
	assert_eq!(symbol.as_deref(), Some("tree_sitter_postgres"));
}

#[test]
fn symbol_requires_library() {
	assert!(Cli::try_parse_from(["tsprobe", "check", "sql", "--symbol", "x"]).is_err());
}

#[test]
fn parse_build_only_list() {
	let cli = Cli::parse_from(["tsprobe", "-v", "build", "--only", "a,b"]);
	assert!(cli.verbose);
	let Command::Build { only, out } = cli.command else {
		panic!("expected build");
	};
	assert_eq!(only, Some(vec!["a".to_string(), "b".to_string()]));
	assert!(out.is_none());
}

#[test]
fn global_manifest_after_subcommand() {
	let cli = Cli::parse_from(["tsprobe", "list", "--manifest", "other.kdl"]);
	assert_eq!(cli.manifest, Some(PathBuf::from("other.kdl")));
	assert!(matches!(cli.command, Command::List));
}
