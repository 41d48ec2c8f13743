use std::fs;
use std::path::PathBuf;

use helpspec_core::{
    Bound, CountRange, DefaultValueRule, ErrorKind, MemberKind, ParserConfig, PropertyDialect,
    Syntax, ValueConstraint, ValueType,
};
use helpspec_parser::{HelpDocument, ModelResolver, Session, parse_help_file, parse_help_text};
use helpspec_template::render;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should exist")
}

fn parse(text: &str) -> HelpDocument {
    parse_help_text(text, &ParserConfig::default()).expect("help text should parse")
}

#[test]
fn test_tool_fixture_members() {
    let doc = parse_help_file(fixture_path("tool.help"), &ParserConfig::default())
        .expect("fixture should parse");

    let names: Vec<&str> = doc.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "debug",
            "dest",
            "end_of_options",
            "help",
            "include",
            "jobs",
            "mode",
            "size",
            "source",
            "verbose",
            "version",
        ]
    );
    assert_eq!(doc.options().len(), 10);
    assert_eq!(doc.positionals().len(), 2);

    assert_eq!(doc.member("help").unwrap().kind, MemberKind::Help);
    assert_eq!(doc.member("version").unwrap().kind, MemberKind::Info);
    assert_eq!(doc.member("end_of_options").unwrap().kind, MemberKind::Final);
}

#[test]
fn test_tool_fixture_shared_member() {
    let doc = parse(&fixture("tool.help"));
    let verbose = doc.member("verbose").unwrap();

    assert_eq!(verbose.arguments.len(), 2);
    assert_eq!(verbose.flags(), vec!["-v", "--verbose", "-q", "--quiet"]);
    assert_eq!(verbose.value_type, ValueType::Bool);
    assert_eq!(verbose.kind, MemberKind::List);
    assert_eq!(verbose.count, CountRange::new(0, Bound::Bounded(3)));
    assert_eq!(verbose.default, vec!["false"]);
    assert_eq!(
        verbose.arguments[1].value,
        Some(vec!["false".to_string()])
    );
}

#[test]
fn test_tool_fixture_values_and_defaults() {
    let doc = parse(&fixture("tool.help"));

    let jobs = doc.member("jobs").unwrap();
    assert_eq!(jobs.value_type, ValueType::Int);
    assert_eq!(jobs.kind, MemberKind::Value);
    assert_eq!(jobs.default, vec!["1"]);
    assert_eq!(jobs.arguments[0].meta_variable.as_deref(), Some("N"));

    let mode = doc.member("mode").unwrap();
    assert_eq!(mode.value_type, ValueType::String);
    assert_eq!(mode.default, vec!["\"safe\""]);
    assert_eq!(
        mode.values,
        vec![
            ValueConstraint::Exact("\"fast\"".to_string()),
            ValueConstraint::Exact("\"safe\"".to_string()),
        ]
    );

    let include = doc.member("include").unwrap();
    assert_eq!(include.kind, MemberKind::List);
    assert_eq!(include.value_type, ValueType::String);
    assert_eq!(include.count, CountRange::ZERO_OR_MORE);

    let size = doc.member("size").unwrap();
    assert_eq!(size.kind, MemberKind::MultiValue);
    assert_eq!(size.value_type, ValueType::Double);
    assert_eq!(size.default, vec!["0", "0"]);
    assert_eq!(size.arguments[0].delimiter, Some(','));
    assert_eq!(size.count, CountRange::new(0, Bound::Bounded(2)));
}

#[test]
fn test_tool_fixture_positionals() {
    let doc = parse(&fixture("tool.help"));

    let source = doc.member("source").unwrap();
    assert_eq!(source.arguments[0].index, Some(0));
    assert_eq!(source.count, CountRange::EXACTLY_ONE);
    assert_eq!(source.kind, MemberKind::Value);

    let dest = doc.member("dest").unwrap();
    assert_eq!(dest.arguments[0].index, Some(1));
    assert_eq!(dest.count, CountRange::ZERO_OR_MORE);
    assert_eq!(dest.kind, MemberKind::List);

    let positionals: Vec<&str> = doc
        .positionals()
        .iter()
        .map(|arg| arg.member_name.as_str())
        .collect();
    assert_eq!(positionals, vec!["source", "dest"]);
}

#[test]
fn test_tool_fixture_text_and_hidden_definition() {
    let doc = parse(&fixture("tool.help"));

    assert!(!doc.text.contains("${"));
    assert!(!doc.text.contains("--debug"));
    assert!(doc.text.contains("\n  -h, --help              Show this help and exit.\n"));
    assert!(doc.text.contains("End of options.\n\nArguments:\n"));

    let debug = doc.member("debug").unwrap();
    let arg = &debug.arguments[0];
    assert!(!arg.visible);
    assert_eq!(arg.text, "--debug");
    assert_eq!(arg.flags, vec!["--debug"]);
    assert_eq!(arg.line_number, 16);

    assert_eq!(
        doc.definition_lines,
        vec![5, 6, 7, 8, 9, 10, 12, 13, 14, 17, 18]
    );
    let lines: Vec<&str> = doc.text.split('\n').collect();
    for &line in &doc.definition_lines {
        assert!(!lines[line].trim().is_empty());
    }
}

#[test]
fn test_member_of_links_arguments_back() {
    let doc = parse(&fixture("tool.help"));
    for arg in doc.arguments() {
        let member = doc.member_of(arg).expect("argument should have a member");
        assert_eq!(member.name, arg.member_name);
    }
    let ordinals: Vec<usize> = doc.arguments().iter().map(|arg| arg.ordinal).collect();
    assert_eq!(ordinals, (0..12).collect::<Vec<_>>());
}

#[test]
fn test_points_fixture_delimiters() {
    let doc = parse(&fixture("points.help"));

    let point = doc.member("point").unwrap();
    assert_eq!(point.kind, MemberKind::MultiValue);
    assert_eq!(point.value_type, ValueType::Double);
    assert_eq!(point.default, vec!["0.0", "0.0", "0.0"]);
    assert_eq!(point.arguments[0].delimiter, Some(':'));
    assert_eq!(point.arguments[0].delimiter_count, CountRange::exactly(2));
    assert_eq!(point.count, CountRange::new(0, Bound::Bounded(3)));

    let color = doc.member("color").unwrap();
    assert_eq!(color.kind, MemberKind::MultiValue);
    assert_eq!(color.value_type, ValueType::Int);
    assert_eq!(color.default, vec!["0", "0", "0"]);
    assert_eq!(
        color.arguments[1].value,
        Some(vec!["255".to_string(), "0".to_string(), "0".to_string()])
    );

    let tag = doc.member("tag").unwrap();
    assert_eq!(tag.kind, MemberKind::List);
    assert_eq!(tag.arguments[0].delimiter, Some(';'));
    assert_eq!(tag.count.max, Bound::Unbounded);
}

#[test]
fn test_duplicate_index_fixture() {
    let err = parse_help_file(fixture_path("bad_index.help"), &ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateIndex);
    assert_eq!(err.lines, vec![3, 4]);
    assert!(err.file_name.as_deref().unwrap().ends_with("bad_index.help"));
    assert!(err.to_string().contains("[3, 4] Error: "));
}

#[test]
fn test_unclosed_definition_fixture() {
    let err = parse_help_file(fixture_path("bad_unclosed.help"), &ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedDefinition);
    assert_eq!(err.lines, vec![4]);
    assert!(err.message.contains("}$"));
}

#[test]
fn test_mixed_member_fixture_is_rejected() {
    let err = parse_help_text(&fixture("bad_mixed.help"), &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingProperty);
    assert_eq!(err.lines, vec![3, 4]);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.help");
    let err = parse_help_file(&path, &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
    assert_eq!(err.file_name.as_deref(), Some(path.display().to_string().as_str()));
}

#[test]
fn test_errors_carry_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.help");
    fs::write(&path, "Usage:\n\n  ${-x | Colour: red}$\n").unwrap();

    let err = parse_help_file(&path, &ParserConfig::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownProperty);
    assert_eq!(err.lines, vec![3]);
    assert_eq!(err.message, "Unknown property name: Colour");
    assert!(err.to_string().starts_with(&path.display().to_string()));
}

#[test]
fn test_escaped_separator_stays_in_text() {
    let doc = parse("${<a||b> | Member: ab}$ Either.");
    assert_eq!(doc.text, "<a||b>  Either.");
    let ab = doc.member("ab").unwrap();
    assert_eq!(ab.arguments[0].text, "<a||b>");
}

#[test]
fn test_dialects_use_different_aliases() {
    let classic = ParserConfig::default();
    let extended = ParserConfig {
        dialect: PropertyDialect::Extended,
        ..ParserConfig::default()
    };

    let text = "${-c N | Vals: 1 2 3}$ Count.";
    let err = parse_help_text(text, &classic).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownProperty);

    let doc = parse_help_text(text, &extended).unwrap();
    assert_eq!(doc.member("c").unwrap().value_type, ValueType::Int);

    let text = "${-c A,B | DelCount: 1}$ Pair.";
    assert!(parse_help_text(text, &classic).is_ok());
    assert_eq!(
        parse_help_text(text, &extended).unwrap_err().kind,
        ErrorKind::UnknownProperty
    );

    let text = "${-c A,B | sep_count: 1}$ Pair.";
    assert!(parse_help_text(text, &extended).is_ok());
}

#[test]
fn test_default_rules() {
    let non_zero = ParserConfig::default();
    let list_kind = ParserConfig {
        default_rule: DefaultValueRule::ListKind,
        ..ParserConfig::default()
    };

    let mandatory = "${-x N | Count: 1 | Default: 5}$";
    let err = parse_help_text(mandatory, &non_zero).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalDefaultValue);
    assert!(parse_help_text(mandatory, &list_kind).is_ok());

    let list = "${-I DIR | Count: 0.. | Default: \"src\"}$";
    assert!(parse_help_text(list, &non_zero).is_ok());
    let err = parse_help_text(list, &list_kind).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalDefaultValue);
    assert_eq!(err.lines, vec![1]);
}

#[test]
fn test_require_help_option() {
    let config = ParserConfig {
        require_help_option: true,
        ..ParserConfig::default()
    };
    let err = parse_help_text("${-v}$ Verbose.", &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingRequiredProperty);

    assert!(parse_help_text("${-?}$ Help.", &config).is_ok());
    assert!(parse_help_text("${/h | Type: help}$ Help.", &config).is_ok());
}

#[test]
fn test_value_type_errors() {
    let err = parse_help_text("${-m M | Values: fast slow}$", &ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AmbiguousOrInvalidType);
    assert!(err.message.contains("quotes"));

    let err = parse_help_text("${-m M | Values: 1 \"one\"}$", &ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::AmbiguousOrInvalidType);
    assert!(err.message.contains("int, string"));

    let doc = parse("${-r R | Values: 1 2.5}$");
    assert_eq!(doc.member("r").unwrap().value_type, ValueType::Double);
}

#[test]
fn test_sessions_are_deterministic() {
    let text = fixture("tool.help");
    let config = ParserConfig::default();

    let mut first = Session::new(&config);
    let a = first.parse_document(&text).unwrap();
    let mut second = Session::new(&config);
    let b = second.parse_document(&text).unwrap();

    assert_eq!(a, b);
    assert_eq!(first.argument_counter(), 2);
    assert_eq!(first.option_counter(), second.option_counter());
}

#[test]
fn test_generated_names_are_unique() {
    let doc = parse("${--load-file}$ ${--load.file | Member: other}$");
    let names: Vec<&str> = doc.arguments().iter().map(|arg| arg.name.as_str()).collect();
    assert_eq!(names, vec!["load_file", "load_file1"]);
}

#[test]
fn test_render_through_model_resolver() {
    let doc = parse(&fixture("tool.help"));
    let template = "\
struct Options {
[[[IF has_help_option]]]
    // generated with help
[[[ENDIF]]]
    fields: [[[member_names]]]
}";
    let text = render(template, &ModelResolver::new(&doc)).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "struct Options {");
    assert_eq!(lines[1], "    // generated with help");
    assert_eq!(lines[2], "    fields: debug");
    assert_eq!(lines[3], "            dest");
    assert_eq!(lines.last(), Some(&"}"));
    assert_eq!(lines.len(), 2 + 11 + 1);
}

#[test]
fn test_text_without_definitions_is_unchanged() {
    let text = "Usage: plain\n\nNothing to see here.\n";
    let doc = parse(text);
    assert_eq!(doc.text, text);
    assert!(doc.members.is_empty());
    assert!(doc.definition_lines.is_empty());
}

#[test]
fn test_positional_with_count_range() {
    let doc = parse("${FOO|Count: 2..5}$");
    assert_eq!(doc.text, "FOO");
    let foo = doc.member("FOO").unwrap();
    assert_eq!(foo.arguments.len(), 1);
    assert!(!foo.is_option());
    assert_eq!(foo.count, CountRange::new(2, Bound::Bounded(5)));
    assert_eq!(foo.kind, MemberKind::List);
}

#[test]
fn test_flag_placeholder_from_either_flag() {
    let doc = parse("${-r MIN-MAX --range=MIN-MAX}$");
    let arg = &doc.member("range").unwrap().arguments[0];
    assert_eq!(arg.flags, vec!["-r", "--range"]);
    assert_eq!(arg.meta_variable.as_deref(), Some("MIN-MAX"));
}

#[test]
fn test_delimiter_count_decides_multivalue_or_list() {
    let fixed = parse("${-p X,Y,Z}$");
    assert_eq!(fixed.member("p").unwrap().kind, MemberKind::MultiValue);

    let variable = parse("${-p X,Y,Z | DelimiterCount: 1..2}$");
    let member = variable.member("p").unwrap();
    assert_eq!(member.kind, MemberKind::List);
    assert_eq!(member.count, CountRange::new(0, Bound::Bounded(3)));

    let err = parse_help_text(
        "${-p X,Y,Z | DelimiterCount: 1..2 | Type: multivalue}$",
        &ParserConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingProperty);
}

#[test]
fn test_conflicting_option_counts() {
    let err = parse_help_text(
        "${-a | Member: x | Count: 1}$\n${-b | Member: x | Count: 0..2}$\n",
        &ParserConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingCount);
    assert_eq!(err.lines, vec![1, 2]);
}

#[test]
fn test_declared_zero_or_one_count_yields() {
    let doc = parse("${-a | Member: x | Count: 0..1}$\n${-b | Member: x | Count: 0..3}$\n");
    let x = doc.member("x").expect("member x");
    assert_eq!(x.count, CountRange::new(0, Bound::Bounded(3)));

    let err = parse_help_text(
        "${-a | Member: x | Count: 0..1}$\n${-b | Member: x | Count: 2}$\n${-c | Member: x | Count: 3}$\n",
        &ParserConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingCount);
}

#[test]
fn test_empty_separator_is_rejected() {
    let config = ParserConfig {
        syntax: Syntax {
            separator: String::new(),
            ..Syntax::default()
        },
        ..ParserConfig::default()
    };
    let err = parse_help_text("${-v}$ Verbose.\n", &config).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidPropertyValue);
    assert!(err.message.contains("separator can't be empty"), "{err}");
}

#[test]
fn test_special_kinds_reject_values_property() {
    let err = parse_help_text("${--version | Type: info | Values: true}$", &ParserConfig::default())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ConflictingProperty);
}
