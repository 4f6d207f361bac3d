//! Tests for parser hardening and robustness
//!
//! Malformed, incomplete or pathological source must produce diagnostics,
//! never a hang, a panic or a stack overflow.

use proptest::prelude::*;
use vela_syntax::diagnostics::DiagnosticKind;
use vela_syntax::{ParsedUnit, SourceUnit, SyntaxOptions};

fn parse(source: &str) -> ParsedUnit {
    SourceUnit::from_code(source).parse()
}

fn has_depth_error(parsed: &ParsedUnit) -> bool {
    parsed
        .diagnostics
        .iter()
        .any(|d| matches!(d.kind, DiagnosticKind::MaxDepthExceeded { .. }))
}

// ============================================================================
// Depth Limits
// ============================================================================

#[test]
fn test_deep_parentheses() {
    let depth = 500;
    let source = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
    let parsed = parse(&source);
    assert!(has_depth_error(&parsed));
    assert!(parsed.root().is_some());
}

#[test]
fn test_deep_prefix_operators() {
    let source = format!("x = {}y\n", "- ".repeat(10_000));
    let parsed = parse(&source);
    assert!(has_depth_error(&parsed));
}

#[test]
fn test_deep_right_associative_chain() {
    let source = format!("x = a{}\n", " ** a".repeat(2_000));
    let parsed = parse(&source);
    assert!(has_depth_error(&parsed));
}

#[test]
fn test_deep_blocks() {
    let mut source = String::new();
    for level in 0..200 {
        source.push_str(&"    ".repeat(level));
        source.push_str("if x\n");
    }
    source.push_str(&"    ".repeat(200));
    source.push_str("pass\n");

    let parsed = parse(&source);
    assert!(has_depth_error(&parsed));
}

#[test]
fn test_reasonable_nesting_is_accepted() {
    let source = format!("x = {}1{}\n", "[".repeat(5), "]".repeat(5));
    let parsed = parse(&source);
    assert!(parsed.is_usable(), "{:?}", parsed.diagnostics);
}

#[test]
fn test_each_bracket_is_one_level() {
    let depth = 40;
    let parens = format!("x = {}1{}\n", "(".repeat(depth), ")".repeat(depth));
    let calls = format!("x = {}1{}\n", "f(".repeat(depth), ")".repeat(depth));
    let lists = format!("x = {}1{}\n", "[".repeat(depth), "]".repeat(depth));
    for source in [parens, calls, lists] {
        let parsed = parse(&source);
        assert!(parsed.is_usable(), "{}: {:?}", source, parsed.diagnostics);
    }
}

#[test]
fn test_depth_limit_is_configurable() {
    let source = format!("x = {}1{}\n", "(".repeat(12), ")".repeat(12));
    let with_limit = |max_depth| {
        let options = SyntaxOptions {
            max_depth,
            ..SyntaxOptions::default()
        };
        SourceUnit::from_code(source.clone()).with_options(options).parse()
    };

    assert!(has_depth_error(&with_limit(10)));
    let parsed = with_limit(13);
    assert!(parsed.is_usable(), "{:?}", parsed.diagnostics);
}

// ============================================================================
// Long Inputs
// ============================================================================

#[test]
fn test_long_operator_chain() {
    let source = format!("x = a{}\n", " + a".repeat(10_000));
    let parsed = parse(&source);
    assert!(parsed.is_usable());
}

#[test]
fn test_print_long_operator_chain() {
    let source = format!("x = a{}\n", " + a".repeat(10_000));
    let parsed = parse(&source);
    assert!(parsed.is_usable());
    let printed = parsed.ast.to_source(parsed.root().unwrap());
    assert_eq!(printed, source);
}

#[test]
fn test_print_long_trailer_chain() {
    let source = format!("x = a{}\n", ".b(1)[2]".repeat(5_000));
    let parsed = parse(&source);
    assert!(parsed.is_usable(), "{:?}", parsed.diagnostics);
    let printed = parsed.ast.to_source(parsed.root().unwrap());
    assert_eq!(printed, source);
}

#[test]
fn test_many_statements() {
    let source: String = (0..5_000).map(|i| format!("v{} = {}\n", i, i)).collect();
    let parsed = parse(&source);
    assert!(parsed.is_usable());
    assert_eq!(parsed.ast.children(parsed.root().unwrap()).len(), 5_000);
}

#[test]
fn test_one_error_per_broken_line() {
    let source = "x = )\n".repeat(1_000);
    let parsed = parse(&source);
    assert_eq!(parsed.diagnostics.error_count(), 1_000);
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_truncated_constructs_terminate() {
    let inputs = [
        "(",
        ")",
        "[[[",
        "}}}",
        "if",
        "if x",
        "elif x\n    y\n",
        "else",
        "fn",
        "fn f(",
        "fn f(a: , b = )",
        "class (",
        "enum E {",
        "enum E { 1, 2 }",
        "macro",
        "macro m (",
        "macro m ({[",
        "macro m (a: , | )",
        "@",
        "@m (",
        "\"",
        "f\"{",
        "f\"{(\"",
        "f\"{a\" + {b}\"",
        "x = {",
        "x = {1: }",
        "for in",
        "for x in",
        "a.",
        "a[::::]",
        "new",
        "yield from",
        "1 +* 2 ^^ 3",
        "\t  \n  \t x",
        "import",
        "import a. as",
        "let",
        "let x += 1",
        "x: = 1",
        "x = y = ",
        "0x 0b2 1e 1.5q 08",
        "\x00\x01\u{feff}",
    ];

    for source in inputs {
        let parsed = parse(source);
        assert!(parsed.root().is_some(), "{:?}", source);
    }
}

#[test]
fn test_unterminated_string_reports_once() {
    let parsed = parse("x = 'abc\ny = 1\n");
    assert_eq!(parsed.diagnostics.error_count(), 1);
    assert_eq!(parsed.ast.children(parsed.root().unwrap()).len(), 2);
}

// ============================================================================
// Property Tests
// ============================================================================

const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "//", "%", "**", "&", "|", "^", "<<", ">>", "<", "==", "and", "or", "??", "..",
];
const PREFIXES: &[&str] = &["", "-", "~", "not "];
const OPERANDS: &[&str] = &["a", "b", "c", "f(x)", "xs[0]", "(p, q)"];

fn operand() -> impl Strategy<Value = String> {
    (
        prop::sample::select(PREFIXES),
        prop::sample::select(OPERANDS),
    )
        .prop_map(|(prefix, name)| format!("{}{}", prefix, name))
}

fn expression() -> impl Strategy<Value = String> {
    (
        operand(),
        prop::collection::vec((prop::sample::select(OPERATORS), operand()), 0..8),
    )
        .prop_map(|(first, rest)| {
            rest.into_iter().fold(first, |text, (op, operand)| {
                format!("{} {} {}", text, op, operand)
            })
        })
}

proptest! {
    #[test]
    fn parse_never_panics(source in "[a-z0-9 ()\\[\\]{}:,.+*=<>!\"'`@#|\\-\n\t]{0,200}") {
        let parsed = parse(&source);
        prop_assert!(parsed.root().is_some());
    }

    #[test]
    fn printing_is_stable(source in expression()) {
        let first = parse(&format!("x = {}\n", source));
        prop_assert!(first.is_usable(), "{}: {:?}", source, first.diagnostics);
        let printed = first.ast.to_source(first.root().unwrap());

        let second = parse(&printed);
        prop_assert!(second.is_usable(), "{} -> {}: {:?}", source, printed, second.diagnostics);
        prop_assert_eq!(second.ast.to_source(second.root().unwrap()), printed);
    }
}
