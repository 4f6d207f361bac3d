//! Token tests for the Vela lexer.

use proptest::prelude::*;
use vela_syntax::diagnostics::DiagnosticKind;
use vela_syntax::token::{NumberValue, TokenPayload};
use vela_syntax::{lex, tokens_to_source, JsonDiagnostic, Position, Span, SyntaxOptions, Token, TokenKind};

fn tokens(source: &str) -> Vec<Token> {
    let (tokens, diagnostics) = lex(source, &SyntaxOptions::default());
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    tokens
}

fn assert_kinds(source: &str, expected: Vec<TokenKind>) {
    let actual: Vec<TokenKind> = tokens(source)
        .iter()
        .map(|t| t.kind)
        .filter(|k| !k.is_trivia())
        .collect();
    let mut expected_with_end = expected;
    expected_with_end.push(TokenKind::End);
    assert_eq!(actual, expected_with_end, "Token mismatch for {:?}", source);
}

fn single(source: &str) -> Token {
    tokens(source).into_iter().next().unwrap()
}

fn lex_errors(source: &str) -> Vec<DiagnosticKind> {
    let (_, diagnostics) = lex(source, &SyntaxOptions::default());
    diagnostics.errors().map(|d| d.kind.clone()).collect()
}

// ============================================================================
// Keywords and identifiers
// ============================================================================

#[test]
fn test_keywords() {
    use TokenKind::*;
    assert_kinds(
        "if elif else while for in not and or is",
        vec![If, Elif, Else, While, For, In, Not, And, Or, Is],
    );
    assert_kinds(
        "fn class enum module macro let import",
        vec![Fn, Class, Enum, Module, Macro, Let, Import],
    );
}

#[test]
fn test_identifiers() {
    let token = single("_naïve2");
    assert_eq!(token.kind, TokenKind::Identifier);
    assert_eq!(token.value, "_naïve2");
    assert_eq!(token.span, Span::new(Position::new(0, 0), Position::new(0, 7)));
}

#[test]
fn test_custom_keywords() {
    let token = single("@repeat");
    assert_eq!(token.kind, TokenKind::CustomKeyword);
    assert_eq!(token.keyword_name(), "repeat");

    let options = SyntaxOptions {
        custom_keywords: vec!["until".to_string()],
        ..SyntaxOptions::default()
    };
    let (tokens, _) = lex("until x", &options);
    assert_eq!(tokens[0].kind, TokenKind::CustomKeyword);
    assert_eq!(tokens[1].kind, TokenKind::Identifier);
}

#[test]
fn test_lone_at_is_invalid() {
    assert!(matches!(
        lex_errors("@ x")[..],
        [DiagnosticKind::UnexpectedCharacter { found: '@' }]
    ));
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_operators_maximal_munch() {
    use TokenKind::*;
    assert_kinds(
        "a ** b // c ?? d |> e",
        vec![
            Identifier, DoubleStar, Identifier, DoubleSlash, Identifier, DoubleQuestion,
            Identifier, PipeRightAngle, Identifier,
        ],
    );
    assert_kinds(
        "x **= 2; y //= 3; z ??= w",
        vec![
            Identifier, DoubleStarEquals, Number, Semicolon, Identifier, DoubleSlashEquals,
            Number, Semicolon, Identifier, DoubleQuestionEquals, Identifier,
        ],
    );
    assert_kinds("f() -> T", vec![Identifier, OpenParen, CloseParen, RightArrow, Identifier]);
}

#[test]
fn test_unknown_character() {
    assert!(matches!(
        lex_errors("a $ b")[..],
        [DiagnosticKind::UnexpectedCharacter { found: '$' }]
    ));
}

// ============================================================================
// Numbers
// ============================================================================

fn number(source: &str) -> (NumberValue, vela_syntax::token::NumberOptions) {
    let token = single(source);
    assert_eq!(token.kind, TokenKind::Number);
    let literal = token.number().unwrap();
    (literal.value, literal.options)
}

#[test]
fn test_integer_radixes() {
    assert_eq!(number("1_000").0, NumberValue::Int(1000));
    assert_eq!(number("0xff").0, NumberValue::Int(255));
    assert_eq!(number("0o17").0, NumberValue::Int(15));
    assert_eq!(number("0b101").0, NumberValue::Int(5));
}

#[test]
fn test_floats() {
    assert_eq!(number("3.25").0, NumberValue::Float(3.25));
    assert_eq!(number("1e3").0, NumberValue::Float(1000.0));
    assert_eq!(number("2.5E-1").0, NumberValue::Float(0.25));
}

#[test]
fn test_number_postfixes() {
    let (_, options) = number("7u8");
    assert!(options.unsigned);
    assert_eq!(options.bit_rate, Some(8));

    let (value, options) = number("3f32");
    assert_eq!(value, NumberValue::Float(3.0));
    assert_eq!(options.bit_rate, Some(32));

    let (_, options) = number("10L");
    assert!(options.long);

    let (_, options) = number("2j");
    assert!(options.complex);
}

#[test]
fn test_number_postfix_errors() {
    assert!(matches!(
        lex_errors("1i12")[..],
        [DiagnosticKind::InvalidBitRate { postfix: 'i', .. }]
    ));
    assert!(matches!(
        lex_errors("1.5u")[..],
        [DiagnosticKind::InvalidPostfix { postfix: 'u', .. }]
    ));
    assert!(matches!(
        lex_errors("12abc")[..],
        [DiagnosticKind::InvalidNumber { .. }]
    ));
    assert!(matches!(
        lex_errors("0x")[..],
        [DiagnosticKind::InvalidNumber { .. }]
    ));
}

#[test]
fn test_member_access_on_number_is_not_a_fraction() {
    use TokenKind::*;
    assert_kinds("1.abs", vec![Number, Dot, Identifier]);
}

// ============================================================================
// Strings and characters
// ============================================================================

#[test]
fn test_string_values() {
    let token = single(r#""a\tb\x41é""#);
    let literal = token.string().unwrap();
    assert_eq!(literal.value, "a\tbAé");
    assert_eq!(literal.raw, r"a\tb\x41é");

    let token = single(r#"r"a\tb""#);
    assert_eq!(token.string().unwrap().value, r"a\tb");
}

#[test]
fn test_single_line_string_end_span() {
    let token = single(r#"rf'abc'"#);
    assert_eq!(token.span.end, Position::new(0, 7));
}

#[test]
fn test_multiline_string_end_span() {
    let token = single("\"\"\"one\ntwo\"\"\" x");
    assert!(token.string().unwrap().options.multiline);
    assert_eq!(token.span.start, Position::new(0, 0));
    assert_eq!(token.span.end, Position::new(1, 6));
    assert_eq!(token.string().unwrap().value, "one\ntwo");
}

#[test]
fn test_unterminated_string() {
    let (tokens, diagnostics) = lex("'abc\nx", &SyntaxOptions::default());
    assert!(tokens[0].string().unwrap().unclosed);
    assert_eq!(tokens[0].span.end, Position::new(0, 4));
    assert!(matches!(
        diagnostics.errors().map(|d| &d.kind).collect::<Vec<_>>()[..],
        [DiagnosticKind::UnterminatedString]
    ));
}

#[test]
fn test_formatted_string_interpolations() {
    let token = single(r#"f"x={x + 1} {{literal}}""#);
    let literal = token.string().unwrap();
    assert!(literal.options.formatted);
    assert_eq!(literal.interpolations.len(), 1);
    assert_eq!(literal.interpolation_text(0), Some("x + 1"));
    assert_eq!(literal.interpolations[0].span.start, Position::new(0, 5));
}

#[test]
fn test_formatted_string_errors() {
    assert!(matches!(
        lex_errors(r#"f"a{b""#)[..],
        [DiagnosticKind::UnclosedInterpolation]
    ));
    assert!(matches!(
        lex_errors(r#"f"a}b""#)[..],
        [DiagnosticKind::StrayInterpolationBrace]
    ));
}

#[test]
fn test_duplicate_prefix_is_a_warning() {
    let (_, diagnostics) = lex(r#"ff"x""#, &SyntaxOptions::default());
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.warnings().count(), 1);
}

#[test]
fn test_characters() {
    let token = single("`a`");
    assert_eq!(token.kind, TokenKind::Character);
    assert_eq!(token.character(), Some('a'));
    assert_eq!(single(r"`\n`").character(), Some('\n'));

    assert!(matches!(lex_errors("``")[..], [DiagnosticKind::EmptyCharacter]));
    assert!(matches!(lex_errors("`ab`")[..], [DiagnosticKind::MultiCharacter]));
    assert!(matches!(lex_errors("`a")[..], [DiagnosticKind::UnterminatedCharacter]));
}

#[test]
fn test_invalid_escape() {
    assert!(matches!(
        lex_errors(r#""\q""#)[..],
        [DiagnosticKind::InvalidEscape { .. }]
    ));
}

// ============================================================================
// Layout
// ============================================================================

#[test]
fn test_indent_and_outdent() {
    use TokenKind::*;
    assert_kinds(
        "if a\n    b\nc\n",
        vec![If, Identifier, Newline, Indent, Identifier, Newline, Outdent, Identifier, Newline],
    );
}

#[test]
fn test_outdents_at_end_of_input() {
    use TokenKind::*;
    assert_kinds(
        "a\n  b\n    c",
        vec![Identifier, Newline, Indent, Identifier, Newline, Indent, Identifier, Outdent, Outdent],
    );
}

#[test]
fn test_blank_and_comment_lines_skip_layout() {
    use TokenKind::*;
    assert_kinds(
        "a\n\n  # note\nb\n",
        vec![Identifier, Newline, Newline, Newline, Identifier, Newline],
    );
}

#[test]
fn test_braces_keep_line_breaks_without_layout() {
    use TokenKind::*;
    assert_kinds(
        "{\n    a: 1\n}",
        vec![OpenBrace, Newline, Identifier, Colon, Number, Newline, CloseBrace],
    );
}

#[test]
fn test_invalid_outdent() {
    assert!(matches!(
        lex_errors("a\n    b\n  c\n")[..],
        [DiagnosticKind::InvalidOutdent]
    ));
}

#[test]
fn test_mixed_indentation() {
    assert!(matches!(
        lex_errors("a\n    b\nc\n\td\n")[..],
        [DiagnosticKind::InconsistentIndentation]
    ));
}

#[test]
fn test_leading_whitespace_sets_base_level() {
    use TokenKind::*;
    assert_kinds("  a\n  b\n", vec![Identifier, Newline, Identifier, Newline]);
}

#[test]
fn test_newline_whitespace_holds_next_indentation() {
    let tokens = tokens("a\n    b\n");
    let newline = tokens.iter().find(|t| t.is(TokenKind::Newline)).unwrap();
    assert_eq!(newline.value, "\n");
    assert_eq!(newline.whitespace, "    ");
}

// ============================================================================
// Lossless round trip
// ============================================================================

#[test]
fn test_round_trip_program() {
    let source = "  # header\nfn f(a,\n      b):\n\treturn f\"{a}\" + `c`  # tail\r\n\n@m x\n";
    let (tokens, _) = lex(source, &SyntaxOptions::default());
    assert_eq!(tokens_to_source(&tokens), source);
}

#[test]
fn test_json_shape() {
    let token = single("total ");
    let value = serde_json::to_value(&token).unwrap();
    assert_eq!(value["kind"], "Identifier");
    assert_eq!(value["value"], "total");
    assert_eq!(value["whitespace"], " ");
    assert_eq!(value["span"]["end"]["column"], 5);
    assert!(value.get("payload").is_none());

    let (_, diagnostics) = lex("x = \"abc", &SyntaxOptions::default());
    let json: Vec<JsonDiagnostic> = diagnostics.iter().map(JsonDiagnostic::from).collect();
    let value = serde_json::to_value(&json).unwrap();
    assert_eq!(value[0]["code"], "E0103");
    assert_eq!(value[0]["severity"], "error");
    assert_eq!(value[0]["start_line"], 1);
    assert_eq!(value[0]["start_column"], 5);
}

#[test]
fn test_end_token_is_last() {
    let tokens = tokens("x");
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::End));
    assert!(matches!(tokens.last().map(|t| &t.payload), Some(TokenPayload::None)));
}

proptest! {
    #[test]
    fn prop_lexing_is_lossless(source in "[ -~\t\n]{0,80}") {
        let (tokens, _) = lex(&source, &SyntaxOptions::default());
        prop_assert_eq!(tokens_to_source(&tokens), source);
    }

    #[test]
    fn prop_relex_is_idempotent(source in "[a-z0-9 +*/().:=\n\"'`#@{}\\[\\]-]{0,60}") {
        let options = SyntaxOptions::default();
        let (first, _) = lex(&source, &options);
        let (second, _) = lex(&tokens_to_source(&first), &options);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_lexer_never_panics(source in "\\PC{0,60}") {
        let (tokens, _) = lex(&source, &SyntaxOptions::default());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::End));
    }
}
