//! Tests for expression parsing

use vela_syntax::ast::*;
use vela_syntax::diagnostics::DiagnosticKind;
use vela_syntax::token::InputSide;
use vela_syntax::{Diagnostics, Position, SourceUnit};

fn parse_module(source: &str) -> (Ast, Vec<NodeId>, Diagnostics) {
    let parsed = SourceUnit::from_code(source).parse();
    let items = parsed.ast.children(parsed.root().unwrap());
    (parsed.ast, items, parsed.diagnostics)
}

/// Parse a single expression statement.
fn expression(source: &str) -> (Ast, NodeId) {
    let (ast, items, diagnostics) = parse_module(source);
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    assert_eq!(items.len(), 1);
    (ast, items[0])
}

/// Fully parenthesized rendering of operator structure.
fn sexp(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Name { name } => name.clone(),
        NodeKind::Constant { token } => token.value.clone(),
        NodeKind::Unary {
            op: UnaryOperator::Not,
            operand,
            ..
        } => format!("(not {})", sexp(ast, *operand)),
        NodeKind::Unary {
            op,
            side: InputSide::Postfix,
            operand,
        } => format!("({}{})", sexp(ast, *operand), op.symbol()),
        NodeKind::Unary { op, operand, .. } => format!("({}{})", op.symbol(), sexp(ast, *operand)),
        NodeKind::Binary { op, left, right } => {
            format!("({} {} {})", sexp(ast, *left), op.symbol(), sexp(ast, *right))
        }
        NodeKind::Ternary {
            condition,
            then_branch,
            else_branch,
            ..
        } => {
            let branch = |b: &Option<NodeId>| b.map_or("_".to_string(), |b| sexp(ast, b));
            format!(
                "({} if {} else {})",
                branch(then_branch),
                sexp(ast, *condition),
                branch(else_branch)
            )
        }
        NodeKind::Call { target, args } => {
            let args: Vec<String> = args.iter().map(|a| sexp(ast, a)).collect();
            format!("{}({})", sexp(ast, *target), args.join(", "))
        }
        NodeKind::Argument { name: None, value } => sexp(ast, *value),
        NodeKind::Argument {
            name: Some(name),
            value,
        } => format!("{}={}", name, sexp(ast, *value)),
        NodeKind::Member { target, member } => format!("{}.{}", sexp(ast, *target), member),
        NodeKind::Index { target, index } => format!("{}[{}]", sexp(ast, *target), sexp(ast, *index)),
        NodeKind::Parenthesized { value } => sexp(ast, *value),
        _ => ast.to_source(id),
    }
}

fn shape(source: &str) -> String {
    let (ast, id) = expression(source);
    sexp(&ast, id)
}

fn errors(source: &str) -> Vec<DiagnosticKind> {
    let (_, _, diagnostics) = parse_module(source);
    diagnostics.errors().map(|d| d.kind.clone()).collect()
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(shape("a + b * c"), "(a + (b * c))");
    assert_eq!(shape("a * b + c * d"), "((a * b) + (c * d))");
}

#[test]
fn test_left_associativity() {
    assert_eq!(shape("a - b - c"), "((a - b) - c)");
    assert_eq!(shape("a // b % c"), "((a // b) % c)");
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(shape("a ** b ** c"), "(a ** (b ** c))");
}

#[test]
fn test_prefix_binds_tighter_than_power() {
    assert_eq!(shape("-a ** b"), "((-a) ** b)");
    assert_eq!(shape("~a & b"), "((~a) & b)");
}

#[test]
fn test_bitwise_levels() {
    assert_eq!(shape("a | b ^ c & d << e"), "(a | (b ^ (c & (d << e))))");
}

#[test]
fn test_comparisons_chain_to_the_right() {
    assert_eq!(shape("a < b < c"), "(a < (b < c))");
}

#[test]
fn test_logical_operators() {
    assert_eq!(shape("a or b and c"), "(a or (b and c))");
    assert_eq!(shape("not a == b and c"), "((not (a == b)) and c)");
    assert_eq!(shape("a ?? b or c"), "((a ?? b) or c)");
}

#[test]
fn test_word_operators() {
    assert_eq!(shape("a not in b"), "(a not in b)");
    assert_eq!(shape("a is not nil"), "(a is not nil)");
    assert_eq!(shape("x in lo..hi"), "(x in (lo .. hi))");
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(shape("(a + b) * c"), "((a + b) * c)");
}

// ============================================================================
// Trailers and pipelines
// ============================================================================

#[test]
fn test_trailer_chain() {
    assert_eq!(shape("a.b(c)[d].e"), "a.b(c)[d].e");
    assert_eq!(shape("f(x, key = y)"), "f(x, key=y)");
}

#[test]
fn test_postfix_increment() {
    assert_eq!(shape("i++ + 1"), "((i++) + 1)");
    assert_eq!(shape("--a.b"), "(--a.b)");
}

#[test]
fn test_pipeline_is_nested_call() {
    let (ast, id) = expression("x |> f |> g");
    let (expected_ast, expected) = expression("g(f(x))");
    assert_eq!(ast.to_source(id), expected_ast.to_source(expected));
    assert_eq!(sexp(&ast, id), "g(f(x))");
}

#[test]
fn test_pipeline_binds_tighter_than_operators() {
    assert_eq!(shape("a + b |> f"), "(a + f(b))");
    assert_eq!(shape("x |> f.g(1)"), "f.g(1)(x)");
}

// ============================================================================
// Ternaries
// ============================================================================

#[test]
fn test_ternary() {
    assert_eq!(shape("a if c else b"), "(a if c else b)");
    assert_eq!(shape("a if c"), "(a if c else _)");
}

#[test]
fn test_unless_inverts_branches() {
    let (ast, id) = expression("a unless c else b");
    let NodeKind::Ternary { inverted, .. } = ast.kind(id) else {
        panic!("expected ternary");
    };
    assert!(*inverted);
    assert_eq!(sexp(&ast, id), shape("b if c else a"));
}

#[test]
fn test_nested_ternary_in_else() {
    assert_eq!(shape("a if x else b if y else c"), "(a if x else (b if y else c))");
}

// ============================================================================
// Collections and primaries
// ============================================================================

fn kind_name(source: &str) -> &'static str {
    let (ast, id) = expression(source);
    ast.kind(id).name()
}

#[test]
fn test_tuples() {
    let (ast, id) = expression("()");
    assert!(matches!(ast.kind(id), NodeKind::Tuple { items } if items.is_empty()));

    let (ast, id) = expression("(1,)");
    assert!(matches!(ast.kind(id), NodeKind::Tuple { items } if items.len() == 1));

    let (ast, id) = expression("1, 2, 3");
    assert!(matches!(ast.kind(id), NodeKind::Tuple { items } if items.len() == 3));

    assert_eq!(kind_name("(1)"), "Parenthesized");
}

#[test]
fn test_comprehensions() {
    let (ast, id) = expression("[x * 2 for x in xs if x > 0]");
    let NodeKind::List { items } = ast.kind(id) else {
        panic!("expected list");
    };
    assert!(matches!(
        ast.kind(items.first().unwrap()),
        NodeKind::Comprehension { condition: Some(_), .. }
    ));

    let (ast, id) = expression("(a for a, b in pairs)");
    let NodeKind::Generator { comprehension } = ast.kind(id) else {
        panic!("expected generator");
    };
    let NodeKind::Comprehension { target, .. } = ast.kind(*comprehension) else {
        panic!("expected comprehension");
    };
    assert!(matches!(ast.kind(*target), NodeKind::Tuple { items } if items.len() == 2));
}

#[test]
fn test_hashes() {
    let (ast, id) = expression("{}");
    assert!(matches!(ast.kind(id), NodeKind::Hash { kind: HashKind::Map, items } if items.is_empty()));

    let (ast, id) = expression("{\n    'a': 1,\n    'b': 2,\n}");
    assert!(matches!(ast.kind(id), NodeKind::Hash { kind: HashKind::Map, items } if items.len() == 2));

    let (ast, id) = expression("{1, 2}");
    assert!(matches!(ast.kind(id), NodeKind::Hash { kind: HashKind::Set, items } if items.len() == 2));
}

#[test]
fn test_subscripts_and_slices() {
    let (ast, id) = expression("a[1:n:2]");
    let NodeKind::Index { index, .. } = ast.kind(id) else {
        panic!("expected index");
    };
    assert!(matches!(
        ast.kind(*index),
        NodeKind::Slice { start: Some(_), stop: Some(_), step: Some(_) }
    ));

    let (ast, id) = expression("m[i, :]");
    let NodeKind::Index { index, .. } = ast.kind(id) else {
        panic!("expected index");
    };
    assert!(matches!(ast.kind(*index), NodeKind::Tuple { items } if items.len() == 2));
}

#[test]
fn test_keyword_primaries() {
    let (ast, id) = expression("await fetch(url)");
    assert!(matches!(ast.kind(id), NodeKind::Await { .. }));

    let (ast, id) = expression("yield from source");
    assert!(matches!(ast.kind(id), NodeKind::Yield { value: Some(_), from: true }));

    let (ast, id) = expression("yield");
    assert!(matches!(ast.kind(id), NodeKind::Yield { value: None, from: false }));

    let (ast, id) = expression("new geo.Point[int](1, y = 2)");
    let NodeKind::New { type_name, args } = ast.kind(id) else {
        panic!("expected new");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(ast.kind(*type_name), NodeKind::TypeName { name, .. } if name == "geo.Point"));
}

#[test]
fn test_constants() {
    for source in ["42", "3.5f64", "'text'", "`c`", "true", "false", "nil"] {
        assert_eq!(kind_name(source), "Constant", "{}", source);
    }
}

#[test]
fn test_formatted_string_values_are_positioned() {
    let (ast, id) = expression("f\"sum: {a + b}!\"");
    let NodeKind::FormattedString { values, .. } = ast.kind(id) else {
        panic!("expected formatted string");
    };
    let value = values.first().unwrap();
    assert_eq!(sexp(&ast, value), "(a + b)");
    assert_eq!(ast.span(value).start, Position::new(0, 8));
    assert_eq!(ast.parent(value), Some(id));
}

#[test]
fn test_spans_cover_operands() {
    let (ast, id) = expression("alpha * (beta + 1)");
    let span = ast.span(id);
    assert_eq!(span.start, Position::new(0, 0));
    assert_eq!(span.end, Position::new(0, 18));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_missing_operand() {
    assert!(matches!(errors("x = a +\n")[..], [DiagnosticKind::ExpectedPrimary { .. }]));
}

#[test]
fn test_invalid_assignment_target() {
    assert!(matches!(errors("1 = x\n")[..], [DiagnosticKind::InvalidAssignmentTarget]));
    assert!(matches!(errors("f() += 1\n")[..], [DiagnosticKind::InvalidAssignmentTarget]));
}

#[test]
fn test_invalid_increment_operand() {
    assert!(matches!(errors("f()++\n")[..], [DiagnosticKind::InvalidOperand { .. }]));
    assert!(matches!(errors("++1\n")[..], [DiagnosticKind::InvalidOperand { .. }]));
}

#[test]
fn test_unclosed_call() {
    let found = errors("f(a, b\ny = 1\n");
    assert!(!found.is_empty());
}

#[test]
fn test_double_negation_warns() {
    let (_, _, diagnostics) = parse_module("x = not not y\n");
    assert!(!diagnostics.has_errors());
    assert!(matches!(
        diagnostics.warnings().map(|d| &d.kind).collect::<Vec<_>>()[..],
        [DiagnosticKind::DoubleNegation]
    ));
}

#[test]
fn test_interpolation_errors_are_reported_in_place() {
    let (_, _, diagnostics) = parse_module("x = f\"{a +}\"\n");
    let errors: Vec<_> = diagnostics.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].span.start.line, 0);
    assert!(errors[0].span.start.column >= 7);
}
