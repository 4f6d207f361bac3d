//! Expression parsing
//!
//! Loosest to tightest: assignment forms, tuples, ternary, binary
//! operators by precedence climbing (with prefix `not`), prefix unary
//! operators, postfix trailers, primary atoms.

use super::guards::LoopGuard;
use super::precedence::{augmented_operator, infix_operator, postfix_operator, prefix_operator};
use super::types::parse_type_name;
use super::Parser;
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;
use crate::span::Position;
use crate::token::{Associativity, InputSide, Precedence, TokenKind};

/// Parse a full expression, ternary included.
pub fn parse_expression(parser: &mut Parser<'_>) -> NodeId {
    parse_ternary(parser)
}

/// Parse an operator expression without a trailing ternary.
pub fn parse_infix(parser: &mut Parser<'_>) -> NodeId {
    parse_binary(parser, Precedence::Or as u8)
}

// ============================================================================
// Assignment and definitions
// ============================================================================

/// Parse an expression statement, turning `name = value` into a variable
/// definition when `name` is not bound yet.
///
/// `immutable` is set after a leading `let`, which always defines.
pub fn parse_assignment(parser: &mut Parser<'_>, start: Position, immutable: bool) -> NodeId {
    let first = parse_tuple(parser, false);

    // Typed definition: `x: Type [= value]`
    if parser.stream.peek_is(&[TokenKind::Colon]) {
        parser.stream.advance();
        let type_name = parse_type_name(parser);
        let value = parser
            .stream
            .maybe_eat(&[TokenKind::Equals])
            .then(|| parse_tuple(parser, false));
        return define(parser, start, first, Some(type_name), value, immutable);
    }

    if let Some(op) = augmented_operator(parser.stream.peek_kind()) {
        if immutable {
            parser.stream.expected("'='");
        }
        check_target(parser, first);
        parser.stream.advance();
        let value = parse_tuple(parser, false);
        let span = parser.span_from(start);
        return parser.alloc(
            NodeKind::AugAssign {
                op,
                target: first,
                value,
            },
            span,
        );
    }

    if !parser.stream.peek_is(&[TokenKind::Equals]) {
        if immutable {
            return define(parser, start, first, None, None, true);
        }
        return first;
    }

    let mut targets = vec![first];
    let mut guard = LoopGuard::new("assignment_targets");
    let value = loop {
        parser.stream.advance();
        let value = parse_tuple(parser, false);
        if !parser.stream.peek_is(&[TokenKind::Equals]) || !guard.check(parser.stream.position()) {
            break value;
        }
        targets.push(value);
    };

    if let [target] = targets[..] {
        let defines = match parser.ast.kind(target) {
            NodeKind::Name { name } => immutable || !parser.is_bound(name),
            _ => false,
        };
        if defines {
            return define(parser, start, target, None, Some(value), immutable);
        }
    }

    for &target in &targets {
        check_target(parser, target);
    }
    let introduced: Vec<String> = targets
        .iter()
        .flat_map(|&target| target_names(&parser.ast, target))
        .filter(|name| !parser.is_bound(name))
        .collect();

    let span = parser.span_from(start);
    let id = parser.alloc(
        NodeKind::Assign {
            targets: NodeList::from(targets),
            value,
        },
        span,
    );
    for name in introduced {
        parser.bind(&name, id);
    }
    id
}

fn define(
    parser: &mut Parser<'_>,
    start: Position,
    target: NodeId,
    type_name: Option<NodeId>,
    value: Option<NodeId>,
    immutable: bool,
) -> NodeId {
    let name = match parser.ast.kind(target) {
        NodeKind::Name { name } => Some(name.clone()),
        _ => None,
    };
    if name.is_none() {
        parser
            .stream
            .report(DiagnosticKind::InvalidAssignmentTarget, parser.ast.span(target));
    }

    let span = parser.span_from(start);
    let id = parser.alloc(
        NodeKind::VarDef {
            target,
            type_name,
            value,
            immutable,
        },
        span,
    );
    if let Some(name) = name {
        parser.bind(&name, id);
    }
    id
}

fn is_assignable(ast: &Ast, id: NodeId) -> bool {
    match ast.kind(id) {
        NodeKind::Tuple { items } | NodeKind::List { items } => {
            items.iter().all(|item| is_assignable(ast, item))
        }
        NodeKind::Parenthesized { value } => is_assignable(ast, *value),
        kind => kind.is_assignable(),
    }
}

fn check_target(parser: &mut Parser<'_>, target: NodeId) {
    if !is_assignable(&parser.ast, target) && !parser.ast.kind(target).is_error() {
        parser
            .stream
            .report(DiagnosticKind::InvalidAssignmentTarget, parser.ast.span(target));
    }
}

/// Names bound by an assignment or loop target.
pub fn target_names(ast: &Ast, target: NodeId) -> Vec<String> {
    match ast.kind(target) {
        NodeKind::Name { name } => vec![name.clone()],
        NodeKind::Tuple { items } | NodeKind::List { items } => items
            .iter()
            .flat_map(|item| target_names(ast, item))
            .collect(),
        NodeKind::Parenthesized { value } => target_names(ast, *value),
        _ => Vec::new(),
    }
}

// ============================================================================
// Tuples and comprehensions
// ============================================================================

/// Parse a comma-separated expression list.
///
/// With `parenthesized` the list is wrapped in `( )`: `()` is the empty
/// tuple, `(x)` is `Parenthesized`, `(x for ...)` a `Generator`. Without
/// parentheses a single element is returned as is.
pub fn parse_tuple(parser: &mut Parser<'_>, parenthesized: bool) -> NodeId {
    let start = parser.start();
    if parenthesized {
        parser.stream.advance();
        if parser.stream.maybe_eat(&[TokenKind::CloseParen]) {
            let span = parser.span_from(start);
            return parser.alloc(NodeKind::Tuple { items: NodeList::new() }, span);
        }
    }

    let first = parse_expression(parser);

    if parser.stream.peek_is(&[TokenKind::For]) {
        let comprehension = parse_comprehension(parser, first);
        if !parenthesized {
            return comprehension;
        }
        parser.stream.eat(TokenKind::CloseParen);
        let span = parser.span_from(start);
        return parser.alloc(NodeKind::Generator { comprehension }, span);
    }

    if !parser.stream.peek_is(&[TokenKind::Comma]) {
        if !parenthesized {
            return first;
        }
        parser.stream.eat(TokenKind::CloseParen);
        let span = parser.span_from(start);
        return parser.alloc(NodeKind::Parenthesized { value: first }, span);
    }

    let mut items = vec![first];
    let mut guard = LoopGuard::new("tuple_items");
    while parser.stream.maybe_eat(&[TokenKind::Comma]) {
        let closed = if parenthesized {
            parser.stream.peek_is(&[TokenKind::CloseParen])
        } else {
            at_tuple_end(parser)
        };
        if closed || !guard.check(parser.stream.position()) {
            break;
        }
        items.push(parse_expression(parser));
    }
    if parenthesized {
        parser.stream.eat(TokenKind::CloseParen);
    }

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Tuple {
            items: NodeList::from(items),
        },
        span,
    )
}

/// `item for target in iterable [if condition]`, with `item` parsed.
fn parse_comprehension(parser: &mut Parser<'_>, item: NodeId) -> NodeId {
    let start = parser.ast.span(item).start;
    parser.stream.advance();
    let target = parse_target_list(parser);
    parser.stream.eat(TokenKind::In);
    let iterable = parse_infix(parser);
    let condition = parser
        .stream
        .maybe_eat(&[TokenKind::If])
        .then(|| parse_infix(parser));

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Comprehension {
            item,
            target,
            iterable,
            condition,
        },
        span,
    )
}

/// Loop targets: postfix expressions separated by commas, stopping
/// before `in`.
pub fn parse_target_list(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let first = parse_postfix(parser);
    if !parser.stream.peek_is(&[TokenKind::Comma]) {
        return first;
    }

    let mut items = vec![first];
    let mut guard = LoopGuard::new("target_list");
    while parser.stream.maybe_eat(&[TokenKind::Comma]) {
        if parser.stream.peek_is(&[TokenKind::In]) || !guard.check(parser.stream.position()) {
            break;
        }
        items.push(parse_postfix(parser));
    }
    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Tuple {
            items: NodeList::from(items),
        },
        span,
    )
}

/// Tokens that end an expression without belonging to it.
pub fn at_expression_end(parser: &Parser<'_>) -> bool {
    parser.stream.peek_is(&[
        TokenKind::Newline,
        TokenKind::Semicolon,
        TokenKind::Indent,
        TokenKind::Outdent,
        TokenKind::End,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::CloseParen,
        TokenKind::CloseBracket,
        TokenKind::CloseBrace,
    ])
}

fn at_tuple_end(parser: &Parser<'_>) -> bool {
    at_expression_end(parser)
        || parser.stream.peek_is(&[TokenKind::Equals])
        || parser.stream.peek_kind().is_augmented_assign()
}

// ============================================================================
// Operators
// ============================================================================

fn parse_ternary(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let value = parse_infix(parser);
    let inverted = match parser.stream.peek_kind() {
        TokenKind::If => false,
        TokenKind::Unless => true,
        _ => return value,
    };
    parser.stream.advance();

    let condition = parse_infix(parser);
    let other = parser
        .stream
        .maybe_eat(&[TokenKind::Else])
        .then(|| parser.nested(parse_expression));

    // `b unless c else a` means `a if c else b`
    let (then_branch, else_branch) = if inverted {
        (other, Some(value))
    } else {
        (Some(value), other)
    };

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Ternary {
            condition,
            then_branch,
            else_branch,
            inverted,
        },
        span,
    )
}

/// Precedence climbing: parse operators binding at least as tight as `min`.
///
/// A left-associative right operand only climbs to tighter levels, so
/// only right-associative operands count toward the depth limit.
pub fn parse_binary(parser: &mut Parser<'_>, min: u8) -> NodeId {
    let start = parser.start();
    let mut left = if parser.stream.peek_is(&[TokenKind::Not]) {
        parse_not(parser)
    } else {
        parse_unary(parser)
    };

    let mut guard = LoopGuard::new("binary_operators");
    while guard.check(parser.stream.position()) {
        let Some(infix) = infix_operator(parser.stream.peek_kind()) else {
            break;
        };
        if (infix.precedence as u8) < min {
            break;
        }

        let operator = parser.stream.advance();
        let mut op = infix.op;
        match operator.kind {
            TokenKind::Not => {
                parser.stream.eat(TokenKind::In);
            }
            TokenKind::Is if parser.stream.maybe_eat(&[TokenKind::Not]) => {
                op = BinaryOperator::IsNot;
            }
            _ => {}
        }

        let right = match infix.associativity {
            Associativity::Left => parse_binary(parser, infix.precedence.next()),
            Associativity::Right => {
                let level = infix.precedence as u8;
                parser.nested(|p| parse_binary(p, level))
            }
        };
        let span = parser.span_from(start);
        left = parser.alloc(NodeKind::Binary { op, left, right }, span);
    }
    left
}

/// `not x`, where `x` is parsed at comparison level.
fn parse_not(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    if parser.stream.peek_is(&[TokenKind::Not]) {
        let span = parser.stream.peek().span;
        parser.stream.report(DiagnosticKind::DoubleNegation, span);
    }
    let operand = parser.nested(|p| parse_binary(p, Precedence::Comparison as u8));
    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Unary {
            op: UnaryOperator::Not,
            side: InputSide::Prefix,
            operand,
        },
        span,
    )
}

/// Prefix `-`, `+`, `~`, `++`, `--`.
pub fn parse_unary(parser: &mut Parser<'_>) -> NodeId {
    let Some(op) = prefix_operator(parser.stream.peek_kind()) else {
        return parse_postfix(parser);
    };
    let start = parser.start();
    let operator = parser.stream.advance();
    let operand = parser.nested(parse_unary);
    if matches!(op, UnaryOperator::Increment | UnaryOperator::Decrement) {
        check_operand(parser, operand, &operator.value);
    }
    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Unary {
            op,
            side: InputSide::Prefix,
            operand,
        },
        span,
    )
}

fn check_operand(parser: &mut Parser<'_>, operand: NodeId, operator: &str) {
    let kind = parser.ast.kind(operand);
    if !kind.is_assignable() && !kind.is_error() {
        parser.stream.report(
            DiagnosticKind::InvalidOperand {
                operator: format!("'{}'", operator),
            },
            parser.ast.span(operand),
        );
    }
}

// ============================================================================
// Trailers
// ============================================================================

/// A primary expression followed by its trailers.
pub fn parse_postfix(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let primary = parse_primary(parser);
    parse_trailers(parser, start, primary, true)
}

fn parse_trailers(parser: &mut Parser<'_>, start: Position, mut node: NodeId, allow_pipe: bool) -> NodeId {
    let mut guard = LoopGuard::new("trailers");
    while guard.check(parser.stream.position()) {
        let kind = parser.stream.peek_kind();
        node = match kind {
            TokenKind::Dot => {
                parser.stream.advance();
                let member = parser.stream.peek();
                if member.kind != TokenKind::Identifier && !member.kind.is_keyword() {
                    parser.stream.expected("member name");
                    break;
                }
                parser.stream.advance();
                let span = parser.span_from(start);
                parser.alloc(
                    NodeKind::Member {
                        target: node,
                        member: member.value.clone(),
                    },
                    span,
                )
            }
            TokenKind::OpenParen => {
                let args = parse_arguments(parser);
                let span = parser.span_from(start);
                parser.alloc(NodeKind::Call { target: node, args }, span)
            }
            TokenKind::OpenBracket => {
                let index = parse_subscript(parser);
                let span = parser.span_from(start);
                parser.alloc(NodeKind::Index { target: node, index }, span)
            }
            // `a |> f` is `f(a)`
            TokenKind::PipeRightAngle if allow_pipe => {
                parser.stream.advance();
                let function_start = parser.start();
                let function = parse_primary(parser);
                let function = parse_trailers(parser, function_start, function, false);
                let argument_span = parser.ast.span(node);
                let argument = parser.alloc(
                    NodeKind::Argument {
                        name: None,
                        value: node,
                    },
                    argument_span,
                );
                let span = parser.span_from(start);
                parser.alloc(
                    NodeKind::Call {
                        target: function,
                        args: NodeList::from(vec![argument]),
                    },
                    span,
                )
            }
            TokenKind::DoublePlus | TokenKind::DoubleMinus => {
                let Some(op) = postfix_operator(kind) else {
                    break;
                };
                let operator = parser.stream.advance();
                check_operand(parser, node, &operator.value);
                let span = parser.span_from(start);
                parser.alloc(
                    NodeKind::Unary {
                        op,
                        side: InputSide::Postfix,
                        operand: node,
                    },
                    span,
                )
            }
            _ => break,
        };
    }
    node
}

/// `( [name =] value, ... )`
fn parse_arguments(parser: &mut Parser<'_>) -> NodeList {
    parser.stream.advance();
    let mut args = Vec::new();
    let mut guard = LoopGuard::new("call_arguments");

    while !parser.stream.peek_is(&[TokenKind::CloseParen, TokenKind::End]) {
        if !guard.check(parser.stream.position()) {
            break;
        }
        let start = parser.start();
        let value = parser.nested(parse_expression);

        let named = match parser.ast.kind(value) {
            NodeKind::Name { name } if parser.stream.peek_is(&[TokenKind::Equals]) => {
                Some(name.clone())
            }
            _ => None,
        };
        let value = if named.is_some() {
            parser.stream.advance();
            parser.nested(parse_expression)
        } else {
            value
        };

        let span = parser.span_from(start);
        args.push(parser.alloc(NodeKind::Argument { name: named, value }, span));
        if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
            break;
        }
    }
    parser.stream.eat(TokenKind::CloseParen);
    NodeList::from(args)
}

/// `[index]`, `[i, j]`, `[start:stop:step]`
fn parse_subscript(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();

    let mut items = Vec::new();
    let mut guard = LoopGuard::new("subscript_items");
    loop {
        if !guard.check(parser.stream.position()) {
            break;
        }
        items.push(parser.nested(parse_slice_item));
        if !parser.stream.maybe_eat(&[TokenKind::Comma])
            || parser.stream.peek_is(&[TokenKind::CloseBracket])
        {
            break;
        }
    }
    parser.stream.eat(TokenKind::CloseBracket);

    if let [item] = items[..] {
        return item;
    }
    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Tuple {
            items: NodeList::from(items),
        },
        span,
    )
}

fn parse_slice_item(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let lower = if parser.stream.peek_is(&[TokenKind::Colon]) {
        None
    } else {
        let value = parse_expression(parser);
        if !parser.stream.peek_is(&[TokenKind::Colon]) {
            return value;
        }
        Some(value)
    };

    parser.stream.advance();
    let stop = (!parser.stream.peek_is(&[
        TokenKind::Colon,
        TokenKind::Comma,
        TokenKind::CloseBracket,
    ]))
    .then(|| parse_expression(parser));
    let step = if parser.stream.maybe_eat(&[TokenKind::Colon]) {
        (!parser
            .stream
            .peek_is(&[TokenKind::Comma, TokenKind::CloseBracket]))
        .then(|| parse_expression(parser))
    } else {
        None
    };

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Slice {
            start: lower,
            stop,
            step,
        },
        span,
    )
}

// ============================================================================
// Primary expressions
// ============================================================================

pub fn parse_primary(parser: &mut Parser<'_>) -> NodeId {
    let token = parser.stream.peek();
    match token.kind {
        TokenKind::Identifier => {
            parser.stream.advance();
            parser.alloc(
                NodeKind::Name {
                    name: token.value.clone(),
                },
                token.span,
            )
        }
        TokenKind::String
            if token
                .string()
                .is_some_and(|s| s.options.formatted && !s.interpolations.is_empty()) =>
        {
            parse_formatted_string(parser)
        }
        TokenKind::Number
        | TokenKind::String
        | TokenKind::Character
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Nil => {
            parser.stream.advance();
            parser.alloc(
                NodeKind::Constant {
                    token: token.clone(),
                },
                token.span,
            )
        }
        TokenKind::OpenParen => parser.nested(|p| parse_tuple(p, true)),
        TokenKind::OpenBracket => parser.nested(parse_list),
        TokenKind::OpenBrace => parser.nested(parse_hash),
        TokenKind::Await => {
            parser.stream.advance();
            let value = parser.nested(parse_postfix);
            let span = parser.span_from(token.span.start);
            parser.alloc(NodeKind::Await { value }, span)
        }
        TokenKind::Yield => parser.nested(parse_yield),
        TokenKind::New => parse_new(parser),
        _ => parser.error_node(DiagnosticKind::ExpectedPrimary {
            found: token.to_string(),
        }),
    }
}

/// `f"..."` with each `{...}` parsed as an expression.
fn parse_formatted_string(parser: &mut Parser<'_>) -> NodeId {
    let token = parser.stream.advance();
    let Some(literal) = token.string() else {
        return parser.alloc(
            NodeKind::Constant {
                token: token.clone(),
            },
            token.span,
        );
    };

    let mut values = Vec::new();
    for index in 0..literal.interpolations.len() {
        let Some((tokens, diagnostics)) = literal.lex_interpolation(index, parser.options()) else {
            continue;
        };
        parser.stream.absorb(diagnostics);

        let ast = std::mem::take(&mut parser.ast);
        let mut nested = Parser::with_ast(&tokens, parser.options(), ast);
        nested.depth = parser.depth + 1;
        let value = parse_expression(&mut nested);
        if !nested.stream.at_end() {
            nested.stream.expected("'}'");
        }
        let (ast, diagnostics) = nested.into_parts();
        parser.ast = ast;
        parser.stream.absorb(diagnostics);
        values.push(value);
    }

    parser.alloc(
        NodeKind::FormattedString {
            token: token.clone(),
            values: NodeList::from(values),
        },
        token.span,
    )
}

/// `[a, b]` or `[x for x in xs]`
fn parse_list(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();

    let mut items = Vec::new();
    if !parser.stream.peek_is(&[TokenKind::CloseBracket]) {
        let first = parse_expression(parser);
        if parser.stream.peek_is(&[TokenKind::For]) {
            items.push(parse_comprehension(parser, first));
        } else {
            items.push(first);
            let mut guard = LoopGuard::new("list_items");
            while parser.stream.maybe_eat(&[TokenKind::Comma]) {
                if parser.stream.peek_is(&[TokenKind::CloseBracket])
                    || !guard.check(parser.stream.position())
                {
                    break;
                }
                items.push(parse_expression(parser));
            }
        }
    }
    parser.stream.eat(TokenKind::CloseBracket);

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::List {
            items: NodeList::from(items),
        },
        span,
    )
}

/// `{}` (empty map), `{k: v, ...}`, `{a, b}` (set), or a comprehension.
/// Line breaks between entries are allowed.
fn parse_hash(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    skip_newlines(parser);

    let mut kind = HashKind::Map;
    let mut items = Vec::new();
    if !parser.stream.peek_is(&[TokenKind::CloseBrace]) {
        let key = parse_expression(parser);
        if !parser.stream.peek_is(&[TokenKind::Colon]) {
            kind = HashKind::Set;
        }
        let first = parse_hash_entry(parser, key, kind);

        if parser.stream.peek_is(&[TokenKind::For]) {
            items.push(parse_comprehension(parser, first));
        } else {
            items.push(first);
            let mut guard = LoopGuard::new("hash_items");
            loop {
                skip_newlines(parser);
                if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
                    break;
                }
                skip_newlines(parser);
                if parser.stream.peek_is(&[TokenKind::CloseBrace])
                    || !guard.check(parser.stream.position())
                {
                    break;
                }
                let key = parse_expression(parser);
                items.push(parse_hash_entry(parser, key, kind));
            }
        }
    }
    skip_newlines(parser);
    parser.stream.eat(TokenKind::CloseBrace);

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Hash {
            kind,
            items: NodeList::from(items),
        },
        span,
    )
}

fn parse_hash_entry(parser: &mut Parser<'_>, key: NodeId, kind: HashKind) -> NodeId {
    if kind == HashKind::Set || parser.stream.eat(TokenKind::Colon).is_none() {
        return key;
    }
    let value = parse_expression(parser);
    let span = parser.join(key, value);
    parser.alloc(NodeKind::Pair { key, value }, span)
}

fn skip_newlines(parser: &mut Parser<'_>) {
    while parser.stream.maybe_eat(&[TokenKind::Newline]) {}
}

/// `yield`, `yield a, b`, `yield from source`
fn parse_yield(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();

    let next = parser.stream.peek();
    let (value, from) = if next.kind == TokenKind::Identifier && next.value == "from" {
        parser.stream.advance();
        (Some(parse_infix(parser)), true)
    } else if at_expression_end(parser) {
        (None, false)
    } else {
        (Some(parse_tuple(parser, false)), false)
    };

    let span = parser.span_from(start);
    parser.alloc(NodeKind::Yield { value, from }, span)
}

/// `new Type [(args)]`
fn parse_new(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let type_name = parse_type_name(parser);
    let args = if parser.stream.peek_is(&[TokenKind::OpenParen]) {
        parse_arguments(parser)
    } else {
        NodeList::new()
    };
    let span = parser.span_from(start);
    parser.alloc(NodeKind::New { type_name, args }, span)
}
