//! Statement parsing

use super::expr::{at_expression_end, parse_assignment, parse_expression, parse_target_list, parse_tuple, target_names};
use super::guards::LoopGuard;
use super::pattern::parse_macro_syntax;
use super::recovery;
use super::types::parse_type_name;
use super::Parser;
use crate::ast::*;
use crate::diagnostics::DiagnosticKind;
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

/// Parse the whole input into the root `Scope`.
pub fn parse_module(parser: &mut Parser<'_>) -> NodeId {
    parser.push_scope(Vec::new());
    let items = parse_statements(parser, &[]);
    let bindings = parser.pop_scope();
    let end = parser.stream.peek().span.end;
    parser.alloc(
        NodeKind::Scope {
            items: NodeList::from(items),
            bindings,
        },
        Span::new(Position::default(), end),
    )
}

/// Parse statements until one of `until` or the end of input.
fn parse_statements(parser: &mut Parser<'_>, until: &[TokenKind]) -> Vec<NodeId> {
    let mut items = Vec::new();
    let mut guard = LoopGuard::new("block_statements");

    loop {
        parser.stream.skip_separators();
        let token = parser.stream.peek();
        if token.kind == TokenKind::End || until.contains(&token.kind) {
            break;
        }
        if !guard.check(parser.stream.position()) {
            parser.stream.advance();
            continue;
        }

        match token.kind {
            TokenKind::Indent => {
                parser.stream.recover();
                parser.stream.report(
                    DiagnosticKind::UnexpectedToken {
                        expected: "statement".to_string(),
                        found: token.to_string(),
                    },
                    token.span,
                );
                parser.stream.recover();
                items.push(parser.nested(parse_stray_block));
            }
            TokenKind::Outdent => {
                parser.stream.advance();
            }
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace => {
                parser.stream.recover();
                parser.stream.report(
                    DiagnosticKind::UnmatchedBracket {
                        found: token.to_string(),
                    },
                    token.span,
                );
                parser.stream.recover();
                parser.stream.advance();
            }
            _ => items.push(parse_statement_recovering(parser)),
        }
    }
    items
}

/// Parse one statement, then skip the rest of it if it reported an error.
fn parse_statement_recovering(parser: &mut Parser<'_>) -> NodeId {
    parser.stream.recover();
    let id = parse_statement(parser);
    if parser.stream.panicking() {
        recovery::sync_to_statement_boundary(parser);
        parser.stream.recover();
    }
    id
}

/// Parse a statement. Nested statements count toward the depth limit
/// through their block.
pub fn parse_statement(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    match parser.stream.peek_kind() {
        TokenKind::If => parse_if(parser),
        TokenKind::While => parse_while(parser),
        TokenKind::For => parse_for(parser),
        TokenKind::Module => parse_module_definition(parser),
        TokenKind::Class => parse_class(parser),
        TokenKind::Enum => parse_enum(parser),
        TokenKind::Fn => parse_function(parser),
        TokenKind::Macro => parse_macro(parser),
        TokenKind::CustomKeyword => parse_macro_application(parser),
        TokenKind::Break | TokenKind::Continue => simple(parser, parse_jump),
        TokenKind::Return => simple(parser, parse_return),
        TokenKind::Pass => simple(parser, |p| {
            let token = p.stream.advance();
            p.alloc(NodeKind::Pass, token.span)
        }),
        TokenKind::Import => simple(parser, parse_import),
        TokenKind::Let => simple(parser, |p| {
            p.stream.advance();
            parse_assignment(p, start, true)
        }),
        _ => simple(parser, |p| parse_assignment(p, start, false)),
    }
}

/// Run a statement routine that must be followed by a statement end.
fn simple(parser: &mut Parser<'_>, f: impl FnOnce(&mut Parser<'_>) -> NodeId) -> NodeId {
    let id = f(parser);
    end_statement(parser);
    id
}

/// Consume a statement terminator: a line break or `;`. A following
/// `Outdent`, `}` or end of input also ends the statement.
pub fn end_statement(parser: &mut Parser<'_>) {
    if parser
        .stream
        .maybe_eat(&[TokenKind::Newline, TokenKind::Semicolon])
    {
        return;
    }
    if parser.stream.peek_is(&[TokenKind::Outdent, TokenKind::CloseBrace, TokenKind::End]) {
        return;
    }
    let found = parser.stream.peek();
    parser.stream.report(
        DiagnosticKind::ExpectedStatementEnd {
            found: found.to_string(),
        },
        found.span,
    );
}

// ============================================================================
// Blocks
// ============================================================================

/// Parse a block into a `Scope`: `{ ... }`, an indented block after a line
/// break, or `: statement` on the same line. `bindings` are names the
/// block starts with, such as parameters.
pub fn parse_block(parser: &mut Parser<'_>, bindings: Vec<(String, NodeId)>) -> NodeId {
    parser.nested(move |p| parse_block_inner(p, bindings))
}

fn parse_block_inner(parser: &mut Parser<'_>, bindings: Vec<(String, NodeId)>) -> NodeId {
    let start = parser.start();
    parser.push_scope(bindings);

    let (items, span) = match parser.stream.peek_kind() {
        TokenKind::OpenBrace => {
            parser.stream.advance();
            let items = parse_statements(parser, &[TokenKind::CloseBrace]);
            parser.stream.eat(TokenKind::CloseBrace);
            (items, parser.span_from(start))
        }
        TokenKind::Colon => {
            parser.stream.advance();
            if parser.stream.peek_is(&[TokenKind::Newline]) {
                let items = parse_indented(parser);
                let span = items_span(parser, &items);
                (items, span)
            } else {
                let item = parse_statement_recovering(parser);
                (vec![item], parser.ast.span(item))
            }
        }
        TokenKind::Newline => {
            let items = parse_indented(parser);
            let span = items_span(parser, &items);
            (items, span)
        }
        _ => {
            parser.stream.expected("block");
            (Vec::new(), Span::point(start))
        }
    };

    let bindings = parser.pop_scope();
    parser.alloc(
        NodeKind::Scope {
            items: NodeList::from(items),
            bindings,
        },
        span,
    )
}

/// `Newline [Newline...] Indent statements Outdent`
fn parse_indented(parser: &mut Parser<'_>) -> Vec<NodeId> {
    while parser.stream.maybe_eat(&[TokenKind::Newline]) {}
    if parser.stream.peek_kind() != TokenKind::Indent {
        parser.stream.expected("indented block");
        return Vec::new();
    }
    parser.stream.advance();
    let items = parse_statements(parser, &[TokenKind::Outdent]);
    parser.stream.maybe_eat(&[TokenKind::Outdent]);
    items
}

/// An indented block with no statement introducing it.
fn parse_stray_block(parser: &mut Parser<'_>) -> NodeId {
    parser.push_scope(Vec::new());
    let items = parse_indented(parser);
    let span = items_span(parser, &items);
    let bindings = parser.pop_scope();
    parser.alloc(
        NodeKind::Scope {
            items: NodeList::from(items),
            bindings,
        },
        span,
    )
}

fn items_span(parser: &Parser<'_>, items: &[NodeId]) -> Span {
    match (items.first(), items.last()) {
        (Some(&first), Some(&last)) => parser.join(first, last),
        _ => Span::point(parser.start()),
    }
}

/// Span from `start` to the end of `last`.
fn span_to(parser: &Parser<'_>, start: Position, last: NodeId) -> Span {
    Span::new(start, parser.ast.span(last).end.max(start))
}

fn expect_name(parser: &mut Parser<'_>) -> String {
    match parser.stream.eat(TokenKind::Identifier) {
        Some(token) => token.value.clone(),
        None => String::new(),
    }
}

// ============================================================================
// Control Flow Statements
// ============================================================================

/// `if cond block [elif cond block]... [else block]`
fn parse_if(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let condition = parse_expression(parser);
    let then_block = parse_block(parser, Vec::new());

    let else_block = match parser.stream.peek_kind() {
        TokenKind::Elif => Some(parser.nested(parse_if)),
        TokenKind::Else => {
            parser.stream.advance();
            Some(parse_block(parser, Vec::new()))
        }
        _ => None,
    };

    let span = span_to(parser, start, else_block.unwrap_or(then_block));
    parser.alloc(
        NodeKind::If {
            condition,
            then_block,
            else_block,
        },
        span,
    )
}

/// The `else` block of a loop, run when it ends without `break`.
fn parse_no_break(parser: &mut Parser<'_>) -> Option<NodeId> {
    parser
        .stream
        .maybe_eat(&[TokenKind::Else])
        .then(|| parse_block(parser, Vec::new()))
}

fn parse_while(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let condition = parse_expression(parser);
    let block = parse_block(parser, Vec::new());
    let no_break = parse_no_break(parser);

    let span = span_to(parser, start, no_break.unwrap_or(block));
    parser.alloc(
        NodeKind::While {
            condition,
            block,
            no_break,
        },
        span,
    )
}

/// `for target in iterable block [else block]`; the target's names are
/// bound in the loop body.
fn parse_for(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let target = parse_target_list(parser);
    parser.stream.eat(TokenKind::In);
    let iterable = parse_expression(parser);

    let bindings = target_names(&parser.ast, target)
        .into_iter()
        .map(|name| (name, target))
        .collect();
    let block = parse_block(parser, bindings);
    let no_break = parse_no_break(parser);

    let span = span_to(parser, start, no_break.unwrap_or(block));
    parser.alloc(
        NodeKind::For {
            target,
            iterable,
            block,
            no_break,
        },
        span,
    )
}

/// `break [label]` / `continue [label]`
fn parse_jump(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let keyword = parser.stream.advance();
    let label = parser
        .stream
        .peek_is(&[TokenKind::Identifier])
        .then(|| parser.stream.advance().value.clone());

    let span = parser.span_from(start);
    let kind = if keyword.kind == TokenKind::Break {
        NodeKind::Break { label }
    } else {
        NodeKind::Continue { label }
    };
    parser.alloc(kind, span)
}

fn parse_return(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let value = (!at_expression_end(parser)).then(|| parse_tuple(parser, false));
    let span = parser.span_from(start);
    parser.alloc(NodeKind::Return { value }, span)
}

/// `import a.b.c [as d]`
fn parse_import(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();

    let mut path = vec![expect_name(parser)];
    while parser.stream.maybe_eat(&[TokenKind::Dot]) {
        path.push(expect_name(parser));
    }

    let next = parser.stream.peek();
    let alias = (next.kind == TokenKind::Identifier && next.value == "as").then(|| {
        parser.stream.advance();
        expect_name(parser)
    });

    let bound = alias.clone().or_else(|| path.first().cloned());
    let span = parser.span_from(start);
    let id = parser.alloc(NodeKind::Import { path, alias }, span);
    if let Some(name) = bound.filter(|name| !name.is_empty()) {
        parser.bind(&name, id);
    }
    id
}

// ============================================================================
// Definitions
// ============================================================================

fn parse_module_definition(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let name = expect_name(parser);
    let block = parse_block(parser, Vec::new());

    let span = span_to(parser, start, block);
    let id = parser.alloc(
        NodeKind::Module {
            name: name.clone(),
            block,
        },
        span,
    );
    parser.bind(&name, id);
    id
}

/// `( Type, ... )` after a class or enum name.
fn parse_bases(parser: &mut Parser<'_>) -> NodeList {
    let mut bases = Vec::new();
    if !parser.stream.maybe_eat(&[TokenKind::OpenParen]) {
        return NodeList::new();
    }
    let mut guard = LoopGuard::new("bases");
    while !parser.stream.peek_is(&[TokenKind::CloseParen, TokenKind::End]) {
        if !guard.check(parser.stream.position()) {
            break;
        }
        bases.push(parse_type_name(parser));
        if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
            break;
        }
    }
    parser.stream.eat(TokenKind::CloseParen);
    NodeList::from(bases)
}

/// `class Name [(bases)] block`
fn parse_class(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let name = expect_name(parser);
    let bases = parse_bases(parser);
    let block = parse_block(parser, Vec::new());

    let span = span_to(parser, start, block);
    let id = parser.alloc(
        NodeKind::Class {
            name: name.clone(),
            bases,
            block,
        },
        span,
    );
    parser.bind(&name, id);
    id
}

/// `enum Name [(bases)] { Item [= value], ... }`; items may also be
/// separated by line breaks.
fn parse_enum(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let name = expect_name(parser);
    let bases = parse_bases(parser);

    let mut items = Vec::new();
    if parser.stream.eat(TokenKind::OpenBrace).is_some() {
        let mut guard = LoopGuard::new("enum_items");
        loop {
            parser.stream.skip_separators();
            while parser.stream.maybe_eat(&[TokenKind::Comma, TokenKind::Newline]) {}
            if parser.stream.peek_is(&[TokenKind::CloseBrace, TokenKind::End])
                || !guard.check(parser.stream.position())
            {
                break;
            }

            let item_start = parser.start();
            if !parser.stream.peek_is(&[TokenKind::Identifier]) {
                parser.stream.expected("enum item");
                break;
            }
            let item_name = parser.stream.advance().value.clone();
            let value = parser
                .stream
                .maybe_eat(&[TokenKind::Equals])
                .then(|| parse_expression(parser));
            let span = parser.span_from(item_start);
            items.push(parser.alloc(
                NodeKind::EnumItem {
                    name: item_name,
                    value,
                },
                span,
            ));
        }
        parser.stream.eat(TokenKind::CloseBrace);
    }

    let span = parser.span_from(start);
    let id = parser.alloc(
        NodeKind::Enum {
            name: name.clone(),
            bases,
            items: NodeList::from(items),
        },
        span,
    );
    parser.bind(&name, id);
    id
}

/// `fn name (params) [-> Type] block`
fn parse_function(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let name = expect_name(parser);

    let mut params = Vec::new();
    if parser.stream.eat(TokenKind::OpenParen).is_some() {
        let mut guard = LoopGuard::new("function_parameters");
        while !parser.stream.peek_is(&[TokenKind::CloseParen, TokenKind::End]) {
            if !guard.check(parser.stream.position()) {
                break;
            }
            params.push(parse_parameter(parser));
            if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
                break;
            }
        }
        parser.stream.eat(TokenKind::CloseParen);
    }

    let return_type = parser
        .stream
        .maybe_eat(&[TokenKind::RightArrow])
        .then(|| parse_type_name(parser));

    let bindings = params
        .iter()
        .filter_map(|&param| match parser.ast.kind(param) {
            NodeKind::Parameter { name, .. } if !name.is_empty() => Some((name.clone(), param)),
            _ => None,
        })
        .collect();
    let block = parse_block(parser, bindings);

    let span = span_to(parser, start, block);
    let id = parser.alloc(
        NodeKind::Function {
            name: name.clone(),
            params: NodeList::from(params),
            return_type,
            block,
        },
        span,
    );
    parser.bind(&name, id);
    id
}

/// `name [: Type] [= default]`
fn parse_parameter(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let name = expect_name(parser);
    let type_name = parser
        .stream
        .maybe_eat(&[TokenKind::Colon])
        .then(|| parse_type_name(parser));
    let default = parser
        .stream
        .maybe_eat(&[TokenKind::Equals])
        .then(|| parse_expression(parser));

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::Parameter {
            name,
            type_name,
            default,
        },
        span,
    )
}

/// `macro name (pattern) block`
fn parse_macro(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    parser.stream.advance();
    let name = expect_name(parser);
    let syntax = parse_macro_syntax(parser);
    let block = parse_block(parser, Vec::new());

    let span = span_to(parser, start, block);
    let id = parser.alloc(
        NodeKind::Macro {
            name: name.clone(),
            syntax,
            block,
        },
        span,
    );
    parser.bind(&name, id);
    id
}

/// `@keyword ...`: the tokens up to the end of the statement are kept
/// unparsed. An indented block right after the line belongs to the
/// application.
fn parse_macro_application(parser: &mut Parser<'_>) -> NodeId {
    let keyword = parser.stream.advance();
    let name = keyword.keyword_name().to_string();
    let mut tokens: Vec<Token> = Vec::new();
    let mut nesting = 0usize;
    let mut guard = LoopGuard::new("macro_application");

    while guard.check(parser.stream.position()) {
        let token = parser.stream.peek();
        match token.kind {
            TokenKind::End => break,
            TokenKind::Semicolon if nesting == 0 => {
                parser.stream.advance();
                break;
            }
            TokenKind::Newline if nesting == 0 => {
                parser.stream.advance();
                if !parser.stream.peek_is(&[TokenKind::Indent]) {
                    break;
                }
                tokens.push(token.clone());
            }
            TokenKind::Outdent | TokenKind::CloseBrace if nesting == 0 => break,
            TokenKind::Indent
            | TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::OpenBrace => {
                nesting += 1;
                tokens.push(token.clone());
                parser.stream.advance();
            }
            TokenKind::Outdent
            | TokenKind::CloseParen
            | TokenKind::CloseBracket
            | TokenKind::CloseBrace => {
                nesting = nesting.saturating_sub(1);
                tokens.push(token.clone());
                parser.stream.advance();
                if token.kind == TokenKind::Outdent && nesting == 0 {
                    break;
                }
            }
            _ => {
                tokens.push(token.clone());
                parser.stream.advance();
            }
        }
    }

    let end = tokens
        .iter()
        .rev()
        .find(|t| !t.kind.is_layout())
        .map_or(keyword.span.end, |t| t.span.end);
    parser.alloc(
        NodeKind::MacroApplication { name, tokens },
        Span::new(keyword.span.start, end),
    )
}
