//! Macro syntax pattern parsing
//!
//! ```text
//! alternatives ::= cascade { '|' cascade }
//! cascade      ::= element { ',' element }
//! element      ::= STRING | ID ':' ID | ID
//!                | '(' alternatives ')' | '[' alternatives ']' | '{' alternatives '}'
//! ```

use super::guards::LoopGuard;
use super::Parser;
use crate::ast::{NodeId, NodeKind, NodeList, PlaceholderType};
use crate::diagnostics::DiagnosticKind;
use crate::lexer::lex;
use crate::token::{Token, TokenKind};

/// Parse the parenthesised syntax pattern of a `macro` definition.
pub fn parse_macro_syntax(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    if parser.stream.eat(TokenKind::OpenParen).is_none() {
        let span = parser.span_from(start);
        return parser.alloc(
            NodeKind::CascadePattern {
                items: NodeList::new(),
            },
            span,
        );
    }
    let pattern = parse_alternatives(parser, TokenKind::CloseParen);
    parser.stream.eat(TokenKind::CloseParen);
    pattern
}

fn skip_newlines(parser: &mut Parser<'_>) {
    while parser.stream.maybe_eat(&[TokenKind::Newline]) {}
}

/// `cascade | cascade | ...`; a single cascade is returned as is.
fn parse_alternatives(parser: &mut Parser<'_>, close: TokenKind) -> NodeId {
    parser.nested(|parser| {
        let start = parser.start();
        let mut alternatives = vec![parse_cascade(parser, close)];
        while parser.stream.maybe_eat(&[TokenKind::Pipe]) {
            alternatives.push(parse_cascade(parser, close));
        }

        if alternatives.len() == 1 {
            return alternatives[0];
        }
        let span = parser.span_from(start);
        parser.alloc(
            NodeKind::OrPattern {
                alternatives: NodeList::from(alternatives),
            },
            span,
        )
    })
}

fn parse_cascade(parser: &mut Parser<'_>, close: TokenKind) -> NodeId {
    let start = parser.start();
    let mut items = Vec::new();
    let mut guard = LoopGuard::new("cascade_pattern");

    loop {
        skip_newlines(parser);
        if parser
            .stream
            .peek_is(&[close, TokenKind::Pipe, TokenKind::End])
            || !guard.check(parser.stream.position())
        {
            break;
        }
        items.push(parse_element(parser));
        skip_newlines(parser);
        if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
            break;
        }
    }

    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::CascadePattern {
            items: NodeList::from(items),
        },
        span,
    )
}

fn parse_element(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    let token = parser.stream.peek();

    match token.kind {
        TokenKind::String => {
            parser.stream.advance();
            parse_literal(parser, token)
        }

        TokenKind::Identifier => {
            parser.stream.advance();
            let (name, ty) = if parser.stream.maybe_eat(&[TokenKind::Colon]) {
                match parser.stream.eat(TokenKind::Identifier) {
                    Some(ty) => (Some(token.value.clone()), ty),
                    None => return error_at(parser, token),
                }
            } else {
                (None, token)
            };

            let Some(placeholder) = PlaceholderType::from_name(&ty.value) else {
                parser.stream.report(
                    DiagnosticKind::UnknownPlaceholderType {
                        name: ty.value.clone(),
                    },
                    ty.span,
                );
                return error_at(parser, ty);
            };
            let span = parser.span_from(start);
            parser.alloc(
                NodeKind::TypePattern {
                    name,
                    ty: placeholder,
                },
                span,
            )
        }

        TokenKind::OpenParen => {
            parser.stream.advance();
            let group = parse_alternatives(parser, TokenKind::CloseParen);
            parser.stream.eat(TokenKind::CloseParen);
            group
        }

        TokenKind::OpenBracket => {
            parser.stream.advance();
            let pattern = parse_alternatives(parser, TokenKind::CloseBracket);
            parser.stream.eat(TokenKind::CloseBracket);
            let span = parser.span_from(start);
            parser.alloc(NodeKind::OptionalPattern { pattern }, span)
        }

        TokenKind::OpenBrace => {
            parser.stream.advance();
            let pattern = parse_alternatives(parser, TokenKind::CloseBrace);
            skip_newlines(parser);
            parser.stream.eat(TokenKind::CloseBrace);
            let span = parser.span_from(start);
            parser.alloc(NodeKind::RepeatPattern { pattern }, span)
        }

        _ => parser.error_node(DiagnosticKind::ExpectedPatternElement {
            found: token.to_string(),
        }),
    }
}

/// A string element names one literal token: its contents are lexed and
/// must produce exactly one token.
fn parse_literal(parser: &mut Parser<'_>, string: &Token) -> NodeId {
    let text = string
        .string()
        .map_or_else(|| string.value.clone(), |s| s.value.clone());
    let (tokens, diagnostics) = lex(&text, parser.options());
    let mut significant = tokens
        .into_iter()
        .filter(|t| !t.kind.is_trivia() && !t.kind.is_layout() && t.kind != TokenKind::End);

    match (significant.next(), significant.next()) {
        (Some(mut token), None) if diagnostics.is_empty() => {
            token.span = string.span;
            token.whitespace.clear();
            parser.alloc(NodeKind::TokenPattern { token }, string.span)
        }
        _ => {
            parser.stream.report(
                DiagnosticKind::InvalidPatternLiteral {
                    text: string.value.clone(),
                },
                string.span,
            );
            error_at(parser, string)
        }
    }
}

fn error_at(parser: &mut Parser<'_>, token: &Token) -> NodeId {
    parser.alloc(
        NodeKind::Error {
            token: token.clone(),
        },
        token.span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ast;
    use crate::diagnostics::Diagnostics;
    use crate::options::SyntaxOptions;

    fn pattern(source: &str) -> (Ast, NodeId, Diagnostics) {
        let options = SyntaxOptions::default();
        let (tokens, _) = lex(source, &options);
        let mut parser = Parser::new(&tokens, &options);
        let id = parse_macro_syntax(&mut parser);
        let (ast, diagnostics) = parser.into_parts();
        (ast, id, diagnostics)
    }

    #[test]
    fn test_cascade_elements() {
        let (ast, id, diagnostics) = pattern(r#"(cond: Infix, "do", body: Expr)"#);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let NodeKind::CascadePattern { items } = ast.kind(id) else {
            panic!("expected cascade");
        };
        assert_eq!(items.len(), 3);
        assert!(matches!(
            ast.kind(items.as_slice()[0]),
            NodeKind::TypePattern { name: Some(name), ty: PlaceholderType::Infix } if name == "cond"
        ));
        assert!(matches!(
            ast.kind(items.as_slice()[1]),
            NodeKind::TokenPattern { token } if token.kind == TokenKind::Identifier && token.value == "do"
        ));
    }

    #[test]
    fn test_alternatives_optional_repeat() {
        let (ast, id, diagnostics) = pattern(r#"(Name, ["=", Expr] | "(", {Atom}, ")")"#);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let NodeKind::OrPattern { alternatives } = ast.kind(id) else {
            panic!("expected alternatives");
        };
        assert_eq!(alternatives.len(), 2);
        let first = ast.children(alternatives.as_slice()[0]);
        assert!(matches!(ast.kind(first[1]), NodeKind::OptionalPattern { .. }));
        let second = ast.children(alternatives.as_slice()[1]);
        assert!(matches!(ast.kind(second[1]), NodeKind::RepeatPattern { .. }));
    }

    #[test]
    fn test_keyword_literal() {
        let (ast, id, diagnostics) = pattern(r#"("in", Expr)"#);
        assert!(diagnostics.is_empty());
        let first = ast.children(id)[0];
        assert!(matches!(ast.kind(first), NodeKind::TokenPattern { token } if token.kind == TokenKind::In));
    }

    #[test]
    fn test_pattern_errors() {
        let (_, _, diagnostics) = pattern(r#"(x: Statement)"#);
        assert!(matches!(
            diagnostics.iter().next().map(|d| &d.kind),
            Some(DiagnosticKind::UnknownPlaceholderType { name }) if name == "Statement"
        ));

        let (_, _, diagnostics) = pattern(r#"("a b")"#);
        assert!(matches!(
            diagnostics.iter().next().map(|d| &d.kind),
            Some(DiagnosticKind::InvalidPatternLiteral { .. })
        ));

        let (_, _, diagnostics) = pattern("(1)");
        assert!(matches!(
            diagnostics.iter().next().map(|d| &d.kind),
            Some(DiagnosticKind::ExpectedPatternElement { .. })
        ));
    }
}
