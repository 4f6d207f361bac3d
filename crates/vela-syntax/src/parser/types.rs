//! Type name parsing

use super::guards::LoopGuard;
use super::Parser;
use crate::ast::{NodeId, NodeKind, NodeList};
use crate::diagnostics::DiagnosticKind;
use crate::token::TokenKind;

/// Parse a type name: `Name`, `a.b.Name`, `List[T]`, `Map[K, V]?`.
pub fn parse_type_name(parser: &mut Parser<'_>) -> NodeId {
    parser.nested(parse_type_name_inner)
}

fn parse_type_name_inner(parser: &mut Parser<'_>) -> NodeId {
    let start = parser.start();
    if !parser.stream.peek_is(&[TokenKind::Identifier]) {
        return parser.error_node(DiagnosticKind::UnexpectedToken {
            expected: "type name".to_string(),
            found: parser.stream.peek().to_string(),
        });
    }

    let mut name = parser.stream.advance().value.clone();
    while parser.stream.maybe_eat(&[TokenKind::Dot]) {
        match parser.stream.eat(TokenKind::Identifier) {
            Some(part) => {
                name.push('.');
                name.push_str(&part.value);
            }
            None => break,
        }
    }

    let mut args = Vec::new();
    if parser.stream.maybe_eat(&[TokenKind::OpenBracket]) {
        let mut guard = LoopGuard::new("type_arguments");
        while !parser.stream.peek_is(&[TokenKind::CloseBracket, TokenKind::End]) {
            if !guard.check(parser.stream.position()) {
                break;
            }
            args.push(parse_type_name(parser));
            if !parser.stream.maybe_eat(&[TokenKind::Comma]) {
                break;
            }
        }
        parser.stream.eat(TokenKind::CloseBracket);
    }

    let optional = parser.stream.maybe_eat(&[TokenKind::Question]);
    let span = parser.span_from(start);
    parser.alloc(
        NodeKind::TypeName {
            name,
            args: NodeList::from(args),
            optional,
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::options::SyntaxOptions;

    #[test]
    fn test_generic_optional_type() {
        let options = SyntaxOptions::default();
        let (tokens, _) = lex("std.Map[str, List[int]]?", &options);
        let mut parser = Parser::new(&tokens, &options);
        let id = parse_type_name(&mut parser);
        let (ast, diagnostics) = parser.into_parts();
        assert!(diagnostics.is_empty());
        match ast.kind(id) {
            NodeKind::TypeName {
                name,
                args,
                optional,
            } => {
                assert_eq!(name, "std.Map");
                assert_eq!(args.len(), 2);
                assert!(*optional);
            }
            other => panic!("expected type name, got {:?}", other),
        }
    }
}
