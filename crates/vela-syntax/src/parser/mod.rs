//! Parser for Vela
//!
//! A recursive descent parser over a [`TokenStream`]. Expressions use
//! precedence climbing (see [`expr`]), statements one routine per
//! statement kind (see [`stmt`]). Nodes are allocated bottom-up into an
//! [`Ast`] arena, so each node's children already exist when it is built
//! and their parent links are bound at that moment.
//!
//! The parser never fails. A production that cannot continue reports a
//! diagnostic and yields an `Error` node; the statement loop then skips to
//! the next statement boundary (see [`recovery`]).

pub mod expr;
pub mod guards;
pub mod pattern;
pub mod precedence;
pub mod recovery;
pub mod stmt;
pub mod types;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::{Ast, NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::options::SyntaxOptions;
use crate::span::{Position, Span};
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

/// Parse a lexed unit into a syntax tree rooted at a `Scope`.
pub fn parse(tokens: &[Token], options: &SyntaxOptions) -> (Ast, Diagnostics) {
    Parser::new(tokens, options).parse()
}

/// Parser state for one token sequence.
pub struct Parser<'t> {
    /// Cursor over the input; also collects diagnostics
    pub stream: TokenStream<'t>,

    /// Arena receiving the nodes
    pub ast: Ast,

    options: &'t SyntaxOptions,

    /// Current nesting depth of expressions and blocks
    depth: usize,

    /// Bindings of the scopes being parsed, innermost last
    scopes: Vec<FxHashMap<String, NodeId>>,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token], options: &'t SyntaxOptions) -> Self {
        Self::with_ast(tokens, options, Ast::new())
    }

    /// A parser that allocates into an existing arena. Used for nested
    /// parses such as string interpolations and macro placeholders.
    pub fn with_ast(tokens: &'t [Token], options: &'t SyntaxOptions, ast: Ast) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            ast,
            options,
            depth: 0,
            scopes: Vec::new(),
        }
    }

    /// Parse the whole input as a module.
    pub fn parse(mut self) -> (Ast, Diagnostics) {
        let root = stmt::parse_module(&mut self);
        self.ast.set_root(root);
        debug!(
            nodes = self.ast.len(),
            diagnostics = self.stream.diagnostics().len(),
            "parsed unit"
        );
        self.into_parts()
    }

    pub fn into_parts(self) -> (Ast, Diagnostics) {
        (self.ast, self.stream.finish())
    }

    pub fn options(&self) -> &'t SyntaxOptions {
        self.options
    }

    // ========================================================================
    // Node construction
    // ========================================================================

    #[inline]
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.ast.alloc(kind, span)
    }

    /// Start position of the current token.
    #[inline]
    pub fn start(&self) -> Position {
        self.stream.peek().span.start
    }

    /// Span from `start` to the end of the last consumed token.
    pub fn span_from(&self, start: Position) -> Span {
        let end = self.stream.last_span().end.max(start);
        Span::new(start, end)
    }

    /// Span covering two nodes.
    pub fn join(&self, first: NodeId, last: NodeId) -> Span {
        self.ast.span(first).merge(&self.ast.span(last))
    }

    /// Report `kind` at the current token and produce an `Error` node.
    ///
    /// The offending token is consumed unless it delimits statements or
    /// brackets, which the enclosing productions still need.
    pub fn error_node(&mut self, kind: DiagnosticKind) -> NodeId {
        let token = self.stream.peek();
        self.stream.report(kind, token.span);
        if !is_structural(token.kind) {
            self.stream.advance();
        }
        self.alloc(
            NodeKind::Error {
                token: token.clone(),
            },
            token.span,
        )
    }

    // ========================================================================
    // Depth limit
    // ========================================================================

    /// Run `f` one nesting level deeper, or produce an `Error` node when
    /// the configured maximum depth is reached.
    pub fn nested(&mut self, f: impl FnOnce(&mut Self) -> NodeId) -> NodeId {
        if self.depth >= self.options.max_depth {
            tracing::trace!(depth = self.depth, "nesting limit reached");
            let token = self.stream.peek();
            self.stream.report(
                DiagnosticKind::MaxDepthExceeded {
                    limit: self.options.max_depth,
                },
                token.span,
            );
            return self.alloc(
                NodeKind::Error {
                    token: token.clone(),
                },
                token.span,
            );
        }

        self.depth += 1;
        let id = f(self);
        self.depth -= 1;
        id
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    pub fn push_scope(&mut self, bindings: impl IntoIterator<Item = (String, NodeId)>) {
        self.scopes.push(bindings.into_iter().collect());
    }

    pub fn pop_scope(&mut self) -> BTreeMap<String, NodeId> {
        self.scopes
            .pop()
            .map(|frame| frame.into_iter().collect())
            .unwrap_or_default()
    }

    /// Bind `name` in the innermost scope.
    pub fn bind(&mut self, name: &str, id: NodeId) {
        if let Some(frame) = self.scopes.last_mut() {
            frame.insert(name.to_string(), id);
        }
    }

    /// True if any enclosing scope binds `name`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|frame| frame.contains_key(name))
    }
}

/// Tokens that end statements or close brackets.
pub fn is_structural(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Newline
            | TokenKind::Indent
            | TokenKind::Outdent
            | TokenKind::End
            | TokenKind::Semicolon
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::CloseParen
            | TokenKind::CloseBracket
            | TokenKind::CloseBrace
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> (Ast, Diagnostics) {
        let options = SyntaxOptions::default();
        let (tokens, lex_diagnostics) = lex(source, &options);
        assert!(lex_diagnostics.is_empty(), "{:?}", lex_diagnostics);
        parse(&tokens, &options)
    }

    #[test]
    fn test_root_is_scope() {
        let (ast, diagnostics) = parse_source("x = 1\ny = 2\n");
        assert!(diagnostics.is_empty());
        let root = ast.root().unwrap();
        match ast.kind(root) {
            NodeKind::Scope { items, bindings } => {
                assert_eq!(items.len(), 2);
                assert!(bindings.contains_key("x"));
                assert!(bindings.contains_key("y"));
            }
            other => panic!("expected scope, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_limit() {
        let options = SyntaxOptions {
            max_depth: 4,
            ..SyntaxOptions::default()
        };
        let (tokens, _) = lex("x = ((((((1))))))\n", &options);
        let (_, diagnostics) = parse(&tokens, &options);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(matches!(
            diagnostics.iter().next().map(|d| &d.kind),
            Some(DiagnosticKind::MaxDepthExceeded { limit: 4 })
        ));
    }

    #[test]
    fn test_depth_counts_each_level_once() {
        let options = SyntaxOptions {
            max_depth: 4,
            ..SyntaxOptions::default()
        };
        let depth_errors = |source: &str| {
            let (tokens, _) = lex(source, &options);
            let (_, diagnostics) = parse(&tokens, &options);
            diagnostics
                .iter()
                .filter(|d| matches!(d.kind, DiagnosticKind::MaxDepthExceeded { .. }))
                .count()
        };

        assert_eq!(depth_errors("x = ((((1))))\n"), 0);
        assert_eq!(depth_errors("x = -(-(a))\n"), 0);
        assert_eq!(depth_errors("x = f(g([a + (b * c)]))\n"), 0);
        assert_eq!(depth_errors("if a\n    if b\n        x = ((1))\n"), 0);
        assert_eq!(depth_errors("x = (((((1)))))\n"), 1);
        assert_eq!(depth_errors("if a\n    if b\n        x = (((1)))\n"), 1);
    }

    #[test]
    fn test_error_node_keeps_structural_tokens() {
        let (ast, diagnostics) = parse_source("x = )\ny = 2\n");
        assert_eq!(diagnostics.error_count(), 1);
        let root = ast.root().unwrap();
        assert_eq!(ast.children(root).len(), 2);
    }
}
