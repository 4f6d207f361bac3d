//! Cursor over a lexed token sequence.
//!
//! The parser reads tokens exclusively through [`TokenStream`]: `peek`,
//! `peek_is`, `advance`, `eat` and `maybe_eat`. Comments and the leading
//! whitespace token are skipped transparently, so the cursor always rests
//! on a token the grammar cares about.

use once_cell::sync::Lazy;

use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::span::{Position, Span};
use crate::token::{Token, TokenKind};

static END: Lazy<Token> = Lazy::new(|| Token::synthetic(TokenKind::End, Position::new(0, 0)));

pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
    last: Option<&'t Token>,
    diagnostics: Diagnostics,
    /// Set by the first error of a statement; later errors are dropped
    /// until [`TokenStream::recover`] is called.
    panicking: bool,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let mut stream = Self {
            tokens,
            pos: 0,
            last: None,
            diagnostics: Diagnostics::new(),
            panicking: false,
        };
        stream.skip_trivia();
        stream
    }

    fn skip_trivia(&mut self) {
        while self.tokens.get(self.pos).is_some_and(|t| t.kind.is_trivia()) {
            self.pos += 1;
        }
    }

    /// The current token. Past the end this is the last token of the
    /// sequence (normally `End`).
    #[inline]
    pub fn peek(&self) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        tokens.get(self.pos).or_else(|| tokens.last()).unwrap_or(&*END)
    }

    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// True if the current token is any of `kinds`.
    #[inline]
    pub fn peek_is(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.peek().kind == TokenKind::End
    }

    /// Consume the current token unconditionally. `End` is never consumed.
    pub fn advance(&mut self) -> &'t Token {
        let token = self.peek();
        if token.kind != TokenKind::End && self.pos < self.tokens.len() {
            self.last = Some(token);
            self.pos += 1;
            self.skip_trivia();
        }
        token
    }

    /// Consume a token of `kind`, or report "expected X, got Y".
    pub fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.peek().kind == kind {
            Some(self.advance())
        } else {
            self.expected(&kind.to_string());
            None
        }
    }

    /// Consume the current token if it is any of `kinds`.
    pub fn maybe_eat(&mut self, kinds: &[TokenKind]) -> bool {
        if self.peek_is(kinds) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// The most recently consumed token.
    pub fn token(&self) -> Option<&'t Token> {
        self.last
    }

    /// Span of the most recently consumed token, or an empty span at the
    /// current token.
    pub fn last_span(&self) -> Span {
        match self.last {
            Some(token) => token.span,
            None => Span::point(self.peek().span.start),
        }
    }

    /// Number of tokens consumed so far, counting skipped trivia.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Report "expected `what`, got <current token>".
    pub fn expected(&mut self, what: &str) {
        let found = self.peek();
        self.report(
            DiagnosticKind::UnexpectedToken {
                expected: what.to_string(),
                found: found.to_string(),
            },
            found.span,
        );
    }

    /// Record a diagnostic. Errors are suppressed while panicking.
    pub fn report(&mut self, kind: DiagnosticKind, span: Span) {
        let is_error = kind.severity() == Severity::Error;
        if is_error && self.panicking {
            tracing::trace!(%kind, "suppressed while recovering");
            return;
        }
        self.diagnostics.report(kind, span);
        if is_error {
            self.panicking = true;
        }
    }

    pub fn panicking(&self) -> bool {
        self.panicking
    }

    /// Leave panic mode at a statement boundary.
    pub fn recover(&mut self) {
        self.panicking = false;
    }

    /// Skip line breaks and semicolons between statements.
    pub fn skip_separators(&mut self) {
        while self.maybe_eat(&[TokenKind::Newline, TokenKind::Semicolon]) {}
    }

    /// Take over diagnostics produced elsewhere, such as by a nested parse.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn finish(self) -> Diagnostics {
        self.diagnostics
    }
}
