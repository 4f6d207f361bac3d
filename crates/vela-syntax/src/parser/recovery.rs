//! Error recovery strategies for the parser.
//!
//! When a statement reports an error the stream is in panic mode. After
//! the statement returns, these strategies skip the rest of it so the
//! next statement starts clean.

use super::guards::LoopGuard;
use super::Parser;
use crate::token::TokenKind;

/// Skip to the next statement boundary.
///
/// Brackets and indented blocks opened while skipping are skipped as a
/// whole. A line break ends the statement unless it introduces an
/// indented block, which then belongs to the broken statement too.
/// `Outdent`, `}` and `End` at the outer level are left for the enclosing
/// block.
pub fn sync_to_statement_boundary(parser: &mut Parser<'_>) {
    let mut guard = LoopGuard::new("statement_recovery");
    let mut nesting = 0usize;
    let mut skipped = 0usize;

    loop {
        if !guard.check(parser.stream.position()) {
            break;
        }

        let kind = parser.stream.peek_kind();
        match kind {
            TokenKind::End => break,

            TokenKind::Outdent | TokenKind::CloseBrace if nesting == 0 => break,

            TokenKind::Semicolon if nesting == 0 => {
                parser.stream.advance();
                break;
            }

            TokenKind::Newline if nesting == 0 => {
                parser.stream.advance();
                if !parser.stream.peek_is(&[TokenKind::Indent]) {
                    break;
                }
            }

            TokenKind::OpenParen
            | TokenKind::OpenBracket
            | TokenKind::OpenBrace
            | TokenKind::Indent => {
                nesting += 1;
                parser.stream.advance();
            }

            TokenKind::CloseParen
            | TokenKind::CloseBracket
            | TokenKind::CloseBrace
            | TokenKind::Outdent => {
                nesting = nesting.saturating_sub(1);
                parser.stream.advance();
                // A block skipped as a whole ends the statement.
                if kind == TokenKind::Outdent && nesting == 0 {
                    break;
                }
            }

            _ => {
                parser.stream.advance();
            }
        }
        skipped += 1;
    }

    tracing::trace!(skipped, "resynchronized at statement boundary");
}

/// Skip tokens until one of `kinds` (or the end of input) is current.
pub fn skip_until(parser: &mut Parser<'_>, kinds: &[TokenKind]) {
    let mut guard = LoopGuard::new("skip_until");

    while !parser.stream.at_end() && !parser.stream.peek_is(kinds) {
        if !guard.check(parser.stream.position()) {
            return;
        }
        parser.stream.advance();
    }
}
