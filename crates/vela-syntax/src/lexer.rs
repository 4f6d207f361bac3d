//! Lexer for the Vela programming language.
//!
//! The lexer turns source text into a lossless token sequence: every byte
//! of the input belongs to exactly one token's `value` or `whitespace`, so
//! concatenating them reproduces the source. Symbols are recognised with a
//! `logos` scanner; identifiers, literals, comments and indentation are
//! scanned by hand because they need context the regular scanner cannot
//! see (prefixes, bracket nesting, the indentation stack).
//!
//! Lexing never fails. Problems are recorded in [`Diagnostics`] and a
//! best-effort token is produced.

use logos::Logos;
use tracing::debug;
use unicode_xid::UnicodeXID;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::options::SyntaxOptions;
use crate::span::{Position, Span};
use crate::token::{
    escape_sequence, Interpolation, NumberLiteral, NumberOptions, NumberValue, StringLiteral,
    StringOptions, Token, TokenKind, TokenPayload, CHAR_QUOTE, FLOAT_BIT_RATES,
    INTEGER_BIT_RATES, KEYWORDS, STRING_QUOTES,
};

/// Symbol scanner. Maximal munch between overlapping symbols (`<`, `<=`,
/// `<=>`, `<<=`) is resolved by logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum Symbol {
    #[token("+", |_| TokenKind::Plus)]
    #[token("-", |_| TokenKind::Minus)]
    #[token("*", |_| TokenKind::Star)]
    #[token("/", |_| TokenKind::Slash)]
    #[token("//", |_| TokenKind::DoubleSlash)]
    #[token("%", |_| TokenKind::Percent)]
    #[token("**", |_| TokenKind::DoubleStar)]
    #[token("&", |_| TokenKind::Ampersand)]
    #[token("|", |_| TokenKind::Pipe)]
    #[token("^", |_| TokenKind::Caret)]
    #[token("~", |_| TokenKind::Tilde)]
    #[token("<<", |_| TokenKind::DoubleLeftAngle)]
    #[token(">>", |_| TokenKind::DoubleRightAngle)]
    #[token("<", |_| TokenKind::LeftAngle)]
    #[token(">", |_| TokenKind::RightAngle)]
    #[token("<=", |_| TokenKind::LeftAngleEquals)]
    #[token(">=", |_| TokenKind::RightAngleEquals)]
    #[token("==", |_| TokenKind::DoubleEquals)]
    #[token("!=", |_| TokenKind::ExclamationEquals)]
    #[token("<=>", |_| TokenKind::LeftRightArrow)]
    #[token("++", |_| TokenKind::DoublePlus)]
    #[token("--", |_| TokenKind::DoubleMinus)]
    #[token("??", |_| TokenKind::DoubleQuestion)]
    #[token("..", |_| TokenKind::DoubleDot)]
    #[token("...", |_| TokenKind::TripleDot)]
    #[token("|>", |_| TokenKind::PipeRightAngle)]
    #[token("=", |_| TokenKind::Equals)]
    #[token("+=", |_| TokenKind::PlusEquals)]
    #[token("-=", |_| TokenKind::MinusEquals)]
    #[token("*=", |_| TokenKind::StarEquals)]
    #[token("/=", |_| TokenKind::SlashEquals)]
    #[token("//=", |_| TokenKind::DoubleSlashEquals)]
    #[token("%=", |_| TokenKind::PercentEquals)]
    #[token("**=", |_| TokenKind::DoubleStarEquals)]
    #[token("&=", |_| TokenKind::AmpersandEquals)]
    #[token("|=", |_| TokenKind::PipeEquals)]
    #[token("^=", |_| TokenKind::CaretEquals)]
    #[token("<<=", |_| TokenKind::DoubleLeftAngleEquals)]
    #[token(">>=", |_| TokenKind::DoubleRightAngleEquals)]
    #[token("??=", |_| TokenKind::DoubleQuestionEquals)]
    #[token(".", |_| TokenKind::Dot)]
    #[token(",", |_| TokenKind::Comma)]
    #[token(":", |_| TokenKind::Colon)]
    #[token(";", |_| TokenKind::Semicolon)]
    #[token("?", |_| TokenKind::Question)]
    #[token("->", |_| TokenKind::RightArrow)]
    #[token("(", |_| TokenKind::OpenParen)]
    #[token(")", |_| TokenKind::CloseParen)]
    #[token("[", |_| TokenKind::OpenBracket)]
    #[token("]", |_| TokenKind::CloseBracket)]
    #[token("{", |_| TokenKind::OpenBrace)]
    #[token("}", |_| TokenKind::CloseBrace)]
    Op(TokenKind),
}

const NO_BIT_RATES: &[u16] = &[];

/// Lex `source` with `options`.
pub fn lex(source: &str, options: &SyntaxOptions) -> (Vec<Token>, Diagnostics) {
    Lexer::new(source, options).tokenize()
}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    options: &'a SyntaxOptions,
    /// Byte offset of the next unread character.
    pos: usize,
    /// Position of the start of the token being scanned.
    cursor: Position,
    tokens: Vec<Token>,
    diagnostics: Diagnostics,
    /// Widths of the open indentation levels, outermost first.
    indents: Vec<usize>,
    /// Character used by the first indented line.
    indent_char: Option<char>,
    /// Open brackets, innermost last.
    brackets: Vec<TokenKind>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, options: &'a SyntaxOptions) -> Self {
        Self {
            source,
            options,
            pos: 0,
            cursor: Position::default(),
            tokens: Vec::with_capacity(source.len() / 4 + 1),
            diagnostics: Diagnostics::new(),
            indents: vec![0],
            indent_char: None,
            brackets: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Token>, Diagnostics) {
        self.lex_leading_whitespace();

        while let Some(c) = self.peek_char() {
            match c {
                '\r' | '\n' => self.lex_line_break(),
                ' ' | '\t' | '\x0c' => self.eat_whitespace(),
                '#' => self.lex_comment(),
                '@' => self.lex_custom_keyword(),
                c if c == CHAR_QUOTE => self.lex_character(),
                c if STRING_QUOTES.contains(&c) => self.lex_string(self.pos),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_identifier_start(c) => self.lex_identifier(),
                _ => self.lex_symbol(),
            }
        }

        for _ in 1..self.indents.len() {
            self.tokens.push(Token::synthetic(TokenKind::Outdent, self.cursor));
        }
        self.tokens.push(Token::synthetic(TokenKind::End, self.cursor));

        debug!(
            tokens = self.tokens.len(),
            diagnostics = self.diagnostics.len(),
            "lexed source"
        );
        (self.tokens, self.diagnostics)
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.source.get(offset..).and_then(|s| s.chars().next())
    }

    #[inline]
    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    fn eat_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    /// Position of byte `offset`, which must lie inside the token that
    /// starts at the cursor.
    fn position_at(&self, token_start: usize, offset: usize) -> Position {
        self.cursor.advance(&self.source[token_start..offset])
    }

    /// Push the token spanning `start..self.pos`, then attach the
    /// whitespace that follows it.
    fn finish(&mut self, kind: TokenKind, start: usize, payload: TokenPayload) -> Span {
        let value = &self.source[start..self.pos];
        let end = match &payload {
            TokenPayload::String(literal) => literal.end_position(self.cursor),
            _ => self.cursor.advance(value),
        };
        let span = Span::new(self.cursor, end);
        let payload = match payload {
            TokenPayload::None => kind
                .operator_info()
                .map(TokenPayload::Operator)
                .unwrap_or(TokenPayload::None),
            other => other,
        };
        self.tokens
            .push(Token::new(kind, value, span).with_payload(payload));
        self.cursor = end;
        self.eat_whitespace();
        span
    }

    /// True while line breaks are insignificant.
    fn in_parens(&self) -> bool {
        matches!(
            self.brackets.last(),
            Some(TokenKind::OpenParen | TokenKind::OpenBracket)
        )
    }

    /// Attach spaces (and, inside parentheses, line breaks) to the last
    /// token's trailing whitespace.
    fn eat_whitespace(&mut self) {
        let start = self.pos;
        let multiline = self.in_parens();
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\x0c') || (multiline && matches!(c, '\r' | '\n')));
        if self.pos == start {
            return;
        }
        let text = &self.source[start..self.pos];
        match self.tokens.last_mut() {
            Some(last) => last.whitespace.push_str(text),
            None => {
                let span = Span::new(self.cursor, self.cursor.advance(text));
                self.tokens.push(Token::new(TokenKind::Whitespace, text, span));
            }
        }
        self.cursor = self.cursor.advance(text);
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    fn lex_leading_whitespace(&mut self) {
        let source = self.source;
        let start = self.pos;
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\x0c'));
        if self.pos == start {
            return;
        }
        let text = &source[start..self.pos];
        let span = Span::new(self.cursor, self.cursor.advance(text));
        self.tokens.push(Token::new(TokenKind::Whitespace, text, span));
        self.cursor = span.end;

        // A first line that holds code sets the base indentation level.
        if !matches!(self.peek_char(), None | Some('\r' | '\n' | '#')) {
            self.check_indent_chars(text, span);
            self.indents[0] = self.indent_width(text);
        }
    }

    fn lex_line_break(&mut self) {
        let source = self.source;
        let start = self.pos;
        if self.source[self.pos..].starts_with("\r\n") {
            self.pos += 2;
        } else {
            self.pos += 1;
        }
        let value = &self.source[start..self.pos];
        let span = Span::new(self.cursor, self.cursor.advance(value));
        self.tokens.push(Token::new(TokenKind::Newline, value, span));
        self.cursor = span.end;

        let indent_start = self.pos;
        self.eat_while(|c| matches!(c, ' ' | '\t' | '\x0c'));
        let indentation = &source[indent_start..self.pos];
        let indent_span = Span::new(self.cursor, self.cursor.advance(indentation));
        if let Some(newline) = self.tokens.last_mut() {
            newline.whitespace.push_str(indentation);
        }
        self.cursor = indent_span.end;

        // Blank and comment-only lines do not take part in layout, and
        // neither does anything inside braces.
        if matches!(self.peek_char(), None | Some('\r' | '\n' | '#')) || !self.brackets.is_empty() {
            return;
        }
        self.check_indent_chars(indentation, indent_span);
        self.apply_indentation(self.indent_width(indentation), indent_span);
    }

    fn indent_width(&self, indentation: &str) -> usize {
        indentation
            .chars()
            .map(|c| match c {
                ' ' => 1,
                '\t' => self.options.tab_width,
                _ => 0,
            })
            .sum()
    }

    fn check_indent_chars(&mut self, indentation: &str, span: Span) {
        let has_space = indentation.contains(' ');
        let has_tab = indentation.contains('\t');
        let used = match (has_space, has_tab) {
            (false, false) => return,
            (true, true) => {
                self.diagnostics
                    .report(DiagnosticKind::InconsistentIndentation, span);
                return;
            }
            (true, false) => ' ',
            (false, true) => '\t',
        };
        match self.indent_char {
            None => self.indent_char = Some(used),
            Some(first) if first != used => {
                self.diagnostics
                    .report(DiagnosticKind::InconsistentIndentation, span);
            }
            Some(_) => {}
        }
    }

    fn apply_indentation(&mut self, width: usize, span: Span) {
        let mut top = self.current_indent();
        if width > top {
            self.indents.push(width);
            self.tokens
                .push(Token::synthetic(TokenKind::Indent, self.cursor));
            return;
        }
        while width < top && self.indents.len() > 1 {
            self.indents.pop();
            self.tokens
                .push(Token::synthetic(TokenKind::Outdent, self.cursor));
            top = self.current_indent();
        }
        if width != top {
            self.diagnostics.report(DiagnosticKind::InvalidOutdent, span);
            if width > top {
                self.indents.push(width);
            } else if let Some(last) = self.indents.last_mut() {
                *last = width;
            }
        }
    }

    fn current_indent(&self) -> usize {
        self.indents.last().copied().unwrap_or(0)
    }

    fn lex_comment(&mut self) {
        let start = self.pos;
        self.eat_while(|c| !matches!(c, '\r' | '\n'));
        self.finish(TokenKind::Comment, start, TokenPayload::None);
    }

    // ------------------------------------------------------------------
    // Words
    // ------------------------------------------------------------------

    fn lex_identifier(&mut self) {
        let source = self.source;
        let start = self.pos;
        self.eat_while(is_identifier_continue);
        let word = &source[start..self.pos];

        if is_string_prefix(word) && matches!(self.peek_char(), Some(c) if STRING_QUOTES.contains(&c)) {
            self.lex_string(start);
            return;
        }

        let kind = match KEYWORDS.get(word) {
            Some(&kind) => kind,
            None if self.options.is_custom_keyword(word) => TokenKind::CustomKeyword,
            None => TokenKind::Identifier,
        };
        self.finish(kind, start, TokenPayload::None);
    }

    fn lex_custom_keyword(&mut self) {
        let start = self.pos;
        self.pos += 1;
        match self.peek_char() {
            Some(c) if is_identifier_start(c) => {
                self.eat_while(is_identifier_continue);
                self.finish(TokenKind::CustomKeyword, start, TokenPayload::None);
            }
            _ => {
                let span = self.finish(TokenKind::Invalid, start, TokenPayload::None);
                self.diagnostics
                    .report(DiagnosticKind::UnexpectedCharacter { found: '@' }, span);
            }
        }
    }

    fn lex_symbol(&mut self) {
        let source = self.source;
        let start = self.pos;
        let mut scanner = Symbol::lexer(&source[start..]);
        match scanner.next() {
            Some(Ok(Symbol::Op(kind))) if scanner.span().start == 0 => {
                self.pos += scanner.span().end;
                self.track_bracket(kind);
                self.finish(kind, start, TokenPayload::None);
            }
            _ => {
                let found = self.peek_char().unwrap_or('\0');
                self.pos += found.len_utf8().max(1);
                let span = self.finish(TokenKind::Invalid, start, TokenPayload::None);
                self.diagnostics
                    .report(DiagnosticKind::UnexpectedCharacter { found }, span);
            }
        }
    }

    fn track_bracket(&mut self, kind: TokenKind) {
        if kind.is_open_bracket() {
            self.brackets.push(kind);
        } else if let Some(open) = kind
            .matching_bracket()
            .filter(|_| kind.is_close_bracket())
        {
            if let Some(index) = self.brackets.iter().rposition(|&k| k == open) {
                self.brackets.truncate(index);
            }
        }
    }

    // ------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------

    fn lex_number(&mut self) {
        let start = self.pos;
        let mut radix = 10;
        if self.byte_at(start) == Some(b'0') {
            radix = match self.byte_at(start + 1) {
                Some(b'x' | b'X') => 16,
                Some(b'o' | b'O') => 8,
                Some(b'b' | b'B') => 2,
                _ => 10,
            };
            if radix != 10 {
                self.pos += 2;
            }
        }

        let digits_start = self.pos;
        self.eat_while(|c| c == '_' || c.is_digit(radix));
        let mut float = false;
        if radix == 10 {
            if self.byte_at(self.pos) == Some(b'.')
                && self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit())
            {
                float = true;
                self.pos += 1;
                self.eat_while(|c| c == '_' || c.is_ascii_digit());
            }
            if matches!(self.byte_at(self.pos), Some(b'e' | b'E')) {
                let mut look = self.pos + 1;
                if matches!(self.byte_at(look), Some(b'+' | b'-')) {
                    look += 1;
                }
                if self.byte_at(look).is_some_and(|b| b.is_ascii_digit()) {
                    float = true;
                    self.pos = look;
                    self.eat_while(|c| c == '_' || c.is_ascii_digit());
                }
            }
        }
        let digits = self.source[digits_start..self.pos].replace('_', "");

        let mut problems = Vec::new();
        let mut options = NumberOptions {
            float,
            ..NumberOptions::default()
        };
        let mut seen = Vec::new();
        while let Some(postfix) = self.peek_char().filter(|c| "flLiIuUjJF".contains(*c)) {
            let lower = postfix.to_ascii_lowercase();
            self.pos += 1;
            let rate_start = self.pos;
            self.eat_while(|c| c.is_ascii_digit());
            let rate = &self.source[rate_start..self.pos];

            if seen.contains(&lower) {
                problems.push(DiagnosticKind::InvalidPostfix {
                    postfix: lower,
                    reason: "is duplicated",
                });
            }
            seen.push(lower);

            let rates: &[u16] = match lower {
                'f' => {
                    if radix != 10 {
                        problems.push(DiagnosticKind::InvalidPostfix {
                            postfix: lower,
                            reason: "cannot be used on a non-decimal literal",
                        });
                    }
                    if options.long || options.unsigned || options.bit_rate.is_some() {
                        problems.push(DiagnosticKind::InvalidPostfix {
                            postfix: lower,
                            reason: "cannot be combined with an integer postfix",
                        });
                    }
                    options.float = true;
                    &FLOAT_BIT_RATES[..]
                }
                'l' | 'i' | 'u' => {
                    if options.float {
                        problems.push(DiagnosticKind::InvalidPostfix {
                            postfix: lower,
                            reason: "cannot be used on a float literal",
                        });
                    }
                    match lower {
                        'l' => options.long = true,
                        'u' => options.unsigned = true,
                        _ if rate.is_empty() => problems.push(DiagnosticKind::InvalidPostfix {
                            postfix: lower,
                            reason: "requires a bit rate",
                        }),
                        _ => {}
                    }
                    if lower == 'l' {
                        NO_BIT_RATES
                    } else {
                        &INTEGER_BIT_RATES[..]
                    }
                }
                _ => {
                    options.complex = true;
                    NO_BIT_RATES
                }
            };

            if !rate.is_empty() {
                match rate.parse::<u16>() {
                    Ok(bits) if rates.contains(&bits) => options.bit_rate = Some(bits),
                    _ => problems.push(DiagnosticKind::InvalidBitRate {
                        postfix: lower,
                        bit_rate: rate.to_string(),
                    }),
                }
            }
        }

        if matches!(self.peek_char(), Some(c) if is_identifier_continue(c)) || digits.is_empty() {
            self.eat_while(is_identifier_continue);
            problems.push(DiagnosticKind::InvalidNumber {
                text: self.source[start..self.pos].to_string(),
            });
        }

        let value = if options.float && radix == 10 {
            match digits.parse::<f64>() {
                Ok(v) if v.is_finite() => NumberValue::Float(v),
                _ => {
                    problems.push(DiagnosticKind::NumberOverflow {
                        text: self.source[start..self.pos].to_string(),
                    });
                    NumberValue::Float(0.0)
                }
            }
        } else {
            let parsed = i128::from_str_radix(&digits, radix);
            if parsed.is_err() && !digits.is_empty() {
                problems.push(DiagnosticKind::NumberOverflow {
                    text: self.source[start..self.pos].to_string(),
                });
            }
            let v = parsed.unwrap_or(0);
            if options.float {
                NumberValue::Float(v as f64)
            } else {
                NumberValue::Int(v)
            }
        };

        let literal = NumberLiteral {
            radix,
            value,
            options,
        };
        let span = self.finish(TokenKind::Number, start, TokenPayload::Number(literal));
        for problem in problems {
            self.diagnostics.report(problem, span);
        }
    }

    // ------------------------------------------------------------------
    // Strings and characters
    // ------------------------------------------------------------------

    /// Scan a string literal whose prefix letters (possibly none) start at
    /// `start`; `self.pos` is on the opening quote.
    fn lex_string(&mut self, start: usize) {
        let prefix = self.source[start..self.pos].to_string();
        let mut options = StringOptions::new(self.peek_char().unwrap_or('"'));
        for (i, letter) in prefix.char_indices() {
            let lower = letter.to_ascii_lowercase();
            if prefix[..i].chars().any(|c| c.to_ascii_lowercase() == lower) {
                let at = self.position_at(start, start + i);
                self.diagnostics.report(
                    DiagnosticKind::DuplicatePrefix { prefix: lower },
                    Span::new(at, Position::new(at.line, at.column + 1)),
                );
            }
            match lower {
                'f' => options.formatted = true,
                _ => options.raw = true,
            }
        }

        let quote = options.quote;
        let triple: String = std::iter::repeat(quote).take(3).collect();
        if self.source[self.pos..].starts_with(&triple) {
            options.multiline = true;
            self.pos += 3;
        } else {
            self.pos += 1;
        }
        let closing = if options.multiline { &triple[..] } else { &triple[..1] };

        let body_start = self.pos;
        let mut value = String::new();
        let mut interpolations = Vec::new();
        let mut unclosed = true;
        let mut body_end = self.pos;

        while let Some(c) = self.peek_char() {
            if self.source[self.pos..].starts_with(closing) {
                body_end = self.pos;
                self.pos += closing.len();
                unclosed = false;
                break;
            }
            match c {
                '\r' | '\n' if !options.multiline => break,
                '\\' if !options.raw => self.scan_escape(start, options.multiline, &mut value),
                '{' if options.formatted => {
                    if self.byte_at(self.pos + 1) == Some(b'{') {
                        value.push('{');
                        self.pos += 2;
                    } else {
                        self.scan_interpolation(start, closing, options.multiline, &mut value, &mut interpolations);
                    }
                }
                '}' if options.formatted => {
                    if self.byte_at(self.pos + 1) == Some(b'}') {
                        value.push('}');
                        self.pos += 2;
                    } else {
                        let at = self.position_at(start, self.pos);
                        self.diagnostics.report(
                            DiagnosticKind::StrayInterpolationBrace,
                            Span::new(at, Position::new(at.line, at.column + 1)),
                        );
                        value.push('}');
                        self.pos += 1;
                    }
                }
                _ => {
                    value.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        if unclosed {
            body_end = self.pos;
        }

        let raw = self.source[body_start..body_end].to_string();
        for interpolation in &mut interpolations {
            let Interpolation { range, .. } = interpolation;
            *range = (range.start - body_start)..(range.end - body_start);
        }
        let literal = StringLiteral {
            options,
            prefix,
            value: if options.raw { raw.clone() } else { value },
            raw,
            interpolations,
            unclosed,
        };
        let span = self.finish(TokenKind::String, start, TokenPayload::String(literal));
        if unclosed {
            self.diagnostics
                .report(DiagnosticKind::UnterminatedString, span);
        }
    }

    /// Decode the escape at `self.pos` (a backslash) into `value`.
    fn scan_escape(&mut self, token_start: usize, multiline: bool, value: &mut String) {
        let escape_start = self.pos;
        self.pos += 1;
        match self.peek_char() {
            None => value.push('\\'),
            Some('\r' | '\n') if !multiline => {
                // The line break ends the literal; keep the backslash.
                value.push('\\');
            }
            Some('\r' | '\n') => {
                // Escaped line break inside a multiline literal.
                if self.source[self.pos..].starts_with("\r\n") {
                    self.pos += 2;
                } else {
                    self.pos += 1;
                }
            }
            Some(_) => {
                let (decoded, len) = decode_escape(&self.source[self.pos..]);
                self.pos += len;
                match decoded {
                    Some(c) => value.push(c),
                    None => {
                        let sequence = &self.source[escape_start..self.pos];
                        value.push_str(sequence);
                        let span = Span::new(
                            self.position_at(token_start, escape_start),
                            self.position_at(token_start, self.pos),
                        );
                        self.diagnostics.report(
                            DiagnosticKind::InvalidEscape {
                                sequence: sequence.to_string(),
                            },
                            span,
                        );
                    }
                }
            }
        }
    }

    /// Record the `{expr}` segment starting at `self.pos`. Byte ranges are
    /// absolute here and made relative to the body by the caller.
    fn scan_interpolation(
        &mut self,
        token_start: usize,
        closing: &str,
        multiline: bool,
        value: &mut String,
        interpolations: &mut Vec<Interpolation>,
    ) {
        let open = self.pos;
        let expr_start = open + 1;
        let mut depth = 1usize;
        let mut scan = expr_start;
        while let Some(c) = self.char_at(scan) {
            if self.source[scan..].starts_with(closing) || (!multiline && matches!(c, '\r' | '\n')) {
                break;
            }
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let span = Span::new(
                            self.position_at(token_start, expr_start),
                            self.position_at(token_start, scan),
                        );
                        interpolations.push(Interpolation {
                            range: expr_start..scan,
                            span,
                        });
                        value.push_str(&self.source[open..=scan]);
                        self.pos = scan + 1;
                        return;
                    }
                }
                _ => {}
            }
            scan += c.len_utf8();
        }

        let at = self.position_at(token_start, open);
        self.diagnostics.report(
            DiagnosticKind::UnclosedInterpolation,
            Span::new(at, Position::new(at.line, at.column + 1)),
        );
        value.push('{');
        self.pos = expr_start;
    }

    fn lex_character(&mut self) {
        let start = self.pos;
        self.pos += CHAR_QUOTE.len_utf8();
        let mut content = String::new();
        let mut closed = false;
        while let Some(c) = self.peek_char() {
            match c {
                '\r' | '\n' => break,
                c if c == CHAR_QUOTE => {
                    self.pos += c.len_utf8();
                    closed = true;
                    break;
                }
                '\\' => self.scan_escape(start, false, &mut content),
                _ => {
                    content.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        let mut chars = content.chars();
        let decoded = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        };
        let span = self.finish(
            TokenKind::Character,
            start,
            TokenPayload::Character(decoded),
        );
        let problem = if !closed {
            Some(DiagnosticKind::UnterminatedCharacter)
        } else if content.is_empty() {
            Some(DiagnosticKind::EmptyCharacter)
        } else if decoded.is_none() {
            Some(DiagnosticKind::MultiCharacter)
        } else {
            None
        };
        if let Some(problem) = problem {
            self.diagnostics.report(problem, span);
        }
    }
}

impl StringLiteral {
    /// Lex the `index`-th interpolated expression of a formatted string.
    ///
    /// Token spans and diagnostics are positioned in the enclosing source.
    pub fn lex_interpolation(
        &self,
        index: usize,
        options: &SyntaxOptions,
    ) -> Option<(Vec<Token>, Diagnostics)> {
        let interpolation = self.interpolations.get(index)?;
        let text = self.raw.get(interpolation.range.clone())?;
        let origin = interpolation.span.start;
        let (mut tokens, diagnostics) = lex(text, options);
        for token in &mut tokens {
            token.span = token.span.shifted(origin);
        }
        let mut shifted = Diagnostics::new();
        shifted.extend_shifted(diagnostics, origin);
        Some((tokens, shifted))
    }
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c)
}

fn is_identifier_continue(c: char) -> bool {
    UnicodeXID::is_xid_continue(c)
}

fn is_string_prefix(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| matches!(c, 'f' | 'F' | 'r' | 'R'))
}

/// Decode the escape body in `rest` (the text after a backslash).
///
/// Returns the decoded character, or `None` for an invalid escape, and
/// the number of bytes the escape occupies.
fn decode_escape(rest: &str) -> (Option<char>, usize) {
    let Some(first) = rest.chars().next() else {
        return (None, 0);
    };
    if let Some(decoded) = escape_sequence(first) {
        return (Some(decoded), first.len_utf8());
    }
    match first {
        'x' => {
            let hex: String = rest[1..]
                .chars()
                .take(2)
                .take_while(char::is_ascii_hexdigit)
                .collect();
            let len = 1 + hex.len();
            if hex.len() == 2 {
                let decoded = u8::from_str_radix(&hex, 16).ok().map(char::from);
                (decoded, len)
            } else {
                (None, len)
            }
        }
        'u' if rest[1..].starts_with('{') => {
            let hex: String = rest[2..]
                .chars()
                .take(6)
                .take_while(char::is_ascii_hexdigit)
                .collect();
            let closed = rest[2 + hex.len()..].starts_with('}');
            let len = 2 + hex.len() + closed as usize;
            if !closed || hex.is_empty() {
                return (None, len);
            }
            let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
            (decoded, len)
        }
        'u' => {
            let hex: String = rest[1..]
                .chars()
                .take(4)
                .take_while(char::is_ascii_hexdigit)
                .collect();
            let len = 1 + hex.len();
            if hex.len() == 4 {
                let decoded = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32);
                (decoded, len)
            } else {
                (None, len)
            }
        }
        other => (None, other.len_utf8()),
    }
}
