//! Token definitions for the Vela programming language.
//!
//! This module defines every token kind that can appear in Vela source
//! code, the extra data carried by string, number and operator tokens,
//! and the read-only specification tables (keywords, operators) used by
//! the lexer and for reverse lookup of a token's textual form.

use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::span::{Position, Span};

/// The kind of a token, without its text or location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Keywords
    Await,
    Break,
    Class,
    Continue,
    Elif,
    Else,
    Enum,
    False,
    Fn,
    For,
    If,
    Import,
    Let,
    Macro,
    Module,
    New,
    Nil,
    Pass,
    Return,
    True,
    Unless,
    While,
    Yield,
    /// Macro-introduced keyword: `@name` or a registered custom keyword
    CustomKeyword,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,

    // Symbol operators
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,
    Ampersand,
    Pipe,
    Caret,
    Tilde,
    DoubleLeftAngle,
    DoubleRightAngle,
    LeftAngle,
    RightAngle,
    LeftAngleEquals,
    RightAngleEquals,
    DoubleEquals,
    ExclamationEquals,
    LeftRightArrow,
    DoublePlus,
    DoubleMinus,
    DoubleQuestion,
    DoubleDot,
    TripleDot,
    PipeRightAngle,

    // Assignment
    Equals,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    DoubleSlashEquals,
    PercentEquals,
    DoubleStarEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,
    DoubleLeftAngleEquals,
    DoubleRightAngleEquals,
    DoubleQuestionEquals,

    // Punctuation
    Dot,
    Comma,
    Colon,
    Semicolon,
    Question,
    RightArrow,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,

    // Literals
    Identifier,
    Comment,
    Character,
    String,
    Number,

    // Layout and special
    Whitespace,
    Newline,
    Indent,
    Outdent,
    End,
    Invalid,
}

impl TokenKind {
    /// Fixed source text of this kind, if it has one.
    pub fn text(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Await => "await",
            Break => "break",
            Class => "class",
            Continue => "continue",
            Elif => "elif",
            Else => "else",
            Enum => "enum",
            False => "false",
            Fn => "fn",
            For => "for",
            If => "if",
            Import => "import",
            Let => "let",
            Macro => "macro",
            Module => "module",
            New => "new",
            Nil => "nil",
            Pass => "pass",
            Return => "return",
            True => "true",
            Unless => "unless",
            While => "while",
            Yield => "yield",
            And => "and",
            Or => "or",
            Not => "not",
            In => "in",
            Is => "is",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            DoubleSlash => "//",
            Percent => "%",
            DoubleStar => "**",
            Ampersand => "&",
            Pipe => "|",
            Caret => "^",
            Tilde => "~",
            DoubleLeftAngle => "<<",
            DoubleRightAngle => ">>",
            LeftAngle => "<",
            RightAngle => ">",
            LeftAngleEquals => "<=",
            RightAngleEquals => ">=",
            DoubleEquals => "==",
            ExclamationEquals => "!=",
            LeftRightArrow => "<=>",
            DoublePlus => "++",
            DoubleMinus => "--",
            DoubleQuestion => "??",
            DoubleDot => "..",
            TripleDot => "...",
            PipeRightAngle => "|>",
            Equals => "=",
            PlusEquals => "+=",
            MinusEquals => "-=",
            StarEquals => "*=",
            SlashEquals => "/=",
            DoubleSlashEquals => "//=",
            PercentEquals => "%=",
            DoubleStarEquals => "**=",
            AmpersandEquals => "&=",
            PipeEquals => "|=",
            CaretEquals => "^=",
            DoubleLeftAngleEquals => "<<=",
            DoubleRightAngleEquals => ">>=",
            DoubleQuestionEquals => "??=",
            Dot => ".",
            Comma => ",",
            Colon => ":",
            Semicolon => ";",
            Question => "?",
            RightArrow => "->",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            OpenBrace => "{",
            CloseBrace => "}",
            CustomKeyword | Identifier | Comment | Character | String | Number | Whitespace
            | Newline | Indent | Outdent | End | Invalid => return None,
        };
        Some(text)
    }

    /// Human-readable name used in diagnostics ("expected X, got Y").
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            CustomKeyword => "custom keyword",
            Identifier => "identifier",
            Comment => "comment",
            Character => "character literal",
            String => "string literal",
            Number => "number literal",
            Whitespace => "whitespace",
            Newline => "line break",
            Indent => "indentation",
            Outdent => "end of indented block",
            End => "end of input",
            Invalid => "invalid token",
            other => other.text().unwrap_or("token"),
        }
    }

    /// Returns true for keyword kinds (including custom keywords).
    pub fn is_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            Await
                | Break
                | Class
                | Continue
                | Elif
                | Else
                | Enum
                | False
                | Fn
                | For
                | If
                | Import
                | Let
                | Macro
                | Module
                | New
                | Nil
                | Pass
                | Return
                | True
                | Unless
                | While
                | Yield
                | CustomKeyword
        )
    }

    /// Returns true for kinds that can start a constant expression.
    pub fn is_literal(self) -> bool {
        use TokenKind::*;
        matches!(self, Character | String | Number | True | False | Nil)
    }

    /// Returns true for compound assignment operators (`+=`, `??=`, ...).
    pub fn is_augmented_assign(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            PlusEquals
                | MinusEquals
                | StarEquals
                | SlashEquals
                | DoubleSlashEquals
                | PercentEquals
                | DoubleStarEquals
                | AmpersandEquals
                | PipeEquals
                | CaretEquals
                | DoubleLeftAngleEquals
                | DoubleRightAngleEquals
                | DoubleQuestionEquals
        )
    }

    /// Layout tokens produced by the lexer rather than written by the user.
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Outdent
        )
    }

    /// Tokens the parser never sees.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Comment | TokenKind::Whitespace)
    }

    pub fn is_open_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::OpenParen | TokenKind::OpenBracket | TokenKind::OpenBrace
        )
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::CloseParen | TokenKind::CloseBracket | TokenKind::CloseBrace
        )
    }

    /// The bracket that pairs with this one.
    pub fn matching_bracket(self) -> Option<TokenKind> {
        use TokenKind::*;
        match self {
            OpenParen => Some(CloseParen),
            OpenBracket => Some(CloseBracket),
            OpenBrace => Some(CloseBrace),
            CloseParen => Some(OpenParen),
            CloseBracket => Some(OpenBracket),
            CloseBrace => Some(OpenBrace),
            _ => None,
        }
    }

    /// Operator metadata for operator kinds.
    pub fn operator_info(self) -> Option<OperatorInfo> {
        use Associativity::{Left, Right};
        use InputSide::{Infix, Postfix, Prefix};
        use TokenKind::*;

        const INFIX: &[InputSide] = &[Infix];
        const PREFIX: &[InputSide] = &[Prefix];
        const PREFIX_INFIX: &[InputSide] = &[Prefix, Infix];
        const PREFIX_POSTFIX: &[InputSide] = &[Prefix, Postfix];

        let (precedence, associativity, sides) = match self {
            DoubleStar => (Precedence::Power, Right, INFIX),
            Star | Slash | DoubleSlash | Percent => (Precedence::Multiplicative, Left, INFIX),
            Plus | Minus => (Precedence::Additive, Left, PREFIX_INFIX),
            DoubleLeftAngle | DoubleRightAngle => (Precedence::Shift, Left, INFIX),
            Ampersand => (Precedence::BitAnd, Left, INFIX),
            Caret => (Precedence::BitXor, Left, INFIX),
            Pipe => (Precedence::BitOr, Left, INFIX),
            DoubleDot | TripleDot => (Precedence::Range, Left, INFIX),
            DoubleQuestion => (Precedence::Coalesce, Left, INFIX),
            LeftAngle | RightAngle | LeftAngleEquals | RightAngleEquals | DoubleEquals
            | ExclamationEquals | LeftRightArrow | In | Is => {
                (Precedence::Comparison, Right, INFIX)
            }
            Not => (Precedence::Not, Right, PREFIX),
            And => (Precedence::And, Left, INFIX),
            Or => (Precedence::Or, Left, INFIX),
            Tilde => (Precedence::Unary, Right, PREFIX),
            DoublePlus | DoubleMinus => (Precedence::Unary, Right, PREFIX_POSTFIX),
            PipeRightAngle => (Precedence::Postfix, Left, INFIX),
            Equals | PlusEquals | MinusEquals | StarEquals | SlashEquals | DoubleSlashEquals
            | PercentEquals | DoubleStarEquals | AmpersandEquals | PipeEquals | CaretEquals
            | DoubleLeftAngleEquals | DoubleRightAngleEquals | DoubleQuestionEquals => {
                (Precedence::Assignment, Right, INFIX)
            }
            _ => return None,
        };
        Some(OperatorInfo {
            precedence,
            associativity,
            sides,
        })
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "'{}'", text),
            None => f.write_str(self.describe()),
        }
    }
}

/// Operator binding strength (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Precedence {
    None = 0,
    Assignment = 1,     // =, +=, ...
    Ternary = 2,        // if / unless
    Or = 3,             // or
    And = 4,            // and
    Not = 5,            // not
    Comparison = 6,     // < > <= >= == != <=> in is
    Coalesce = 7,       // ??
    Range = 8,          // .. ...
    BitOr = 9,          // |
    BitXor = 10,        // ^
    BitAnd = 11,        // &
    Shift = 12,         // << >>
    Additive = 13,      // + -
    Multiplicative = 14, // * / // %
    Power = 15,         // **
    Unary = 16,         // prefix - + ~ ++ --
    Postfix = 17,       // |> and postfix ++ --
}

impl Precedence {
    /// The next tighter level, used as the minimum for a right operand.
    pub fn next(self) -> u8 {
        self as u8 + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Associativity {
    Left,
    Right,
}

/// Where an operator's operand sits relative to the operator symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputSide {
    /// `-x`, `++x`
    Prefix,
    /// `x++`
    Postfix,
    /// `x + y`
    Infix,
}

/// Static properties of an operator token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperatorInfo {
    pub precedence: Precedence,
    pub associativity: Associativity,
    /// Positions in which the symbol may be used.
    pub sides: &'static [InputSide],
}

impl OperatorInfo {
    pub fn allows(&self, side: InputSide) -> bool {
        self.sides.contains(&side)
    }
}

/// Reserved words, looked up after an identifier has been scanned.
pub static KEYWORDS: Lazy<FxHashMap<&'static str, TokenKind>> = Lazy::new(|| {
    use TokenKind::*;
    [
        Await, Break, Class, Continue, Elif, Else, Enum, False, Fn, For, If, Import, Let, Macro,
        Module, New, Nil, Pass, Return, True, Unless, While, Yield, And, Or, Not, In, Is,
    ]
    .into_iter()
    .filter_map(|kind| kind.text().map(|text| (text, kind)))
    .collect()
});

/// Characters that may open a string literal.
pub const STRING_QUOTES: [char; 2] = ['"', '\''];

/// Character literal delimiter.
pub const CHAR_QUOTE: char = '`';

/// Bit rates accepted after an `i`/`u` number postfix.
pub const INTEGER_BIT_RATES: [u16; 4] = [8, 16, 32, 64];

/// Bit rates accepted after an `f` number postfix.
pub const FLOAT_BIT_RATES: [u16; 3] = [32, 64, 128];

/// Decoded value of a single-character escape, `\n` -> `'\n'`.
pub fn escape_sequence(c: char) -> Option<char> {
    let decoded = match c {
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        'f' => '\u{c}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\u{b}',
        '\\' => '\\',
        '\'' => '\'',
        '"' => '"',
        '`' => '`',
        _ => return None,
    };
    Some(decoded)
}

/// A lexical unit: kind, exact source text, location and trailing whitespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source text of the token.
    pub value: String,
    pub span: Span,
    /// Whitespace that follows the token (may contain line breaks
    /// inside brackets).
    pub whitespace: String,
    #[serde(skip_serializing_if = "TokenPayload::is_none")]
    pub payload: TokenPayload,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
            whitespace: String::new(),
            payload: TokenPayload::None,
        }
    }

    /// A zero-width token, used for layout and end-of-input markers.
    pub fn synthetic(kind: TokenKind, pos: Position) -> Self {
        Self::new(kind, "", Span::point(pos))
    }

    pub fn with_payload(mut self, payload: TokenPayload) -> Self {
        self.payload = payload;
        self
    }

    #[inline]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    #[inline]
    pub fn is_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.kind)
    }

    /// The token as it appeared in the source, with trailing whitespace.
    pub fn to_source(&self) -> String {
        let mut out = String::with_capacity(self.value.len() + self.whitespace.len());
        out.push_str(&self.value);
        out.push_str(&self.whitespace);
        out
    }

    /// Name of a custom keyword without its `@` marker.
    pub fn keyword_name(&self) -> &str {
        self.value.trim_start_matches('@')
    }

    /// True if two tokens spell the same word, treating `@name` custom
    /// keywords and plain identifiers as interchangeable.
    pub fn same_word(&self, other: &Token) -> bool {
        let word = |t: &Token| matches!(t.kind, TokenKind::Identifier | TokenKind::CustomKeyword);
        if word(self) && word(other) {
            self.keyword_name() == other.keyword_name()
        } else {
            self.kind == other.kind && self.value == other.value
        }
    }

    pub fn operator(&self) -> Option<OperatorInfo> {
        match &self.payload {
            TokenPayload::Operator(info) => Some(*info),
            _ => self.kind.operator_info(),
        }
    }

    pub fn string(&self) -> Option<&StringLiteral> {
        match &self.payload {
            TokenPayload::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<&NumberLiteral> {
        match &self.payload {
            TokenPayload::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn character(&self) -> Option<char> {
        match self.payload {
            TokenPayload::Character(c) => c,
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier | TokenKind::Number | TokenKind::CustomKeyword => {
                write!(f, "{} '{}'", self.kind.describe(), self.value)
            }
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Kind-specific token data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenPayload {
    None,
    String(StringLiteral),
    Number(NumberLiteral),
    /// `None` for a malformed character literal.
    Character(Option<char>),
    Operator(OperatorInfo),
}

impl TokenPayload {
    pub fn is_none(&self) -> bool {
        matches!(self, TokenPayload::None)
    }
}

/// Quote style and prefixes of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StringOptions {
    pub quote: char,
    /// Delimited by a tripled quote.
    pub multiline: bool,
    /// `r` prefix: escapes are not decoded.
    pub raw: bool,
    /// `f` prefix: `{expr}` segments are interpolated.
    pub formatted: bool,
}

impl StringOptions {
    pub fn new(quote: char) -> Self {
        Self {
            quote,
            multiline: false,
            raw: false,
            formatted: false,
        }
    }

    pub fn quotes_count(&self) -> u32 {
        if self.multiline {
            3
        } else {
            1
        }
    }
}

/// A `{expr}` segment inside a formatted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interpolation {
    /// Byte range of the expression text inside [`StringLiteral::raw`].
    pub range: std::ops::Range<usize>,
    /// Location of the expression text in the source.
    pub span: Span,
}

/// Data of a string token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringLiteral {
    pub options: StringOptions,
    /// Prefix letters exactly as written (`f`, `rF`, ...).
    pub prefix: String,
    /// Text between the quotes, exactly as written.
    pub raw: String,
    /// Text with escapes decoded (equal to `raw` for raw strings).
    pub value: String,
    pub interpolations: Vec<Interpolation>,
    /// No closing quote; `raw` then runs to the end of the line (or of
    /// the input, for multiline literals).
    pub unclosed: bool,
}

impl StringLiteral {
    /// End position of a literal that starts at `start`.
    ///
    /// One physical line: start column + raw length + quotes on both
    /// sides (one side when unclosed) + one column per prefix letter.
    /// Several lines: length of the last line + closing quotes (none
    /// when unclosed), on start line + line count - 1.
    pub fn end_position(&self, start: Position) -> Position {
        let lines = split_physical_lines(&self.raw);
        let quotes = self.options.quotes_count();
        let last_len = lines.last().map(|l| l.chars().count()).unwrap_or(0) as u32;
        if lines.len() <= 1 {
            let sides = if self.unclosed { 1 } else { 2 };
            Position::new(
                start.line,
                start.column + last_len + quotes * sides + self.prefix.chars().count() as u32,
            )
        } else {
            let closing = if self.unclosed { 0 } else { quotes };
            Position::new(start.line + (lines.len() as u32 - 1), last_len + closing)
        }
    }

    /// Source text of the literal (prefixes, quotes and raw body).
    pub fn to_source(&self) -> String {
        let quotes: String = std::iter::repeat(self.options.quote)
            .take(self.options.quotes_count() as usize)
            .collect();
        let mut out = String::new();
        out.push_str(&self.prefix);
        out.push_str(&quotes);
        out.push_str(&self.raw);
        if !self.unclosed {
            out.push_str(&quotes);
        }
        out
    }

    /// Text of the `index`-th interpolated expression.
    pub fn interpolation_text(&self, index: usize) -> Option<&str> {
        self.interpolations
            .get(index)
            .and_then(|i| self.raw.get(i.range.clone()))
    }
}

/// Splits on `\r\n`, `\n` or `\r` without dropping a trailing empty line.
fn split_physical_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);
    lines
}

/// Numeric value of a number token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum NumberValue {
    Int(i128),
    Float(f64),
}

/// Postfix-derived properties of a number literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NumberOptions {
    pub float: bool,
    pub long: bool,
    pub unsigned: bool,
    pub complex: bool,
    /// Explicit bit rate from an `i`/`u`/`f` postfix.
    pub bit_rate: Option<u16>,
}

/// Data of a number token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberLiteral {
    pub radix: u32,
    pub value: NumberValue,
    pub options: NumberOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(raw: &str, multiline: bool, unclosed: bool, prefixes: (bool, bool)) -> StringLiteral {
        let mut prefix = String::new();
        if prefixes.0 {
            prefix.push('f');
        }
        if prefixes.1 {
            prefix.push('r');
        }
        StringLiteral {
            options: StringOptions {
                quote: '"',
                multiline,
                formatted: prefixes.0,
                raw: prefixes.1,
            },
            prefix,
            raw: raw.to_string(),
            value: raw.to_string(),
            interpolations: Vec::new(),
            unclosed,
        }
    }

    #[test]
    fn test_single_line_end_position() {
        let s = literal("abc", false, false, (false, false));
        assert_eq!(s.end_position(Position::new(0, 0)), Position::new(0, 5));
    }

    #[test]
    fn test_prefixed_end_position() {
        let s = literal("abc", false, false, (true, true));
        assert_eq!(s.end_position(Position::new(3, 4)), Position::new(3, 11));
    }

    #[test]
    fn test_unclosed_end_position() {
        let s = literal("abc", false, true, (false, false));
        assert_eq!(s.end_position(Position::new(0, 0)), Position::new(0, 4));
    }

    #[test]
    fn test_multiline_end_position() {
        let s = literal("first\nlast", true, false, (false, false));
        assert_eq!(s.end_position(Position::new(2, 8)), Position::new(3, 7));

        let open = literal("first\r\nlast", true, true, (false, false));
        assert_eq!(open.end_position(Position::new(2, 8)), Position::new(3, 4));
    }

    #[test]
    fn test_keyword_table_reverse_lookup() {
        for (text, kind) in KEYWORDS.iter() {
            assert_eq!(kind.text(), Some(*text));
        }
        assert_eq!(KEYWORDS.get("unless"), Some(&TokenKind::Unless));
        assert!(KEYWORDS.get("do").is_none());
    }

    #[test]
    fn test_operator_info() {
        let power = TokenKind::DoubleStar.operator_info().unwrap();
        assert_eq!(power.associativity, Associativity::Right);
        let plus = TokenKind::Plus.operator_info().unwrap();
        assert!(plus.allows(InputSide::Prefix) && plus.allows(InputSide::Infix));
        let inc = TokenKind::DoublePlus.operator_info().unwrap();
        assert!(inc.allows(InputSide::Postfix) && !inc.allows(InputSide::Infix));
        assert!(TokenKind::Comma.operator_info().is_none());
        assert!(power.precedence > plus.precedence);
    }

    #[test]
    fn test_matching_brackets() {
        assert_eq!(
            TokenKind::OpenParen.matching_bracket(),
            Some(TokenKind::CloseParen)
        );
        assert_eq!(
            TokenKind::CloseBrace.matching_bracket(),
            Some(TokenKind::OpenBrace)
        );
        assert_eq!(TokenKind::Dot.matching_bracket(), None);
    }
}
