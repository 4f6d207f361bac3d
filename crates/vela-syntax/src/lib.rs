//! Vela Language Front End
//!
//! This crate turns Vela source text into a positioned syntax tree:
//! - **Lexer**: lossless tokens with layout (`lexer` module)
//! - **Parser**: recursive descent with precedence climbing (`parser` module)
//! - **AST**: arena of nodes with parent links (`ast` module)
//! - **Macros**: matching token runs against macro syntax patterns (`macros` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use vela_syntax::SourceUnit;
//!
//! let unit = SourceUnit::from_code("x = a + b * c\n");
//! let parsed = unit.parse();
//! assert!(parsed.is_usable());
//! println!("{}", parsed.ast.to_source(parsed.root().unwrap()));
//! ```

#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod macros;
pub mod options;
pub mod parser;
pub mod printer;
pub mod span;
pub mod stream;
pub mod token;
pub mod unit;

// ============================================================================
// Re-exports
// ============================================================================

pub use ast::{Ast, NodeId, NodeKind, NodeList, Slot, Visitor};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, JsonDiagnostic, Severity};
pub use lexer::lex;
pub use macros::{MacroError, MacroMatch, MacroPattern, PatternNode};
pub use options::{OptionsError, SyntaxOptions};
pub use parser::parse;
pub use printer::tokens_to_source;
pub use span::{LineIndex, Position, Span};
pub use token::{Token, TokenKind};
pub use unit::{LexedUnit, ParsedUnit, SourceError, SourceUnit};
