//! Source units
//!
//! A [`SourceUnit`] owns one piece of source text together with a label
//! naming where it came from and the options it is read with. It is the
//! entry point for lexing and parsing a whole file or snippet.

use std::io;
use std::path::{Path, PathBuf};

use termcolor::WriteColor;
use thiserror::Error;
use tracing::instrument;

use crate::ast::{Ast, NodeId};
use crate::diagnostics::Diagnostics;
use crate::lexer::lex;
use crate::options::SyntaxOptions;
use crate::parser::parse;
use crate::token::Token;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Source text with its origin and syntax options.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    origin: String,
    text: String,
    options: SyntaxOptions,
}

impl SourceUnit {
    /// A unit for a snippet of code.
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            origin: "<code>".to_string(),
            text: code.into(),
            options: SyntaxOptions::default(),
        }
    }

    /// A unit for lines of code, joined with `\n`.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = lines
            .into_iter()
            .map(|line| line.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_code(text)
    }

    /// A unit for the contents of a file; the path is its origin.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            origin: path.display().to_string(),
            text,
            options: SyntaxOptions::default(),
        })
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_options(mut self, options: SyntaxOptions) -> Self {
        self.options = options;
        self
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &SyntaxOptions {
        &self.options
    }

    pub fn lex(&self) -> LexedUnit {
        let (tokens, diagnostics) = lex(&self.text, &self.options);
        LexedUnit {
            tokens,
            diagnostics,
        }
    }

    /// Lex and parse the unit. Lexer diagnostics come first.
    #[instrument(skip(self), fields(origin = %self.origin))]
    pub fn parse(&self) -> ParsedUnit {
        let LexedUnit {
            tokens,
            mut diagnostics,
        } = self.lex();
        let (ast, parse_diagnostics) = parse(&tokens, &self.options);
        diagnostics.extend(parse_diagnostics);
        ParsedUnit {
            tokens,
            ast,
            diagnostics,
        }
    }

    /// Render `diagnostics` against this unit's text.
    pub fn emit(&self, diagnostics: &Diagnostics, writer: &mut dyn WriteColor) -> io::Result<()> {
        diagnostics
            .emit(writer, &self.origin, &self.text)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct LexedUnit {
    pub tokens: Vec<Token>,
    pub diagnostics: Diagnostics,
}

impl LexedUnit {
    /// The exact source text the tokens were lexed from.
    pub fn to_source(&self) -> String {
        crate::printer::tokens_to_source(&self.tokens)
    }
}

#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub tokens: Vec<Token>,
    pub ast: Ast,
    pub diagnostics: Diagnostics,
}

impl ParsedUnit {
    /// True when no error was reported; warnings are allowed.
    pub fn is_usable(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.ast.root()
    }
}
