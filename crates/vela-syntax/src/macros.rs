//! Macro pattern matching
//!
//! A `macro` definition's syntax pattern is compiled from its pattern
//! nodes into a [`MacroPattern`], which then recognizes concrete token runs
//! such as the tokens captured by a `@keyword` application.
//!
//! Matching is ordered and greedy: the first alternative that matches
//! wins, repetitions take as many rounds as they can, and neither is
//! revisited when a later element fails. Placeholders are matched by
//! running the parser on the remaining tokens; the tokens it consumed
//! without reporting an error are the placeholder's capture.

use std::ops::Range;

use thiserror::Error;

use crate::ast::{Ast, NodeId, NodeKind, PlaceholderType};
use crate::options::SyntaxOptions;
use crate::parser::expr::{parse_expression, parse_infix, parse_postfix};
use crate::parser::stmt::parse_block;
use crate::parser::types::parse_type_name;
use crate::parser::Parser;
use crate::span::Span;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacroError {
    #[error("node {0} is not a macro definition")]
    NotAMacro(NodeId),

    #[error("macro pattern has an invalid element at {0}")]
    InvalidPattern(Span),
}

/// A compiled pattern element.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternNode {
    Sequence(Vec<PatternNode>),
    /// Ordered alternatives
    Choice(Vec<PatternNode>),
    /// A token matched by kind and spelling
    Literal(Token),
    Placeholder {
        name: Option<String>,
        ty: PlaceholderType,
    },
    Optional(Box<PatternNode>),
    /// Zero or more
    Repeat(Box<PatternNode>),
}

impl PatternNode {
    fn compile(ast: &Ast, id: NodeId) -> Result<Self, MacroError> {
        let compile_all = |ids: &crate::ast::NodeList| {
            ids.iter()
                .map(|item| Self::compile(ast, item))
                .collect::<Result<Vec<_>, _>>()
        };

        match ast.kind(id) {
            NodeKind::CascadePattern { items } => Ok(PatternNode::Sequence(compile_all(items)?)),
            NodeKind::OrPattern { alternatives } => Ok(PatternNode::Choice(compile_all(alternatives)?)),
            NodeKind::TokenPattern { token } => Ok(PatternNode::Literal(token.clone())),
            NodeKind::TypePattern { name, ty } => Ok(PatternNode::Placeholder {
                name: name.clone(),
                ty: *ty,
            }),
            NodeKind::OptionalPattern { pattern } => {
                Ok(PatternNode::Optional(Box::new(Self::compile(ast, *pattern)?)))
            }
            NodeKind::RepeatPattern { pattern } => {
                Ok(PatternNode::Repeat(Box::new(Self::compile(ast, *pattern)?)))
            }
            _ => Err(MacroError::InvalidPattern(ast.span(id))),
        }
    }
}

/// The syntax of one macro, ready for matching.
#[derive(Debug, Clone)]
pub struct MacroPattern {
    name: String,
    root: PatternNode,
    options: SyntaxOptions,
}

impl MacroPattern {
    /// Compile the pattern of the `Macro` node `macro_node`.
    pub fn compile(ast: &Ast, macro_node: NodeId) -> Result<Self, MacroError> {
        let NodeKind::Macro { name, syntax, .. } = ast.kind(macro_node) else {
            return Err(MacroError::NotAMacro(macro_node));
        };
        Ok(Self {
            name: name.clone(),
            root: PatternNode::compile(ast, *syntax)?,
            options: SyntaxOptions::default(),
        })
    }

    /// Options for the placeholder sub-parses.
    pub fn with_options(mut self, options: SyntaxOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &PatternNode {
        &self.root
    }

    /// Match a whole token run. Trivia is ignored, as are trailing line
    /// breaks, `;` and `End`.
    pub fn match_tokens(&self, tokens: &[Token]) -> Option<MacroMatch> {
        let mut tokens: Vec<Token> = tokens
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .cloned()
            .collect();
        while tokens.last().is_some_and(|t| {
            matches!(t.kind, TokenKind::Newline | TokenKind::Semicolon | TokenKind::End)
        }) {
            tokens.pop();
        }

        let mut captures = Vec::new();
        let end = self.match_node(&self.root, &tokens, 0, &mut captures)?;
        if end != tokens.len() {
            tracing::trace!(macro_name = %self.name, end, len = tokens.len(), "macro pattern matched a prefix only");
            return None;
        }
        Some(MacroMatch { tokens, captures })
    }

    /// Match the tokens of a `MacroApplication` node naming this macro.
    pub fn match_application(&self, ast: &Ast, application: NodeId) -> Option<MacroMatch> {
        match ast.kind(application) {
            NodeKind::MacroApplication { name, tokens } if *name == self.name => {
                self.match_tokens(tokens)
            }
            _ => None,
        }
    }

    fn match_node(
        &self,
        node: &PatternNode,
        tokens: &[Token],
        pos: usize,
        captures: &mut Vec<(String, Range<usize>)>,
    ) -> Option<usize> {
        match node {
            PatternNode::Sequence(items) => {
                let mark = captures.len();
                let mut pos = pos;
                for item in items {
                    match self.match_node(item, tokens, pos, captures) {
                        Some(next) => pos = next,
                        None => {
                            captures.truncate(mark);
                            return None;
                        }
                    }
                }
                Some(pos)
            }

            PatternNode::Choice(alternatives) => alternatives.iter().find_map(|alternative| {
                let mark = captures.len();
                let result = self.match_node(alternative, tokens, pos, captures);
                if result.is_none() {
                    captures.truncate(mark);
                }
                result
            }),

            PatternNode::Literal(expected) => tokens
                .get(pos)
                .filter(|token| token.same_word(expected))
                .map(|_| pos + 1),

            PatternNode::Placeholder { name, ty } => {
                let length = self.placeholder_length(*ty, &tokens[pos.min(tokens.len())..])?;
                if let Some(name) = name {
                    captures.push((name.clone(), pos..pos + length));
                }
                Some(pos + length)
            }

            PatternNode::Optional(inner) => {
                let mark = captures.len();
                match self.match_node(inner, tokens, pos, captures) {
                    Some(next) => Some(next),
                    None => {
                        captures.truncate(mark);
                        Some(pos)
                    }
                }
            }

            PatternNode::Repeat(inner) => {
                let mut pos = pos;
                loop {
                    let mark = captures.len();
                    match self.match_node(inner, tokens, pos, captures) {
                        Some(next) if next > pos => pos = next,
                        _ => {
                            captures.truncate(mark);
                            return Some(pos);
                        }
                    }
                }
            }
        }
    }

    /// Number of leading tokens a placeholder of type `ty` takes, if any.
    fn placeholder_length(&self, ty: PlaceholderType, tokens: &[Token]) -> Option<usize> {
        let first = tokens.first()?;
        match ty {
            PlaceholderType::Name => return (first.kind == TokenKind::Identifier).then_some(1),
            PlaceholderType::Number => return (first.kind == TokenKind::Number).then_some(1),
            PlaceholderType::String => return (first.kind == TokenKind::String).then_some(1),
            _ => {}
        }

        let end = tokens.last().map_or(first.span.end, |t| t.span.end);
        let mut input = tokens.to_vec();
        input.push(Token::synthetic(TokenKind::End, end));

        let mut parser = Parser::new(&input, &self.options);
        let id = match ty {
            PlaceholderType::Expr => parse_expression(&mut parser),
            PlaceholderType::Infix => parse_infix(&mut parser),
            PlaceholderType::Atom => parse_postfix(&mut parser),
            PlaceholderType::Type => parse_type_name(&mut parser),
            PlaceholderType::Scope => parse_block(&mut parser, Vec::new()),
            PlaceholderType::Name | PlaceholderType::Number | PlaceholderType::String => {
                return None
            }
        };
        let consumed = parser.stream.position().min(tokens.len());
        let (ast, diagnostics) = parser.into_parts();

        if consumed == 0 || diagnostics.has_errors() || ast.kind(id).is_error() {
            return None;
        }
        Some(consumed)
    }
}

/// Result of a successful match: the matched tokens and the range of each
/// named placeholder's capture within them.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroMatch {
    tokens: Vec<Token>,
    captures: Vec<(String, Range<usize>)>,
}

impl MacroMatch {
    /// The tokens the pattern was matched against, trivia removed.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens of the first capture named `name`.
    pub fn get(&self, name: &str) -> Option<&[Token]> {
        self.range(name).map(|range| &self.tokens[range])
    }

    pub fn range(&self, name: &str) -> Option<Range<usize>> {
        self.captures
            .iter()
            .find(|(capture, _)| capture == name)
            .map(|(_, range)| range.clone())
    }

    /// Every capture named `name`, in match order. Placeholders inside
    /// repetitions capture once per round.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a [Token]> + 'a {
        self.captures
            .iter()
            .filter(move |(capture, _)| capture == name)
            .map(|(_, range)| &self.tokens[range.clone()])
    }

    pub fn captures(&self) -> &[(String, Range<usize>)] {
        &self.captures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn compile(source: &str) -> MacroPattern {
        let options = SyntaxOptions::default();
        let (tokens, _) = lex(source, &options);
        let (ast, diagnostics) = parse(&tokens, &options);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        let root = ast.root().unwrap();
        MacroPattern::compile(&ast, ast.children(root)[0]).unwrap()
    }

    fn words(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.value.as_str()).collect()
    }

    #[test]
    fn test_infix_placeholder_stops_at_literal() {
        let pattern = compile("macro guard (cond: Infix, \"do\", body: Expr)\n    pass\n");
        let (tokens, _) = lex("x > 1 do y + 2\n", &SyntaxOptions::default());
        let matched = pattern.match_tokens(&tokens).unwrap();
        assert_eq!(words(matched.get("cond").unwrap()), vec!["x", ">", "1"]);
        assert_eq!(words(matched.get("body").unwrap()), vec!["y", "+", "2"]);
    }

    #[test]
    fn test_requires_full_match() {
        let pattern = compile("macro m (a: Name, \"is\", b: Name)\n    pass\n");
        let options = SyntaxOptions::default();
        assert!(pattern.match_tokens(&lex("x is y", &options).0).is_some());
        assert!(pattern.match_tokens(&lex("x is y z", &options).0).is_none());
        assert!(pattern.match_tokens(&lex("x was y", &options).0).is_none());
    }

    #[test]
    fn test_optional_and_repeat() {
        let pattern = compile("macro m (n: Name, [\"=\", v: Number], {\",\", rest: Name})\n    pass\n");
        let options = SyntaxOptions::default();

        let matched = pattern.match_tokens(&lex("a = 1, b, c", &options).0).unwrap();
        assert_eq!(words(matched.get("v").unwrap()), vec!["1"]);
        let rest: Vec<_> = matched.all("rest").map(words).collect();
        assert_eq!(rest, vec![vec!["b"], vec!["c"]]);

        let matched = pattern.match_tokens(&lex("a", &options).0).unwrap();
        assert!(matched.get("v").is_none());
    }

    #[test]
    fn test_ordered_alternatives() {
        let pattern = compile("macro m (\"up\", n: Number | \"down\", n: Name)\n    pass\n");
        let options = SyntaxOptions::default();
        assert!(pattern.match_tokens(&lex("up 3", &options).0).is_some());
        assert!(pattern.match_tokens(&lex("down x", &options).0).is_some());
        assert!(pattern.match_tokens(&lex("down 3", &options).0).is_none());
    }

    #[test]
    fn test_not_a_macro() {
        let options = SyntaxOptions::default();
        let (tokens, _) = lex("x = 1\n", &options);
        let (ast, _) = parse(&tokens, &options);
        let item = ast.children(ast.root().unwrap())[0];
        assert_eq!(MacroPattern::compile(&ast, item).unwrap_err(), MacroError::NotAMacro(item));
    }
}
