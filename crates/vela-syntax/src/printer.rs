//! Canonical source printing.
//!
//! [`Ast::to_source`] prints a subtree as normalized Vela source: single
//! spaces around binary operators, four-space block indentation, and
//! parentheses only where precedence requires them. Re-parsing the output
//! yields a tree of the same shape. [`tokens_to_source`] reproduces the
//! exact text of a token run instead.

use crate::ast::*;
use crate::parser::precedence::{binary_precedence, node_precedence};
use crate::token::{Associativity, InputSide, Precedence, Token};

const INDENT: &str = "    ";

/// Tighter than any operator: atoms and trailers only.
const ATOM: u8 = Precedence::Postfix as u8 + 1;

/// The exact source text of `tokens`, trailing whitespace included.
pub fn tokens_to_source(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_source).collect()
}

impl Ast {
    /// Print the subtree rooted at `id` as canonical source.
    pub fn to_source(&self, id: NodeId) -> String {
        let mut printer = Printer {
            ast: self,
            out: String::new(),
            indent: 0,
        };
        match self.kind(id) {
            NodeKind::Scope { items, .. } => {
                for item in items.iter() {
                    printer.statement(item);
                }
            }
            kind if is_statement(kind) => printer.statement(id),
            kind if is_pattern(kind) => return printer.pattern(id, false),
            _ => return printer.expr(id, 0),
        }
        printer.out
    }
}

fn is_statement(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::VarDef { .. }
            | NodeKind::Assign { .. }
            | NodeKind::AugAssign { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::For { .. }
            | NodeKind::Return { .. }
            | NodeKind::Import { .. }
            | NodeKind::Pass
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Module { .. }
            | NodeKind::Class { .. }
            | NodeKind::Enum { .. }
            | NodeKind::Function { .. }
            | NodeKind::Macro { .. }
            | NodeKind::MacroApplication { .. }
    )
}

fn is_pattern(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::CascadePattern { .. }
            | NodeKind::OrPattern { .. }
            | NodeKind::TokenPattern { .. }
            | NodeKind::TypePattern { .. }
            | NodeKind::OptionalPattern { .. }
            | NodeKind::RepeatPattern { .. }
    )
}

struct Printer<'a> {
    ast: &'a Ast,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `header` followed by the statements of `scope`, indented. An empty
    /// block prints as `{}`.
    fn block(&mut self, header: String, scope: NodeId) {
        let ast = self.ast;
        let items = match ast.kind(scope) {
            NodeKind::Scope { items, .. } => items.as_slice(),
            _ => std::slice::from_ref(&scope),
        };
        if items.is_empty() {
            self.line(&format!("{} {{}}", header));
            return;
        }
        self.line(&header);
        self.indent += 1;
        for &item in items {
            self.statement(item);
        }
        self.indent -= 1;
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, id: NodeId) {
        let ast = self.ast;
        match ast.kind(id) {
            NodeKind::Scope { items, .. } => {
                for item in items.iter() {
                    self.statement(item);
                }
            }
            NodeKind::VarDef {
                target,
                type_name,
                value,
                immutable,
            } => {
                let mut text = String::new();
                if *immutable {
                    text.push_str("let ");
                }
                text.push_str(&self.expr(*target, 0));
                if let Some(type_name) = type_name {
                    text.push_str(": ");
                    text.push_str(&self.expr(*type_name, 0));
                }
                if let Some(value) = value {
                    text.push_str(" = ");
                    text.push_str(&self.expr(*value, 0));
                }
                self.line(&text);
            }
            NodeKind::Assign { targets, value } => {
                let mut parts: Vec<String> = targets.iter().map(|t| self.expr(t, 0)).collect();
                parts.push(self.expr(*value, 0));
                self.line(&parts.join(" = "));
            }
            NodeKind::AugAssign { op, target, value } => {
                let text = format!(
                    "{} {}= {}",
                    self.expr(*target, 0),
                    op.symbol(),
                    self.expr(*value, 0)
                );
                self.line(&text);
            }
            NodeKind::If { .. } => self.if_chain(id, "if"),
            NodeKind::While {
                condition,
                block,
                no_break,
            } => {
                let header = format!("while {}", self.expr(*condition, 0));
                self.block(header, *block);
                if let Some(no_break) = no_break {
                    self.block("else".to_string(), *no_break);
                }
            }
            NodeKind::For {
                target,
                iterable,
                block,
                no_break,
            } => {
                let header = format!(
                    "for {} in {}",
                    self.expr(*target, 0),
                    self.expr(*iterable, 0)
                );
                self.block(header, *block);
                if let Some(no_break) = no_break {
                    self.block("else".to_string(), *no_break);
                }
            }
            NodeKind::Return { value } => match value {
                Some(value) => {
                    let text = format!("return {}", self.expr(*value, 0));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            NodeKind::Break { label } => self.line(&labelled("break", label)),
            NodeKind::Continue { label } => self.line(&labelled("continue", label)),
            NodeKind::Pass => self.line("pass"),
            NodeKind::Import { path, alias } => {
                let mut text = format!("import {}", path.join("."));
                if let Some(alias) = alias {
                    text.push_str(" as ");
                    text.push_str(alias);
                }
                self.line(&text);
            }
            NodeKind::Module { name, block } => self.block(format!("module {}", name), *block),
            NodeKind::Class { name, bases, block } => {
                let header = format!("class {}{}", name, self.bases(bases));
                self.block(header, *block);
            }
            NodeKind::Enum { name, bases, items } => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| match ast.kind(item) {
                        NodeKind::EnumItem {
                            name,
                            value: Some(value),
                        } => format!("{} = {}", name, self.expr(*value, 0)),
                        NodeKind::EnumItem { name, value: None } => name.clone(),
                        _ => self.expr(item, 0),
                    })
                    .collect();
                let text = format!("enum {}{} {{ {} }}", name, self.bases(bases), items.join(", "));
                self.line(&text);
            }
            NodeKind::Function {
                name,
                params,
                return_type,
                block,
            } => {
                let params: Vec<String> = params.iter().map(|p| self.parameter(p)).collect();
                let mut header = format!("fn {}({})", name, params.join(", "));
                if let Some(return_type) = return_type {
                    header.push_str(" -> ");
                    header.push_str(&self.expr(*return_type, 0));
                }
                self.block(header, *block);
            }
            NodeKind::Macro {
                name,
                syntax,
                block,
            } => {
                let header = format!("macro {} ({})", name, self.pattern(*syntax, false));
                self.block(header, *block);
            }
            NodeKind::MacroApplication { name, tokens } => {
                let text = format!("@{} {}", name, tokens_to_source(tokens));
                self.line(text.trim_end());
            }
            _ => {
                let text = self.expr(id, 0);
                self.line(&text);
            }
        }
    }

    /// `if`/`elif`/`else` chains; an `If` in `else_block` prints as `elif`.
    fn if_chain(&mut self, id: NodeId, keyword: &str) {
        let ast = self.ast;
        let NodeKind::If {
            condition,
            then_block,
            else_block,
        } = ast.kind(id)
        else {
            return;
        };
        let header = format!("{} {}", keyword, self.expr(*condition, 0));
        self.block(header, *then_block);
        match else_block {
            Some(other) if matches!(ast.kind(*other), NodeKind::If { .. }) => {
                self.if_chain(*other, "elif")
            }
            Some(other) => self.block("else".to_string(), *other),
            None => {}
        }
    }

    fn bases(&self, bases: &NodeList) -> String {
        if bases.is_empty() {
            return String::new();
        }
        format!("({})", self.list(bases, 0))
    }

    fn parameter(&self, id: NodeId) -> String {
        let NodeKind::Parameter {
            name,
            type_name,
            default,
        } = self.ast.kind(id)
        else {
            return self.expr(id, 0);
        };
        let mut text = name.clone();
        if let Some(type_name) = type_name {
            text.push_str(": ");
            text.push_str(&self.expr(*type_name, 0));
        }
        if let Some(default) = default {
            text.push_str(" = ");
            text.push_str(&self.expr(*default, Precedence::Ternary as u8));
        }
        text
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn list(&self, items: &NodeList, min: u8) -> String {
        items
            .iter()
            .map(|item| self.expr(item, min))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Print `id`, parenthesized if it binds looser than `min`.
    ///
    /// Left operands and trailer targets are walked in a loop, so chains of
    /// any length print without deep recursion.
    fn expr(&self, id: NodeId, min: u8) -> String {
        let mut spine = Vec::new();
        let mut current = (id, min);
        while let Some(next) = self.left_operand(current.0) {
            spine.push(current);
            current = next;
        }

        let (leaf, leaf_min) = current;
        let leaf = self.ast.kind(leaf);
        let mut text = parenthesize(self.expr_text(leaf), leaf, leaf_min);
        for (node, node_min) in spine.into_iter().rev() {
            let kind = self.ast.kind(node);
            self.append_operation(&mut text, kind);
            text = parenthesize(text, kind, node_min);
        }
        text
    }

    /// The operand printed first in a binary operation or a trailer, with
    /// the precedence it must be printed at.
    fn left_operand(&self, id: NodeId) -> Option<(NodeId, u8)> {
        match self.ast.kind(id) {
            NodeKind::Binary { op, left, .. } => Some((*left, operand_levels(*op).0)),
            NodeKind::Unary {
                side: InputSide::Postfix,
                operand,
                ..
            } => Some((*operand, ATOM)),
            NodeKind::Member { target, .. }
            | NodeKind::Call { target, .. }
            | NodeKind::Index { target, .. } => Some((*target, ATOM)),
            _ => None,
        }
    }

    /// Append the rest of `kind` after its already printed left operand.
    fn append_operation(&self, text: &mut String, kind: &NodeKind) {
        let item = Precedence::Ternary as u8;
        match kind {
            NodeKind::Binary { op, right, .. } => {
                text.push(' ');
                text.push_str(op.symbol());
                text.push(' ');
                text.push_str(&self.expr(*right, operand_levels(*op).1));
            }
            NodeKind::Unary { op, .. } => text.push_str(op.symbol()),
            NodeKind::Member { member, .. } => {
                text.push('.');
                text.push_str(member);
            }
            NodeKind::Call { args, .. } => {
                text.push('(');
                text.push_str(&self.list(args, item));
                text.push(')');
            }
            NodeKind::Index { index, .. } => {
                let index = match self.ast.kind(*index) {
                    NodeKind::Tuple { items } if items.len() > 1 => self.list(items, item),
                    _ => self.expr(*index, item),
                };
                text.push('[');
                text.push_str(&index);
                text.push(']');
            }
            _ => {}
        }
    }

    fn expr_text(&self, kind: &NodeKind) -> String {
        let item = Precedence::Ternary as u8;
        match kind {
            NodeKind::Name { name } => name.clone(),
            NodeKind::Constant { token }
            | NodeKind::FormattedString { token, .. }
            | NodeKind::Error { token } => token.value.clone(),

            NodeKind::Unary {
                op: UnaryOperator::Not,
                operand,
                ..
            } => format!("not {}", self.expr(*operand, Precedence::Comparison as u8)),
            NodeKind::Unary { op, operand, .. } => {
                let operand = self.expr(*operand, Precedence::Unary as u8);
                // `- -x` must not print as `--x`
                let symbol = op.symbol();
                if operand.starts_with(['+', '-']) || symbol.ends_with(|c: char| c.is_alphabetic()) {
                    format!("{} {}", symbol, operand)
                } else {
                    format!("{}{}", symbol, operand)
                }
            }
            NodeKind::Ternary {
                condition,
                then_branch,
                else_branch,
                inverted,
            } => {
                let (keyword, value, other) = if *inverted {
                    ("unless", else_branch, then_branch)
                } else {
                    ("if", then_branch, else_branch)
                };
                let or = Precedence::Or as u8;
                let mut text = format!(
                    "{} {} {}",
                    value.map(|v| self.expr(v, or)).unwrap_or_default(),
                    keyword,
                    self.expr(*condition, or)
                );
                if let Some(other) = other {
                    text.push_str(" else ");
                    text.push_str(&self.expr(*other, item));
                }
                text
            }
            NodeKind::Await { value } => format!("await {}", self.expr(*value, ATOM)),
            NodeKind::Yield { value, from } => {
                let mut text = String::from("yield");
                if *from {
                    text.push_str(" from");
                }
                if let Some(value) = value {
                    text.push(' ');
                    text.push_str(&self.expr(*value, 0));
                }
                text
            }

            NodeKind::Argument { name, value } => match name {
                Some(name) => format!("{} = {}", name, self.expr(*value, item)),
                None => self.expr(*value, item),
            },
            NodeKind::Slice { start, stop, step } => {
                let part = |id: &Option<NodeId>| id.map(|id| self.expr(id, item)).unwrap_or_default();
                let mut text = format!("{}:{}", part(start), part(stop));
                if step.is_some() {
                    text.push(':');
                    text.push_str(&part(step));
                }
                text
            }

            NodeKind::Tuple { items } => match items.len() {
                0 => "()".to_string(),
                1 => format!("{},", self.list(items, item)),
                _ => self.list(items, item),
            },
            NodeKind::Parenthesized { value } => format!("({})", self.expr(*value, 0)),
            NodeKind::List { items } => format!("[{}]", self.list(items, item)),
            NodeKind::Hash { items, .. } => format!("{{{}}}", self.list(items, item)),
            NodeKind::Pair { key, value } => {
                format!("{}: {}", self.expr(*key, item), self.expr(*value, item))
            }
            NodeKind::Comprehension {
                item: value,
                target,
                iterable,
                condition,
            } => {
                let or = Precedence::Or as u8;
                let mut text = format!(
                    "{} for {} in {}",
                    self.expr(*value, item),
                    self.expr(*target, 0),
                    self.expr(*iterable, or)
                );
                if let Some(condition) = condition {
                    text.push_str(" if ");
                    text.push_str(&self.expr(*condition, or));
                }
                text
            }
            NodeKind::Generator { comprehension } => format!("({})", self.expr(*comprehension, 0)),
            NodeKind::New { type_name, args } => {
                format!("new {}({})", self.expr(*type_name, 0), self.list(args, item))
            }
            NodeKind::TypeName {
                name,
                args,
                optional,
            } => {
                let mut text = name.clone();
                if !args.is_empty() {
                    text.push('[');
                    text.push_str(&self.list(args, 0));
                    text.push(']');
                }
                if *optional {
                    text.push('?');
                }
                text
            }
            NodeKind::EnumItem { name, .. } | NodeKind::Parameter { name, .. } => name.clone(),
            _ => String::new(),
        }
    }

    // ========================================================================
    // Macro patterns
    // ========================================================================

    /// Print a pattern element. `nested` is set for elements of a cascade,
    /// where alternatives and groups need their parentheses back.
    fn pattern(&self, id: NodeId, nested: bool) -> String {
        match self.ast.kind(id) {
            NodeKind::CascadePattern { items } => {
                let text = items
                    .iter()
                    .map(|item| self.pattern(item, true))
                    .collect::<Vec<_>>()
                    .join(", ");
                if nested {
                    format!("({})", text)
                } else {
                    text
                }
            }
            NodeKind::OrPattern { alternatives } => {
                let text = alternatives
                    .iter()
                    .map(|alternative| self.pattern(alternative, false))
                    .collect::<Vec<_>>()
                    .join(" | ");
                if nested {
                    format!("({})", text)
                } else {
                    text
                }
            }
            NodeKind::TokenPattern { token } => {
                format!("\"{}\"", token.value.replace('\\', "\\\\").replace('"', "\\\""))
            }
            NodeKind::TypePattern { name: Some(name), ty } => format!("{}: {}", name, ty.name()),
            NodeKind::TypePattern { name: None, ty } => ty.name().to_string(),
            NodeKind::OptionalPattern { pattern } => format!("[{}]", self.pattern(*pattern, false)),
            NodeKind::RepeatPattern { pattern } => format!("{{{}}}", self.pattern(*pattern, false)),
            NodeKind::Error { token } => token.value.clone(),
            _ => String::new(),
        }
    }
}

/// Minimum levels of the left and right operands of `op`.
fn operand_levels(op: BinaryOperator) -> (u8, u8) {
    let (precedence, associativity) = binary_precedence(op);
    let level = precedence as u8;
    match associativity {
        Associativity::Left => (level, level + 1),
        Associativity::Right => (level + 1, level),
    }
}

fn parenthesize(text: String, kind: &NodeKind, min: u8) -> String {
    if node_precedence(kind) < min {
        format!("({})", text)
    } else {
        text
    }
}

fn labelled(keyword: &str, label: &Option<String>) -> String {
    match label {
        Some(label) => format!("{} {}", keyword, label),
        None => keyword.to_string(),
    }
}
