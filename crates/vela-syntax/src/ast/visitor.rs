//! Visitor for walking an [`Ast`] arena.
//!
//! [`Visitor::visit_node`] dispatches on the node kind to the matching
//! `visit_*` hook. Every hook defaults to [`walk_children`], so an
//! implementation only overrides the kinds it cares about.
//!
//! # Example
//!
//! ```rust
//! use vela_syntax::ast::*;
//!
//! struct CountNames {
//!     count: usize,
//! }
//!
//! impl Visitor for CountNames {
//!     fn visit_name(&mut self, _ast: &Ast, _id: NodeId, _name: &str) {
//!         self.count += 1;
//!     }
//! }
//! ```

use super::*;

/// AST visitor trait
///
/// Hooks receive the arena and the node handle so they can look at
/// spans, parents and bindings as well as the node itself.
pub trait Visitor: Sized {
    fn visit_node(&mut self, ast: &Ast, id: NodeId) {
        walk_node(self, ast, id);
    }

    fn visit_scope(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_name(&mut self, _ast: &Ast, _id: NodeId, _name: &str) {}

    fn visit_constant(&mut self, _ast: &Ast, _id: NodeId, _token: &Token) {}

    fn visit_error(&mut self, _ast: &Ast, _id: NodeId) {}

    fn visit_unary(&mut self, ast: &Ast, id: NodeId, _op: UnaryOperator) {
        walk_children(self, ast, id);
    }

    fn visit_binary(&mut self, ast: &Ast, id: NodeId, _op: BinaryOperator) {
        walk_children(self, ast, id);
    }

    fn visit_call(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_definition(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_macro_application(&mut self, _ast: &Ast, _id: NodeId, _name: &str, _tokens: &[Token]) {}

    fn visit_pattern(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }

    fn visit_other(&mut self, ast: &Ast, id: NodeId) {
        walk_children(self, ast, id);
    }
}

/// Dispatch `id` to the visitor hook for its kind.
pub fn walk_node<V: Visitor>(visitor: &mut V, ast: &Ast, id: NodeId) {
    match ast.kind(id) {
        NodeKind::Scope { .. } => visitor.visit_scope(ast, id),
        NodeKind::Name { name } => visitor.visit_name(ast, id, name),
        NodeKind::Constant { token } => visitor.visit_constant(ast, id, token),
        NodeKind::Error { .. } => visitor.visit_error(ast, id),
        NodeKind::Unary { op, .. } => visitor.visit_unary(ast, id, *op),
        NodeKind::Binary { op, .. } => visitor.visit_binary(ast, id, *op),
        NodeKind::Call { .. } | NodeKind::New { .. } => visitor.visit_call(ast, id),
        NodeKind::Function { .. }
        | NodeKind::Class { .. }
        | NodeKind::Module { .. }
        | NodeKind::Enum { .. }
        | NodeKind::Macro { .. }
        | NodeKind::VarDef { .. } => visitor.visit_definition(ast, id),
        NodeKind::MacroApplication { name, tokens } => {
            visitor.visit_macro_application(ast, id, name, tokens)
        }
        NodeKind::CascadePattern { .. }
        | NodeKind::OrPattern { .. }
        | NodeKind::TokenPattern { .. }
        | NodeKind::TypePattern { .. }
        | NodeKind::OptionalPattern { .. }
        | NodeKind::RepeatPattern { .. } => visitor.visit_pattern(ast, id),
        _ => visitor.visit_other(ast, id),
    }
}

/// Visit every child of `id` in source order.
pub fn walk_children<V: Visitor>(visitor: &mut V, ast: &Ast, id: NodeId) {
    for child in ast.children(id) {
        visitor.visit_node(ast, child);
    }
}
