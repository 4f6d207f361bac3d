//! Abstract syntax tree for Vela.
//!
//! Nodes live in an arena ([`Ast`]) and refer to each other through
//! [`NodeId`] handles. Every node records its parent (a non-owning
//! back-reference) and the [`Slot`] it occupies in that parent, so a node
//! can be found, walked upward from, or replaced in place without owning
//! pointers in both directions.
//!
//! Parent links are bound when a node is allocated: [`Ast::alloc`] walks
//! the children of the new node and points each of them at it. Children
//! are therefore always allocated before their parent.

pub mod visitor;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::span::Span;
use crate::token::{InputSide, Token};

pub use visitor::{walk_node, Visitor};

/// Handle of a node in an [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a node sits inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    /// Not attached to a parent.
    Root,
    /// A single-child field such as `left` or `condition`.
    Field(&'static str),
    /// Element `index` of the list field `list`.
    Item { list: &'static str, index: usize },
}

/// Ordered children of a node.
///
/// Lists are filled when their owner is built and afterwards only changed
/// through [`Ast::insert_item`] / [`Ast::remove_item`], which keep every
/// element's [`Slot`] index current.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeList {
    items: Vec<NodeId>,
}

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.items.get(index).copied()
    }

    pub fn first(&self) -> Option<NodeId> {
        self.items.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.items.last().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator + '_ {
        self.items.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.items
    }
}

impl From<Vec<NodeId>> for NodeList {
    fn from(items: Vec<NodeId>) -> Self {
        Self { items }
    }
}

impl FromIterator<NodeId> for NodeList {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOperator {
    Plus,       // +x
    Minus,      // -x
    BitwiseNot, // ~x
    Not,        // not x
    Increment,  // ++x, x++
    Decrement,  // --x, x--
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Not => "not",
            UnaryOperator::Increment => "++",
            UnaryOperator::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOperator {
    // Arithmetic
    Add,         // +
    Subtract,    // -
    Multiply,    // *
    Divide,      // /
    FloorDivide, // //
    Modulo,      // %
    Power,       // **

    // Bitwise
    BitwiseAnd, // &
    BitwiseOr,  // |
    BitwiseXor, // ^
    LeftShift,  // <<
    RightShift, // >>

    // Comparison
    Less,         // <
    Greater,      // >
    LessEqual,    // <=
    GreaterEqual, // >=
    Equal,        // ==
    NotEqual,     // !=
    Compare,      // <=>
    In,           // in
    NotIn,        // not in
    Is,           // is
    IsNot,        // is not

    // Other
    Coalesce,       // ??
    RangeInclusive, // ..
    RangeExclusive, // ...
    And,            // and
    Or,             // or
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        use BinaryOperator::*;
        match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            FloorDivide => "//",
            Modulo => "%",
            Power => "**",
            BitwiseAnd => "&",
            BitwiseOr => "|",
            BitwiseXor => "^",
            LeftShift => "<<",
            RightShift => ">>",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            Equal => "==",
            NotEqual => "!=",
            Compare => "<=>",
            In => "in",
            NotIn => "not in",
            Is => "is",
            IsNot => "is not",
            Coalesce => "??",
            RangeInclusive => "..",
            RangeExclusive => "...",
            And => "and",
            Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashKind {
    Map,
    Set,
}

/// What a macro pattern placeholder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlaceholderType {
    /// A full expression, ternaries included
    Expr,
    /// An operator expression without ternary
    Infix,
    /// A primary expression with its trailers
    Atom,
    /// A single identifier
    Name,
    /// A block
    Scope,
    /// A type name
    Type,
    /// A number literal
    Number,
    /// A string literal
    String,
}

impl PlaceholderType {
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name {
            "Expr" => PlaceholderType::Expr,
            "Infix" => PlaceholderType::Infix,
            "Atom" => PlaceholderType::Atom,
            "Name" => PlaceholderType::Name,
            "Scope" => PlaceholderType::Scope,
            "Type" => PlaceholderType::Type,
            "Number" => PlaceholderType::Number,
            "String" => PlaceholderType::String,
            _ => return None,
        };
        Some(ty)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlaceholderType::Expr => "Expr",
            PlaceholderType::Infix => "Infix",
            PlaceholderType::Atom => "Atom",
            PlaceholderType::Name => "Name",
            PlaceholderType::Scope => "Scope",
            PlaceholderType::Type => "Type",
            PlaceholderType::Number => "Number",
            PlaceholderType::String => "String",
        }
    }
}

/// The syntactic construct a node represents, with its children.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    // Atoms
    Name {
        name: String,
    },
    /// Number, string, character, `true`, `false` or `nil`
    Constant {
        token: Token,
    },
    /// `f"..."` with its interpolated expressions parsed
    FormattedString {
        token: Token,
        values: NodeList,
    },
    /// Placeholder for a construct that failed to parse
    Error {
        token: Token,
    },
    Pass,
    Break {
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Yield {
        value: Option<NodeId>,
        from: bool,
    },
    Await {
        value: NodeId,
    },

    // Operations
    Unary {
        op: UnaryOperator,
        side: InputSide,
        operand: NodeId,
    },
    Binary {
        op: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    /// `a if cond else b`; for `b unless cond else a` the branches are
    /// stored swapped and `inverted` is set.
    Ternary {
        condition: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
        inverted: bool,
    },

    // Trailers
    Member {
        target: NodeId,
        member: String,
    },
    Call {
        target: NodeId,
        args: NodeList,
    },
    /// Call argument, optionally named (`f(x = 1)`)
    Argument {
        name: Option<String>,
        value: NodeId,
    },
    Index {
        target: NodeId,
        index: NodeId,
    },
    Slice {
        start: Option<NodeId>,
        stop: Option<NodeId>,
        step: Option<NodeId>,
    },

    // Collections
    Tuple {
        items: NodeList,
    },
    Parenthesized {
        value: NodeId,
    },
    List {
        items: NodeList,
    },
    Hash {
        kind: HashKind,
        items: NodeList,
    },
    Pair {
        key: NodeId,
        value: NodeId,
    },
    /// `item for target in iterable [if condition]`
    Comprehension {
        item: NodeId,
        target: NodeId,
        iterable: NodeId,
        condition: Option<NodeId>,
    },
    /// Parenthesised comprehension
    Generator {
        comprehension: NodeId,
    },
    New {
        type_name: NodeId,
        args: NodeList,
    },

    // Statements
    VarDef {
        target: NodeId,
        type_name: Option<NodeId>,
        value: Option<NodeId>,
        immutable: bool,
    },
    Assign {
        targets: NodeList,
        value: NodeId,
    },
    AugAssign {
        op: BinaryOperator,
        target: NodeId,
        value: NodeId,
    },
    /// `elif` chains nest as an `If` in `else_block`.
    If {
        condition: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    },
    While {
        condition: NodeId,
        block: NodeId,
        /// Runs when the loop ends without `break`.
        no_break: Option<NodeId>,
    },
    For {
        target: NodeId,
        iterable: NodeId,
        block: NodeId,
        no_break: Option<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Import {
        path: Vec<String>,
        alias: Option<String>,
    },

    // Definitions
    TypeName {
        name: String,
        args: NodeList,
        optional: bool,
    },
    Module {
        name: String,
        block: NodeId,
    },
    Class {
        name: String,
        bases: NodeList,
        block: NodeId,
    },
    Enum {
        name: String,
        bases: NodeList,
        items: NodeList,
    },
    EnumItem {
        name: String,
        value: Option<NodeId>,
    },
    Function {
        name: String,
        params: NodeList,
        return_type: Option<NodeId>,
        block: NodeId,
    },
    Parameter {
        name: String,
        type_name: Option<NodeId>,
        default: Option<NodeId>,
    },
    Macro {
        name: String,
        syntax: NodeId,
        block: NodeId,
    },
    /// `@name ...`: raw tokens up to the end of the statement
    MacroApplication {
        name: String,
        tokens: Vec<Token>,
    },

    // Structure
    Scope {
        items: NodeList,
        bindings: BTreeMap<String, NodeId>,
    },

    // Macro syntax patterns
    CascadePattern {
        items: NodeList,
    },
    OrPattern {
        alternatives: NodeList,
    },
    TokenPattern {
        token: Token,
    },
    TypePattern {
        name: Option<String>,
        ty: PlaceholderType,
    },
    OptionalPattern {
        pattern: NodeId,
    },
    RepeatPattern {
        pattern: NodeId,
    },
}

/// Expands to a match over every child of a node. `$iter` and `$opt`
/// select shared (`iter`, `as_ref`) or mutable (`iter_mut`, `as_mut`)
/// access; the match arms are identical otherwise.
macro_rules! for_each_child {
    ($kind:expr, $f:ident, $iter:ident, $opt:ident) => {{
        macro_rules! field {
            ($name:literal, $id:expr) => {
                $f(Slot::Field($name), $id)
            };
        }
        macro_rules! optional {
            ($name:literal, $id:expr) => {
                if let Some(id) = $id.$opt() {
                    $f(Slot::Field($name), id)
                }
            };
        }
        macro_rules! list {
            ($name:literal, $list:expr) => {
                for (index, id) in $list.items.$iter().enumerate() {
                    $f(Slot::Item { list: $name, index }, id)
                }
            };
        }

        match $kind {
            NodeKind::Name { .. }
            | NodeKind::Constant { .. }
            | NodeKind::Error { .. }
            | NodeKind::Pass
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Import { .. }
            | NodeKind::MacroApplication { .. }
            | NodeKind::TokenPattern { .. }
            | NodeKind::TypePattern { .. } => {}
            NodeKind::FormattedString { values, .. } => list!("values", values),
            NodeKind::Yield { value, .. } => optional!("value", value),
            NodeKind::Await { value } => field!("value", value),
            NodeKind::Unary { operand, .. } => field!("operand", operand),
            NodeKind::Binary { left, right, .. } => {
                field!("left", left);
                field!("right", right);
            }
            NodeKind::Ternary {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                optional!("then_branch", then_branch);
                field!("condition", condition);
                optional!("else_branch", else_branch);
            }
            NodeKind::Member { target, .. } => field!("target", target),
            NodeKind::Call { target, args } => {
                field!("target", target);
                list!("args", args);
            }
            NodeKind::Argument { value, .. } => field!("value", value),
            NodeKind::Index { target, index } => {
                field!("target", target);
                field!("index", index);
            }
            NodeKind::Slice { start, stop, step } => {
                optional!("start", start);
                optional!("stop", stop);
                optional!("step", step);
            }
            NodeKind::Tuple { items } | NodeKind::List { items } | NodeKind::Hash { items, .. } => {
                list!("items", items)
            }
            NodeKind::Parenthesized { value } => field!("value", value),
            NodeKind::Pair { key, value } => {
                field!("key", key);
                field!("value", value);
            }
            NodeKind::Comprehension {
                item,
                target,
                iterable,
                condition,
            } => {
                field!("item", item);
                field!("target", target);
                field!("iterable", iterable);
                optional!("condition", condition);
            }
            NodeKind::Generator { comprehension } => field!("comprehension", comprehension),
            NodeKind::New { type_name, args } => {
                field!("type_name", type_name);
                list!("args", args);
            }
            NodeKind::VarDef {
                target,
                type_name,
                value,
                ..
            } => {
                field!("target", target);
                optional!("type_name", type_name);
                optional!("value", value);
            }
            NodeKind::Assign { targets, value } => {
                list!("targets", targets);
                field!("value", value);
            }
            NodeKind::AugAssign { target, value, .. } => {
                field!("target", target);
                field!("value", value);
            }
            NodeKind::If {
                condition,
                then_block,
                else_block,
            } => {
                field!("condition", condition);
                field!("then_block", then_block);
                optional!("else_block", else_block);
            }
            NodeKind::While {
                condition,
                block,
                no_break,
            } => {
                field!("condition", condition);
                field!("block", block);
                optional!("no_break", no_break);
            }
            NodeKind::For {
                target,
                iterable,
                block,
                no_break,
            } => {
                field!("target", target);
                field!("iterable", iterable);
                field!("block", block);
                optional!("no_break", no_break);
            }
            NodeKind::Return { value } => optional!("value", value),
            NodeKind::TypeName { args, .. } => list!("args", args),
            NodeKind::Module { block, .. } => field!("block", block),
            NodeKind::Class { bases, block, .. } => {
                list!("bases", bases);
                field!("block", block);
            }
            NodeKind::Enum { bases, items, .. } => {
                list!("bases", bases);
                list!("items", items);
            }
            NodeKind::EnumItem { value, .. } => optional!("value", value),
            NodeKind::Function {
                params,
                return_type,
                block,
                ..
            } => {
                list!("params", params);
                optional!("return_type", return_type);
                field!("block", block);
            }
            NodeKind::Parameter {
                type_name, default, ..
            } => {
                optional!("type_name", type_name);
                optional!("default", default);
            }
            NodeKind::Macro { syntax, block, .. } => {
                field!("syntax", syntax);
                field!("block", block);
            }
            NodeKind::Scope { items, .. } => list!("items", items),
            NodeKind::CascadePattern { items } => list!("items", items),
            NodeKind::OrPattern { alternatives } => list!("alternatives", alternatives),
            NodeKind::OptionalPattern { pattern } | NodeKind::RepeatPattern { pattern } => {
                field!("pattern", pattern)
            }
        }
    }};
}

impl NodeKind {
    /// Calls `f` for every child, in source order.
    pub fn for_each_child(&self, mut f: impl FnMut(Slot, NodeId)) {
        let mut visit = |slot: Slot, id: &NodeId| f(slot, *id);
        for_each_child!(self, visit, iter, as_ref)
    }

    pub fn for_each_child_mut(&mut self, mut f: impl FnMut(Slot, &mut NodeId)) {
        for_each_child!(self, f, iter_mut, as_mut)
    }

    pub fn children(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        self.for_each_child(|_, id| children.push(id));
        children
    }

    /// The list field called `name`, if this kind has one.
    fn list_mut(&mut self, name: &str) -> Option<&mut NodeList> {
        let list = match self {
            NodeKind::FormattedString { values, .. } if name == "values" => values,
            NodeKind::Call { args, .. } | NodeKind::New { args, .. } | NodeKind::TypeName { args, .. }
                if name == "args" =>
            {
                args
            }
            NodeKind::Tuple { items }
            | NodeKind::List { items }
            | NodeKind::Hash { items, .. }
            | NodeKind::Scope { items, .. }
            | NodeKind::CascadePattern { items }
            | NodeKind::Enum { items, .. }
                if name == "items" =>
            {
                items
            }
            NodeKind::Class { bases, .. } | NodeKind::Enum { bases, .. } if name == "bases" => bases,
            NodeKind::Assign { targets, .. } if name == "targets" => targets,
            NodeKind::Function { params, .. } if name == "params" => params,
            NodeKind::OrPattern { alternatives } if name == "alternatives" => alternatives,
            _ => return None,
        };
        Some(list)
    }

    /// Short name of the variant, for dumps and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Name { .. } => "Name",
            NodeKind::Constant { .. } => "Constant",
            NodeKind::FormattedString { .. } => "FormattedString",
            NodeKind::Error { .. } => "Error",
            NodeKind::Pass => "Pass",
            NodeKind::Break { .. } => "Break",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Yield { .. } => "Yield",
            NodeKind::Await { .. } => "Await",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Ternary { .. } => "Ternary",
            NodeKind::Member { .. } => "Member",
            NodeKind::Call { .. } => "Call",
            NodeKind::Argument { .. } => "Argument",
            NodeKind::Index { .. } => "Index",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Tuple { .. } => "Tuple",
            NodeKind::Parenthesized { .. } => "Parenthesized",
            NodeKind::List { .. } => "List",
            NodeKind::Hash { .. } => "Hash",
            NodeKind::Pair { .. } => "Pair",
            NodeKind::Comprehension { .. } => "Comprehension",
            NodeKind::Generator { .. } => "Generator",
            NodeKind::New { .. } => "New",
            NodeKind::VarDef { .. } => "VarDef",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::AugAssign { .. } => "AugAssign",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::Return { .. } => "Return",
            NodeKind::Import { .. } => "Import",
            NodeKind::TypeName { .. } => "TypeName",
            NodeKind::Module { .. } => "Module",
            NodeKind::Class { .. } => "Class",
            NodeKind::Enum { .. } => "Enum",
            NodeKind::EnumItem { .. } => "EnumItem",
            NodeKind::Function { .. } => "Function",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::Macro { .. } => "Macro",
            NodeKind::MacroApplication { .. } => "MacroApplication",
            NodeKind::Scope { .. } => "Scope",
            NodeKind::CascadePattern { .. } => "CascadePattern",
            NodeKind::OrPattern { .. } => "OrPattern",
            NodeKind::TokenPattern { .. } => "TokenPattern",
            NodeKind::TypePattern { .. } => "TypePattern",
            NodeKind::OptionalPattern { .. } => "OptionalPattern",
            NodeKind::RepeatPattern { .. } => "RepeatPattern",
        }
    }

    /// Forms that may appear on the left of `=`.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            NodeKind::Name { .. } | NodeKind::Member { .. } | NodeKind::Index { .. }
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeData {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    pub slot: Slot,
}

/// Arena that owns every node of one source unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ast {
    nodes: Vec<NodeData>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and bind its children's parent links to it.
    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let mut attached = Vec::new();
        kind.for_each_child(|slot, child| attached.push((slot, child)));
        self.nodes.push(NodeData {
            kind,
            span,
            parent: None,
            slot: Slot::Root,
        });
        for (slot, child) in attached {
            let data = &mut self.nodes[child.index()];
            data.parent = Some(id);
            data.slot = slot;
        }
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn slot(&self, id: NodeId) -> Slot {
        self.nodes[id.index()].slot
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// All node handles in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Parent, grandparent, ... of `id`.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Slots from the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<Slot> {
        let mut path: Vec<Slot> = std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|n| self.slot(n))
            .take_while(|slot| *slot != Slot::Root)
            .collect();
        path.reverse();
        path
    }

    /// Find the node that binds `name` in a scope enclosing `id`.
    pub fn lookup(&self, id: NodeId, name: &str) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|n| match self.kind(n) {
                NodeKind::Scope { bindings, .. } => bindings.get(name).copied(),
                _ => None,
            })
    }

    /// Put `new` where `old` is, detaching `old`.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        let parent = self.parent(old);
        let slot = self.slot(old);
        if let Some(parent) = parent {
            self.nodes[parent.index()]
                .kind
                .for_each_child_mut(|s, child| {
                    if s == slot && *child == old {
                        *child = new;
                    }
                });
        } else if self.root == Some(old) {
            self.root = Some(new);
        }
        let detached = &mut self.nodes[old.index()];
        detached.parent = None;
        detached.slot = Slot::Root;
        let attached = &mut self.nodes[new.index()];
        attached.parent = parent;
        attached.slot = slot;
    }

    /// Insert `child` into list `list` of `owner` at `index`.
    ///
    /// Returns false if `owner` has no such list.
    pub fn insert_item(&mut self, owner: NodeId, list: &'static str, index: usize, child: NodeId) -> bool {
        let Some(items) = self.nodes[owner.index()].kind.list_mut(list) else {
            return false;
        };
        let index = index.min(items.items.len());
        items.items.insert(index, child);
        let moved: Vec<NodeId> = items.items[index..].to_vec();
        self.nodes[child.index()].parent = Some(owner);
        self.renumber(list, index, &moved);
        true
    }

    /// Remove and return element `index` of list `list` of `owner`.
    pub fn remove_item(&mut self, owner: NodeId, list: &'static str, index: usize) -> Option<NodeId> {
        let items = self.nodes[owner.index()].kind.list_mut(list)?;
        if index >= items.items.len() {
            return None;
        }
        let removed = items.items.remove(index);
        let moved: Vec<NodeId> = items.items[index..].to_vec();
        self.renumber(list, index, &moved);
        let detached = &mut self.nodes[removed.index()];
        detached.parent = None;
        detached.slot = Slot::Root;
        Some(removed)
    }

    fn renumber(&mut self, list: &'static str, start: usize, items: &[NodeId]) {
        for (offset, id) in items.iter().enumerate() {
            self.nodes[id.index()].slot = Slot::Item {
                list,
                index: start + offset,
            };
        }
    }
}
