//! `vela parse`: show the syntax tree of a source.

use std::process::ExitCode;

use serde::Serialize;
use tracing::debug;
use vela_syntax::{Ast, JsonDiagnostic, NodeId, NodeKind, Slot};

use super::{exit_status, Context, SourceArgs};
use crate::output::StyledOutput;

#[derive(Serialize)]
struct ParseReport<'a> {
    origin: &'a str,
    root: Option<NodeId>,
    ast: &'a Ast,
    diagnostics: Vec<JsonDiagnostic>,
}

pub fn execute(ctx: &Context, source: &SourceArgs, json: bool, print: bool) -> anyhow::Result<ExitCode> {
    let unit = source.unit(&ctx.options)?;
    let parsed = unit.parse();
    debug!(
        origin = unit.origin(),
        nodes = parsed.ast.len(),
        diagnostics = parsed.diagnostics.len(),
        "parsed"
    );

    if json {
        let report = ParseReport {
            origin: unit.origin(),
            root: parsed.root(),
            ast: &parsed.ast,
            diagnostics: parsed.diagnostics.iter().map(JsonDiagnostic::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_status(&parsed.diagnostics));
    }

    let mut out = StyledOutput::new(ctx.color);
    if let Some(root) = parsed.root() {
        if print {
            out.plain(&parsed.ast.to_source(root));
        } else {
            print_tree(&mut out, &parsed.ast, root);
        }
    }
    out.flush();

    unit.emit(&parsed.diagnostics, out.stderr())?;
    Ok(exit_status(&parsed.diagnostics))
}

// ── Tree dump ──────────────────────────────────────────────────────────────

/// One line per node: `slot: Kind detail span`, indented by depth.
fn print_tree(out: &mut StyledOutput, ast: &Ast, root: NodeId) {
    // Operator chains can nest far deeper than the call stack allows.
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        out.plain(&"  ".repeat(depth));
        if let Some(label) = slot_label(ast.slot(id)) {
            out.dim(&format!("{}: ", label));
        }
        let kind = ast.kind(id);
        if kind.is_error() {
            out.error(kind.name());
        } else {
            out.write_styled(kind.name(), None, true);
        }
        if let Some(detail) = node_detail(kind) {
            out.plain(" ");
            out.info(&detail);
        }
        out.plain(" ");
        out.dim(&ast.span(id).to_string());
        out.newline();

        for child in ast.children(id).into_iter().rev() {
            stack.push((child, depth + 1));
        }
    }
}

fn slot_label(slot: Slot) -> Option<String> {
    match slot {
        Slot::Root => None,
        Slot::Field(name) => Some(name.to_string()),
        Slot::Item { list, index } => Some(format!("{}[{}]", list, index)),
    }
}

/// The non-child payload of a node worth showing next to its kind.
fn node_detail(kind: &NodeKind) -> Option<String> {
    let detail = match kind {
        NodeKind::Name { name }
        | NodeKind::Member { member: name, .. }
        | NodeKind::Module { name, .. }
        | NodeKind::Class { name, .. }
        | NodeKind::Enum { name, .. }
        | NodeKind::EnumItem { name, .. }
        | NodeKind::Function { name, .. }
        | NodeKind::Parameter { name, .. }
        | NodeKind::Macro { name, .. } => name.clone(),
        NodeKind::Constant { token } | NodeKind::FormattedString { token, .. } | NodeKind::Error { token } => {
            format!("{:?}", token.value)
        }
        NodeKind::TokenPattern { token } => format!("{:?}", token.value),
        NodeKind::Unary { op, .. } => op.symbol().to_string(),
        NodeKind::Binary { op, .. } => op.symbol().to_string(),
        NodeKind::AugAssign { op, .. } => format!("{}=", op.symbol()),
        NodeKind::Argument { name: Some(name), .. } => format!("{}=", name),
        NodeKind::Break { label: Some(label) } | NodeKind::Continue { label: Some(label) } => label.clone(),
        NodeKind::Ternary { inverted: true, .. } => "unless".to_string(),
        NodeKind::Yield { from: true, .. } => "from".to_string(),
        NodeKind::VarDef { immutable: true, .. } => "let".to_string(),
        NodeKind::TypeName { name, optional, .. } => {
            format!("{}{}", name, if *optional { "?" } else { "" })
        }
        NodeKind::Import { path, alias } => match alias {
            Some(alias) => format!("{} as {}", path.join("."), alias),
            None => path.join("."),
        },
        NodeKind::MacroApplication { name, tokens } => {
            format!("@{} ({} tokens)", name, tokens.len())
        }
        NodeKind::TypePattern { name, ty } => match name {
            Some(name) => format!("{}: {}", name, ty.name()),
            None => ty.name().to_string(),
        },
        NodeKind::Scope { bindings, .. } if !bindings.is_empty() => {
            let names: Vec<&str> = bindings.keys().map(String::as_str).collect();
            format!("[{}]", names.join(", "))
        }
        _ => return None,
    };
    Some(detail)
}
