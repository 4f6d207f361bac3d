//! `vela lex`: print the tokens of a source.

use std::process::ExitCode;

use serde::Serialize;
use tracing::debug;
use vela_syntax::{JsonDiagnostic, Token};

use super::{exit_status, Context, SourceArgs};
use crate::output::StyledOutput;

#[derive(Serialize)]
struct LexReport<'a> {
    origin: &'a str,
    tokens: Vec<&'a Token>,
    diagnostics: Vec<JsonDiagnostic>,
}

pub fn execute(ctx: &Context, source: &SourceArgs, trivia: bool, json: bool) -> anyhow::Result<ExitCode> {
    let unit = source.unit(&ctx.options)?;
    let lexed = unit.lex();
    debug!(origin = unit.origin(), tokens = lexed.tokens.len(), "lexed");

    let tokens: Vec<&Token> = lexed
        .tokens
        .iter()
        .filter(|t| trivia || !t.kind.is_trivia())
        .collect();

    if json {
        let report = LexReport {
            origin: unit.origin(),
            tokens,
            diagnostics: lexed.diagnostics.iter().map(JsonDiagnostic::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_status(&lexed.diagnostics));
    }

    let mut out = StyledOutput::new(ctx.color);
    for token in tokens {
        print_token(&mut out, token);
    }
    out.flush();

    unit.emit(&lexed.diagnostics, out.stderr())?;
    Ok(exit_status(&lexed.diagnostics))
}

/// `line:col-line:col Kind "value"`, positions counted from one.
fn print_token(out: &mut StyledOutput, token: &Token) {
    out.dim(&format!("{:<12}", token.span.to_string()));
    out.plain(" ");
    if token.kind.is_keyword() {
        out.info(&format!("{:?}", token.kind));
    } else {
        out.plain(&format!("{:?}", token.kind));
    }
    if !token.value.is_empty() {
        out.plain(" ");
        out.write_styled(&format!("{:?}", token.value), None, true);
    }
    out.newline();
}

