//! `vela check`: report diagnostics for source files.

use std::process::ExitCode;

use serde::Serialize;
use tracing::{debug, warn};
use vela_syntax::{JsonDiagnostic, ParsedUnit, SourceUnit};

use super::files::collect_vela_files;
use super::Context;
use crate::output::StyledOutput;

#[derive(Serialize)]
struct FileReport {
    file: String,
    diagnostics: Vec<JsonDiagnostic>,
}

struct FileResult {
    unit: SourceUnit,
    parsed: ParsedUnit,
}

pub fn execute(ctx: &Context, files: &[String], json: bool) -> anyhow::Result<ExitCode> {
    let mut out = StyledOutput::new(ctx.color);

    // 1. Collect source files
    let source_files = collect_vela_files(files)?;
    if source_files.is_empty() {
        out.warning("warning");
        out.plain(": no .vela files found");
        out.newline();
        return Ok(ExitCode::SUCCESS);
    }

    // 2. Parse each file
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    let mut results = Vec::new();

    for path in &source_files {
        let unit = match SourceUnit::from_file(path) {
            Ok(unit) => unit.with_options(ctx.options.clone()),
            Err(e) => {
                warn!(path = %path.display(), "skipping unreadable file");
                out.stderr_error(&e.to_string());
                total_errors += 1;
                continue;
            }
        };
        let parsed = unit.parse();
        debug!(path = %path.display(), diagnostics = parsed.diagnostics.len(), "checked");

        total_errors += parsed.diagnostics.error_count();
        total_warnings += parsed.diagnostics.warnings().count();
        results.push(FileResult { unit, parsed });
    }

    // 3. Output diagnostics
    if json {
        emit_json(&results)?;
    } else {
        for result in &results {
            result.unit.emit(&result.parsed.diagnostics, out.stderr())?;
        }
        out.flush();
        print_summary(&mut out, source_files.len(), total_errors, total_warnings);
    }
    out.flush();

    // 4. Exit code
    if total_errors > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

// ── JSON output ────────────────────────────────────────────────────────────

fn emit_json(results: &[FileResult]) -> anyhow::Result<()> {
    let reports: Vec<FileReport> = results
        .iter()
        .map(|result| FileReport {
            file: result.unit.origin().to_string(),
            diagnostics: result.parsed.diagnostics.iter().map(JsonDiagnostic::from).collect(),
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

// ── Colored summary ────────────────────────────────────────────────────────

fn print_summary(out: &mut StyledOutput, file_count: usize, errors: usize, warnings: usize) {
    out.plain(&format!("Checked {} file{}: ", file_count, plural(file_count)));
    if errors == 0 && warnings == 0 {
        out.success("no problems found");
        out.newline();
        return;
    }

    if errors > 0 {
        out.error(&format!("{} error{}", errors, plural(errors)));
    }
    if errors > 0 && warnings > 0 {
        out.plain(", ");
    }
    if warnings > 0 {
        out.warning(&format!("{} warning{}", warnings, plural(warnings)));
    }
    out.newline();
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

