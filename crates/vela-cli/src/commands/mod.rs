//! Subcommand implementations and the state they share.

pub mod check;
pub mod config;
pub mod files;
pub mod lex;
pub mod parse;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Args;
use termcolor::ColorChoice;
use tracing::debug;
use vela_syntax::{Diagnostics, SourceUnit, SyntaxOptions};

use crate::output::resolve_color_choice;

/// Configuration file picked up from the working directory.
const DEFAULT_CONFIG: &str = "vela.toml";

/// Settings resolved from the global command-line options.
#[derive(Debug, Clone)]
pub struct Context {
    pub options: SyntaxOptions,
    /// The file the options were read from, if any
    pub config_path: Option<PathBuf>,
    pub color: ColorChoice,
}

impl Context {
    pub fn load(config: Option<&Path>, color: Option<&str>) -> anyhow::Result<Self> {
        let config_path = match config {
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG)).filter(|path| path.is_file()),
        };

        let options = match &config_path {
            Some(path) => SyntaxOptions::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => SyntaxOptions::default(),
        };
        debug!(config = ?config_path, ?options, "resolved syntax options");

        Ok(Self {
            options,
            config_path,
            color: resolve_color_choice(color),
        })
    }
}

/// A source given as a file path, `-` for standard input, or inline code.
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Source file, or `-` to read standard input
    #[arg(required_unless_present = "code")]
    pub file: Option<PathBuf>,

    /// Source code given on the command line
    #[arg(short = 'e', long = "eval", value_name = "CODE", conflicts_with = "file")]
    pub code: Option<String>,
}

impl SourceArgs {
    pub fn unit(&self, options: &SyntaxOptions) -> anyhow::Result<SourceUnit> {
        let unit = match (&self.code, &self.file) {
            (Some(code), _) => SourceUnit::from_code(code.as_str()),
            (None, Some(path)) if path.as_os_str() == "-" => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .context("failed to read standard input")?;
                SourceUnit::from_code(text).with_origin("<stdin>")
            }
            (None, Some(path)) => SourceUnit::from_file(path)?,
            (None, None) => anyhow::bail!("no source given: pass a file or -e CODE"),
        };
        Ok(unit.with_options(options.clone()))
    }
}

/// Exit status for a run that produced `diagnostics`.
pub fn exit_status(diagnostics: &Diagnostics) -> ExitCode {
    if diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
