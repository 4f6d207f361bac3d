//! Vela command-line driver
//!
//! A thin front end over `vela-syntax`: dump the tokens of a source, print
//! or dump its syntax tree, and check files for diagnostics.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{Context, SourceArgs};

#[derive(Debug, Parser)]
#[command(name = "vela")]
#[command(about = "Vela language front end", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file with a [syntax] table (defaults to ./vela.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// When to use colors: auto, always or never
    #[arg(long, global = true, value_name = "WHEN")]
    color: Option<String>,

    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the tokens of a source
    Lex {
        #[command(flatten)]
        source: SourceArgs,
        /// Include whitespace and comment tokens
        #[arg(long)]
        trivia: bool,
        /// Print tokens and diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parse a source and show its syntax tree
    Parse {
        #[command(flatten)]
        source: SourceArgs,
        /// Print the tree and diagnostics as JSON
        #[arg(long, conflicts_with = "print")]
        json: bool,
        /// Print the tree as canonical source
        #[arg(long)]
        print: bool,
    },

    /// Report diagnostics for files or directories
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        files: Vec<String>,
        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective syntax options
    Config,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = Context::load(cli.config.as_deref(), cli.color.as_deref())?;
    match cli.command {
        Commands::Lex {
            source,
            trivia,
            json,
        } => commands::lex::execute(&ctx, &source, trivia, json),
        Commands::Parse {
            source,
            json,
            print,
        } => commands::parse::execute(&ctx, &source, json, print),
        Commands::Check { files, json } => commands::check::execute(&ctx, &files, json),
        Commands::Config => commands::config::execute(&ctx),
    }
}

/// Install the log subscriber. `VELA_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env("VELA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "warn",
        1 => "warn,vela=debug,vela_syntax=debug",
        _ => "warn,vela=trace,vela_syntax=trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn directive_defaults() {
        assert_eq!(directive_for_verbosity(0), "warn");
        assert_eq!(directive_for_verbosity(1), "warn,vela=debug,vela_syntax=debug");
        assert_eq!(directive_for_verbosity(5), "warn,vela=trace,vela_syntax=trace");
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn source_from_file_or_code() {
        let cli = Cli::try_parse_from(["vela", "lex", "main.vela", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Lex { json: true, .. }));

        let cli = Cli::try_parse_from(["vela", "parse", "-e", "x = 1", "--print"]).unwrap();
        assert!(matches!(cli.command, Commands::Parse { print: true, .. }));

        assert!(Cli::try_parse_from(["vela", "parse"]).is_err());
        assert!(Cli::try_parse_from(["vela", "parse", "a.vela", "-e", "x"]).is_err());
        assert!(Cli::try_parse_from(["vela", "parse", "-e", "x", "--json", "--print"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["vela", "check", "src", "--config", "vela.toml", "-vv"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("vela.toml")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Check { ref files, .. } if files == &["src"]));
    }
}
