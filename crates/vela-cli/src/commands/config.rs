//! `vela config`: print the effective syntax options.

use std::process::ExitCode;

use super::Context;

pub fn execute(ctx: &Context) -> anyhow::Result<ExitCode> {
    match &ctx.config_path {
        Some(path) => println!("# from {}", path.display()),
        None => println!("# defaults"),
    }
    print!("{}", ctx.options.to_toml_string()?);
    Ok(ExitCode::SUCCESS)
}
