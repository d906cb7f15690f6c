//! Command dispatch and handler modules.

mod check;
mod pom;
mod tasks;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Tasks { json } => tasks::exec(json),
        Command::Pom {
            pub_name,
            variant,
            marker,
        } => pom::exec(pub_name, variant, marker),
        Command::Check => check::exec(),
    }
}

fn current_dir() -> Result<std::path::PathBuf> {
    Ok(std::env::current_dir().map_err(jarbird_util::errors::JarbirdError::Io)?)
}
