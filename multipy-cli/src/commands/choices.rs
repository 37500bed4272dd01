//! Choices command - show the choice document a silent install would use.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use multipy::choices::build_silent_config;
use multipy::installer::NativeInstaller;
use multipy::SystemRunner;

use super::common::load_config;
use crate::error::CliError;

/// Arguments for the choices command.
#[derive(Debug, Args)]
pub struct ChoicesArgs {
    /// Path to a downloaded installer package
    pub pkg: PathBuf,

    /// Print an identifier/enabled summary instead of the XML document
    #[arg(long)]
    pub summary: bool,

    /// Configuration file (default: ~/.multipy/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the choices command.
pub fn run(args: ChoicesArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let installer = NativeInstaller::new(SystemRunner::new());

    let document = build_silent_config(&installer, &args.pkg, &config.installer.allow_prefixes)?;

    if args.summary {
        for item in document.items().filter(|i| i.is_selection()) {
            let mark = if item.is_enabled().unwrap_or(false) { "on " } else { "off" };
            println!("{}  {}", mark, item.identifier().unwrap_or("<unnamed>"));
        }
        return Ok(());
    }

    let xml = document.to_xml()?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&xml)?;
    stdout.flush()?;
    Ok(())
}
