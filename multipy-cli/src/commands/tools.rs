//! Tools command - install the companion developer tools.

use std::path::PathBuf;

use clap::Args;

use multipy::tools::ToolInstaller;
use multipy::SystemRunner;

use super::common::load_config;
use crate::error::CliError;

/// Arguments for the tools command.
#[derive(Debug, Args)]
pub struct ToolsArgs {
    /// Configuration file (default: ~/.multipy/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the tools command.
pub fn run(args: ToolsArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let packages = &config.tools.packages;

    if packages.is_empty() {
        println!("No tools configured.");
        return Ok(());
    }

    println!(
        "Installing {} tool(s) with {}: {}",
        packages.len(),
        config.tools.installer,
        packages.join(", ")
    );

    let installer = ToolInstaller::new(SystemRunner::new()).with_program(&config.tools.installer);
    let installed = installer.install_all(packages)?;

    println!("Installed {} tool(s).", installed.len());
    Ok(())
}
