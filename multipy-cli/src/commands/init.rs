//! Init command - initialize configuration file.

use clap::Args;

use multipy::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Arguments for the init command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing configuration file with the defaults
    #[arg(long)]
    pub force: bool,
}

/// Run the init command.
pub fn run(args: InitArgs) -> Result<(), CliError> {
    let path = config_file_path();

    if path.exists() && !args.force {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to replace it with the defaults.");
        return Ok(());
    }

    ConfigFile::default().save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit the [runtime.*] sections to choose which runtimes to provision.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
