//! Relink and list commands - inspect and repair the version aliases.

use std::path::PathBuf;

use clap::Args;

use multipy::versions::{list_entries, relink_aliases};

use super::common::{load_config, resolve_path};
use crate::error::CliError;

/// Arguments shared by the relink and list commands.
#[derive(Debug, Args)]
pub struct RootArgs {
    /// Installation root
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Configuration file (default: ~/.multipy/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RootArgs {
    fn resolve(self) -> Result<PathBuf, CliError> {
        let config = load_config(self.config.as_deref())?;
        Ok(resolve_path(self.root, &config.provision.root))
    }
}

/// Rebuild the bare aliases under the root.
pub fn run(args: RootArgs) -> Result<(), CliError> {
    let root = args.resolve()?;
    let report = relink_aliases(&root)?;

    if report.created.is_empty() && report.skipped.is_empty() {
        println!("No variant installations under {}", root.display());
    }
    for alias in &report.created {
        println!("{} -> {}", alias.name, alias.target);
    }
    for name in &report.skipped {
        println!("{} is a real installation, not aliased", name);
    }
    Ok(())
}

/// List version directories and aliases under the root.
pub fn run_list(args: RootArgs) -> Result<(), CliError> {
    let root = args.resolve()?;
    if !root.is_dir() {
        println!("Nothing installed under {}", root.display());
        return Ok(());
    }
    for entry in list_entries(&root)? {
        println!("{}", entry);
    }
    Ok(())
}
