//! Provision command - install every configured runtime from scratch.

use std::path::PathBuf;

use clap::Args;
use console::style;

use multipy::fetch::{Fetcher, HttpDownloader};
use multipy::fixup::PostInstallFixup;
use multipy::installer::NativeInstaller;
use multipy::{Provisioner, SystemRunner};

use super::common::{load_config, resolve_path};
use crate::error::CliError;
use crate::output;

/// Arguments for the provision command.
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Configuration file (default: ~/.multipy/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Installation root; removed and rebuilt
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Download cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

/// Run the provision command.
pub fn run(args: ProvisionArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let root = resolve_path(args.root, &config.provision.root);
    let cache_dir = resolve_path(args.cache_dir, &config.provision.cache_dir);
    let specs = config.runtime_specs();

    println!("Provisioning {} runtime(s) into {}", specs.len(), root.display());
    for entry in &config.runtimes {
        println!("  {:<10} {}", entry.label, entry.spec.url);
    }
    println!();

    let bar = output::download_bar();
    let fetcher = Fetcher::new(HttpDownloader::new()?, &cache_dir)
        .with_progress(output::byte_progress(bar.clone()));

    let runner = SystemRunner::new();
    let installer = NativeInstaller::new(runner)
        .with_target(config.provision.target.as_str())
        .with_elevation(config.installer.sudo);
    let fixup = PostInstallFixup::new(runner).with_elevation(config.installer.sudo);

    let provisioner = Provisioner::new(fetcher, installer, fixup, &root)
        .with_allow_prefixes(config.installer.allow_prefixes.clone());

    let report = provisioner.provision(&specs, Some(output::step_printer(bar)))?;

    println!();
    for runtime in &report.runtimes {
        let source = if runtime.cache_hit { "cached" } else { "downloaded" };
        println!(
            "  {} {} ({})",
            style("✓").green(),
            runtime.path.display(),
            source
        );
    }
    for alias in &report.aliases.created {
        println!("  {} -> {}", alias.name, alias.target);
    }
    for name in &report.aliases.skipped {
        println!("  {} is a real installation, not aliased", name);
    }

    Ok(())
}
