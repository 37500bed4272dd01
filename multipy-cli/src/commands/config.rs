//! Configuration inspection CLI commands.

use std::path::PathBuf;

use clap::Subcommand;

use multipy::config::{config_file_path, ConfigFile};

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show {
        /// Configuration file (default: ~/.multipy/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show { config } => run_show(config),
    }
}

fn run_path() -> Result<(), CliError> {
    let path = config_file_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("(file does not exist, run 'multipy init' to create it)");
    }
    Ok(())
}

fn run_show(path: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(path.as_deref())?;
    print!("{}", describe(&config));
    Ok(())
}

/// Render the effective configuration for display.
fn describe(config: &ConfigFile) -> String {
    let mut lines = vec![
        "[provision]".to_string(),
        format!("  root           {}", config.provision.root.display()),
        format!("  cache_dir      {}", config.provision.cache_dir.display()),
        format!("  target         {}", config.provision.target),
        "[installer]".to_string(),
        format!("  sudo           {}", config.installer.sudo),
    ];
    for prefix in &config.installer.allow_prefixes {
        lines.push(format!("  allow          {}", prefix));
    }
    lines.push("[tools]".to_string());
    lines.push(format!("  installer      {}", config.tools.installer));
    lines.push(format!("  packages       {}", config.tools.packages.join(", ")));
    lines.push("[runtimes]".to_string());
    for entry in &config.runtimes {
        let mut line = format!("  {:<14} {}", entry.label, entry.spec.url);
        if let Some(variant) = entry.spec.variant() {
            line.push_str(&format!(" variant={}", variant));
        }
        if entry.spec.checksum().is_some() {
            line.push_str(" (pinned)");
        }
        lines.push(line);
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_lists_every_runtime() {
        let config = ConfigFile::default();
        let text = describe(&config);

        for entry in &config.runtimes {
            assert!(text.contains(&entry.spec.url));
        }
        assert!(text.contains("sudo           false"));
        assert!(text.contains("allow          org.python.Python.PythonFramework"));
    }
}
