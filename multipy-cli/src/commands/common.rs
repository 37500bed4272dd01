//! Common helpers shared across CLI commands.

use std::path::{Path, PathBuf};

use multipy::config::ConfigFile;

use crate::error::CliError;

/// Load the configuration from `path`, or from the default location.
///
/// A missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let config = match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    Ok(config)
}

/// CLI value if given, otherwise the configured one.
pub fn resolve_path(cli: Option<PathBuf>, configured: &Path) -> PathBuf {
    cli.unwrap_or_else(|| configured.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let temp = TempDir::new().unwrap();
        let config = load_config(Some(&temp.path().join("absent.ini"))).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[installer]\nsudo = perhaps\n").unwrap();

        assert!(matches!(load_config(Some(&path)), Err(CliError::Config(_))));
    }

    #[test]
    fn test_cli_path_takes_precedence() {
        let configured = Path::new("/Library/Frameworks/Python.framework/Versions");
        assert_eq!(
            resolve_path(Some(PathBuf::from("/tmp/Versions")), configured),
            PathBuf::from("/tmp/Versions")
        );
        assert_eq!(resolve_path(None, configured), configured.to_path_buf());
    }
}
