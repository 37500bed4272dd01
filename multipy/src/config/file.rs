//! Configuration file handling for ~/.multipy/config.ini.
//!
//! Loads and saves user configuration with sensible defaults. Parsing lives
//! in [`super::parser`] and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::defaults::*;
use crate::spec::RuntimeSpec;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// `[provision]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionSettings {
    /// Installation root holding the version trees.
    pub root: PathBuf,
    /// Download cache directory.
    pub cache_dir: PathBuf,
    /// Volume passed to the installer's `-target`.
    pub target: String,
}

impl Default for ProvisionSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            cache_dir: default_cache_dir(),
            target: DEFAULT_TARGET.to_string(),
        }
    }
}

/// `[installer]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallerSettings {
    /// Run the installer and post-install steps through `sudo`.
    pub sudo: bool,
    /// Choice identifier prefixes to enable.
    pub allow_prefixes: Vec<String>,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            sudo: false,
            allow_prefixes: DEFAULT_ALLOW_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// `[tools]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub installer: String,
    pub packages: Vec<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            installer: DEFAULT_TOOL_INSTALLER.to_string(),
            packages: DEFAULT_TOOLS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// A `[runtime.<label>]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeEntry {
    pub label: String,
    pub spec: RuntimeSpec,
}

/// Parsed `config.ini`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub provision: ProvisionSettings,
    pub installer: InstallerSettings,
    pub tools: ToolSettings,
    /// Runtimes in provisioning order.
    pub runtimes: Vec<RuntimeEntry>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            provision: ProvisionSettings::default(),
            installer: InstallerSettings::default(),
            tools: ToolSettings::default(),
            runtimes: DEFAULT_RUNTIMES
                .iter()
                .map(|(label, url, variant)| RuntimeEntry {
                    label: label.to_string(),
                    spec: default_runtime_spec(url, *variant),
                })
                .collect(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.multipy/config.ini).
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.multipy/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let content = super::writer::to_config_string(self);
        std::fs::write(path, content).map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Runtime specs in provisioning order.
    pub fn runtime_specs(&self) -> Vec<RuntimeSpec> {
        self.runtimes.iter().map(|r| r.spec.clone()).collect()
    }
}

/// Get the path to the config file (~/.multipy/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.provision.root, PathBuf::from(DEFAULT_ROOT));
        assert_eq!(config.provision.target, "/");
        assert!(!config.installer.sudo);
        assert_eq!(config.installer.allow_prefixes.len(), 3);
        assert_eq!(config.tools.installer, "pipx");
        assert_eq!(config.runtimes.len(), DEFAULT_RUNTIMES.len());
        assert_eq!(config.runtime_specs(), default_runtime_specs());
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        ConfigFile::default().save_to(&config_path).unwrap();
        assert!(config_path.is_file());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.provision.root = temp_dir.path().join("Versions");
        config.installer.sudo = true;
        config.tools.packages = vec!["ruff".to_string(), "tox".to_string()];
        config.runtimes = vec![
            RuntimeEntry {
                label: "3.13-t".to_string(),
                spec: RuntimeSpec::new(
                    "https://www.python.org/ftp/python/3.13.1/python-3.13.1-macos11.pkg",
                )
                .with_variant("t")
                .with_checksum("ab".repeat(32)),
            },
            RuntimeEntry {
                label: "3.13".to_string(),
                spec: RuntimeSpec::new(
                    "https://www.python.org/ftp/python/3.13.1/python-3.13.1-macos11.pkg",
                ),
            },
        ];

        config.save_to(&config_path).unwrap();
        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }
}
