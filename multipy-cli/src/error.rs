//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use multipy::config::ConfigFileError;
use multipy::ProvisionError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded or saved
    Config(ConfigFileError),
    /// A provisioning step failed
    Provision(ProvisionError),
    /// Failed to write to the terminal or a file
    Io(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let Some(hint) = self.hint() {
            eprintln!();
            eprintln!("{}", hint);
        }

        process::exit(1)
    }

    /// Extra guidance for errors with a common fix.
    fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Provision(ProvisionError::CommandFailed { stderr, .. })
                if stderr.contains("root") || stderr.contains("permission") =>
            {
                Some(
                    "The installer needs administrator rights. Run multipy with sudo, \
                     or set `sudo = true` in the [installer] section of config.ini.",
                )
            }
            CliError::Provision(ProvisionError::RemoveFailed { .. }) => Some(
                "The installation root could not be cleared. Check its permissions, \
                 or set `sudo = true` in the [installer] section of config.ini.",
            ),
            CliError::Provision(ProvisionError::VersionSlotOccupied { .. }) => Some(
                "A plain install of this version was already provisioned in this run. \
                 List each variant before the plain install of the same version.",
            ),
            CliError::Provision(ProvisionError::ChecksumMismatch { .. }) => Some(
                "The downloaded installer does not match the pinned sha256. \
                 Check the runtime's sha256 in config.ini.",
            ),
            CliError::Config(ConfigFileError::InvalidValue { .. }) => {
                Some("Run `multipy config path` to locate the configuration file.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Provision(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Provision(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::LoggingInit(_) => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e)
    }
}

impl From<ProvisionError> for CliError {
    fn from(e: ProvisionError) -> Self {
        CliError::Provision(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_provision_error_display_is_unwrapped() {
        let err: CliError = ProvisionError::UnknownVersion("python-latest.pkg".to_string()).into();
        assert_eq!(
            err.to_string(),
            "cannot determine runtime version from python-latest.pkg"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err: CliError = ConfigFileError::InvalidValue {
            section: "installer".to_string(),
            key: "sudo".to_string(),
            value: "maybe".to_string(),
            reason: "must be true or false".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_permission_hint() {
        let err: CliError = ProvisionError::CommandFailed {
            command: "/usr/sbin/installer -pkg x.pkg".to_string(),
            code: Some(1),
            stderr: "installer: Must be run as root to install this package.".to_string(),
        }
        .into();
        assert!(err.hint().unwrap().contains("sudo"));

        let err: CliError = ProvisionError::CommandFailed {
            command: "pipx install ruff".to_string(),
            code: Some(1),
            stderr: "No matching distribution".to_string(),
        }
        .into();
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_slot_hint() {
        let err: CliError = ProvisionError::VersionSlotOccupied {
            path: PathBuf::from("/Library/Frameworks/Python.framework/Versions/3.12"),
        }
        .into();
        assert!(err.hint().unwrap().contains("variant"));
    }
}
