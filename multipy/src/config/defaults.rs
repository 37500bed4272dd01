//! Default values for `config.ini`.

use std::path::PathBuf;

use crate::spec::RuntimeSpec;

pub use crate::choices::DEFAULT_ALLOW_PREFIXES;
pub use crate::installer::DEFAULT_TARGET;
pub use crate::provision::DEFAULT_ROOT;
pub use crate::tools::{DEFAULT_TOOLS, DEFAULT_TOOL_INSTALLER};

/// Name of the per-user state directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".multipy";

/// Configuration file name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Built-in runtime table: `(label, url, variant)`, in provisioning order.
pub const DEFAULT_RUNTIMES: &[(&str, &str, Option<&str>)] = &[
    (
        "3.9",
        "https://www.python.org/ftp/python/3.9.13/python-3.9.13-macos11.pkg",
        None,
    ),
    (
        "3.10",
        "https://www.python.org/ftp/python/3.10.11/python-3.10.11-macos11.pkg",
        None,
    ),
    (
        "3.11",
        "https://www.python.org/ftp/python/3.11.9/python-3.11.9-macos11.pkg",
        None,
    ),
    (
        "3.12",
        "https://www.python.org/ftp/python/3.12.8/python-3.12.8-macos11.pkg",
        None,
    ),
    (
        "3.13-t",
        "https://www.python.org/ftp/python/3.13.1/python-3.13.1-macos11.pkg",
        Some("t"),
    ),
    (
        "3.13",
        "https://www.python.org/ftp/python/3.13.1/python-3.13.1-macos11.pkg",
        None,
    ),
];

/// The per-user state directory (`~/.multipy`).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Default download cache (`~/.multipy/downloads`).
pub fn default_cache_dir() -> PathBuf {
    config_directory().join("downloads")
}

/// Default log directory (`~/.multipy/logs`).
pub fn default_log_dir() -> PathBuf {
    config_directory().join("logs")
}

/// The built-in runtime table as specs.
pub fn default_runtime_specs() -> Vec<RuntimeSpec> {
    DEFAULT_RUNTIMES
        .iter()
        .map(|(_, url, variant)| default_runtime_spec(url, *variant))
        .collect()
}

pub(crate) fn default_runtime_spec(url: &str, variant: Option<&str>) -> RuntimeSpec {
    let spec = RuntimeSpec::new(url);
    match variant {
        Some(variant) => spec.with_variant(variant),
        None => spec,
    }
}
