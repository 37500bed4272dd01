//! User configuration (`~/.multipy/config.ini`).
//!
//! The file has fixed `[provision]`, `[installer]` and `[tools]` sections
//! plus one `[runtime.<label>]` section per runtime to provision. Runtime
//! sections keep their file order; when none are present the built-in
//! table is used.

mod defaults;
mod file;
mod parser;
mod writer;

pub use defaults::{
    config_directory, default_cache_dir, default_log_dir, default_runtime_specs,
    CONFIG_FILE_NAME, DEFAULT_RUNTIMES,
};
pub use file::{
    config_file_path, ConfigFile, ConfigFileError, InstallerSettings, ProvisionSettings,
    RuntimeEntry, ToolSettings,
};
pub use parser::expand_tilde;
