//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`provision`] - Full provisioning run
//! - [`fetch`] - Download one installer into the cache
//! - [`choices`] - Show the silent-install choice document for a package
//! - [`relink`] - Rebuild or list version aliases
//! - [`tools`] - Install the companion developer tools
//! - [`init`] - Configuration initialization
//! - [`config`] - Configuration inspection

pub mod choices;
pub mod common;
pub mod config;
pub mod fetch;
pub mod init;
pub mod provision;
pub mod relink;
pub mod tools;
