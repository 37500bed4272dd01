//! multipy - side-by-side CPython runtimes from python.org installers.
//!
//! This library provides everything needed to provision several versions of
//! the python.org macOS framework build on one machine:
//!
//! - [`fetch`]: download installers into a checksum-verified cache
//! - [`choices`]: rewrite installer choices for a silent, minimal install
//! - [`installer`]: drive the native `installer` tool
//! - [`fixup`]: certificate bootstrap and baseline package upgrade
//! - [`versions`]: variant-tagged version directories and their aliases
//! - [`provision`]: the end-to-end run over a list of [`RuntimeSpec`]s
//! - [`tools`]: companion developer tools through `pipx`
//!
//! External processes go through [`CommandRunner`] and HTTP through
//! [`fetch::Downloader`], so every component can run against fakes.

pub mod choices;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fixup;
pub mod installer;
pub mod logging;
pub mod provision;
pub mod runner;
pub mod spec;
pub mod tools;
pub mod versions;

pub use error::{ProvisionError, ProvisionResult};
pub use provision::{ProvisionReport, ProvisionStage, Provisioner};
pub use runner::{CommandLine, CommandOutput, CommandRunner, SystemRunner};
pub use spec::{RuntimeSpec, RuntimeVersion};
