//! Runtimes to provision: which installers, in which order.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ProvisionError, ProvisionResult};
use crate::fetch::cache_file_name;

/// Separator between the version and the variant in directory names.
pub const VARIANT_SEPARATOR: char = '-';

/// A `MAJOR.MINOR` runtime version, the unit that gets its own directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u32,
    pub minor: u32,
}

impl RuntimeVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Find the first `N.N` in an installer file name.
    ///
    /// `python-3.13.1-macos11.pkg` yields `3.13`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE.get_or_init(|| {
            Regex::new(r"(\d+)\.(\d+)").expect("version pattern is valid")
        });

        let caps = re.captures(name)?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        Some(Self::new(major, minor))
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RuntimeVersion {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| ProvisionError::UnknownVersion(s.to_string()))?;
        let major = major
            .parse()
            .map_err(|_| ProvisionError::UnknownVersion(s.to_string()))?;
        let minor = minor
            .parse()
            .map_err(|_| ProvisionError::UnknownVersion(s.to_string()))?;
        Ok(Self::new(major, minor))
    }
}

/// One runtime to provision.
///
/// Immutable once built. Position in the provisioning list decides alias
/// precedence: later variants of the same version win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSpec {
    /// Installer package URL.
    pub url: String,
    /// Pinned SHA-256 of the installer, if any.
    pub checksum: Option<String>,
    /// Variant tag appended to the version directory (e.g. `t`).
    pub variant: Option<String>,
    /// Explicit version, for URLs whose file name does not carry one.
    pub version: Option<RuntimeVersion>,
}

impl RuntimeSpec {
    /// Create a spec for `url` with no checksum and no variant.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            checksum: None,
            variant: None,
            version: None,
        }
    }

    /// Pin the installer's SHA-256.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Tag the installed directory with `variant`.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    /// Override the version derived from the URL.
    pub fn with_version(mut self, version: RuntimeVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// The variant, treating an empty string as no variant.
    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref().filter(|v| !v.is_empty())
    }

    /// The pinned checksum, treating an empty string as none.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// The `MAJOR.MINOR` this installer provides.
    pub fn runtime_version(&self) -> ProvisionResult<RuntimeVersion> {
        if let Some(version) = self.version {
            return Ok(version);
        }
        let name = cache_file_name(&self.url)?;
        RuntimeVersion::from_file_name(&name)
            .ok_or_else(|| ProvisionError::UnknownVersion(self.url.clone()))
    }

    /// Final directory name: `3.13` or `3.13-t`.
    pub fn dir_name(&self) -> ProvisionResult<String> {
        let version = self.runtime_version()?;
        Ok(versioned_name(version, self.variant()))
    }

    /// Interpreter file name inside `bin/`: `python3.13` or `python3.13t`.
    pub fn interpreter_name(&self) -> ProvisionResult<String> {
        let version = self.runtime_version()?;
        Ok(format!("python{}{}", version, self.variant().unwrap_or("")))
    }
}

/// Compose a version directory name from a version and optional variant.
pub fn versioned_name(version: RuntimeVersion, variant: Option<&str>) -> String {
    match variant.filter(|v| !v.is_empty()) {
        Some(variant) => format!("{}{}{}", version, VARIANT_SEPARATOR, variant),
        None => version.to_string(),
    }
}
