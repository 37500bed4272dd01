//! Provisioning runs.
//!
//! A run wipes the installation root and then processes each runtime in
//! order:
//! 1. Fetch the installer into the download cache
//! 2. Build the silent-install choice document
//! 3. Apply the installer
//! 4. Repair the fresh runtime (certificates, baseline packages)
//! 5. Tag the version directory with its variant
//!
//! A bare `MAJOR.MINOR` installed earlier in the run is stashed while a
//! variant of the same version takes the slot, and put back once the variant
//! is tagged. After the last runtime, bare aliases are rebuilt once over the
//! root. The first failure stops the run; runtimes finished before it stay
//! installed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::choices::{build_silent_config, ChoiceDocument, DEFAULT_ALLOW_PREFIXES};
use crate::error::{ProvisionError, ProvisionResult};
use crate::fetch::{cache_file_name, Downloader, Fetcher};
use crate::fixup::PostInstallFixup;
use crate::installer::NativeInstaller;
use crate::runner::CommandRunner;
use crate::spec::{RuntimeSpec, RuntimeVersion};
use crate::versions::{
    clear_root, relink_aliases_in_order, restore_version_dir, stash_version_dir, tag_variant,
    RelinkReport,
};

/// Default installation root of python.org framework builds.
pub const DEFAULT_ROOT: &str = "/Library/Frameworks/Python.framework/Versions";

/// Progress callback for provisioning runs.
///
/// Called once as each step begins, with a human-readable message.
pub type ProvisionProgressCallback = Box<dyn Fn(ProvisionStage, &str) + Send + Sync>;

/// Steps of a provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    /// Removing previous installations.
    Clearing,
    /// Fetching an installer.
    Downloading,
    /// Building the choice document.
    Configuring,
    /// Running the native installer.
    Installing,
    /// Certificate bootstrap and baseline upgrade.
    Repairing,
    /// Renaming a version directory with its variant.
    Tagging,
    /// Rebuilding bare aliases.
    Linking,
    /// Run finished.
    Complete,
}

impl ProvisionStage {
    /// Get a human-readable name for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Clearing => "Clearing",
            Self::Downloading => "Downloading",
            Self::Configuring => "Configuring",
            Self::Installing => "Installing",
            Self::Repairing => "Repairing",
            Self::Tagging => "Tagging",
            Self::Linking => "Linking",
            Self::Complete => "Complete",
        }
    }
}

/// One runtime installed by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedRuntime {
    pub url: String,
    pub version: RuntimeVersion,
    pub variant: Option<String>,
    /// Final directory under the root.
    pub path: PathBuf,
    /// Whether the installer came from the download cache.
    pub cache_hit: bool,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub runtimes: Vec<ProvisionedRuntime>,
    pub aliases: RelinkReport,
}

/// Drives a full provisioning run.
pub struct Provisioner<D: Downloader, R: CommandRunner> {
    fetcher: Fetcher<D>,
    installer: NativeInstaller<R>,
    fixup: PostInstallFixup<R>,
    root: PathBuf,
    allow_prefixes: Vec<String>,
}

impl<D: Downloader, R: CommandRunner> Provisioner<D, R> {
    /// Create a provisioner that installs under `root`.
    ///
    /// `root` must be the directory the installer writes version trees into
    /// for the installer's target volume.
    pub fn new(
        fetcher: Fetcher<D>,
        installer: NativeInstaller<R>,
        fixup: PostInstallFixup<R>,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            installer,
            fixup,
            root: root.into(),
            allow_prefixes: DEFAULT_ALLOW_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Replace the installer choice allow-list.
    pub fn with_allow_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.allow_prefixes = prefixes;
        self
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Provision `specs` in order, replacing whatever is under the root.
    pub fn provision(
        &self,
        specs: &[RuntimeSpec],
        on_progress: Option<ProvisionProgressCallback>,
    ) -> ProvisionResult<ProvisionReport> {
        let report = |stage: ProvisionStage, message: &str| {
            if let Some(ref cb) = on_progress {
                cb(stage, message);
            }
        };

        report(
            ProvisionStage::Clearing,
            &format!("Removing {}", self.root.display()),
        );
        clear_root(&self.root)?;

        let mut runtimes = Vec::with_capacity(specs.len());
        let mut created = Vec::with_capacity(specs.len());

        for spec in specs {
            let runtime = self.provision_one(spec, &report)?;
            if let Some(name) = runtime.path.file_name() {
                created.push(name.to_string_lossy().to_string());
            }
            runtimes.push(runtime);
        }

        let aliases = if self.root.is_dir() {
            report(ProvisionStage::Linking, "Linking version aliases");
            relink_aliases_in_order(&self.root, &created)?
        } else {
            RelinkReport::default()
        };

        report(ProvisionStage::Complete, "Provisioning complete");
        tracing::info!(runtimes = runtimes.len(), aliases = aliases.created.len(), "provisioning complete");

        Ok(ProvisionReport { runtimes, aliases })
    }

    fn provision_one(
        &self,
        spec: &RuntimeSpec,
        report: &dyn Fn(ProvisionStage, &str),
    ) -> ProvisionResult<ProvisionedRuntime> {
        let version = spec.runtime_version()?;
        let label = spec.dir_name()?;

        let fetched = match self.fetcher.cached(&spec.url, spec.checksum())? {
            Some(hit) => {
                report(
                    ProvisionStage::Downloading,
                    &format!("Using cached {}", cache_file_name(&spec.url)?),
                );
                hit
            }
            None => {
                report(ProvisionStage::Downloading, &format!("Downloading {}", spec.url));
                self.fetcher.download(&spec.url, spec.checksum())?
            }
        };

        report(
            ProvisionStage::Configuring,
            &format!("Configuring {}", label),
        );
        let choices = build_silent_config(&self.installer, &fetched.path, &self.allow_prefixes)?;

        let version_dir = self.root.join(version.to_string());
        let stashed = match fs::symlink_metadata(&version_dir) {
            Err(_) => None,
            Ok(metadata) if metadata.is_dir() && spec.variant().is_some() => {
                Some(stash_version_dir(&version_dir)?)
            }
            Ok(_) => return Err(ProvisionError::VersionSlotOccupied { path: version_dir }),
        };

        let installed = self.install(spec, &fetched.path, &choices, &version_dir, report);
        let restored = match stashed {
            Some(stash) => restore_version_dir(&stash, &version_dir),
            None => Ok(()),
        };
        let path = installed?;
        restored?;

        Ok(ProvisionedRuntime {
            url: spec.url.clone(),
            version,
            variant: spec.variant().map(str::to_string),
            path,
            cache_hit: fetched.cache_hit,
        })
    }

    /// Apply, repair and tag one runtime in an empty version slot.
    fn install(
        &self,
        spec: &RuntimeSpec,
        pkg: &Path,
        choices: &ChoiceDocument,
        version_dir: &Path,
        report: &dyn Fn(ProvisionStage, &str),
    ) -> ProvisionResult<PathBuf> {
        let interpreter = spec.interpreter_name()?;
        let label = spec.dir_name()?;

        report(ProvisionStage::Installing, &format!("Installing {}", label));
        self.installer.apply(pkg, choices)?;

        if !version_dir.is_dir() {
            return Err(ProvisionError::VersionDirMissing {
                path: version_dir.to_path_buf(),
            });
        }

        report(ProvisionStage::Repairing, &format!("Repairing {}", label));
        self.fixup.repair(version_dir, &interpreter)?;

        if spec.variant().is_some() {
            report(ProvisionStage::Tagging, &format!("Tagging {}", label));
        }
        tag_variant(version_dir, spec.variant())
    }
}
