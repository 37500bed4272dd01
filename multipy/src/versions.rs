//! Side-by-side version directories and their aliases.
//!
//! Layout under the installation root:
//!
//! ```text
//! <root>/3.12        real directory (installed without a variant)
//! <root>/3.13-t      real directory (variant "t")
//! <root>/3.13 -> 3.13-t
//! ```
//!
//! The installer always creates the bare `MAJOR.MINOR` directory; a variant
//! install is renamed right after. A bare tree installed earlier is stashed
//! while its variant takes the slot. Once all runtimes are in place, every
//! variant-only version gets a bare alias pointing at its most recently
//! created variant. A real bare directory always wins over an alias.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{ProvisionError, ProvisionResult};
use crate::spec::{RuntimeVersion, VARIANT_SEPARATOR};

/// An alias created by [`relink_aliases`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasLink {
    /// Bare `MAJOR.MINOR` name of the link.
    pub name: String,
    /// Variant-qualified directory it points at (relative).
    pub target: String,
}

/// Outcome of an alias pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelinkReport {
    /// Aliases created, in scan order.
    pub created: Vec<AliasLink>,
    /// Bases not aliased because a real entry already holds the name.
    pub skipped: Vec<String>,
}

/// Remove the installation root and everything under it.
///
/// Returns `true` if something was removed.
pub fn clear_root(root: &Path) -> ProvisionResult<bool> {
    let metadata = match fs::symlink_metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(ProvisionError::ReadFailed {
                path: root.to_path_buf(),
                source: e,
            })
        }
    };

    tracing::info!(root = %root.display(), "removing previous installations");

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(root)
    } else {
        fs::remove_file(root)
    };
    removed.map_err(|e| ProvisionError::RemoveFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    Ok(true)
}

/// Rename `version_dir` to `<name>-<variant>`.
///
/// No-op without a variant. Returns the directory's final path.
pub fn tag_variant(version_dir: &Path, variant: Option<&str>) -> ProvisionResult<PathBuf> {
    let variant = match variant.filter(|v| !v.is_empty()) {
        Some(variant) => variant,
        None => return Ok(version_dir.to_path_buf()),
    };

    let name = version_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ProvisionError::VersionDirMissing {
            path: version_dir.to_path_buf(),
        })?;

    let tagged = version_dir.with_file_name(format!("{}{}{}", name, VARIANT_SEPARATOR, variant));

    if tagged.symlink_metadata().is_ok() {
        return Err(ProvisionError::RenameCollision {
            from: version_dir.to_path_buf(),
            to: tagged,
        });
    }

    tracing::info!(from = %version_dir.display(), to = %tagged.display(), "tagging variant");

    fs::rename(version_dir, &tagged).map_err(|e| ProvisionError::RenameFailed {
        from: version_dir.to_path_buf(),
        to: tagged.clone(),
        source: e,
    })?;

    Ok(tagged)
}

/// Point each variant-only `MAJOR.MINOR` at its latest variant.
///
/// Entries are ranked by creation time; see [`relink_aliases_in_order`].
pub fn relink_aliases(root: &Path) -> ProvisionResult<RelinkReport> {
    relink_aliases_in_order(root, &[])
}

/// Alias pass with explicit creation order.
///
/// `created` lists entry names provisioned in this run, oldest first. They
/// rank after every other entry. Other entries rank by creation time (falling
/// back to modification time); on a tie the current alias target ranks last,
/// then names compare lexicographically. The scan walks the ranking
/// backwards, so the newest variant of a base claims the alias and a repeated
/// pass leaves it in place. Entries without a variant separator are never aliased. When a
/// real directory already has the bare name, that base is skipped; stale
/// symlinks are replaced.
pub fn relink_aliases_in_order(root: &Path, created: &[String]) -> ProvisionResult<RelinkReport> {
    let entries = ranked_entries(root, created)?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut report = RelinkReport::default();

    for name in entries.iter().rev() {
        let Some((base, _variant)) = name.split_once(VARIANT_SEPARATOR) else {
            continue;
        };
        if base.parse::<RuntimeVersion>().is_err() {
            tracing::debug!(entry = %name, "not a version directory, ignoring");
            continue;
        }
        if !seen.insert(base.to_string()) {
            continue;
        }

        let link = root.join(base);
        if let Ok(metadata) = fs::symlink_metadata(&link) {
            if !metadata.file_type().is_symlink() {
                tracing::warn!(
                    alias = base,
                    target = %name,
                    "a real {} already exists, not aliasing",
                    base
                );
                report.skipped.push(base.to_string());
                continue;
            }
            fs::remove_file(&link).map_err(|e| ProvisionError::RemoveFailed {
                path: link.clone(),
                source: e,
            })?;
        }

        symlink(name, &link).map_err(|e| ProvisionError::SymlinkFailed {
            link: link.clone(),
            target: PathBuf::from(name),
            reason: e.to_string(),
        })?;

        tracing::info!(alias = base, target = %name, "linked");
        report.created.push(AliasLink {
            name: base.to_string(),
            target: name.clone(),
        });
    }

    Ok(report)
}

/// Move a real version directory aside so the installer can reuse its slot.
///
/// Returns the stash path, a hidden sibling of `version_dir`.
pub fn stash_version_dir(version_dir: &Path) -> ProvisionResult<PathBuf> {
    let name = version_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| ProvisionError::VersionDirMissing {
            path: version_dir.to_path_buf(),
        })?;
    let stash = version_dir.with_file_name(format!(".{}.stashed", name));

    if stash.symlink_metadata().is_ok() {
        return Err(ProvisionError::RenameCollision {
            from: version_dir.to_path_buf(),
            to: stash,
        });
    }

    tracing::debug!(from = %version_dir.display(), to = %stash.display(), "stashing version directory");

    fs::rename(version_dir, &stash).map_err(|e| ProvisionError::RenameFailed {
        from: version_dir.to_path_buf(),
        to: stash.clone(),
        source: e,
    })?;

    Ok(stash)
}

/// Move a stashed directory back to `version_dir`.
///
/// Whatever still holds the slot is an unfinished install and is removed.
pub fn restore_version_dir(stash: &Path, version_dir: &Path) -> ProvisionResult<()> {
    if let Ok(metadata) = fs::symlink_metadata(version_dir) {
        tracing::warn!(path = %version_dir.display(), "removing unfinished install to restore the earlier one");
        let removed = if metadata.is_dir() {
            fs::remove_dir_all(version_dir)
        } else {
            fs::remove_file(version_dir)
        };
        removed.map_err(|e| ProvisionError::RemoveFailed {
            path: version_dir.to_path_buf(),
            source: e,
        })?;
    }

    tracing::debug!(from = %stash.display(), to = %version_dir.display(), "restoring version directory");

    fs::rename(stash, version_dir).map_err(|e| ProvisionError::RenameFailed {
        from: stash.to_path_buf(),
        to: version_dir.to_path_buf(),
        source: e,
    })
}

struct RankedEntry {
    name: String,
    recent: Option<usize>,
    created: Option<SystemTime>,
    incumbent: bool,
}

impl RankedEntry {
    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.recent
            .cmp(&other.recent)
            .then(self.created.cmp(&other.created))
            .then(self.incumbent.cmp(&other.incumbent))
            .then_with(|| self.name.cmp(&other.name))
    }
}

/// Entry names under `root`, oldest first, with `created` last in order.
fn ranked_entries(root: &Path, created: &[String]) -> ProvisionResult<Vec<String>> {
    let mut ranked: Vec<RankedEntry> = entry_names(root)?
        .into_iter()
        .map(|name| {
            let path = root.join(&name);
            RankedEntry {
                recent: created.iter().position(|c| *c == name),
                created: creation_time(&path),
                incumbent: is_alias_target(root, &name),
                name,
            }
        })
        .collect();

    ranked.sort_by(RankedEntry::cmp_rank);
    Ok(ranked.into_iter().map(|entry| entry.name).collect())
}

fn entry_names(root: &Path) -> ProvisionResult<Vec<String>> {
    let read_dir = fs::read_dir(root).map_err(|e| ProvisionError::ReadFailed {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut names = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| ProvisionError::ReadFailed {
            path: root.to_path_buf(),
            source: e,
        })?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::debug!(entry = ?raw, "skipping non-UTF-8 entry"),
        }
    }
    Ok(names)
}

/// Birth time where the filesystem records one, else modification time.
fn creation_time(path: &Path) -> Option<SystemTime> {
    let metadata = fs::symlink_metadata(path).ok()?;
    metadata.created().or_else(|_| metadata.modified()).ok()
}

/// Whether `name` is what its base's alias currently points at.
fn is_alias_target(root: &Path, name: &str) -> bool {
    let Some((base, _variant)) = name.split_once(VARIANT_SEPARATOR) else {
        return false;
    };
    fs::read_link(root.join(base))
        .map(|target| target == Path::new(name))
        .unwrap_or(false)
}

/// Names of the real version directories and aliases under `root`, sorted.
///
/// Aliases are rendered as `name -> target`.
pub fn list_entries(root: &Path) -> ProvisionResult<Vec<String>> {
    let mut names = entry_names(root)?;
    names.sort();

    let mut out = Vec::new();
    for name in names {
        let path = root.join(&name);
        match fs::read_link(&path) {
            Ok(target) => out.push(format!("{} -> {}", name, target.display())),
            Err(_) => out.push(name),
        }
    }
    Ok(out)
}
