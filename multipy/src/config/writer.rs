//! INI serialization logic for converting `ConfigFile` → INI string.

use std::fmt::Write;
use std::path::Path;

use super::file::{ConfigFile, RuntimeEntry};
use super::parser::RUNTIME_SECTION_PREFIX;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut out = format!(
        r#"[provision]
; Directory the installer writes version trees into. Removed at the start
; of every provisioning run.
root = {}
; Download cache. Installers with a pinned sha256 are reused from here.
cache_dir = {}
; Volume passed to the installer as -target
target = {}

[installer]
; Run the installer and the post-install steps through sudo
sudo = {}
; Comma-separated choice identifier prefixes to enable. Every other
; selectable package component is disabled.
allow_prefixes = {}

[tools]
; Isolated-environment installer used by `multipy tools`
installer = {}
; Comma-separated list of tools to install
packages = {}
"#,
        path_to_string(&config.provision.root),
        path_to_string(&config.provision.cache_dir),
        config.provision.target,
        config.installer.sudo,
        config.installer.allow_prefixes.join(", "),
        config.tools.installer,
        config.tools.packages.join(", "),
    );

    out.push_str(
        r#"
; Runtimes, provisioned in the order listed. Keys:
;   url     - installer package URL (required)
;   sha256  - pinned checksum; without it the installer is downloaded every run
;   variant - tag appended to the version directory, e.g. 3.13-t
;   version - MAJOR.MINOR, only needed when the URL's file name lacks one
; The last variant listed for a MAJOR.MINOR gets the bare alias.
"#,
    );

    for entry in &config.runtimes {
        write_runtime(&mut out, entry);
    }

    out
}

fn write_runtime(out: &mut String, entry: &RuntimeEntry) {
    let spec = &entry.spec;
    // Writing to a String cannot fail.
    let _ = writeln!(out, "\n[{}{}]", RUNTIME_SECTION_PREFIX, entry.label);
    let _ = writeln!(out, "url = {}", spec.url);
    if let Some(checksum) = spec.checksum() {
        let _ = writeln!(out, "sha256 = {}", checksum);
    }
    if let Some(variant) = spec.variant() {
        let _ = writeln!(out, "variant = {}", variant);
    }
    if let Some(version) = spec.version {
        let _ = writeln!(out, "version = {}", version);
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::RuntimeSpec;

    #[test]
    fn test_default_config_lists_builtin_runtimes() {
        let content = to_config_string(&ConfigFile::default());
        assert!(content.contains("[runtime.3.12]"));
        assert!(content.contains("python-3.13.1-macos11.pkg"));
        assert!(content.contains("allow_prefixes = org.python.Python.PythonFramework,"));
        assert!(!content.contains("sha256 ="));
    }

    #[test]
    fn test_optional_keys_written_when_set() {
        let mut config = ConfigFile::default();
        config.runtimes = vec![RuntimeEntry {
            label: "latest-t".to_string(),
            spec: RuntimeSpec::new("https://example.com/python-latest.pkg")
                .with_variant("t")
                .with_version("3.14".parse().unwrap()),
        }];

        let content = to_config_string(&config);
        assert!(content.contains("[runtime.latest-t]\nurl = https://example.com/python-latest.pkg\nvariant = t\nversion = 3.14\n"));
    }
}
