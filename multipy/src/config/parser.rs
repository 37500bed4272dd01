//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::{ConfigFile, ConfigFileError, RuntimeEntry};
use crate::spec::{RuntimeSpec, RuntimeVersion, VARIANT_SEPARATOR};

/// Prefix of per-runtime section names.
pub(super) const RUNTIME_SECTION_PREFIX: &str = "runtime.";

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [provision] section
    if let Some(section) = ini.section(Some("provision")) {
        if let Some(v) = non_empty(section.get("root")) {
            config.provision.root = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("cache_dir")) {
            config.provision.cache_dir = expand_tilde(v);
        }
        if let Some(v) = non_empty(section.get("target")) {
            config.provision.target = v.to_string();
        }
    }

    // [installer] section
    if let Some(section) = ini.section(Some("installer")) {
        if let Some(v) = section.get("sudo") {
            config.installer.sudo = parse_bool(v).ok_or_else(|| ConfigFileError::InvalidValue {
                section: "installer".to_string(),
                key: "sudo".to_string(),
                value: v.to_string(),
                reason: "must be true or false".to_string(),
            })?;
        }
        if let Some(v) = section.get("allow_prefixes") {
            let prefixes = parse_list(v);
            if prefixes.is_empty() {
                return Err(ConfigFileError::InvalidValue {
                    section: "installer".to_string(),
                    key: "allow_prefixes".to_string(),
                    value: v.to_string(),
                    reason: "must list at least one choice identifier prefix".to_string(),
                });
            }
            config.installer.allow_prefixes = prefixes;
        }
    }

    // [tools] section
    if let Some(section) = ini.section(Some("tools")) {
        if let Some(v) = non_empty(section.get("installer")) {
            config.tools.installer = v.to_string();
        }
        if let Some(v) = section.get("packages") {
            config.tools.packages = parse_list(v);
        }
    }

    // [runtime.<label>] sections, in file order
    let mut runtimes = Vec::new();
    for (name, section) in ini.iter() {
        let Some(label) = name.and_then(|n| n.strip_prefix(RUNTIME_SECTION_PREFIX)) else {
            continue;
        };
        runtimes.push(parse_runtime(label, section)?);
    }
    if !runtimes.is_empty() {
        config.runtimes = runtimes;
    }

    Ok(config)
}

fn parse_runtime(label: &str, section: &ini::Properties) -> Result<RuntimeEntry, ConfigFileError> {
    let section_name = format!("{}{}", RUNTIME_SECTION_PREFIX, label);
    let invalid = |key: &str, value: &str, reason: &str| ConfigFileError::InvalidValue {
        section: section_name.clone(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let url = non_empty(section.get("url"))
        .ok_or_else(|| invalid("url", "", "every runtime needs an installer url"))?;
    let mut spec = RuntimeSpec::new(url);

    if let Some(v) = non_empty(section.get("sha256")) {
        if v.len() != 64 || !v.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("sha256", v, "must be 64 hexadecimal digits"));
        }
        spec = spec.with_checksum(v);
    }

    if let Some(v) = non_empty(section.get("variant")) {
        if v.contains(VARIANT_SEPARATOR) || v.contains('/') {
            return Err(invalid(
                "variant",
                v,
                "must not contain '-' or '/'",
            ));
        }
        spec = spec.with_variant(v);
    }

    if let Some(v) = non_empty(section.get("version")) {
        let version: RuntimeVersion = v
            .parse()
            .map_err(|_| invalid("version", v, "expected MAJOR.MINOR, e.g. 3.13"))?;
        spec = spec.with_version(version);
    }

    if spec.runtime_version().is_err() {
        return Err(invalid(
            "url",
            url,
            "no MAJOR.MINOR in the file name; set version explicitly",
        ));
    }

    Ok(RuntimeEntry {
        label: label.to_string(),
        spec,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Split a comma-separated list, dropping empty items.
pub(super) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean value from a config string.
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
