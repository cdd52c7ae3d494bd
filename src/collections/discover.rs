//! Filesystem collection discovery.
//!
//! # Responsibilities
//! - Scan `collections_root`; every immediate subdirectory is one
//!   collection
//! - Load the optional `<dir>/config.yaml` as the base mapping
//! - Resolve `index_paths` / `archive_paths` (required, fatal when
//!   missing) and `static_path` (optional, warning) against the
//!   global `paths` table
//! - Collect per-collection template overrides without clobbering
//!   explicit values
//!
//! # Design Decisions
//! - Resolved directories are stored absolute with a trailing
//!   separator so downstream consumers can treat them as prefixes
//! - Static routes are recorded only after both required paths
//!   validated, so a failing collection leaks nothing
//! - A configured `collections_root` that cannot be listed is fatal;
//!   an unset one simply yields no collections

use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use serde_yaml::{Mapping, Value};

use crate::config::{load_yaml_config, ConfigError, LayeredConfig, Result};

/// Everything a scan produced, returned by value for the caller to
/// merge.
#[derive(Debug, Default)]
pub struct DiscoveredCollections {
    /// Collection name → resolved base mapping, in lexicographic
    /// directory order.
    pub collections: Vec<(String, Mapping)>,
    /// `static/<name>` → absolute asset directory.
    pub static_routes: Vec<(String, String)>,
}

/// Scan `collections_root` for collection directories.
pub fn scan_collections(config: &LayeredConfig) -> Result<DiscoveredCollections> {
    let mut discovered = DiscoveredCollections::default();

    let Some(root) = config.get_str("collections_root") else {
        return Ok(discovered);
    };
    let root = Path::new(root);

    let mut dirs: Vec<(String, PathBuf)> = fs::read_dir(root)
        .map_err(|source| ConfigError::Io {
            path: root.to_path_buf(),
            source,
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some((name, entry.path()))
        })
        .collect();
    dirs.sort();

    for (name, dir) in dirs {
        let (coll, static_path) = load_collection_dir(config, &dir, &name)?;

        if let Some(path) = static_path {
            discovered.static_routes.push((format!("static/{name}"), path));
        }
        discovered.collections.push((name, coll));
    }

    Ok(discovered)
}

/// Resolve one collection directory into its base mapping plus an
/// optional static asset path.
fn load_collection_dir(
    config: &LayeredConfig,
    dir: &Path,
    name: &str,
) -> Result<(Mapping, Option<String>)> {
    let config_file = dir.join("config.yaml");
    let mut coll = if config_file.is_file() {
        load_yaml_config(&config_file).map_err(|e| ConfigError::for_collection(name, e))?
    } else {
        Mapping::new()
    };

    let paths = config.get_mapping("paths");

    resolve_dir(&mut coll, dir, name, "index_paths", paths, true)?;
    resolve_dir(&mut coll, dir, name, "archive_paths", paths, true)?;

    // registered last, after the required paths validated
    let static_path = resolve_dir(&mut coll, dir, name, "static_path", paths, false)?;

    apply_template_overrides(&mut coll, dir, paths);

    Ok((coll, static_path))
}

/// Resolve one named directory key. An explicit value in the
/// collection config always wins and is left untouched. Returns the
/// resolved path when this call set it.
fn resolve_dir(
    coll: &mut Mapping,
    dir: &Path,
    name: &str,
    key: &'static str,
    paths: Option<&Mapping>,
    required: bool,
) -> Result<Option<String>> {
    if coll.contains_key(key) {
        return Ok(None);
    }

    let Some(segment) = paths.and_then(|p| p.get(key)).and_then(Value::as_str) else {
        if required {
            return Err(ConfigError::MissingPathKey {
                collection: name.to_string(),
                key,
            });
        }
        tracing::warn!(collection = %name, key, "no path segment configured");
        return Ok(None);
    };

    let full = dir.join(segment);
    if full.is_dir() {
        let rendered = directory_prefix(&full)?;
        coll.insert(key.into(), rendered.clone().into());
        return Ok(Some(rendered));
    }

    if required {
        return Err(ConfigError::MissingDir {
            collection: name.to_string(),
            key,
            dir: full,
        });
    }

    tracing::warn!(collection = %name, key, dir = %full.display(), "optional directory missing");
    Ok(None)
}

/// For every configured template file that exists under the
/// collection's templates directory, set its logical name unless the
/// collection already did.
fn apply_template_overrides(coll: &mut Mapping, dir: &Path, paths: Option<&Mapping>) {
    let Some(paths) = paths else { return };
    let Some(templates_dir) = paths.get("templates_dir").and_then(Value::as_str) else {
        return;
    };
    let Some(files) = paths.get("template_files").and_then(Value::as_mapping) else {
        return;
    };

    let templates_dir = dir.join(templates_dir);
    for (tname, tfile) in files {
        let (Some(tname), Some(tfile)) = (tname.as_str(), tfile.as_str()) else {
            continue;
        };
        if coll.contains_key(tname) {
            continue;
        }

        let full = templates_dir.join(tfile);
        if full.is_file() {
            coll.insert(tname.into(), full.to_string_lossy().into_owned().into());
        }
    }
}

/// Absolute form with a trailing separator.
fn directory_prefix(dir: &Path) -> Result<String> {
    let absolute = std::path::absolute(dir).map_err(|source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut rendered = absolute.to_string_lossy().into_owned();
    if !rendered.ends_with(MAIN_SEPARATOR) {
        rendered.push(MAIN_SEPARATOR);
    }
    Ok(rendered)
}
