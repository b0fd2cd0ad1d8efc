//! Folder discovery: cheap, eager registration of extension names.
//!
//! # Responsibility
//! - Turn folder entries (or explicit names) into registered class identities.
//! - Tell the class loader where each identity's source lives, one batch per folder.
//! - Optionally force-load what was found.
//!
//! # Invariants
//! - Sentinel and hidden entries are never registered.
//! - A missing folder registers nothing and is not an error.
//! - Re-registering a name from another folder overrides it and is logged.

use crate::class_loader::LoaderBatch;
use crate::error::{ExtensionError, ExtensionResult};
use crate::host::ExtensionHost;
use crate::identity::class_identity_for;
use crate::kind::ManagerKind;
use crate::loader::load_extension;
use crate::paths::RootSet;
use crate::registry::ExtensionRecord;
use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Placeholder file found in extension folders that is not an extension.
pub const SENTINEL_ENTRY: &str = "index.html";
/// Sub-folder of an extension that holds its implementation source.
pub const SOURCE_DIR: &str = "src";

/// Which entries of a folder to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSelection {
    /// Every immediate sub-folder.
    Discover,
    /// Only these names (base names are taken).
    Names(Vec<String>),
}

impl From<&str> for ExtensionSelection {
    fn from(value: &str) -> Self {
        Self::Names(vec![value.to_string()])
    }
}

impl From<String> for ExtensionSelection {
    fn from(value: String) -> Self {
        Self::Names(vec![value])
    }
}

impl From<Vec<String>> for ExtensionSelection {
    fn from(value: Vec<String>) -> Self {
        Self::Names(value)
    }
}

impl From<&[&str]> for ExtensionSelection {
    fn from(value: &[&str]) -> Self {
        Self::Names(value.iter().map(|name| name.to_string()).collect())
    }
}

/// Base name of `entry` when it can be an extension.
pub fn extension_name(entry: &str) -> Option<String> {
    let base = Path::new(entry.trim()).file_name()?.to_str()?;
    if base == SENTINEL_ENTRY || base.starts_with('.') {
        return None;
    }
    Some(base.to_string())
}

fn list_subfolders(folder: &Path) -> ExtensionResult<Vec<String>> {
    let to_error = |source| ExtensionError::Discovery {
        folder: folder.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(err) => return Err(to_error(err)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(to_error)?;
        if !entry.file_type().map_err(to_error)?.is_dir() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => debug!(
                "event=folder_discovery module=discovery status=skipped folder={} entry={} reason=non_utf8_name",
                folder.display(),
                entry.file_name().to_string_lossy()
            ),
        }
    }
    names.sort();
    Ok(names)
}

/// Registers the extensions found in `folder` for `kind`.
///
/// Returns the registered names in discovery order.
pub(crate) fn register_folder_extensions(
    host: &mut ExtensionHost,
    kind: ManagerKind,
    folder: &Path,
    selection: ExtensionSelection,
    preload: bool,
) -> ExtensionResult<Vec<String>> {
    let namespace = host
        .paths
        .namespace(kind)
        .cloned()
        .ok_or(ExtensionError::KindNotInitialized(kind))?;
    let started_at = Instant::now();

    let candidates = match selection {
        ExtensionSelection::Discover => list_subfolders(folder)?,
        ExtensionSelection::Names(names) => names,
    };
    let mut names: Vec<String> = Vec::with_capacity(candidates.len());
    for name in candidates.iter().filter_map(|entry| extension_name(entry)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    if names.is_empty() {
        debug!(
            "event=folder_discovery module=discovery status=empty kind={} folder={}",
            kind,
            folder.display()
        );
        return Ok(names);
    }

    let mut batch = LoaderBatch::new(folder);
    for name in &names {
        let class_identity = class_identity_for(&namespace, name);
        let source_dir: PathBuf = folder.join(name).join(SOURCE_DIR);
        let replaced = host.registry.register_record(
            kind,
            ExtensionRecord {
                name: name.clone(),
                class_identity: class_identity.clone(),
                source_dir: Some(source_dir.clone()),
            },
        );
        if let Some(previous) = replaced.and_then(|record| record.source_dir) {
            if previous != source_dir {
                warn!(
                    "event=extension_override module=discovery status=ok kind={} extension={} previous={} current={} cached={}",
                    kind,
                    name,
                    previous.display(),
                    source_dir.display(),
                    host.registry.instance(kind, name).is_some()
                );
            }
        }
        batch.register_source_location(class_identity, source_dir);
    }
    host.class_loader.activate(batch);

    info!(
        "event=folder_discovery module=discovery status=ok kind={} folder={} count={} preload={} duration_ms={}",
        kind,
        folder.display(),
        names.len(),
        preload,
        started_at.elapsed().as_millis()
    );

    if preload {
        for name in &names {
            load_extension(host, kind, name)?;
        }
    }
    Ok(names)
}

/// Discovers every root of `roots` in order.
///
/// Returns every registered name, once, in first-seen order.
pub(crate) fn register_root_set(
    host: &mut ExtensionHost,
    kind: ManagerKind,
    roots: &RootSet,
    preload: bool,
) -> ExtensionResult<Vec<String>> {
    let mut discovered = Vec::new();
    for (_, path) in roots.iter() {
        let names =
            register_folder_extensions(host, kind, path, ExtensionSelection::Discover, preload)?;
        merge_names(&mut discovered, names);
    }
    Ok(discovered)
}

fn merge_names(into: &mut Vec<String>, names: Vec<String>) {
    for name in names {
        if !into.contains(&name) {
            into.push(name);
        }
    }
}

/// Discovers the core root, addon roots, then module roots, and loads every
/// discovered name afterwards so the last discovered root wins.
pub(crate) fn preload(host: &mut ExtensionHost, kind: ManagerKind) -> ExtensionResult<()> {
    if !host.paths.is_initialized(kind) {
        return Err(ExtensionError::KindNotInitialized(kind));
    }

    let mut discovered = Vec::new();
    if let Some(core) = host.paths.core_path(kind) {
        let names =
            register_folder_extensions(host, kind, &core, ExtensionSelection::Discover, false)?;
        merge_names(&mut discovered, names);
    }
    let addon = host.paths.addon_paths(kind);
    let names = register_root_set(host, kind, &addon, false)?;
    merge_names(&mut discovered, names);
    let modules = host.paths.module_paths(kind);
    let names = register_root_set(host, kind, &modules, false)?;
    merge_names(&mut discovered, names);

    // Names registered without a folder (register_slug_class) are left alone.
    for name in &discovered {
        load_extension(host, kind, name)?;
    }
    Ok(())
}
