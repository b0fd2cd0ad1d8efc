//! Search-root bookkeeping per manager kind.
//!
//! # Responsibility
//! - Derive addon, shared-addon, core, and host-module roots from filesystem
//!   conventions when a kind is initialized.
//! - Keep explicit root overrides (`set_addon_path`, `set_module_path`).
//!
//! # Invariants
//! - `init` runs once per kind; later calls change nothing.
//! - Root sets only grow. Upserting an existing key keeps its position.
//! - Paths are not validated here; discovery skips missing folders.

use crate::kind::{ManagerKind, Namespace};
use crate::modules::ModuleRegistry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key of the primary addon root.
pub const ADDON_ROOT_KEY: &str = "addon";
/// Key of the shared-override addon root.
pub const SHARED_ADDON_ROOT_KEY: &str = "addon_alt";

/// Filesystem conventions shared by every kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonLayout {
    addon_root: PathBuf,
    shared_addon_root: PathBuf,
    core_addon_root: Option<PathBuf>,
    web_root: Option<PathBuf>,
}

impl AddonLayout {
    pub fn new(addon_root: impl Into<PathBuf>, shared_addon_root: impl Into<PathBuf>) -> Self {
        Self {
            addon_root: addon_root.into(),
            shared_addon_root: shared_addon_root.into(),
            core_addon_root: None,
            web_root: None,
        }
    }

    pub fn with_core_addon_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.core_addon_root = Some(root.into());
        self
    }

    pub fn with_web_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.web_root = Some(root.into());
        self
    }

    pub fn addon_path(&self, namespace: &Namespace) -> PathBuf {
        self.addon_root.join(namespace.extensions_subdir())
    }

    pub fn shared_addon_path(&self, namespace: &Namespace) -> PathBuf {
        self.shared_addon_root.join(namespace.extensions_subdir())
    }

    /// `{core_addon_root}/extensions`, when a core root is configured.
    pub fn core_extensions_path(&self) -> Option<PathBuf> {
        self.core_addon_root
            .as_ref()
            .map(|root| root.join("extensions"))
    }

    pub fn module_path(&self, module_root: &Path, namespace: &Namespace) -> PathBuf {
        module_root.join(namespace.extensions_subdir())
    }

    pub fn web_root(&self) -> Option<&Path> {
        self.web_root.as_deref()
    }
}

/// Ordered mapping from a symbolic root key to a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootSet {
    entries: Vec<(String, PathBuf)>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`. Replacement keeps the original position.
    pub fn upsert(&mut self, key: impl Into<String>, path: impl Into<PathBuf>) {
        let key = key.into();
        let path = path.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = path,
            None => self.entries.push((key, path)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(key, path)| (key.as_str(), path.as_path()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
struct KindRoots {
    namespace: Option<Namespace>,
    addon: RootSet,
    modules: RootSet,
    core: Option<PathBuf>,
}

/// Per-kind namespace and search roots.
#[derive(Debug, Default)]
pub struct PathResolver {
    kinds: BTreeMap<ManagerKind, KindRoots>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace and seeds roots on first call for `kind`.
    ///
    /// Returns `false` when `kind` was already initialized.
    pub fn init(
        &mut self,
        kind: ManagerKind,
        namespace: Namespace,
        layout: &AddonLayout,
        modules: &dyn ModuleRegistry,
    ) -> bool {
        let roots = self.kinds.entry(kind).or_default();
        if roots.namespace.is_some() {
            return false;
        }

        roots
            .addon
            .upsert(ADDON_ROOT_KEY, layout.addon_path(&namespace));
        roots
            .addon
            .upsert(SHARED_ADDON_ROOT_KEY, layout.shared_addon_path(&namespace));
        if roots.core.is_none() {
            roots.core = layout.core_extensions_path();
        }

        for module in modules.enabled_modules() {
            let candidate = layout.module_path(&module.path, &namespace);
            if candidate.is_dir() {
                roots.modules.upsert(module.slug, candidate);
            }
        }

        roots.namespace = Some(namespace);
        true
    }

    pub fn is_initialized(&self, kind: ManagerKind) -> bool {
        self.namespace(kind).is_some()
    }

    pub fn namespace(&self, kind: ManagerKind) -> Option<&Namespace> {
        self.kinds
            .get(&kind)
            .and_then(|roots| roots.namespace.as_ref())
    }

    pub fn set_addon_path(&mut self, kind: ManagerKind, key: &str, path: impl Into<PathBuf>) {
        self.kinds.entry(kind).or_default().addon.upsert(key, path);
    }

    pub fn set_module_path(&mut self, kind: ManagerKind, key: &str, path: impl Into<PathBuf>) {
        self.kinds.entry(kind).or_default().modules.upsert(key, path);
    }

    pub fn set_core_path(&mut self, kind: ManagerKind, path: impl Into<PathBuf>) {
        self.kinds.entry(kind).or_default().core = Some(path.into());
    }

    /// Addon roots snapshot; empty when `kind` has none.
    pub fn addon_paths(&self, kind: ManagerKind) -> RootSet {
        self.kinds
            .get(&kind)
            .map(|roots| roots.addon.clone())
            .unwrap_or_default()
    }

    /// Host-module roots snapshot; empty when `kind` has none.
    pub fn module_paths(&self, kind: ManagerKind) -> RootSet {
        self.kinds
            .get(&kind)
            .map(|roots| roots.modules.clone())
            .unwrap_or_default()
    }

    pub fn core_path(&self, kind: ManagerKind) -> Option<PathBuf> {
        self.kinds.get(&kind).and_then(|roots| roots.core.clone())
    }
}
