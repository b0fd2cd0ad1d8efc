//! Per-kind façade over an `ExtensionHost`.
//!
//! # Responsibility
//! - Expose the init / discovery / access surface of one extension kind.
//! - Report the kind's lifecycle state.
//!
//! # Invariants
//! - State moves `Uninitialized -> Initialized -> Discovered -> Loaded`.
//!   Names discovered after loading count as not yet loaded.
//! - `get_extension` is the single read path and memoizes.

use crate::discovery::{self, ExtensionSelection};
use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::ExtensionInstance;
use crate::host::ExtensionHost;
use crate::identity::{class_identity_for, ClassIdentity};
use crate::kind::{ManagerKind, Namespace};
use crate::loader::load_extension;
use crate::paths::RootSet;
use crate::registry::{ExtensionCollection, ExtensionRecord};
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lifecycle state of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ManagerState {
    Uninitialized,
    Initialized,
    Discovered,
    PartiallyLoaded,
    FullyLoaded,
}

/// Extension manager for one kind.
pub struct ExtensionManager<'h> {
    kind: ManagerKind,
    host: &'h mut ExtensionHost,
}

impl<'h> ExtensionManager<'h> {
    pub(crate) fn new(kind: ManagerKind, host: &'h mut ExtensionHost) -> Self {
        Self { kind, host }
    }

    pub fn kind(&self) -> ManagerKind {
        self.kind
    }

    /// Sets the namespace and search roots on first call; later calls do
    /// nothing. `preload` only applies to the first call.
    ///
    /// Returns whether this call initialized the kind.
    pub fn init(&mut self, module: &str, slug: &str, preload: bool) -> ExtensionResult<bool> {
        let host = &mut *self.host;
        let initialized = host.paths.init(
            self.kind,
            Namespace::new(module, slug),
            &host.layout,
            host.modules.as_ref(),
        );
        if !initialized {
            debug!(
                "event=kind_init module=manager status=skipped kind={}",
                self.kind
            );
            return Ok(false);
        }

        info!(
            "event=kind_init module=manager status=ok kind={} namespace={}/{} addon_roots={} module_roots={}",
            self.kind,
            module,
            slug,
            host.paths.addon_paths(self.kind).len(),
            host.paths.module_paths(self.kind).len()
        );
        if preload {
            self.preload()?;
        }
        Ok(true)
    }

    pub fn namespace(&self) -> Option<&Namespace> {
        self.host.paths.namespace(self.kind)
    }

    pub fn state(&self) -> ManagerState {
        if !self.host.paths.is_initialized(self.kind) {
            return ManagerState::Uninitialized;
        }
        let classes = self.host.registry.class_count(self.kind);
        let instances = self.host.registry.instance_count(self.kind);
        match (classes, instances) {
            (0, 0) => ManagerState::Initialized,
            (_, 0) => ManagerState::Discovered,
            (classes, instances) if instances < classes => ManagerState::PartiallyLoaded,
            _ => ManagerState::FullyLoaded,
        }
    }

    pub fn set_addon_path(&mut self, key: &str, path: impl Into<PathBuf>) {
        self.host.paths.set_addon_path(self.kind, key, path);
    }

    pub fn set_module_path(&mut self, key: &str, path: impl Into<PathBuf>) {
        self.host.paths.set_module_path(self.kind, key, path);
    }

    /// Overrides the core root searched first by `preload`.
    pub fn set_core_path(&mut self, path: impl Into<PathBuf>) {
        self.host.paths.set_core_path(self.kind, path);
    }

    pub fn addon_paths(&self) -> RootSet {
        self.host.paths.addon_paths(self.kind)
    }

    pub fn module_paths(&self) -> RootSet {
        self.host.paths.module_paths(self.kind)
    }

    pub fn core_path(&self) -> Option<PathBuf> {
        self.host.paths.core_path(self.kind)
    }

    /// Class identity `extension` maps to; `None` before `init`.
    pub fn class_identity(&self, extension: &str) -> Option<ClassIdentity> {
        self.namespace()
            .map(|namespace| class_identity_for(namespace, extension))
    }

    pub fn classes(&self) -> BTreeMap<String, ClassIdentity> {
        self.host.registry.classes(self.kind)
    }

    pub fn records(&self) -> Vec<ExtensionRecord> {
        self.host.registry.records(self.kind)
    }

    pub fn register_slug_class<I, S>(&mut self, names: I) -> ExtensionResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let namespace = self
            .namespace()
            .cloned()
            .ok_or(ExtensionError::KindNotInitialized(self.kind))?;
        self.host
            .registry
            .register_slug_class(self.kind, &namespace, names);
        Ok(())
    }

    pub fn register_folder_extensions(
        &mut self,
        folder: impl AsRef<Path>,
        selection: impl Into<ExtensionSelection>,
        preload: bool,
    ) -> ExtensionResult<Vec<String>> {
        discovery::register_folder_extensions(
            self.host,
            self.kind,
            folder.as_ref(),
            selection.into(),
            preload,
        )
    }

    /// Discovers every addon root.
    pub fn register_extensions(&mut self, preload: bool) -> ExtensionResult<()> {
        let roots = self.addon_paths();
        discovery::register_root_set(self.host, self.kind, &roots, preload)?;
        Ok(())
    }

    /// Discovers every host-module root.
    pub fn register_module_extensions(&mut self, preload: bool) -> ExtensionResult<()> {
        let roots = self.module_paths();
        discovery::register_root_set(self.host, self.kind, &roots, preload)?;
        Ok(())
    }

    pub fn preload(&mut self) -> ExtensionResult<()> {
        discovery::preload(self.host, self.kind)
    }

    /// Cached instance of `extension`, loading it on first access.
    pub fn get_extension(
        &mut self,
        extension: &str,
    ) -> ExtensionResult<Option<Arc<ExtensionInstance>>> {
        load_extension(self.host, self.kind, extension)
    }

    /// Instances loaded so far. Partial or empty results are expected.
    pub fn registered_extensions(&self) -> ExtensionCollection {
        self.host.registry.instances(self.kind)
    }

    /// Every discoverable instance; runs `preload` first.
    pub fn all_extensions(&mut self) -> ExtensionResult<ExtensionCollection> {
        self.preload()?;
        Ok(self.registered_extensions())
    }
}
