//! Owned state and collaborators shared by every manager kind.
//!
//! # Responsibility
//! - Own the path resolver, the registry, and the injected collaborators
//!   (module registry, localizer, class loader, configured locale).
//! - Hand out per-kind `ExtensionManager` façades.
//!
//! # Invariants
//! - State is per host value, never process-global; a fresh host starts empty.
//! - A façade borrows the host mutably, so one mutator runs at a time.

use crate::class_loader::ClassLoader;
use crate::config::{ConfigSource, HostConfig};
use crate::error::ExtensionResult;
use crate::kind::{ManagerDefinition, ManagerKind};
use crate::locale::{JsonLocalizer, Localizer};
use crate::manager::ExtensionManager;
use crate::modules::{ModuleRegistry, StaticModuleRegistry};
use crate::paths::{AddonLayout, PathResolver};
use crate::registry::ExtensionRegistry;

/// Extension subsystem of one host application.
pub struct ExtensionHost {
    pub(crate) layout: AddonLayout,
    pub(crate) locale: Option<String>,
    pub(crate) modules: Box<dyn ModuleRegistry>,
    pub(crate) localizer: Box<dyn Localizer>,
    pub(crate) class_loader: Box<dyn ClassLoader>,
    pub(crate) paths: PathResolver,
    pub(crate) registry: ExtensionRegistry,
}

impl ExtensionHost {
    /// Creates a host with no enabled modules, an empty JSON localizer, and
    /// the default locale.
    pub fn new(layout: AddonLayout, class_loader: impl ClassLoader + 'static) -> Self {
        Self {
            layout,
            locale: None,
            modules: Box::new(StaticModuleRegistry::default()),
            localizer: Box::new(JsonLocalizer::new()),
            class_loader: Box::new(class_loader),
            paths: PathResolver::new(),
            registry: ExtensionRegistry::new(),
        }
    }

    pub fn from_config(config: &HostConfig, class_loader: impl ClassLoader + 'static) -> Self {
        Self::new(config.layout(), class_loader).with_config_source(config)
    }

    pub fn with_module_registry(mut self, modules: impl ModuleRegistry + 'static) -> Self {
        self.modules = Box::new(modules);
        self
    }

    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Box::new(localizer);
        self
    }

    pub fn with_config_source(mut self, config: &dyn ConfigSource) -> Self {
        self.locale = config.configured_locale();
        self
    }

    /// Façade for `kind`. The kind still needs `init` before discovery.
    pub fn manager(&mut self, kind: ManagerKind) -> ExtensionManager<'_> {
        ExtensionManager::new(kind, self)
    }

    /// Initializes `definition`'s kind with its namespace and returns its façade.
    pub fn open(
        &mut self,
        definition: &ManagerDefinition,
        preload: bool,
    ) -> ExtensionResult<ExtensionManager<'_>> {
        let mut manager = ExtensionManager::new(definition.kind, self);
        manager.init(definition.module, definition.slug, preload)?;
        Ok(manager)
    }

    pub fn layout(&self) -> &AddonLayout {
        &self.layout
    }

    pub fn configured_locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn class_loader(&self) -> &dyn ClassLoader {
        self.class_loader.as_ref()
    }

    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }
}
