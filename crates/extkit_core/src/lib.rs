//! Extension registry and loader.
//!
//! Discovers extension folders across addon, core, and host-module roots,
//! registers their class identities cheaply, and builds each extension on
//! first use. State is partitioned by `ManagerKind` and owned by an
//! `ExtensionHost`.

pub mod class_loader;
pub mod config;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod host;
pub mod identity;
pub mod kind;
pub mod loader;
pub mod locale;
pub mod logging;
pub mod manager;
pub mod modules;
pub mod paths;
pub mod registry;

pub use class_loader::{
    ClassLoadError, ClassLoader, ConstructedExtension, LoaderBatch, StaticClassLoader,
};
pub use config::{ConfigError, ConfigSource, FixedLocale, HostConfig, LoggingConfig};
pub use discovery::{ExtensionSelection, SENTINEL_ENTRY};
pub use error::{ExtensionError, ExtensionResult};
pub use extension::{
    DisplayMetadata, Extension, ExtensionInfo, ExtensionInstance, ExtensionMetadata,
    ExtensionPaths, MetadataField,
};
pub use host::ExtensionHost;
pub use identity::{class_identity_for, studly, ClassIdentity};
pub use kind::{ManagerDefinition, ManagerKind, Namespace};
pub use locale::{lang_label, JsonLocalizer, LocaleError, Localizer, DEFAULT_LOCALE};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use manager::{ExtensionManager, ManagerState};
pub use modules::{DirectoryModuleRegistry, HostModule, ModuleRegistry, StaticModuleRegistry};
pub use paths::{AddonLayout, PathResolver, RootSet};
pub use registry::{ExtensionCollection, ExtensionRecord, ExtensionRegistry};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
