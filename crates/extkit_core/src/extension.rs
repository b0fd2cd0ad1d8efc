//! Extension contract and the live instance wrapper.
//!
//! # Responsibility
//! - Define what every loadable extension implements.
//! - Hold the convention-derived data (paths, localized labels, type tag)
//!   attached to an extension when it is loaded.
//!
//! # Invariants
//! - Metadata preset by the extension wins over localized fallbacks.
//! - `Extension::loaded` runs once, before the instance is shared.

use crate::identity::ClassIdentity;
use crate::kind::ManagerKind;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Contract implemented by every loadable extension.
pub trait Extension: Send + Sync {
    /// Display metadata the extension sets for itself. Unset fields are
    /// filled from the localization subsystem.
    fn preset_metadata(&self) -> ExtensionMetadata {
        ExtensionMetadata::default()
    }

    /// Post-construction hook. Runs exactly once per kind and name.
    fn loaded(&mut self, _info: &ExtensionInfo) {}

    fn as_any(&self) -> &dyn Any;
}

/// Optional display fields an extension may preset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionMetadata {
    pub name: Option<String>,
    pub plural: Option<String>,
    pub description: Option<String>,
}

impl ExtensionMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Fills every unset field from `fallback`. Set fields are kept untouched
    /// and `fallback` is not consulted for them.
    pub fn fill_if_absent(
        self,
        mut fallback: impl FnMut(MetadataField) -> String,
    ) -> DisplayMetadata {
        DisplayMetadata {
            name: self.name.unwrap_or_else(|| fallback(MetadataField::Name)),
            plural: self.plural.unwrap_or_else(|| fallback(MetadataField::Plural)),
            description: self
                .description
                .unwrap_or_else(|| fallback(MetadataField::Description)),
        }
    }
}

/// Localizable display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Name,
    Plural,
    Description,
}

impl MetadataField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Plural => "plural",
            Self::Description => "description",
        }
    }
}

/// Resolved display fields of a loaded extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMetadata {
    pub name: String,
    pub plural: String,
    pub description: String,
}

/// Asset locations derived from an extension's root folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPaths {
    pub root: PathBuf,
    pub views: PathBuf,
    pub img: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
}

impl ExtensionPaths {
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            views: root.join("views"),
            img: root.join("img"),
            css: root.join("css"),
            js: root.join("js"),
            root,
        }
    }
}

/// Everything the loader attaches to an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionInfo {
    /// Extension name as discovered (folder name).
    pub name: String,
    pub kind: ManagerKind,
    pub class_identity: ClassIdentity,
    /// Slug of the owning kind. Same-named extensions of different kinds
    /// stay distinct through this tag.
    pub extension_type: String,
    pub paths: ExtensionPaths,
    pub metadata: DisplayMetadata,
    /// Stamped once when the instance is built.
    pub load_id: Uuid,
}

/// Live, loaded extension.
pub struct ExtensionInstance {
    info: ExtensionInfo,
    extension: Box<dyn Extension>,
}

impl ExtensionInstance {
    pub(crate) fn new(info: ExtensionInfo, extension: Box<dyn Extension>) -> Self {
        Self { info, extension }
    }

    pub fn info(&self) -> &ExtensionInfo {
        &self.info
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn display_name(&self) -> &str {
        &self.info.metadata.name
    }

    pub fn plural(&self) -> &str {
        &self.info.metadata.plural
    }

    pub fn description(&self) -> &str {
        &self.info.metadata.description
    }

    pub fn extension_type(&self) -> &str {
        &self.info.extension_type
    }

    pub fn class_identity(&self) -> &ClassIdentity {
        &self.info.class_identity
    }

    pub fn path(&self) -> &Path {
        &self.info.paths.root
    }

    pub fn path_views(&self) -> &Path {
        &self.info.paths.views
    }

    pub fn path_img(&self) -> &Path {
        &self.info.paths.img
    }

    pub fn path_css(&self) -> &Path {
        &self.info.paths.css
    }

    pub fn path_js(&self) -> &Path {
        &self.info.paths.js
    }

    pub fn load_id(&self) -> Uuid {
        self.info.load_id
    }

    pub fn extension(&self) -> &dyn Extension {
        self.extension.as_ref()
    }

    /// Borrows the concrete extension type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.extension.as_any().downcast_ref::<T>()
    }
}

impl Debug for ExtensionInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionInstance")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}
