//! Manager kind identity and per-kind namespace.
//!
//! # Responsibility
//! - Name one extension category (`field_types`, `widgets`, ...) with a stable key.
//! - Carry the `(module, slug)` pair that scopes class identities and locale keys.
//!
//! # Invariants
//! - Every per-kind map in the crate is keyed by `ManagerKind`.
//! - A kind's `Namespace` is set once and never replaced.

use std::fmt::{Display, Formatter};

/// Identity of one concrete extension manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ManagerKind(&'static str);

impl ManagerKind {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for ManagerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// `(module, slug)` pair owned by one kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Host module the extensions belong to, e.g. `streams_core`.
    pub module: String,
    /// Extension category inside the module, e.g. `field_types`.
    pub slug: String,
}

impl Namespace {
    pub fn new(module: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            slug: slug.into(),
        }
    }

    /// Relative `extensions/{module}/{slug}` folder used under every search root.
    pub fn extensions_subdir(&self) -> String {
        format!("extensions/{}/{}", self.module, self.slug)
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.module, self.slug)
    }
}

/// Static description of a concrete manager: its kind plus default namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerDefinition {
    pub kind: ManagerKind,
    pub module: &'static str,
    pub slug: &'static str,
}

impl ManagerDefinition {
    pub const fn new(kind: ManagerKind, module: &'static str, slug: &'static str) -> Self {
        Self { kind, module, slug }
    }

    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.module, self.slug)
    }
}
