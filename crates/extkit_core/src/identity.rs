//! Class identity derivation.
//!
//! A class identity is the canonical address of an extension implementation:
//! `Extension::{Module}::{Slug}::{Name}` with every segment studly-cased.
//! The same string doubles as the relative source layout below an extension's
//! `src/` folder (`Extension/{Module}/{Slug}/{Name}.rs`).

use crate::kind::Namespace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Leading segment shared by every class identity.
pub const CLASS_IDENTITY_PREFIX: &str = "Extension";
/// Separator between identity segments.
pub const CLASS_IDENTITY_SEPARATOR: &str = "::";
/// File extension of an implementation source file.
const SOURCE_FILE_EXTENSION: &str = "rs";

static WORD_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_\-]+").expect("valid word separator regex"));

/// Canonical identifier of one extension implementation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassIdentity(String);

impl ClassIdentity {
    /// Shorthand for [`class_identity_for`].
    pub fn for_extension(namespace: &Namespace, extension: &str) -> Self {
        class_identity_for(namespace, extension)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(CLASS_IDENTITY_SEPARATOR)
    }

    /// Source file path relative to the extension's `src/` folder.
    pub fn relative_source_path(&self) -> PathBuf {
        let mut path: PathBuf = self.segments().collect();
        path.set_extension(SOURCE_FILE_EXTENSION);
        path
    }
}

impl Display for ClassIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps `(module, slug, extension)` to its class identity. Pure.
pub fn class_identity_for(namespace: &Namespace, extension: &str) -> ClassIdentity {
    let segments = [
        CLASS_IDENTITY_PREFIX.to_string(),
        studly(&namespace.module),
        studly(&namespace.slug),
        studly(extension),
    ];
    ClassIdentity(segments.join(CLASS_IDENTITY_SEPARATOR))
}

/// `field_types` -> `FieldTypes`, `my-widget` -> `MyWidget`.
///
/// Only the first letter of each word changes case; the rest is kept as is.
pub fn studly(value: &str) -> String {
    WORD_SEPARATOR_RE
        .split(value.trim())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
