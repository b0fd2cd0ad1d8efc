//! Localization capability and the JSON-backed default implementation.
//!
//! # Responsibility
//! - Load per-extension locale bundles from `{root}/language/{locale}/`.
//! - Resolve `lang:`-prefixed labels to display strings.
//!
//! # Invariants
//! - `resolve` never fails; unknown keys resolve to the key itself.
//! - Later bundles override earlier ones for the same key.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Locale used when none is configured or the configured one is missing.
pub const DEFAULT_LOCALE: &str = "english";
/// Folder below an extension root that holds locale sub-folders.
pub const LANGUAGE_DIR: &str = "language";

static LANG_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^lang:(.+)$").expect("valid lang label regex"));

/// Localization subsystem consumed by the extension loader.
pub trait Localizer {
    /// Loads `bundle` for `locale` from below `dir`.
    fn load_locale_file(&mut self, bundle: &str, locale: &str, dir: &Path)
        -> Result<(), LocaleError>;

    /// Resolves `key`; missing keys yield a deterministic placeholder.
    fn resolve(&self, key: &str) -> String;
}

/// Resolves `lang:{key}` labels through `localizer`; other labels pass through.
pub fn lang_label(localizer: &dyn Localizer, label: &str) -> String {
    match LANG_LABEL_RE.captures(label) {
        Some(captures) => localizer.resolve(&captures[1]),
        None => label.to_string(),
    }
}

/// Locale bundle errors. Callers treat these as non-fatal.
#[derive(Debug)]
pub enum LocaleError {
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for LocaleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "locale file not found: {}", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read locale file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid locale file `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for LocaleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Localizer reading flat JSON string maps from
/// `{dir}/language/{locale}/{bundle}.json`.
#[derive(Debug, Clone, Default)]
pub struct JsonLocalizer {
    lines: BTreeMap<String, String>,
    loaded: Vec<PathBuf>,
}

impl JsonLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one line directly, e.g. host-level strings.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.lines.insert(key.into(), value.into());
    }

    /// Files loaded so far, in load order.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded
    }

    pub fn bundle_path(bundle: &str, locale: &str, dir: &Path) -> PathBuf {
        dir.join(LANGUAGE_DIR)
            .join(locale)
            .join(format!("{bundle}.json"))
    }
}

impl Localizer for JsonLocalizer {
    fn load_locale_file(
        &mut self,
        bundle: &str,
        locale: &str,
        dir: &Path,
    ) -> Result<(), LocaleError> {
        let path = Self::bundle_path(bundle, locale, dir);
        if !path.is_file() {
            return Err(LocaleError::NotFound(path));
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| LocaleError::Io {
            path: path.clone(),
            source,
        })?;
        let lines: BTreeMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| LocaleError::Parse {
                path: path.clone(),
                source,
            })?;

        debug!(
            "event=locale_load module=locale status=ok bundle={} locale={} lines={}",
            bundle,
            locale,
            lines.len()
        );
        self.lines.extend(lines);
        self.loaded.push(path);
        Ok(())
    }

    fn resolve(&self, key: &str) -> String {
        self.lines
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{lang_label, JsonLocalizer, LocaleError, Localizer};

    #[test]
    fn lang_label_resolves_prefixed_keys_only() {
        let mut localizer = JsonLocalizer::new();
        localizer.insert("text:field_types.name", "Text");

        assert_eq!(lang_label(&localizer, "lang:text:field_types.name"), "Text");
        assert_eq!(lang_label(&localizer, "Plain Label"), "Plain Label");
    }

    #[test]
    fn missing_key_resolves_to_itself() {
        let localizer = JsonLocalizer::new();
        assert_eq!(
            lang_label(&localizer, "lang:ghost:widgets.plural"),
            "ghost:widgets.plural"
        );
    }

    #[test]
    fn loads_bundle_from_language_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let locale_dir = dir.path().join("language").join("english");
        std::fs::create_dir_all(&locale_dir).expect("locale dir");
        std::fs::write(
            locale_dir.join("email_field_types_lang.json"),
            r#"{"email:field_types.name": "Email"}"#,
        )
        .expect("write bundle");

        let mut localizer = JsonLocalizer::new();
        localizer
            .load_locale_file("email_field_types_lang", "english", dir.path())
            .expect("bundle should load");

        assert_eq!(localizer.resolve("email:field_types.name"), "Email");
        assert_eq!(localizer.loaded_files().len(), 1);
    }

    #[test]
    fn reports_missing_and_malformed_bundles() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut localizer = JsonLocalizer::new();

        let missing = localizer
            .load_locale_file("nope_lang", "english", dir.path())
            .expect_err("missing bundle");
        assert!(matches!(missing, LocaleError::NotFound(_)));

        let locale_dir = dir.path().join("language").join("english");
        std::fs::create_dir_all(&locale_dir).expect("locale dir");
        std::fs::write(locale_dir.join("broken_lang.json"), "[1, 2").expect("write bundle");
        let broken = localizer
            .load_locale_file("broken_lang", "english", dir.path())
            .expect_err("malformed bundle");
        assert!(matches!(broken, LocaleError::Parse { .. }));
    }
}
