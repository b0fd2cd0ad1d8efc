//! Host configuration.
//!
//! # Responsibility
//! - Parse the JSON host file describing addon roots, locale, and logging.
//! - Expose the configured locale through `ConfigSource`.
//!
//! # Invariants
//! - Unknown keys are rejected so typos do not silently drop roots.
//! - A blank `language` value counts as unset.

use crate::paths::AddonLayout;
use log::info;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Read-only configuration consumed by the extension loader.
pub trait ConfigSource {
    /// Locale used for extension bundles; `None` means the default locale.
    fn configured_locale(&self) -> Option<String>;
}

/// Top-level host configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Site-specific addon root; `extensions/{module}/{slug}/` is searched below it.
    pub addon_root: PathBuf,
    /// Shared addon root searched after `addon_root`.
    pub shared_addon_root: PathBuf,
    /// Root of the core bundled addons; `extensions/` is searched below it.
    #[serde(default)]
    pub core_addon_root: Option<PathBuf>,
    /// Prefix stripped from derived extension paths.
    #[serde(default)]
    pub web_root: Option<PathBuf>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Logging section of the host file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_level")]
    pub level: String,
    pub dir: PathBuf,
}

fn default_logging_level() -> String {
    crate::logging::default_log_level().to_string()
}

impl HostConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        info!(
            "event=config_load module=config status=ok path={} core_root={}",
            path.display(),
            config.core_addon_root.is_some()
        );
        Ok(config)
    }

    /// Filesystem conventions derived from the configured roots.
    pub fn layout(&self) -> AddonLayout {
        let mut layout = AddonLayout::new(&self.addon_root, &self.shared_addon_root);
        if let Some(core) = &self.core_addon_root {
            layout = layout.with_core_addon_root(core);
        }
        if let Some(web_root) = &self.web_root {
            layout = layout.with_web_root(web_root);
        }
        layout
    }
}

impl ConfigSource for HostConfig {
    fn configured_locale(&self) -> Option<String> {
        self.language
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

/// Fixed locale source, mostly for embedding hosts without a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedLocale(pub Option<String>);

impl ConfigSource for FixedLocale {
    fn configured_locale(&self) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid host config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ConfigSource, HostConfig};
    use std::path::Path;

    #[test]
    fn parses_minimal_config() {
        let config = HostConfig::from_json_str(
            r#"{"addon_root": "/srv/addons", "shared_addon_root": "/srv/shared"}"#,
        )
        .expect("minimal config");

        assert_eq!(config.addon_root, Path::new("/srv/addons"));
        assert!(config.core_addon_root.is_none());
        assert!(config.configured_locale().is_none());
        assert!(config.logging.is_none());
    }

    #[test]
    fn blank_language_counts_as_unset() {
        let config = HostConfig::from_json_str(
            r#"{"addon_root": "/a", "shared_addon_root": "/b", "language": "  "}"#,
        )
        .expect("config");
        assert!(config.configured_locale().is_none());
    }

    #[test]
    fn logging_level_defaults_by_build_mode() {
        let config = HostConfig::from_json_str(
            r#"{"addon_root": "/a", "shared_addon_root": "/b", "logging": {"dir": "/tmp/logs"}}"#,
        )
        .expect("config");
        let logging = config.logging.expect("logging section");
        assert_eq!(logging.level, crate::logging::default_log_level());
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = HostConfig::from_json_str(
            r#"{"addon_root": "/a", "shared_addon_root": "/b", "adon_root": "/c"}"#,
        )
        .expect_err("typo must be rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn layout_carries_optional_roots() {
        let config = HostConfig::from_json_str(
            r#"{
                "addon_root": "/srv/addons",
                "shared_addon_root": "/srv/shared",
                "core_addon_root": "/srv/core",
                "web_root": "/srv",
                "language": "french"
            }"#,
        )
        .expect("config");

        let layout = config.layout();
        assert_eq!(
            layout.core_extensions_path(),
            Some(Path::new("/srv/core/extensions").to_path_buf())
        );
        assert_eq!(layout.web_root(), Some(Path::new("/srv")));
        assert_eq!(config.configured_locale().as_deref(), Some("french"));
    }

    #[test]
    fn from_file_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = HostConfig::from_file(dir.path().join("missing.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
