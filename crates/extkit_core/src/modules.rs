//! Host module registry capability.

use log::warn;
use std::path::{Path, PathBuf};

/// One enabled host module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostModule {
    pub slug: String,
    pub path: PathBuf,
}

impl HostModule {
    pub fn new(slug: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            slug: slug.into(),
            path: path.into(),
        }
    }
}

/// Enumerates installed and enabled host modules.
pub trait ModuleRegistry {
    fn enabled_modules(&self) -> Vec<HostModule>;
}

/// Fixed module list.
#[derive(Debug, Clone, Default)]
pub struct StaticModuleRegistry {
    modules: Vec<HostModule>,
}

impl StaticModuleRegistry {
    pub fn new(modules: Vec<HostModule>) -> Self {
        Self { modules }
    }
}

impl ModuleRegistry for StaticModuleRegistry {
    fn enabled_modules(&self) -> Vec<HostModule> {
        self.modules.clone()
    }
}

/// Treats every visible sub-folder of one directory as an enabled module.
#[derive(Debug, Clone)]
pub struct DirectoryModuleRegistry {
    root: PathBuf,
}

impl DirectoryModuleRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ModuleRegistry for DirectoryModuleRegistry {
    fn enabled_modules(&self) -> Vec<HostModule> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    "event=module_scan module=modules status=error root={} error={}",
                    self.root.display(),
                    err
                );
                return vec![];
            }
        };

        let mut modules: Vec<HostModule> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| {
                let slug = entry.file_name().to_str()?.to_string();
                if slug.starts_with('.') {
                    return None;
                }
                Some(HostModule::new(slug, entry.path()))
            })
            .collect();
        modules.sort_by(|a, b| a.slug.cmp(&b.slug));
        modules
    }
}
