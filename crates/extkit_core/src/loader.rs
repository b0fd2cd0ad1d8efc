//! Extension loading: construct, enrich, hook, memoize.
//!
//! # Responsibility
//! - Build a registered extension through the class loader.
//! - Derive its asset paths from its implementation source location.
//! - Load its locale bundle and fill unset display metadata.
//! - Run the `loaded` hook once and store the shared instance.
//!
//! # Invariants
//! - Empty or unregistered names yield `Ok(None)`, never an error.
//! - A cached instance is returned as is; nothing above runs twice.
//! - Locale failures are logged and ignored.

use crate::class_loader::ConstructedExtension;
use crate::error::{ExtensionError, ExtensionResult};
use crate::extension::{ExtensionInfo, ExtensionInstance, ExtensionPaths, MetadataField};
use crate::host::ExtensionHost;
use crate::kind::ManagerKind;
use crate::locale::{lang_label, Localizer, DEFAULT_LOCALE, LANGUAGE_DIR};
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Parent levels between an implementation source file and its extension
/// root: `{root}/src/Extension/{Module}/{Slug}/{Name}.rs`.
pub const EXTENSION_ROOT_DEPTH: usize = 5;

/// Extension root for `source_file`.
pub fn extension_root(source_file: &Path) -> ExtensionResult<PathBuf> {
    source_file
        .ancestors()
        .nth(EXTENSION_ROOT_DEPTH)
        .filter(|root| !root.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .ok_or_else(|| ExtensionError::InvalidSourceLocation(source_file.to_path_buf()))
}

/// Strips `web_root` from `root` when it is a prefix.
fn public_root(root: &Path, web_root: Option<&Path>) -> PathBuf {
    web_root
        .and_then(|prefix| root.strip_prefix(prefix).ok())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf())
}

/// Locale key for one display field, e.g. `lang:email:field_types.name`.
pub fn metadata_label(extension: &str, slug: &str, field: MetadataField) -> String {
    format!("lang:{extension}:{slug}.{}", field.as_str())
}

/// Bundle name of an extension's locale file.
pub fn locale_bundle(extension: &str, slug: &str) -> String {
    format!("{extension}_{slug}_lang")
}

fn load_language(
    localizer: &mut dyn Localizer,
    root: &Path,
    extension: &str,
    slug: &str,
    configured: Option<&str>,
) {
    let language_dir = root.join(LANGUAGE_DIR);
    if !language_dir.is_dir() {
        return;
    }

    let mut locale = configured.unwrap_or(DEFAULT_LOCALE);
    if !language_dir.join(locale).is_dir() {
        locale = DEFAULT_LOCALE;
    }

    let bundle = locale_bundle(extension, slug);
    if let Err(err) = localizer.load_locale_file(&bundle, locale, root) {
        debug!(
            "event=locale_load module=loader status=skipped extension={} locale={} error={}",
            extension, locale, err
        );
    }
}

/// Loads `name` for `kind`, or returns its cached instance.
pub(crate) fn load_extension(
    host: &mut ExtensionHost,
    kind: ManagerKind,
    name: &str,
) -> ExtensionResult<Option<Arc<ExtensionInstance>>> {
    if name.is_empty() {
        return Ok(None);
    }
    if let Some(cached) = host.registry.instance(kind, name) {
        return Ok(Some(cached));
    }
    let (Some(record), Some(namespace)) = (
        host.registry.record(kind, name).cloned(),
        host.paths.namespace(kind).cloned(),
    ) else {
        debug!(
            "event=extension_load module=loader status=miss kind={} extension={}",
            kind, name
        );
        return Ok(None);
    };

    let started_at = Instant::now();
    let ConstructedExtension {
        mut extension,
        source_file,
    } = match host.class_loader.construct(&record.class_identity) {
        Ok(constructed) => constructed,
        Err(err) => {
            error!(
                "event=extension_load module=loader status=error kind={} extension={} error={}",
                kind, name, err
            );
            return Err(err.into());
        }
    };

    let root = extension_root(&source_file)?;
    load_language(
        host.localizer.as_mut(),
        &root,
        name,
        &namespace.slug,
        host.locale.as_deref(),
    );

    let localizer = host.localizer.as_ref();
    let metadata = extension.preset_metadata().fill_if_absent(|field| {
        lang_label(localizer, &metadata_label(name, &namespace.slug, field))
    });

    let info = ExtensionInfo {
        name: name.to_string(),
        kind,
        class_identity: record.class_identity,
        extension_type: namespace.slug.clone(),
        paths: ExtensionPaths::under(public_root(&root, host.layout.web_root())),
        metadata,
        load_id: Uuid::new_v4(),
    };
    extension.loaded(&info);

    info!(
        "event=extension_load module=loader status=ok kind={} extension={} class={} load_id={} duration_ms={}",
        kind,
        name,
        info.class_identity,
        info.load_id,
        started_at.elapsed().as_millis()
    );
    Ok(Some(
        host.registry
            .store_instance(kind, ExtensionInstance::new(info, extension)),
    ))
}
