use extkit_core::{
    AddonLayout, ClassIdentity, ClassLoadError, ClassLoader, ConstructedExtension, Extension,
    ExtensionError, ExtensionHost, ExtensionSelection, LoaderBatch, ManagerKind, ManagerState,
    Namespace, StaticClassLoader,
};
use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const FIELDS: ManagerKind = ManagerKind::new("field_types");

struct Plain;

impl Extension for Plain {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Records every committed batch before delegating.
struct RecordingLoader {
    batches: Arc<Mutex<Vec<LoaderBatch>>>,
    inner: StaticClassLoader,
}

impl ClassLoader for RecordingLoader {
    fn activate(&mut self, batch: LoaderBatch) {
        self.batches.lock().expect("batch log").push(batch.clone());
        self.inner.activate(batch);
    }

    fn construct(&self, identity: &ClassIdentity) -> Result<ConstructedExtension, ClassLoadError> {
        self.inner.construct(identity)
    }
}

fn namespace() -> Namespace {
    Namespace::new("streams", "field_types")
}

fn plain_loader(names: &[&str]) -> StaticClassLoader {
    let mut loader = StaticClassLoader::new();
    for name in names {
        loader.define(ClassIdentity::for_extension(&namespace(), name), || Plain);
    }
    loader
}

fn make_extensions(folder: &Path, names: &[&str]) {
    for name in names {
        std::fs::create_dir_all(folder.join(name).join("src")).expect("extension dir");
    }
}

fn host_in(root: &Path, loader: impl ClassLoader + 'static) -> ExtensionHost {
    ExtensionHost::new(
        AddonLayout::new(root.join("addons"), root.join("shared")),
        loader,
    )
}

fn addon_folder(root: &Path) -> PathBuf {
    root.join("addons/extensions/streams/field_types")
}

#[test]
fn discovery_skips_sentinel_and_hidden_entries() {
    let dir = tempfile::tempdir().unwrap();
    let folder = addon_folder(dir.path());
    make_extensions(&folder, &["alpha", "beta", ".git"]);
    std::fs::write(folder.join("index.html"), "<html></html>").unwrap();

    let mut host = host_in(dir.path(), plain_loader(&["alpha", "beta"]));
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();

    let names = manager
        .register_folder_extensions(&folder, ExtensionSelection::Discover, false)
        .unwrap();
    assert_eq!(names, vec!["alpha".to_string(), "beta".to_string()]);

    let classes = manager.classes();
    assert_eq!(
        classes.keys().cloned().collect::<Vec<_>>(),
        vec!["alpha".to_string(), "beta".to_string()]
    );
    assert_eq!(
        classes["alpha"].as_str(),
        "Extension::Streams::FieldTypes::Alpha"
    );
}

#[test]
fn explicit_names_are_stripped_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    let folder = addon_folder(dir.path());
    make_extensions(&folder, &["alpha"]);

    let mut host = host_in(dir.path(), plain_loader(&["alpha"]));
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();

    let names = manager
        .register_folder_extensions(
            &folder,
            vec!["alpha/".to_string(), "index.html".to_string()],
            false,
        )
        .unwrap();
    assert_eq!(names, vec!["alpha".to_string()]);

    let single = manager
        .register_folder_extensions(&folder, "alpha", false)
        .unwrap();
    assert_eq!(single, vec!["alpha".to_string()]);
}

#[test]
fn registration_without_preload_builds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let folder = addon_folder(dir.path());
    make_extensions(&folder, &["alpha", "beta"]);

    let mut host = host_in(dir.path(), plain_loader(&["alpha", "beta"]));
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();
    manager
        .register_folder_extensions(&folder, ExtensionSelection::Discover, false)
        .unwrap();

    assert_eq!(manager.classes().len(), 2);
    assert!(manager.registered_extensions().is_empty());
    assert_eq!(manager.state(), ManagerState::Discovered);
}

#[test]
fn registration_with_preload_builds_every_name() {
    let dir = tempfile::tempdir().unwrap();
    let folder = addon_folder(dir.path());
    make_extensions(&folder, &["alpha", "beta"]);

    let mut host = host_in(dir.path(), plain_loader(&["alpha", "beta"]));
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();
    manager
        .register_folder_extensions(&folder, ExtensionSelection::Discover, true)
        .unwrap();

    let loaded = manager.registered_extensions();
    assert_eq!(loaded.names(), vec!["alpha", "beta"]);
    assert_eq!(manager.state(), ManagerState::FullyLoaded);
}

#[test]
fn each_folder_commits_one_loader_batch() {
    let dir = tempfile::tempdir().unwrap();
    let primary = addon_folder(dir.path());
    let shared = dir.path().join("shared/extensions/streams/field_types");
    make_extensions(&primary, &["alpha", "beta"]);
    make_extensions(&shared, &["gamma"]);

    let batches = Arc::new(Mutex::new(Vec::new()));
    let loader = RecordingLoader {
        batches: Arc::clone(&batches),
        inner: plain_loader(&["alpha", "beta", "gamma"]),
    };
    let mut host = host_in(dir.path(), loader);
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();
    manager.register_extensions(false).unwrap();

    let batches = batches.lock().unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].folder(), primary.as_path());
    assert_eq!(batches[0].len(), 2);
    assert_eq!(
        batches[0].entries()[0].1,
        primary.join("alpha").join("src")
    );
    assert_eq!(batches[1].len(), 1);
}

#[test]
fn missing_folder_registers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host_in(dir.path(), StaticClassLoader::new());
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();

    let names = manager
        .register_folder_extensions(dir.path().join("nowhere"), ExtensionSelection::Discover, true)
        .unwrap();
    assert!(names.is_empty());
    assert!(manager.classes().is_empty());
    assert_eq!(manager.state(), ManagerState::Initialized);
}

#[test]
fn discovery_requires_init() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host_in(dir.path(), StaticClassLoader::new());
    let mut manager = host.manager(FIELDS);

    let err = manager
        .register_folder_extensions(dir.path(), ExtensionSelection::Discover, false)
        .unwrap_err();
    assert!(matches!(err, ExtensionError::KindNotInitialized(kind) if kind == FIELDS));

    let err = manager.register_slug_class(["alpha"]).unwrap_err();
    assert!(matches!(err, ExtensionError::KindNotInitialized(_)));
    assert!(manager.class_identity("alpha").is_none());
}

#[test]
fn register_slug_class_registers_without_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut host = host_in(dir.path(), StaticClassLoader::new());
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();

    manager.register_slug_class(["text", "rich_text"]).unwrap();
    let records = manager.records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|record| record.source_dir.is_none()));
    assert_eq!(
        manager.class_identity("rich_text").unwrap().as_str(),
        "Extension::Streams::FieldTypes::RichText"
    );
}

#[test]
fn register_extensions_and_module_extensions_walk_their_root_sets() {
    let dir = tempfile::tempdir().unwrap();
    let shared = dir.path().join("shared/extensions/streams/field_types");
    let custom = dir.path().join("custom/field_types");
    make_extensions(&addon_folder(dir.path()), &["alpha"]);
    make_extensions(&shared, &["beta"]);
    make_extensions(&custom, &["gamma"]);

    let mut host = host_in(dir.path(), plain_loader(&["alpha", "beta", "gamma"]));
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();
    manager.set_module_path("custom", &custom);

    manager.register_extensions(false).unwrap();
    assert_eq!(manager.classes().len(), 2);

    manager.register_module_extensions(true).unwrap();
    assert_eq!(manager.classes().len(), 3);
    assert_eq!(manager.registered_extensions().names(), vec!["gamma"]);
    assert_eq!(manager.state(), ManagerState::PartiallyLoaded);
}

#[test]
fn later_folder_overrides_earlier_registration() {
    let dir = tempfile::tempdir().unwrap();
    let primary = addon_folder(dir.path());
    let shared = dir.path().join("shared/extensions/streams/field_types");
    make_extensions(&primary, &["alpha"]);
    make_extensions(&shared, &["alpha"]);

    let batches = Arc::new(Mutex::new(Vec::new()));
    let loader = RecordingLoader {
        batches: Arc::clone(&batches),
        inner: plain_loader(&["alpha"]),
    };
    let mut host = host_in(dir.path(), loader);
    let mut manager = host.manager(FIELDS);
    manager.init("streams", "field_types", false).unwrap();
    manager.register_extensions(false).unwrap();

    let records = manager.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source_dir, Some(shared.join("alpha").join("src")));
    assert_eq!(batches.lock().unwrap().len(), 2);

    let alpha = manager.get_extension("alpha").unwrap().unwrap();
    assert_eq!(alpha.path(), shared.join("alpha").as_path());
}
