//! Class-loading capability.
//!
//! Discovery tells the loader where each class identity's source lives, one
//! `LoaderBatch` per scanned folder; the extension loader later asks it to
//! construct an identity.

use crate::extension::Extension;
use crate::identity::ClassIdentity;
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Source locations collected during one folder discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderBatch {
    folder: PathBuf,
    entries: Vec<(ClassIdentity, PathBuf)>,
}

impl LoaderBatch {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            entries: Vec::new(),
        }
    }

    /// Records that `identity` is implemented below `source_dir`.
    pub fn register_source_location(&mut self, identity: ClassIdentity, source_dir: PathBuf) {
        self.entries.push((identity, source_dir));
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn entries(&self) -> &[(ClassIdentity, PathBuf)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A freshly built extension plus the file that implements it.
pub struct ConstructedExtension {
    pub extension: Box<dyn Extension>,
    pub source_file: PathBuf,
}

/// Maps class identities to runnable implementations.
pub trait ClassLoader {
    /// Commits one discovery pass. Later activations override earlier ones
    /// for the same identity.
    fn activate(&mut self, batch: LoaderBatch);

    fn construct(&self, identity: &ClassIdentity) -> Result<ConstructedExtension, ClassLoadError>;
}

/// Class-loading failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassLoadError {
    /// No implementation is compiled in for the identity.
    UnknownClass(ClassIdentity),
    /// The identity was never activated from a discovered folder.
    SourceNotRegistered(ClassIdentity),
}

impl Display for ClassLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownClass(identity) => {
                write!(f, "no implementation available for class `{identity}`")
            }
            Self::SourceNotRegistered(identity) => {
                write!(f, "class `{identity}` has no registered source location")
            }
        }
    }
}

impl Error for ClassLoadError {}

type Constructor = Box<dyn Fn() -> Box<dyn Extension> + Send + Sync>;

/// Class loader backed by compiled-in constructors.
///
/// An identity is constructible once it has a constructor and at least one
/// activated source location.
#[derive(Default)]
pub struct StaticClassLoader {
    constructors: BTreeMap<ClassIdentity, Constructor>,
    locations: BTreeMap<ClassIdentity, PathBuf>,
    activations: usize,
}

impl StaticClassLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constructor for `identity`, replacing any previous one.
    pub fn define<E, F>(&mut self, identity: ClassIdentity, constructor: F)
    where
        E: Extension + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.constructors.insert(
            identity,
            Box::new(move || Box::new(constructor()) as Box<dyn Extension>),
        );
    }

    pub fn with<E, F>(mut self, identity: ClassIdentity, constructor: F) -> Self
    where
        E: Extension + 'static,
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.define(identity, constructor);
        self
    }

    pub fn source_dir(&self, identity: &ClassIdentity) -> Option<&Path> {
        self.locations.get(identity).map(PathBuf::as_path)
    }

    /// Number of committed batches.
    pub fn activation_count(&self) -> usize {
        self.activations
    }
}

impl ClassLoader for StaticClassLoader {
    fn activate(&mut self, batch: LoaderBatch) {
        debug!(
            "event=loader_activate module=class_loader status=ok folder={} entries={}",
            batch.folder.display(),
            batch.entries.len()
        );
        self.locations.extend(batch.entries);
        self.activations += 1;
    }

    fn construct(&self, identity: &ClassIdentity) -> Result<ConstructedExtension, ClassLoadError> {
        let constructor = self
            .constructors
            .get(identity)
            .ok_or_else(|| ClassLoadError::UnknownClass(identity.clone()))?;
        let source_dir = self
            .locations
            .get(identity)
            .ok_or_else(|| ClassLoadError::SourceNotRegistered(identity.clone()))?;

        Ok(ConstructedExtension {
            extension: constructor(),
            source_file: source_dir.join(identity.relative_source_path()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ClassLoadError, ClassLoader, LoaderBatch, StaticClassLoader};
    use crate::extension::Extension;
    use crate::identity::class_identity_for;
    use crate::kind::Namespace;
    use std::any::Any;
    use std::path::{Path, PathBuf};

    struct Plain;

    impl Extension for Plain {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn construct_requires_activation() {
        let identity = class_identity_for(&Namespace::new("blog", "widgets"), "archive");
        let mut loader = StaticClassLoader::new().with(identity.clone(), || Plain);

        let err = loader
            .construct(&identity)
            .err()
            .expect("inactive identity must fail");
        assert_eq!(err, ClassLoadError::SourceNotRegistered(identity.clone()));

        let mut batch = LoaderBatch::new("/ext/");
        batch.register_source_location(identity.clone(), PathBuf::from("/ext/archive/src"));
        loader.activate(batch);

        let built = loader.construct(&identity).expect("activated identity");
        assert_eq!(
            built.source_file,
            Path::new("/ext/archive/src/Extension/Blog/Widgets/Archive.rs")
        );
        assert_eq!(loader.activation_count(), 1);
    }

    #[test]
    fn later_activation_wins() {
        let identity = class_identity_for(&Namespace::new("blog", "widgets"), "archive");
        let mut loader = StaticClassLoader::new().with(identity.clone(), || Plain);

        for folder in ["/addon/archive/src", "/module/archive/src"] {
            let mut batch = LoaderBatch::new(folder);
            batch.register_source_location(identity.clone(), PathBuf::from(folder));
            loader.activate(batch);
        }

        assert_eq!(
            loader.source_dir(&identity),
            Some(Path::new("/module/archive/src"))
        );
    }

    #[test]
    fn unknown_class_is_reported() {
        let identity = class_identity_for(&Namespace::new("blog", "widgets"), "ghost");
        let loader = StaticClassLoader::new();
        let err = loader.construct(&identity).err().expect("unknown class");
        assert_eq!(err, ClassLoadError::UnknownClass(identity));
    }
}
