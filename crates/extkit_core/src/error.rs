//! Crate-level error types for discovery and loading.

use crate::class_loader::ClassLoadError;
use crate::kind::ManagerKind;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ExtensionResult<T> = Result<T, ExtensionError>;

/// Failures surfaced by manager operations.
///
/// Unknown or empty extension names are not errors; lookups return `None`.
#[derive(Debug)]
pub enum ExtensionError {
    /// Discovery or registration was requested before `init` set a namespace.
    KindNotInitialized(ManagerKind),
    /// Listing a discovery folder failed for a reason other than absence.
    Discovery {
        folder: PathBuf,
        source: std::io::Error,
    },
    /// The class loader could not build a registered identity.
    Construct(ClassLoadError),
    /// The implementation source file is too shallow to derive an extension root.
    InvalidSourceLocation(PathBuf),
}

impl Display for ExtensionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KindNotInitialized(kind) => {
                write!(f, "extension manager `{kind}` used before init")
            }
            Self::Discovery { folder, source } => write!(
                f,
                "failed to list extension folder `{}`: {source}",
                folder.display()
            ),
            Self::Construct(err) => write!(f, "{err}"),
            Self::InvalidSourceLocation(path) => write!(
                f,
                "cannot derive extension root from source file `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ExtensionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Discovery { source, .. } => Some(source),
            Self::Construct(err) => Some(err),
            Self::KindNotInitialized(_) | Self::InvalidSourceLocation(_) => None,
        }
    }
}

impl From<ClassLoadError> for ExtensionError {
    fn from(value: ClassLoadError) -> Self {
        Self::Construct(value)
    }
}
