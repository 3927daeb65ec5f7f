//! Error types for the registry crate.
//!
//! [`RegistryError`] covers both caller mistakes (validation, lookups,
//! conflicts) and server-side failures (storage, malformed stored data). The
//! [`RegistryError::kind`] classification lets an outer boundary pick a status
//! without matching every variant.

use std::path::PathBuf;

use fur_utils::error::FileSystemError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("No JSON data provided")]
    #[diagnostic(
        code(fur_registry::empty_payload),
        help("Send the furconfig document as a non-empty JSON object")
    )]
    EmptyPayload,

    #[error("Missing required fields: {}", .0.join(", "))]
    #[diagnostic(
        code(fur_registry::missing_fields),
        help("name, version, authors, homepage, issue_tracker, git and installer must be non-empty; dependencies must be a list, possibly empty")
    )]
    MissingFields(Vec<String>),

    #[error("Version must be in x.y.z format")]
    #[diagnostic(
        code(fur_registry::invalid_version),
        help("Use exactly three dot-separated numbers, e.g. 1.0.0")
    )]
    InvalidVersion(String),

    #[error("Invalid furconfig: {0}")]
    #[diagnostic(
        code(fur_registry::invalid_descriptor),
        help("Check the field types: lists must be arrays of strings, everything else a string")
    )]
    InvalidDescriptor(String),

    #[error("Package name '{0}' cannot be stored")]
    #[diagnostic(
        code(fur_registry::invalid_name),
        help("The name must contain at least one character other than <>:\"/\\|?* and must not be '.' or '..'")
    )]
    InvalidName(String),

    #[error("Package '{name}' not found")]
    #[diagnostic(code(fur_registry::not_found))]
    NotFound { name: String },

    #[error("Version '{version}' not found for package '{name}'")]
    #[diagnostic(code(fur_registry::version_not_found))]
    VersionNotFound { name: String, version: String },

    #[error("Package '{0}' already exists")]
    #[diagnostic(
        code(fur_registry::already_exists),
        help("Package names are unique; a new version cannot be uploaded under an existing name")
    )]
    AlreadyExists(String),

    #[error("Package name '{name}' conflicts with existing package '{existing}'")]
    #[diagnostic(
        code(fur_registry::slug_collision),
        help("Both names map to the same storage directory; choose a different name")
    )]
    SlugCollision { name: String, existing: String },

    #[error("Failed to save package '{name}' to file")]
    #[diagnostic(
        code(fur_registry::storage),
        help("Check permissions and free space of the projects directory")
    )]
    Storage {
        name: String,
        #[source]
        source: FileSystemError,
    },

    #[error("Malformed descriptor at {}: {reason}", path.display())]
    #[diagnostic(code(fur_registry::malformed_descriptor))]
    MalformedDescriptor { path: PathBuf, reason: String },

    #[error("Error while {action}")]
    #[diagnostic(code(fur_registry::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(fur_registry::filesystem))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(
        code(fur_registry::json),
        help("The document may be corrupted or in an invalid format")
    )]
    JsonError(#[from] serde_json::Error),
}

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something the registry will not accept.
    Validation,
    /// The requested package or version does not exist.
    NotFound,
    /// The name is taken.
    Conflict,
    /// Something went wrong on the server side.
    Internal,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::EmptyPayload
            | RegistryError::MissingFields(_)
            | RegistryError::InvalidVersion(_)
            | RegistryError::InvalidDescriptor(_)
            | RegistryError::InvalidName(_) => ErrorKind::Validation,
            RegistryError::NotFound { .. } | RegistryError::VersionNotFound { .. } => {
                ErrorKind::NotFound
            }
            RegistryError::AlreadyExists(_) | RegistryError::SlugCollision { .. } => {
                ErrorKind::Conflict
            }
            RegistryError::Storage { .. }
            | RegistryError::MalformedDescriptor { .. }
            | RegistryError::IoError { .. }
            | RegistryError::FileSystem(_)
            | RegistryError::JsonError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Wraps the error with a description of the action that failed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
