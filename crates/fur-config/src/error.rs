use fur_utils::error::{FileSystemError, PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(fur_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(fur_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Failed to parse TOML: {0}")]
    #[diagnostic(code(fur_config::toml))]
    Toml(#[from] toml_edit::TomlError),

    #[error("Configuration file already exists at {0}")]
    #[diagnostic(
        code(fur_config::already_exists),
        help("Remove the existing config file or pass a different path with --config")
    )]
    ConfigAlreadyExists(String),

    #[error("Invalid bind address: '{0}'")]
    #[diagnostic(
        code(fur_config::invalid_bind_address),
        help("Use a socket address such as 0.0.0.0:5001 or 127.0.0.1:8080")
    )]
    InvalidBindAddress(String),

    #[error("Invalid API prefix: '{0}'")]
    #[diagnostic(
        code(fur_config::invalid_api_prefix),
        help("The prefix must start with '/' and must not end with '/', e.g. /api/v1")
    )]
    InvalidApiPrefix(String),

    #[error("max_upload_size must be greater than zero")]
    #[diagnostic(code(fur_config::invalid_upload_size))]
    InvalidUploadSize,

    #[error("Encountered unexpected TOML item: {0}")]
    #[diagnostic(code(fur_config::unexpected_toml_item))]
    UnexpectedTomlItem(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(fur_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(fur_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
