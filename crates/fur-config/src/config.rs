use std::{
    fs,
    net::SocketAddr,
    path::PathBuf,
    sync::{LazyLock, RwLock},
};

use documented::{Documented, DocumentedFields};
use fur_utils::path::{resolve_path, xdg_config_home, xdg_data_home};
use serde::{Deserialize, Serialize};
use toml_edit::DocumentMut;
use tracing::info;

use crate::{
    annotations::annotate_toml_table,
    error::{ConfigError, Result},
};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5001";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 1024 * 1024;

/// Registry server configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, Documented, DocumentedFields)]
pub struct Config {
    /// Address the HTTP server listens on.
    /// Default: "0.0.0.0:5001"
    pub bind_address: Option<String>,

    /// Directory holding one sub-directory (with a furconfig.json) per package.
    /// Default: $FUR_ROOT/projects
    pub projects_path: Option<String>,

    /// Seed the bundled example packages when the registry is empty.
    /// Default: true
    pub seed_defaults: Option<bool>,

    /// JSON file with an array of furconfig documents to seed instead of the
    /// bundled examples.
    pub seed_path: Option<String>,

    /// Prefix under which all routes are additionally served.
    /// Default: "/api/v1"
    pub api_prefix: Option<String>,

    /// Tracing filter, e.g. "info" or "fur=debug,tower_http=warn".
    /// Default: "info"
    pub log_level: Option<String>,

    /// Emit log records as JSON lines.
    /// Default: false
    pub log_json: Option<bool>,

    /// Largest accepted upload body, in bytes.
    /// Default: 1048576
    pub max_upload_size: Option<usize>,
}

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("FUR_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("fur").join("config.toml"),
    })
});

/// Returns the config file location currently in effect.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .map(|path| path.clone())
        .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
}

/// Points subsequent [`Config::new`] calls at `path`.
pub fn set_config_path(path: PathBuf) {
    let mut guard = CONFIG_PATH
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = path;
}

fn fur_root() -> String {
    std::env::var("FUR_ROOT").unwrap_or_else(|_| format!("{}/fur", xdg_data_home().display()))
}

impl Config {
    pub fn default_config() -> Self {
        let fur_root = fur_root();

        Self {
            bind_address: Some(DEFAULT_BIND_ADDRESS.to_string()),
            projects_path: Some(format!("{fur_root}/projects")),
            seed_defaults: Some(true),
            seed_path: None,
            api_prefix: Some(DEFAULT_API_PREFIX.to_string()),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            log_json: Some(false),
            max_upload_size: Some(DEFAULT_MAX_UPLOAD_SIZE),
        }
    }

    /// Loads the configuration file, falling back to the defaults when it
    /// does not exist.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        let defaults = Self::default_config();

        if self.bind_address.is_none() {
            self.bind_address = defaults.bind_address;
        }
        if self.projects_path.is_none() {
            self.projects_path = defaults.projects_path;
        }
        if self.api_prefix.is_none() {
            self.api_prefix = defaults.api_prefix;
        }
        if self.log_level.is_none() {
            self.log_level = defaults.log_level;
        }
        self.seed_defaults.get_or_insert(true);
        self.log_json.get_or_insert(false);
        self.max_upload_size.get_or_insert(DEFAULT_MAX_UPLOAD_SIZE);

        self.bind_address()?;

        let prefix = self.api_prefix();
        if !prefix.starts_with('/') || (prefix.len() > 1 && prefix.ends_with('/')) {
            return Err(ConfigError::InvalidApiPrefix(prefix.to_string()));
        }

        if self.max_upload_size() == 0 {
            return Err(ConfigError::InvalidUploadSize);
        }

        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        let raw = match std::env::var("FUR_BIND") {
            Ok(addr) => addr,
            Err(_) => {
                self.bind_address
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            }
        };
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(raw))
    }

    pub fn get_projects_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("FUR_PROJECTS") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(projects_path) = &self.projects_path {
            return Ok(resolve_path(projects_path)?);
        }
        Ok(resolve_path(&format!("{}/projects", fur_root()))?)
    }

    pub fn get_seed_path(&self) -> Result<Option<PathBuf>> {
        self.seed_path
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn seed_defaults(&self) -> bool {
        self.seed_defaults.unwrap_or(true)
    }

    pub fn api_prefix(&self) -> &str {
        self.api_prefix.as_deref().unwrap_or(DEFAULT_API_PREFIX)
    }

    pub fn log_level(&self) -> String {
        std::env::var("FUR_LOG").unwrap_or_else(|_| {
            self.log_level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
        })
    }

    pub fn log_json(&self) -> bool {
        self.log_json.unwrap_or(false)
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size.unwrap_or(DEFAULT_MAX_UPLOAD_SIZE)
    }

    pub fn to_annotated_document(&self) -> Result<DocumentMut> {
        let toml_string = toml::to_string_pretty(self)?;
        let mut doc = toml_string.parse::<DocumentMut>()?;

        annotate_toml_table::<Config>(doc.as_table_mut())?;

        Ok(doc)
    }
}

/// Writes the annotated default configuration to the current config path.
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists(
            config_path.display().to_string(),
        ));
    }

    let annotated_doc = Config::default_config().to_annotated_document()?;

    if let Some(parent) = config_path.parent() {
        fur_utils::fs::ensure_dir_exists(parent)?;
    }

    fs::write(&config_path, annotated_doc.to_string())?;
    info!(
        "Default configuration file generated with documentation at: {}",
        config_path.display()
    );
    Ok(config_path)
}
