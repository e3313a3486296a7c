use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub const PRIMARY_CONFIG_PATH: &str = "/etc/facegate/config.toml";
pub const SECONDARY_CONFIG_PATH: &str = "/usr/local/etc/facegate/config.toml";
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
pub const DEFAULT_RECOGNITION_TOLERANCE: f64 = 0.6;
pub const DEFAULT_ADMIN_PRINCIPAL_ID: &str = "admin";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub similarity_threshold: Option<f64>,
    pub admin_principal_id: Option<String>,
    pub encoding_store_dir: Option<PathBuf>,
    pub recognition_tolerance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub similarity_threshold: f64,
    pub admin_principal_id: String,
    /// `None` leaves the choice to the store's own resolver.
    pub encoding_store_dir: Option<PathBuf>,
    pub recognition_tolerance: f64,
}

impl ResolvedConfig {
    pub fn from_raw(raw: ConfigFile) -> Self {
        Self {
            similarity_threshold: raw
                .similarity_threshold
                .unwrap_or(DEFAULT_SIMILARITY_THRESHOLD),
            admin_principal_id: raw
                .admin_principal_id
                .unwrap_or_else(|| DEFAULT_ADMIN_PRINCIPAL_ID.to_string()),
            encoding_store_dir: raw.encoding_store_dir,
            recognition_tolerance: raw
                .recognition_tolerance
                .unwrap_or(DEFAULT_RECOGNITION_TOLERANCE),
        }
    }

    /// Checks the value ranges the authentication core relies on.
    ///
    /// `source` is only used to label the error.
    pub fn validate(&self, source: &Path) -> Result<(), ConfigError> {
        let threshold = self.similarity_threshold;
        if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
            return Err(ConfigError::Invalid {
                path: source.to_path_buf(),
                message: format!("similarity_threshold must be in (0, 1], found {threshold}"),
            });
        }

        let tolerance = self.recognition_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                path: source.to_path_buf(),
                message: format!("recognition_tolerance must be positive, found {tolerance}"),
            });
        }

        let admin = &self.admin_principal_id;
        if admin.is_empty()
            || !admin
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
        {
            return Err(ConfigError::Invalid {
                path: source.to_path_buf(),
                message: format!(
                    "admin_principal_id '{admin}' must use ASCII letters, numbers, '-' or '_'"
                ),
            });
        }

        Ok(())
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self::from_raw(ConfigFile::default())
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub contents: ConfigFile,
    pub source: PathBuf,
}

impl LoadedConfig {
    pub fn new(contents: ConfigFile, source: PathBuf) -> Self {
        Self { contents, source }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfigWithSource {
    pub resolved: ResolvedConfig,
    pub source: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid configuration in {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

pub fn default_sources() -> [PathBuf; 2] {
    [
        PathBuf::from(PRIMARY_CONFIG_PATH),
        PathBuf::from(SECONDARY_CONFIG_PATH),
    ]
}

pub fn load_resolved_config() -> Result<ResolvedConfigWithSource, ConfigError> {
    load_resolved_from_paths(&default_sources())
}

pub fn load_from_paths(paths: &[PathBuf]) -> Result<Option<LoadedConfig>, ConfigError> {
    for path in paths {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let parsed =
                    toml::from_str::<ConfigFile>(&contents).map_err(|err| ConfigError::Parse {
                        path: path.clone(),
                        message: err.to_string(),
                    })?;
                return Ok(Some(LoadedConfig::new(parsed, path.clone())));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => {
                return Err(ConfigError::Read {
                    path: path.clone(),
                    source: err,
                })
            }
        }
    }

    Ok(None)
}

pub fn load_resolved_from_paths(
    paths: &[PathBuf],
) -> Result<ResolvedConfigWithSource, ConfigError> {
    match load_from_paths(paths)? {
        Some(entry) => {
            let resolved = ResolvedConfig::from_raw(entry.contents);
            resolved.validate(&entry.source)?;
            Ok(ResolvedConfigWithSource {
                resolved,
                source: Some(entry.source),
            })
        }
        None => Ok(ResolvedConfigWithSource {
            resolved: ResolvedConfig::default(),
            source: None,
        }),
    }
}
