use std::path::{Path, PathBuf};

use facegate_config::{self as config, ConfigError, ResolvedConfig, ResolvedConfigWithSource};
use facegate_core::faces::FilesystemEncodingStore;
use facegate_core::service::ServiceConfig;

use crate::errors::{AppError, AppResult};

/// Configuration the CLI runs with, plus where it came from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub resolved: ResolvedConfig,
    pub source: Option<PathBuf>,
}

impl Settings {
    pub fn service_config(&self, threshold: Option<f64>) -> ServiceConfig {
        ServiceConfig {
            similarity_threshold: threshold.unwrap_or(self.resolved.similarity_threshold),
            admin_principal_id: self.resolved.admin_principal_id.clone(),
        }
    }

    pub fn principal_or_admin(&self, principal: Option<&str>) -> String {
        principal
            .unwrap_or(&self.resolved.admin_principal_id)
            .to_string()
    }

    /// CLI flag, then config file, then `FACEGATE_STORE_DIR`, then the built-in default.
    pub fn open_store(&self, cli_value: Option<&Path>) -> FilesystemEncodingStore {
        let dir = cli_value.or(self.resolved.encoding_store_dir.as_deref());
        FilesystemEncodingStore::from_env(dir)
    }

    pub fn source_label(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "built-in defaults".to_string(),
        }
    }
}

pub fn load_settings() -> AppResult<Settings> {
    config::load_resolved_config()
        .map(Settings::from)
        .map_err(map_config_error)
}

pub fn load_settings_from(paths: &[PathBuf]) -> AppResult<Settings> {
    config::load_resolved_from_paths(paths)
        .map(Settings::from)
        .map_err(map_config_error)
}

impl From<ResolvedConfigWithSource> for Settings {
    fn from(loaded: ResolvedConfigWithSource) -> Self {
        if let Some(source) = &loaded.source {
            tracing::debug!(source = %source.display(), "configuration loaded");
        }
        Self {
            resolved: loaded.resolved,
            source: loaded.source,
        }
    }
}

fn map_config_error(err: ConfigError) -> AppError {
    match err {
        ConfigError::Read { path, source } => AppError::ConfigRead { path, source },
        ConfigError::Parse { path, message } | ConfigError::Invalid { path, message } => {
            AppError::ConfigParse { path, message }
        }
    }
}
