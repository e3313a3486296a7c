use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::faces::encoding::{validate_principal_id, FaceEncoding};

const DEFAULT_STORE_DIR: &str = "/var/lib/facegate/encodings";
const ENCODING_STORE_ENV: &str = "FACEGATE_STORE_DIR";
const STORE_EXTENSION: &str = "json";

/// The single reference signature held for a principal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentRecord {
    pub id: String,
    pub principal_id: String,
    pub encoding: FaceEncoding,
    pub encoding_len: usize,
    pub enrolled_at: String,
}

impl EnrollmentRecord {
    fn new(principal: &str, encoding: &[f64]) -> AppResult<Self> {
        validate_principal_id(principal)?;
        let encoding = FaceEncoding::from_slice(encoding)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            principal_id: principal.to_string(),
            encoding_len: encoding.len(),
            encoding,
            enrolled_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

/// Durable mapping from principal id to one face signature.
///
/// `register` overwrites any earlier enrollment and must be visible to a
/// following `get` on the same store.
pub trait EncodingStore {
    fn register(&self, principal: &str, encoding: &[f64]) -> AppResult<EnrollmentRecord>;
    fn get(&self, principal: &str) -> AppResult<EnrollmentRecord>;
    fn exists(&self, principal: &str) -> bool;
    fn principals(&self) -> AppResult<Vec<String>>;
}

impl<S: EncodingStore + ?Sized> EncodingStore for &S {
    fn register(&self, principal: &str, encoding: &[f64]) -> AppResult<EnrollmentRecord> {
        (**self).register(principal, encoding)
    }

    fn get(&self, principal: &str) -> AppResult<EnrollmentRecord> {
        (**self).get(principal)
    }

    fn exists(&self, principal: &str) -> bool {
        (**self).exists(principal)
    }

    fn principals(&self) -> AppResult<Vec<String>> {
        (**self).principals()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEncodingStore {
    records: Mutex<HashMap<String, EnrollmentRecord>>,
}

impl InMemoryEncodingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, EnrollmentRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EncodingStore for InMemoryEncodingStore {
    fn register(&self, principal: &str, encoding: &[f64]) -> AppResult<EnrollmentRecord> {
        let record = EnrollmentRecord::new(principal, encoding)?;
        self.records()
            .insert(principal.to_string(), record.clone());
        Ok(record)
    }

    fn get(&self, principal: &str) -> AppResult<EnrollmentRecord> {
        self.records()
            .get(principal)
            .cloned()
            .ok_or_else(|| AppError::NotFound {
                principal: principal.to_string(),
            })
    }

    fn exists(&self, principal: &str) -> bool {
        self.records().contains_key(principal)
    }

    fn principals(&self) -> AppResult<Vec<String>> {
        let mut principals: Vec<String> = self.records().keys().cloned().collect();
        principals.sort();
        Ok(principals)
    }
}

pub trait StoreDirResolver {
    fn resolve(&self, override_dir: Option<&Path>) -> PathBuf;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnvStoreDirResolver;

impl StoreDirResolver for EnvStoreDirResolver {
    fn resolve(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            dir.to_path_buf()
        } else if let Ok(env_value) = env::var(ENCODING_STORE_ENV) {
            PathBuf::from(env_value)
        } else {
            PathBuf::from(DEFAULT_STORE_DIR)
        }
    }
}

/// One JSON document per principal under a store directory.
#[derive(Debug, Clone)]
pub struct FilesystemEncodingStore {
    dir: PathBuf,
}

impl FilesystemEncodingStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn resolve_with<R: StoreDirResolver>(resolver: &R, override_dir: Option<&Path>) -> Self {
        Self::new(resolver.resolve(override_dir))
    }

    pub fn from_env(override_dir: Option<&Path>) -> Self {
        Self::resolve_with(&EnvStoreDirResolver, override_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, principal: &str) -> PathBuf {
        self.dir.join(format!("{principal}.{STORE_EXTENSION}"))
    }
}

impl EncodingStore for FilesystemEncodingStore {
    fn register(&self, principal: &str, encoding: &[f64]) -> AppResult<EnrollmentRecord> {
        let record = EnrollmentRecord::new(principal, encoding)?;
        let path = self.record_path(principal);
        write_record(&path, &record)?;
        debug!(principal, path = %path.display(), "persisted enrollment record");
        Ok(record)
    }

    fn get(&self, principal: &str) -> AppResult<EnrollmentRecord> {
        validate_principal_id(principal)?;
        let path = self.record_path(principal);
        let record = read_record(&path)?.ok_or_else(|| AppError::NotFound {
            principal: principal.to_string(),
        })?;
        if record.principal_id != principal {
            return Err(AppError::InvalidStoreFile {
                path,
                message: format!(
                    "record belongs to principal '{}' instead of '{principal}'",
                    record.principal_id
                ),
            });
        }
        Ok(record)
    }

    fn exists(&self, principal: &str) -> bool {
        validate_principal_id(principal).is_ok() && self.record_path(principal).is_file()
    }

    fn principals(&self) -> AppResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AppError::StoreRead {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut principals = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| AppError::StoreRead {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(STORE_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            if validate_principal_id(stem).is_ok() && path.is_file() {
                principals.push(stem.to_string());
            }
        }
        principals.sort();
        Ok(principals)
    }
}

fn read_record(path: &Path) -> AppResult<Option<EnrollmentRecord>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(AppError::StoreRead {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let record: EnrollmentRecord =
        serde_json::from_slice(&data).map_err(|err| AppError::InvalidStoreFile {
            path: path.to_path_buf(),
            message: format!("invalid enrollment record: {err}"),
        })?;

    if record.encoding_len != record.encoding.len() {
        return Err(AppError::InvalidStoreFile {
            path: path.to_path_buf(),
            message: format!(
                "declared encoding_len {} but found {} values",
                record.encoding_len,
                record.encoding.len()
            ),
        });
    }

    Ok(Some(record))
}

fn write_record(path: &Path, record: &EnrollmentRecord) -> AppResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|source| AppError::StoreWrite {
        path: parent.to_path_buf(),
        source,
    })?;

    let write_err = |source: io::Error| AppError::StoreWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(write_err)?;
    {
        let file = tmp.as_file_mut();
        {
            let mut writer = BufWriter::new(&mut *file);
            let serialized = serde_json::to_vec_pretty(record)?;
            writer.write_all(&serialized).map_err(write_err)?;
            writer.write_all(b"\n").map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }
        file.sync_all().map_err(write_err)?;
    }

    let file = tmp.persist(path).map_err(|err| write_err(err.error))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata().map_err(write_err)?.permissions();
        perms.set_mode(0o600);
        file.set_permissions(perms).map_err(write_err)?;
    }
    #[cfg(not(unix))]
    drop(file);

    Ok(())
}
