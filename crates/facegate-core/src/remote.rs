//! Payloads exchanged with the remote face service.
//!
//! The service turns image bytes into encodings (`/encode`) or into a
//! candidate identity from the user registry (`/recognize`). Nothing here
//! talks to the network; [`FaceService`] is the seam a transport implements.

use std::fs;
use std::path::Path;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::faces::encoding::FaceEncoding;

const NO_FACE_MESSAGE: &str = "no face detected";

pub trait FaceService {
    fn encode(&self, image: &[u8]) -> AppResult<EncodeResponse>;
    fn recognize(&self, image: &[u8]) -> AppResult<RecognizeResponse>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_encoding: Option<Vec<f64>>,
    #[serde(default, alias = "detail", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EncodeResponse {
    pub fn with_encoding(encoding: Vec<f64>) -> Self {
        Self {
            success: true,
            face_encoding: Some(encoding),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            face_encoding: None,
            error: Some(error.into()),
        }
    }

    /// The probe signature, or `InvalidEncoding` when upstream detection
    /// produced nothing usable.
    pub fn into_encoding(self) -> AppResult<FaceEncoding> {
        if !self.success {
            return Err(AppError::invalid_encoding(
                self.error.unwrap_or_else(|| NO_FACE_MESSAGE.to_string()),
            ));
        }
        let values = self
            .face_encoding
            .ok_or_else(|| AppError::invalid_encoding("response carried no face_encoding"))?;
        FaceEncoding::new(values)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedIdentity {
    #[serde(deserialize_with = "deserialize_identity_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl RecognizedIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            confidence: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<RecognizedIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "detail", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognizeResponse {
    pub fn found(identity: RecognizedIdentity) -> Self {
        Self {
            success: true,
            user_found: true,
            user: Some(identity),
            message: None,
            error: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: true,
            user_found: false,
            user: None,
            message: Some("No matching user found".into()),
            error: None,
        }
    }

    /// The candidate identity, present only for a successful match.
    pub fn recognized_identity(&self) -> Option<&RecognizedIdentity> {
        if self.success && self.user_found {
            self.user.as_ref()
        } else {
            None
        }
    }
}

pub fn load_encode_response(path: &Path) -> AppResult<EncodeResponse> {
    load_response(path)
}

pub fn load_recognize_response(path: &Path) -> AppResult<RecognizeResponse> {
    load_response(path)
}

fn load_response<T>(path: &Path) -> AppResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let data = fs::read(path).map_err(|source| AppError::ResponseRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|err| AppError::InvalidResponse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn deserialize_identity_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => integral_id(&id).ok_or_else(|| {
            de::Error::custom(format!("identity id must be an integer, found {id}"))
        }),
        other => Err(de::Error::custom(format!(
            "identity id must be a string or number, found {other}"
        ))),
    }
}

/// `5` and `5.0` both name identity `"5"`.
fn integral_id(id: &serde_json::Number) -> Option<String> {
    if let Some(value) = id.as_i64() {
        return Some(value.to_string());
    }
    if let Some(value) = id.as_u64() {
        return Some(value.to_string());
    }
    let value = id.as_f64()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some((value as i64).to_string())
    } else {
        None
    }
}
