use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// A face signature produced by the external encoder.
///
/// Always non-empty with finite components. The dimensionality is whatever the
/// encoder emits; callers compare only encodings of equal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    pub fn new(values: Vec<f64>) -> AppResult<Self> {
        if values.is_empty() {
            return Err(AppError::invalid_encoding("encoding is empty"));
        }
        if let Some(index) = values.iter().position(|value| !value.is_finite()) {
            return Err(AppError::invalid_encoding(format!(
                "component {index} is not a finite number"
            )));
        }
        Ok(Self(values))
    }

    pub fn from_slice(values: &[f64]) -> AppResult<Self> {
        Self::new(values.to_vec())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

impl Deref for FaceEncoding {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for FaceEncoding {
    type Error = AppError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<FaceEncoding> for Vec<f64> {
    fn from(encoding: FaceEncoding) -> Self {
        encoding.0
    }
}

/// Principal ids double as store file names.
pub fn validate_principal_id(principal: &str) -> AppResult<()> {
    if principal.is_empty() {
        return Err(AppError::InvalidPrincipal {
            principal: principal.to_string(),
            message: "principal id cannot be empty".into(),
        });
    }

    if !principal
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(AppError::InvalidPrincipal {
            principal: principal.to_string(),
            message: "use ASCII letters, numbers, '-' or '_' only".into(),
        });
    }

    Ok(())
}
