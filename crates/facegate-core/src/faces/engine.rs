use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::{AppError, AppResult};
use crate::faces::comparer::cosine_similarity;
use crate::faces::encoding::FaceEncoding;
use crate::faces::store::{EncodingStore, EnrollmentRecord};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthDecision {
    Accept,
    Reject,
}

impl AuthDecision {
    pub fn is_accept(self) -> bool {
        matches!(self, AuthDecision::Accept)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticationOutcome {
    pub principal: String,
    pub decision: AuthDecision,
    pub similarity: f64,
    pub threshold: f64,
}

/// Enrollment and similarity-based authentication against an [`EncodingStore`].
///
/// The engine only decides; moving a session to authenticated is the
/// caller's job.
#[derive(Debug)]
pub struct AuthenticationEngine<S> {
    store: S,
    threshold: f64,
}

impl<S: EncodingStore> AuthenticationEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn enroll(&self, principal: &str, probe: &[f64]) -> AppResult<EnrollmentRecord> {
        if probe.is_empty() {
            return Err(AppError::invalid_encoding(
                "no face was detected in the captured image",
            ));
        }
        let record = self.store.register(principal, probe)?;
        info!(
            principal,
            encoding_len = record.encoding_len,
            "enrolled reference face"
        );
        Ok(record)
    }

    pub fn authenticate(&self, principal: &str, probe: &[f64]) -> AppResult<AuthenticationOutcome> {
        self.authenticate_with_threshold(principal, probe, self.threshold)
    }

    /// Accepts only when the similarity strictly exceeds `threshold`.
    pub fn authenticate_with_threshold(
        &self,
        principal: &str,
        probe: &[f64],
        threshold: f64,
    ) -> AppResult<AuthenticationOutcome> {
        let probe = FaceEncoding::from_slice(probe)?;
        let stored = match self.store.get(principal) {
            Ok(record) => record,
            Err(AppError::NotFound { .. }) => {
                return Err(AppError::NotRegistered {
                    principal: principal.to_string(),
                })
            }
            Err(err) => return Err(err),
        };

        let similarity = cosine_similarity(&stored.encoding, &probe)?;
        debug!(principal, similarity, threshold, "compared probe against enrollment");

        let decision = if similarity > threshold {
            AuthDecision::Accept
        } else {
            AuthDecision::Reject
        };
        match decision {
            AuthDecision::Accept => info!(principal, similarity, "face authentication accepted"),
            AuthDecision::Reject => warn!(
                principal,
                similarity, threshold, "face authentication rejected"
            ),
        }

        Ok(AuthenticationOutcome {
            principal: principal.to_string(),
            decision,
            similarity,
            threshold,
        })
    }
}
