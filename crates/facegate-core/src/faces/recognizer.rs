use tracing::{debug, warn};

use crate::errors::{AppError, AppResult};
use crate::faces::comparer::euclidean_distance;
use crate::faces::encoding::FaceEncoding;
use crate::faces::store::EncodingStore;
use crate::remote::{RecognizeResponse, RecognizedIdentity};

pub const DEFAULT_RECOGNITION_TOLERANCE: f64 = 0.6;

/// Identifies which enrolled principal, if any, a probe belongs to.
///
/// A principal matches when its distance to the probe is within `tolerance`.
/// Among matches, the one with the highest confidence (`1 - distance`) wins.
#[derive(Debug)]
pub struct RegistryRecognizer<S> {
    store: S,
    tolerance: f64,
}

impl<S: EncodingStore> RegistryRecognizer<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            tolerance: DEFAULT_RECOGNITION_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn recognize(&self, probe: &FaceEncoding) -> AppResult<RecognizeResponse> {
        let mut best: Option<RecognizedIdentity> = None;
        let mut best_confidence = 0.0;

        for principal in self.store.principals()? {
            let record = self.store.get(&principal)?;
            let distance = match euclidean_distance(&record.encoding, probe) {
                Ok(distance) => distance,
                Err(AppError::LengthMismatch { expected, found }) => {
                    warn!(
                        principal = %principal,
                        expected, found, "skipping enrollment with different dimensionality"
                    );
                    continue;
                }
                Err(err) => return Err(err),
            };
            let confidence = 1.0 - distance;
            debug!(principal = %principal, distance, "measured registry candidate");

            if distance <= self.tolerance && confidence > best_confidence {
                best_confidence = confidence;
                best = Some(RecognizedIdentity {
                    id: principal,
                    name: None,
                    email: None,
                    confidence: Some(confidence),
                });
            }
        }

        Ok(match best {
            Some(identity) => RecognizeResponse::found(identity),
            None => RecognizeResponse::not_found(),
        })
    }
}
