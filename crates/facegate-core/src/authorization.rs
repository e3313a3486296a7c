//! Per-resource authorization for recognized faces.
//!
//! Recognition says *who* is in front of the camera; this gate decides whether
//! that identity may act on the resource it asked for. A face recognized as
//! some registered user is still denied another user's resource.

use serde::Serialize;

use crate::errors::AppError;
use crate::remote::{RecognizeResponse, RecognizedIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NotRecognized,
    IdentityMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum AuthorizationVerdict {
    Grant,
    Deny(DenialReason),
}

impl AuthorizationVerdict {
    pub fn is_granted(self) -> bool {
        matches!(self, AuthorizationVerdict::Grant)
    }

    pub fn explain(self) -> &'static str {
        match self {
            AuthorizationVerdict::Grant => "Authentication successful; access granted.",
            AuthorizationVerdict::Deny(DenialReason::NotRecognized) => {
                "Face not recognized. Please use a registered face."
            }
            AuthorizationVerdict::Deny(DenialReason::IdentityMismatch) => {
                "Access denied. You can only access your own resource."
            }
        }
    }
}

/// No IO, no side effects.
pub fn authorize(
    requested_resource_id: &str,
    recognized: Option<&RecognizedIdentity>,
) -> AuthorizationVerdict {
    match recognized {
        None => AuthorizationVerdict::Deny(DenialReason::NotRecognized),
        Some(identity) if identity.id == requested_resource_id => AuthorizationVerdict::Grant,
        Some(_) => AuthorizationVerdict::Deny(DenialReason::IdentityMismatch),
    }
}

pub fn authorize_recognition(
    requested_resource_id: &str,
    response: &RecognizeResponse,
) -> AuthorizationVerdict {
    authorize(requested_resource_id, response.recognized_identity())
}

/// Fails with `AuthorizationMismatch` for a recognized identity that does
/// not own the resource. `Ok(false)` means nobody was recognized.
pub fn ensure_owner(
    requested_resource_id: &str,
    recognized: Option<&RecognizedIdentity>,
) -> Result<bool, AppError> {
    match (authorize(requested_resource_id, recognized), recognized) {
        (AuthorizationVerdict::Grant, _) => Ok(true),
        (AuthorizationVerdict::Deny(DenialReason::IdentityMismatch), Some(identity)) => {
            Err(AppError::AuthorizationMismatch {
                requested: requested_resource_id.to_string(),
                recognized: identity.id.clone(),
            })
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_identity_is_granted() {
        let identity = RecognizedIdentity::new("5");
        assert_eq!(authorize("5", Some(&identity)), AuthorizationVerdict::Grant);
    }

    #[test]
    fn other_identity_is_denied() {
        let identity = RecognizedIdentity::new("7");
        assert_eq!(
            authorize("5", Some(&identity)),
            AuthorizationVerdict::Deny(DenialReason::IdentityMismatch)
        );
    }

    #[test]
    fn absent_identity_is_not_recognized() {
        assert_eq!(
            authorize("5", None),
            AuthorizationVerdict::Deny(DenialReason::NotRecognized)
        );
    }

    #[test]
    fn ids_compare_exactly() {
        let identity = RecognizedIdentity::new("05");
        assert!(!authorize("5", Some(&identity)).is_granted());
    }

    #[test]
    fn recognition_payload_feeds_the_gate() {
        let found = RecognizeResponse::found(RecognizedIdentity::new("5"));
        assert!(authorize_recognition("5", &found).is_granted());

        let missing = RecognizeResponse::not_found();
        assert_eq!(
            authorize_recognition("5", &missing),
            AuthorizationVerdict::Deny(DenialReason::NotRecognized)
        );
    }

    #[test]
    fn ensure_owner_surfaces_mismatch() {
        let other = RecognizedIdentity::new("7");
        match ensure_owner("5", Some(&other)).unwrap_err() {
            AppError::AuthorizationMismatch {
                requested,
                recognized,
            } => {
                assert_eq!(requested, "5");
                assert_eq!(recognized, "7");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!ensure_owner("5", None).unwrap());
        assert!(ensure_owner("5", Some(&RecognizedIdentity::new("5"))).unwrap());
    }

    #[test]
    fn verdict_serializes_with_reason() {
        let json = serde_json::to_value(AuthorizationVerdict::Deny(
            DenialReason::IdentityMismatch,
        ))
        .unwrap();
        assert_eq!(json["verdict"], "deny");
        assert_eq!(json["reason"], "identity_mismatch");
    }
}
