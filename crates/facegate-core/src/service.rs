//! Application-facing facade over enrollment, authentication, session state
//! and per-resource authorization.
//!
//! Every operation returns a result value with a human-readable message;
//! errors from the core or the face service never escape as `Err`.

use serde::Serialize;
use tracing::{info, warn};

use crate::authorization::{authorize_recognition, AuthorizationVerdict};
use crate::errors::{AppError, AppResult};
use crate::faces::{
    validate_principal_id, AuthDecision, AuthenticationEngine, EncodingStore,
    DEFAULT_SIMILARITY_THRESHOLD,
};
use crate::remote::{EncodeResponse, FaceService, RecognizeResponse};
use crate::session::Session;

pub const DEFAULT_ADMIN_PRINCIPAL_ID: &str = "admin";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub similarity_threshold: f64,
    pub admin_principal_id: String,
}

impl ServiceConfig {
    /// Rejects thresholds outside `(0, 1]` and admin ids that cannot name a store entry.
    pub fn validate(&self) -> AppResult<()> {
        let threshold = self.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(AppError::InvalidThreshold { value: threshold });
        }
        validate_principal_id(&self.admin_principal_id)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            admin_principal_id: DEFAULT_ADMIN_PRINCIPAL_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl OperationResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            similarity: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            similarity: None,
        }
    }

    fn with_similarity(mut self, similarity: f64) -> Self {
        self.similarity = Some(similarity);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorizationResult {
    pub granted: bool,
    pub reason: String,
}

/// Which branch [`FaceAuthService::handle_admin_capture`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminFlow {
    Enrollment,
    Authentication,
}

/// One instance per process or client context, owning that context's session.
#[derive(Debug)]
pub struct FaceAuthService<S> {
    engine: AuthenticationEngine<S>,
    session: Session,
    admin_principal_id: String,
}

impl<S: EncodingStore> FaceAuthService<S> {
    pub fn new(store: S, config: ServiceConfig) -> AppResult<Self> {
        config.validate()?;
        Ok(Self {
            engine: AuthenticationEngine::new(store).with_threshold(config.similarity_threshold),
            session: Session::new(),
            admin_principal_id: config.admin_principal_id,
        })
    }

    pub fn store(&self) -> &S {
        self.engine.store()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn admin_principal_id(&self) -> &str {
        &self.admin_principal_id
    }

    pub fn register_principal_face(
        &self,
        principal: &str,
        encode_result: AppResult<EncodeResponse>,
    ) -> OperationResult {
        let response = match encode_result {
            Ok(response) => response,
            Err(err) => return transport_failure("registration", principal, err),
        };

        match response
            .into_encoding()
            .and_then(|encoding| self.engine.enroll(principal, &encoding))
        {
            Ok(_) => OperationResult::ok(format!(
                "Face registered successfully for '{principal}'."
            )),
            Err(AppError::InvalidEncoding { message }) => {
                warn!(principal, %message, "registration skipped: no usable encoding");
                OperationResult::failed(format!("No face detected or encoding failed: {message}"))
            }
            Err(err) => {
                warn!(principal, error = %err, "registration failed");
                OperationResult::failed(format!("Failed to register face: {err}"))
            }
        }
    }

    pub fn authenticate_principal(
        &mut self,
        principal: &str,
        encode_result: AppResult<EncodeResponse>,
    ) -> OperationResult {
        let response = match encode_result {
            Ok(response) => response,
            Err(err) => return transport_failure("authentication", principal, err),
        };

        let outcome = response
            .into_encoding()
            .and_then(|encoding| self.engine.authenticate(principal, &encoding));
        match outcome {
            Ok(outcome) => {
                self.session.record(outcome.decision);
                let result = match outcome.decision {
                    AuthDecision::Accept => {
                        OperationResult::ok(format!("'{principal}' authenticated successfully."))
                    }
                    AuthDecision::Reject => OperationResult::failed(
                        "Access denied. Face did not match the enrolled reference.",
                    ),
                };
                result.with_similarity(outcome.similarity)
            }
            Err(AppError::NotRegistered { .. }) => OperationResult::failed(format!(
                "Face not registered for '{principal}'. Please register first."
            )),
            Err(AppError::InvalidEncoding { message }) => {
                OperationResult::failed(format!("No face detected: {message}"))
            }
            Err(err) => {
                warn!(principal, error = %err, "authentication failed");
                OperationResult::failed(format!("Authentication failed: {err}"))
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    pub fn is_registered(&self, principal: &str) -> bool {
        self.engine.store().exists(principal)
    }

    pub fn authorize_resource_access(
        &self,
        requested_resource_id: &str,
        recognize_result: AppResult<RecognizeResponse>,
    ) -> AuthorizationResult {
        let response = match recognize_result {
            Ok(response) => response,
            Err(err) => {
                let err = into_transport_failure(err);
                warn!(resource = requested_resource_id, error = %err, "recognition unavailable");
                return AuthorizationResult {
                    granted: false,
                    reason: format!("Authentication failed. Please try again. ({err})"),
                };
            }
        };

        let verdict = authorize_recognition(requested_resource_id, &response);
        match verdict {
            AuthorizationVerdict::Grant => {
                info!(resource = requested_resource_id, "resource access granted")
            }
            AuthorizationVerdict::Deny(reason) => {
                warn!(resource = requested_resource_id, ?reason, "resource access denied")
            }
        }
        AuthorizationResult {
            granted: verdict.is_granted(),
            reason: verdict.explain().to_string(),
        }
    }

    pub fn register_admin_face(&self, encode_result: AppResult<EncodeResponse>) -> OperationResult {
        self.register_principal_face(&self.admin_principal_id, encode_result)
    }

    pub fn authenticate_admin(
        &mut self,
        encode_result: AppResult<EncodeResponse>,
    ) -> OperationResult {
        let admin = self.admin_principal_id.clone();
        self.authenticate_principal(&admin, encode_result)
    }

    pub fn is_admin_registered(&self) -> bool {
        self.is_registered(&self.admin_principal_id)
    }

    /// Enrolls the admin on first capture, authenticates on later ones.
    pub fn handle_admin_capture(
        &mut self,
        encode_result: AppResult<EncodeResponse>,
    ) -> (AdminFlow, OperationResult) {
        if self.is_admin_registered() {
            (
                AdminFlow::Authentication,
                self.authenticate_admin(encode_result),
            )
        } else {
            (
                AdminFlow::Enrollment,
                self.register_admin_face(encode_result),
            )
        }
    }

    pub fn register_with_service<F: FaceService>(
        &self,
        service: &F,
        principal: &str,
        image: &[u8],
    ) -> OperationResult {
        self.register_principal_face(principal, service.encode(image))
    }

    pub fn authenticate_with_service<F: FaceService>(
        &mut self,
        service: &F,
        principal: &str,
        image: &[u8],
    ) -> OperationResult {
        self.authenticate_principal(principal, service.encode(image))
    }

    pub fn authorize_with_service<F: FaceService>(
        &self,
        service: &F,
        requested_resource_id: &str,
        image: &[u8],
    ) -> AuthorizationResult {
        self.authorize_resource_access(requested_resource_id, service.recognize(image))
    }
}

fn into_transport_failure(err: AppError) -> AppError {
    match err {
        AppError::TransportFailure { .. } => err,
        other => AppError::transport(other.to_string()),
    }
}

fn transport_failure(operation: &str, principal: &str, err: AppError) -> OperationResult {
    let err = into_transport_failure(err);
    warn!(principal, operation, error = %err, "face service unavailable; state unchanged");
    OperationResult::failed(format!("Face {operation} failed: {err}"))
}
