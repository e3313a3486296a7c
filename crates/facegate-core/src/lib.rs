//! Face-signature enrollment, authentication and per-resource authorization.

pub mod authorization;
pub mod errors;
pub mod faces;
pub mod remote;
pub mod service;
pub mod session;

pub use authorization::{authorize, AuthorizationVerdict, DenialReason};
pub use errors::{AppError, AppResult};
pub use service::{AuthorizationResult, FaceAuthService, OperationResult, ServiceConfig};
pub use session::{Session, SessionState};
