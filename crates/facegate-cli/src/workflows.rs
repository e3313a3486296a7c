//! Command workflows: load inputs and settings, drive [`FaceAuthService`],
//! and report what happened.
//!
//! Each `run_*` loads the configuration from the standard locations; the
//! matching `*_with` variant takes [`Settings`] directly.

use std::path::PathBuf;

use serde::Serialize;

use facegate_core::faces::{validate_principal_id, EncodingStore, RegistryRecognizer};
use facegate_core::remote::{
    load_encode_response, load_recognize_response, RecognizeResponse, RecognizedIdentity,
};
use facegate_core::service::AdminFlow;
use facegate_core::{AuthorizationResult, FaceAuthService, OperationResult, SessionState};

use crate::cli::{
    AdminArgs, AuthenticateArgs, AuthorizeArgs, EnrollArgs, RecognizeArgs, StatusArgs,
};
use crate::config::{self as config_loader, Settings};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct EnrollOutcome {
    pub principal: String,
    pub store_path: PathBuf,
    pub replaced: bool,
    #[serde(flatten)]
    pub result: OperationResult,
    #[serde(skip)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthenticateOutcome {
    pub principal: String,
    pub threshold: f64,
    pub session: SessionState,
    #[serde(flatten)]
    pub result: OperationResult,
    #[serde(skip)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOutcome {
    pub principal: String,
    pub flow: AdminFlow,
    pub session: SessionState,
    #[serde(flatten)]
    pub result: OperationResult,
    #[serde(skip)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeOutcome {
    pub resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recognized: Option<RecognizedIdentity>,
    #[serde(flatten)]
    pub result: AuthorizationResult,
    #[serde(skip)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecognizeOutcome {
    pub tolerance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    pub recognition: RecognizeResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization: Option<AuthorizationResult>,
    #[serde(skip)]
    pub logs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusOutcome {
    pub principal: String,
    pub registered: bool,
    pub store_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding_len: Option<usize>,
}

pub fn run_enroll(args: &EnrollArgs) -> AppResult<EnrollOutcome> {
    enroll_with(args, &config_loader::load_settings()?)
}

pub fn enroll_with(args: &EnrollArgs, settings: &Settings) -> AppResult<EnrollOutcome> {
    let principal = settings.principal_or_admin(args.principal.as_deref());
    validate_principal_id(&principal)?;
    let response = load_encode_response(&args.encoding)?;

    let store = settings.open_store(args.store_dir.as_deref());
    let mut logs = vec![
        format!("Loaded encode response from {}", args.encoding.display()),
        format!("Configuration: {}", settings.source_label()),
        format!("Encoding store: {}", store.dir().display()),
    ];
    let service = FaceAuthService::new(&store, settings.service_config(None))?;
    let replaced = service.is_registered(&principal);
    if replaced {
        logs.push(format!("Replacing existing enrollment for '{principal}'"));
    }

    let result = service.register_principal_face(&principal, Ok(response));
    Ok(EnrollOutcome {
        store_path: store.record_path(&principal),
        principal,
        replaced: replaced && result.success,
        result,
        logs,
    })
}

pub fn run_authenticate(args: &AuthenticateArgs) -> AppResult<AuthenticateOutcome> {
    authenticate_with(args, &config_loader::load_settings()?)
}

pub fn authenticate_with(
    args: &AuthenticateArgs,
    settings: &Settings,
) -> AppResult<AuthenticateOutcome> {
    let principal = settings.principal_or_admin(args.principal.as_deref());
    validate_principal_id(&principal)?;
    let response = load_encode_response(&args.encoding)?;

    let store = settings.open_store(args.store_dir.as_deref());
    let config = settings.service_config(args.threshold);
    let threshold = config.similarity_threshold;
    let logs = vec![
        format!("Loaded encode response from {}", args.encoding.display()),
        format!("Configuration: {}", settings.source_label()),
        format!("Encoding store: {}", store.dir().display()),
        format!("Similarity threshold: {threshold}"),
    ];

    let mut service = FaceAuthService::new(&store, config)?;
    let result = service.authenticate_principal(&principal, Ok(response));
    Ok(AuthenticateOutcome {
        principal,
        threshold,
        session: service.session().state(),
        result,
        logs,
    })
}

pub fn run_admin(args: &AdminArgs) -> AppResult<AdminOutcome> {
    admin_with(args, &config_loader::load_settings()?)
}

pub fn admin_with(args: &AdminArgs, settings: &Settings) -> AppResult<AdminOutcome> {
    let response = load_encode_response(&args.encoding)?;
    let store = settings.open_store(args.store_dir.as_deref());
    let mut service = FaceAuthService::new(&store, settings.service_config(args.threshold))?;

    let (flow, result) = service.handle_admin_capture(Ok(response));
    let logs = vec![
        format!("Loaded encode response from {}", args.encoding.display()),
        format!("Configuration: {}", settings.source_label()),
        format!("Encoding store: {}", store.dir().display()),
        format!("Admin flow: {flow:?}"),
    ];
    Ok(AdminOutcome {
        principal: service.admin_principal_id().to_string(),
        flow,
        session: service.session().state(),
        result,
        logs,
    })
}

pub fn run_authorize(args: &AuthorizeArgs) -> AppResult<AuthorizeOutcome> {
    authorize_with(args, &config_loader::load_settings()?)
}

pub fn authorize_with(args: &AuthorizeArgs, settings: &Settings) -> AppResult<AuthorizeOutcome> {
    let response = load_recognize_response(&args.recognition)?;
    let recognized = response.recognized_identity().cloned();
    let logs = vec![
        format!("Loaded recognize response from {}", args.recognition.display()),
        match &recognized {
            Some(identity) => format!("Recognized identity: {}", identity.id),
            None => "No identity recognized".to_string(),
        },
    ];

    let store = settings.open_store(None);
    let service = FaceAuthService::new(&store, settings.service_config(None))?;
    let result = service.authorize_resource_access(&args.resource, Ok(response));
    Ok(AuthorizeOutcome {
        resource: args.resource.clone(),
        recognized,
        result,
        logs,
    })
}

pub fn run_recognize(args: &RecognizeArgs) -> AppResult<RecognizeOutcome> {
    recognize_with(args, &config_loader::load_settings()?)
}

pub fn recognize_with(args: &RecognizeArgs, settings: &Settings) -> AppResult<RecognizeOutcome> {
    let probe = load_encode_response(&args.encoding)?.into_encoding()?;
    let store = settings.open_store(args.store_dir.as_deref());
    let tolerance = args
        .tolerance
        .unwrap_or(settings.resolved.recognition_tolerance);
    let mut logs = vec![
        format!("Loaded encode response from {}", args.encoding.display()),
        format!("Configuration: {}", settings.source_label()),
        format!("Encoding store: {}", store.dir().display()),
        format!("Recognition tolerance: {tolerance}"),
    ];

    let recognition = RegistryRecognizer::new(&store)
        .with_tolerance(tolerance)
        .recognize(&probe)?;
    match recognition.recognized_identity() {
        Some(identity) => logs.push(format!("Best match: {}", identity.id)),
        None => logs.push("No enrolled principal within tolerance".to_string()),
    }

    let authorization = match args.resource.as_deref() {
        Some(resource) => {
            let service = FaceAuthService::new(&store, settings.service_config(None))?;
            Some(service.authorize_resource_access(resource, Ok(recognition.clone())))
        }
        None => None,
    };

    Ok(RecognizeOutcome {
        tolerance,
        resource: args.resource.clone(),
        recognition,
        authorization,
        logs,
    })
}

pub fn run_status(args: &StatusArgs) -> AppResult<StatusOutcome> {
    status_with(args, &config_loader::load_settings()?)
}

pub fn status_with(args: &StatusArgs, settings: &Settings) -> AppResult<StatusOutcome> {
    let principal = settings.principal_or_admin(args.principal.as_deref());
    validate_principal_id(&principal)?;
    let store = settings.open_store(args.store_dir.as_deref());
    let store_path = store.record_path(&principal);

    let record = match store.get(&principal) {
        Ok(record) => Some(record),
        Err(AppError::NotFound { .. }) => None,
        Err(err) => return Err(err),
    };
    Ok(StatusOutcome {
        principal,
        registered: record.is_some(),
        store_path,
        enrolled_at: record.as_ref().map(|record| record.enrolled_at.clone()),
        encoding_len: record.as_ref().map(|record| record.encoding_len),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    use facegate_config::ResolvedConfig;
    use facegate_core::remote::EncodeResponse;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        settings: Settings,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let settings = Settings {
                resolved: ResolvedConfig {
                    encoding_store_dir: Some(dir.path().join("store")),
                    ..ResolvedConfig::default()
                },
                source: None,
            };
            Self { dir, settings }
        }

        fn encode_file(&self, name: &str, encoding: Vec<f64>) -> PathBuf {
            let path = self.dir.path().join(name);
            let body = serde_json::to_string(&EncodeResponse::with_encoding(encoding)).unwrap();
            fs::write(&path, body).unwrap();
            path
        }

        fn raw_file(&self, name: &str, body: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            fs::write(&path, body).unwrap();
            path
        }

        fn enroll(&self, principal: &str, encoding: Vec<f64>) -> EnrollOutcome {
            let args = EnrollArgs {
                principal: Some(principal.into()),
                encoding: self.encode_file(&format!("{principal}-enroll.json"), encoding),
                store_dir: None,
            };
            enroll_with(&args, &self.settings).unwrap()
        }

        fn authenticate(&self, principal: &str, encoding: Vec<f64>) -> AuthenticateOutcome {
            let args = AuthenticateArgs {
                principal: Some(principal.into()),
                encoding: self.encode_file("probe.json", encoding),
                threshold: None,
                store_dir: None,
            };
            authenticate_with(&args, &self.settings).unwrap()
        }
    }

    #[test]
    fn enroll_then_authenticate() {
        let fixture = Fixture::new();
        let enrolled = fixture.enroll("alice", vec![1.0, 0.0, 0.0]);
        assert!(enrolled.result.success, "{}", enrolled.result.message);
        assert!(!enrolled.replaced);
        assert!(enrolled.store_path.is_file());

        let accepted = fixture.authenticate("alice", vec![0.9, 0.1, 0.0]);
        assert!(accepted.result.success);
        assert_eq!(accepted.session, SessionState::Authenticated);
        assert_eq!(accepted.threshold, 0.6);

        let rejected = fixture.authenticate("alice", vec![0.0, 1.0, 0.0]);
        assert!(!rejected.result.success);
        assert_eq!(rejected.result.similarity, Some(0.0));
        assert_eq!(rejected.session, SessionState::Unauthenticated);
    }

    #[test]
    fn re_enrollment_is_reported_as_replacement() {
        let fixture = Fixture::new();
        fixture.enroll("alice", vec![1.0, 0.0]);
        let again = fixture.enroll("alice", vec![0.0, 1.0]);
        assert!(again.replaced);

        let accepted = fixture.authenticate("alice", vec![0.0, 1.0]);
        assert!(accepted.result.success);
    }

    #[test]
    fn threshold_flag_overrides_configuration() {
        let fixture = Fixture::new();
        fixture.enroll("alice", vec![1.0, 0.0, 0.0]);
        let args = AuthenticateArgs {
            principal: Some("alice".into()),
            encoding: fixture.encode_file("probe.json", vec![0.9, 0.1, 0.0]),
            threshold: Some(1.0),
            store_dir: None,
        };
        let outcome = authenticate_with(&args, &fixture.settings).unwrap();
        assert_eq!(outcome.threshold, 1.0);
        assert!(!outcome.result.success);
    }

    #[test]
    fn unregistered_principal_is_a_failed_result() {
        let fixture = Fixture::new();
        let outcome = fixture.authenticate("bob", vec![1.0, 0.0]);
        assert!(!outcome.result.success);
        assert!(outcome.result.message.contains("register first"));
    }

    #[test]
    fn invalid_principal_is_an_error() {
        let fixture = Fixture::new();
        let args = EnrollArgs {
            principal: Some("../etc/passwd".into()),
            encoding: fixture.encode_file("probe.json", vec![1.0]),
            store_dir: None,
        };
        match enroll_with(&args, &fixture.settings).unwrap_err() {
            AppError::InvalidPrincipal { principal, .. } => assert_eq!(principal, "../etc/passwd"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_encode_file_is_an_error() {
        let fixture = Fixture::new();
        let args = EnrollArgs {
            principal: None,
            encoding: fixture.dir.path().join("missing.json"),
            store_dir: None,
        };
        assert!(matches!(
            enroll_with(&args, &fixture.settings).unwrap_err(),
            AppError::ResponseRead { .. }
        ));
    }

    #[test]
    fn failed_encode_response_does_not_enroll() {
        let fixture = Fixture::new();
        let args = EnrollArgs {
            principal: Some("alice".into()),
            encoding: fixture.raw_file(
                "failed.json",
                r#"{"success": false, "error": "No face detected in the image"}"#,
            ),
            store_dir: None,
        };
        let outcome = enroll_with(&args, &fixture.settings).unwrap();
        assert!(!outcome.result.success);
        assert!(!outcome.store_path.exists());
    }

    #[test]
    fn admin_flow_enrolls_then_authenticates() {
        let fixture = Fixture::new();
        let args = AdminArgs {
            encoding: fixture.encode_file("admin.json", vec![0.2, 0.4, 0.4]),
            threshold: None,
            store_dir: None,
        };

        let first = admin_with(&args, &fixture.settings).unwrap();
        assert_eq!(first.flow, AdminFlow::Enrollment);
        assert_eq!(first.principal, "admin");
        assert_eq!(first.session, SessionState::Unauthenticated);

        let second = admin_with(&args, &fixture.settings).unwrap();
        assert_eq!(second.flow, AdminFlow::Authentication);
        assert!(second.result.success);
        assert_eq!(second.session, SessionState::Authenticated);
    }

    #[test]
    fn authorize_compares_recognized_identity_with_resource() {
        let fixture = Fixture::new();
        let recognition = fixture.raw_file(
            "recognize.json",
            r#"{"success": true, "user_found": true, "user": {"id": 5, "name": "Ada", "confidence": 0.83}}"#,
        );

        let own = authorize_with(
            &AuthorizeArgs {
                resource: "5".into(),
                recognition: recognition.clone(),
            },
            &fixture.settings,
        )
        .unwrap();
        assert!(own.result.granted);
        assert_eq!(own.recognized.as_ref().map(|user| user.id.as_str()), Some("5"));

        let other = authorize_with(
            &AuthorizeArgs {
                resource: "7".into(),
                recognition,
            },
            &fixture.settings,
        )
        .unwrap();
        assert!(!other.result.granted);
        assert!(other.result.reason.contains("your own"));
    }

    #[test]
    fn authorize_without_match_is_not_recognized() {
        let fixture = Fixture::new();
        let recognition = fixture.raw_file(
            "recognize.json",
            r#"{"success": true, "user_found": false, "message": "No matching user found"}"#,
        );
        let outcome = authorize_with(
            &AuthorizeArgs {
                resource: "5".into(),
                recognition,
            },
            &fixture.settings,
        )
        .unwrap();
        assert!(!outcome.result.granted);
        assert!(outcome.recognized.is_none());
        assert!(outcome.result.reason.contains("not recognized"));
    }

    #[test]
    fn recognize_finds_closest_enrollment_and_authorizes() {
        let fixture = Fixture::new();
        fixture.enroll("alice", vec![0.1, 0.2, 0.3]);
        fixture.enroll("bob", vec![0.9, 0.9, 0.9]);

        let args = RecognizeArgs {
            encoding: fixture.encode_file("probe.json", vec![0.1, 0.2, 0.35]),
            tolerance: None,
            resource: Some("alice".into()),
            store_dir: None,
        };
        let outcome = recognize_with(&args, &fixture.settings).unwrap();
        let identity = outcome.recognition.recognized_identity().unwrap();
        assert_eq!(identity.id, "alice");
        assert!(outcome.authorization.as_ref().unwrap().granted);
        assert_eq!(outcome.resource.as_deref(), Some("alice"));

        let denied = recognize_with(
            &RecognizeArgs {
                resource: Some("bob".into()),
                ..args
            },
            &fixture.settings,
        )
        .unwrap();
        assert!(!denied.authorization.as_ref().unwrap().granted);
    }

    #[test]
    fn recognize_outside_tolerance_finds_nobody() {
        let fixture = Fixture::new();
        fixture.enroll("alice", vec![0.0, 0.0]);
        let args = RecognizeArgs {
            encoding: fixture.encode_file("probe.json", vec![3.0, 4.0]),
            tolerance: Some(1.0),
            resource: None,
            store_dir: None,
        };
        let outcome = recognize_with(&args, &fixture.settings).unwrap();
        assert!(outcome.recognition.recognized_identity().is_none());
        assert!(outcome.resource.is_none());
    }

    #[test]
    fn status_reports_enrollment() {
        let fixture = Fixture::new();
        let args = StatusArgs {
            principal: Some("alice".into()),
            store_dir: None,
        };
        let before = status_with(&args, &fixture.settings).unwrap();
        assert!(!before.registered);
        assert!(before.enrolled_at.is_none());

        fixture.enroll("alice", vec![1.0, 2.0, 3.0]);
        let after = status_with(&args, &fixture.settings).unwrap();
        assert!(after.registered);
        assert_eq!(after.encoding_len, Some(3));
        assert_eq!(
            after.store_path,
            fixture.dir.path().join("store").join("alice.json")
        );
    }

    #[test]
    fn store_dir_flag_overrides_settings() {
        let fixture = Fixture::new();
        let other = fixture.dir.path().join("elsewhere");
        let args = EnrollArgs {
            principal: Some("alice".into()),
            encoding: fixture.encode_file("probe.json", vec![1.0]),
            store_dir: Some(other.clone()),
        };
        let outcome = enroll_with(&args, &fixture.settings).unwrap();
        assert!(outcome.store_path.starts_with(Path::new(&other)));
        assert!(other.join("alice.json").is_file());
    }
}
