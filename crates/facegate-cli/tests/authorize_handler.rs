use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use facegate_cli::cli::{AuthorizeArgs, OutputMode, RecognizeArgs};
use facegate_cli::commands::{
    AuthorizeHandler, CommandHandler, RecognizeHandler, DENIED_EXIT_CODE,
};
use facegate_cli::config::Settings;
use facegate_cli::errors::AppError;
use facegate_cli::workflows;
use facegate_config::ResolvedConfig;
use facegate_core::faces::{EncodingStore, FilesystemEncodingStore};
use tempfile::tempdir;

const RECOGNIZED_FIVE: &str =
    r#"{"success": true, "user_found": true, "user": {"id": 5, "name": "Ada"}}"#;

fn mismatch_exit_code() -> ExitCode {
    AppError::AuthorizationMismatch {
        requested: String::new(),
        recognized: String::new(),
    }
    .exit_code()
}

fn authorize_args(resource: &str, body: &str, dir: &Path) -> AuthorizeArgs {
    let recognition = dir.join(format!("recognize-{resource}.json"));
    fs::write(&recognition, body).unwrap();
    AuthorizeArgs {
        resource: resource.into(),
        recognition,
    }
}

fn authorize_handler(args: AuthorizeArgs, granted: Arc<Mutex<Vec<bool>>>) -> AuthorizeHandler {
    AuthorizeHandler::with_dependencies(
        args,
        |args| workflows::authorize_with(args, &Settings::default()),
        move |outcome, _mode, _verbose| {
            granted.lock().unwrap().push(outcome.result.granted);
            Ok(())
        },
    )
}

fn recognize_handler(settings: Settings, encoding: PathBuf, resource: &str) -> RecognizeHandler {
    RecognizeHandler::with_dependencies(
        RecognizeArgs {
            encoding,
            tolerance: None,
            resource: Some(resource.into()),
            store_dir: None,
        },
        move |args| workflows::recognize_with(args, &settings),
        |_outcome, _mode, _verbose| Ok(()),
    )
}

#[test]
fn owner_is_granted_and_other_identity_is_a_mismatch() {
    let dir = tempdir().unwrap();
    let granted = Arc::new(Mutex::new(Vec::new()));

    let own = authorize_handler(
        authorize_args("5", RECOGNIZED_FIVE, dir.path()),
        Arc::clone(&granted),
    );
    assert_eq!(own.execute(OutputMode::Json, false).unwrap(), ExitCode::SUCCESS);

    let other = authorize_handler(
        authorize_args("7", RECOGNIZED_FIVE, dir.path()),
        Arc::clone(&granted),
    );
    assert_eq!(
        other.execute(OutputMode::Json, false).unwrap(),
        mismatch_exit_code()
    );

    assert_eq!(*granted.lock().unwrap(), vec![true, false]);
}

#[test]
fn unrecognized_face_is_a_plain_denial() {
    let dir = tempdir().unwrap();
    let body = r#"{"success": true, "user_found": false, "message": "No matching user found"}"#;
    let granted = Arc::new(Mutex::new(Vec::new()));

    let handler = authorize_handler(authorize_args("5", body, dir.path()), Arc::clone(&granted));
    assert_eq!(
        handler.execute(OutputMode::Human, false).unwrap(),
        ExitCode::from(DENIED_EXIT_CODE)
    );
    assert_eq!(*granted.lock().unwrap(), vec![false]);
}

#[test]
fn unreadable_recognition_payload_is_an_error() {
    let dir = tempdir().unwrap();
    let args = authorize_args("5", "not json", dir.path());
    let handler = authorize_handler(args, Arc::new(Mutex::new(Vec::new())));

    let err = handler.execute(OutputMode::Human, false).unwrap_err();
    assert_eq!(err.exit_code(), ExitCode::from(2));
}

#[test]
fn registry_recognition_feeds_authorization() {
    let dir = tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let store = FilesystemEncodingStore::new(&store_dir);
    store.register("alice", &[0.1, 0.2, 0.3]).unwrap();
    store.register("bob", &[0.9, 0.9, 0.9]).unwrap();

    let probe = dir.path().join("probe.json");
    fs::write(&probe, r#"{"success": true, "face_encoding": [0.1, 0.2, 0.31]}"#).unwrap();

    let settings = Settings {
        resolved: ResolvedConfig {
            encoding_store_dir: Some(store_dir),
            ..ResolvedConfig::default()
        },
        source: None,
    };

    let own = recognize_handler(settings.clone(), probe.clone(), "alice");
    assert_eq!(own.execute(OutputMode::Json, false).unwrap(), ExitCode::SUCCESS);

    let other = recognize_handler(settings, probe, "bob");
    assert_eq!(
        other.execute(OutputMode::Json, false).unwrap(),
        mismatch_exit_code()
    );
}
