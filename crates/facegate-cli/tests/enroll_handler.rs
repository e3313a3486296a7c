use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use facegate_cli::cli::{EnrollArgs, OutputMode};
use facegate_cli::commands::{CommandHandler, EnrollHandler, DENIED_EXIT_CODE};
use facegate_cli::errors::AppError;
use facegate_cli::workflows::EnrollOutcome;
use facegate_core::OperationResult;

fn sample_args() -> EnrollArgs {
    EnrollArgs {
        principal: Some("alice".into()),
        encoding: PathBuf::from("encode.json"),
        store_dir: Some(PathBuf::from("/var/lib/facegate/encodings")),
    }
}

fn sample_outcome(success: bool) -> EnrollOutcome {
    EnrollOutcome {
        principal: "alice".into(),
        store_path: PathBuf::from("/var/lib/facegate/encodings/alice.json"),
        replaced: false,
        result: OperationResult {
            success,
            message: if success {
                "Face registered successfully for 'alice'.".into()
            } else {
                "No face detected or encoding failed: No face detected in the image".into()
            },
            similarity: None,
        },
        logs: vec!["Loaded encode response from encode.json".into()],
    }
}

#[test]
fn enroll_handler_passes_verbose_flag_to_renderer() {
    let render_calls = Arc::new(Mutex::new(Vec::new()));
    let handler = EnrollHandler::with_dependencies(
        sample_args(),
        |_args| Ok(sample_outcome(true)),
        {
            let render_calls = Arc::clone(&render_calls);
            move |outcome, mode, verbose| {
                render_calls
                    .lock()
                    .unwrap()
                    .push((outcome.principal.clone(), mode, verbose));
                Ok(())
            }
        },
    );

    let exit = handler.execute(OutputMode::Json, true).unwrap();
    assert_eq!(exit, ExitCode::SUCCESS);
    let calls = render_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], ("alice".to_string(), OutputMode::Json, true));
}

#[test]
fn enroll_handler_reports_failed_registration_through_exit_code() {
    let handler = EnrollHandler::with_dependencies(
        sample_args(),
        |_args| Ok(sample_outcome(false)),
        |_outcome, _mode, _verbose| Ok(()),
    );

    let exit = handler.execute(OutputMode::Human, false).unwrap();
    assert_eq!(exit, ExitCode::from(DENIED_EXIT_CODE));
}

#[test]
fn enroll_handler_surfaces_run_errors() {
    let handler = EnrollHandler::with_dependencies(
        sample_args(),
        |args| {
            Err(AppError::InvalidPrincipal {
                principal: args.principal.clone().unwrap_or_default(),
                message: "boom".into(),
            })
        },
        |_outcome, _mode, _verbose| panic!("renderer must not run after a failure"),
    );

    let err = handler.execute(OutputMode::Human, false).unwrap_err();
    match err {
        AppError::InvalidPrincipal { principal, message } => {
            assert_eq!(principal, "alice");
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}
