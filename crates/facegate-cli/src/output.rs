use std::error::Error;
use std::io::{self, Write};

use serde::Serialize;
use serde_json::json;

use crate::cli::OutputMode;
use crate::errors::{AppError, AppResult};
use crate::workflows::{
    AdminOutcome, AuthenticateOutcome, AuthorizeOutcome, EnrollOutcome, RecognizeOutcome,
    StatusOutcome,
};

pub fn render_enroll(outcome: &EnrollOutcome, mode: OutputMode, verbose: bool) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            emit_logs(&outcome.logs, verbose);
            println!("{}", outcome.result.message);
            if outcome.result.success {
                println!("Encoding store: {}", outcome.store_path.display());
            }
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_authenticate(
    outcome: &AuthenticateOutcome,
    mode: OutputMode,
    verbose: bool,
) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            emit_logs(&outcome.logs, verbose);
            println!("{}", outcome.result.message);
            if let Some(similarity) = outcome.result.similarity {
                println!(
                    "Similarity: {similarity:.4} (threshold {:.4})",
                    outcome.threshold
                );
            }
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_admin(outcome: &AdminOutcome, mode: OutputMode, verbose: bool) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            emit_logs(&outcome.logs, verbose);
            println!("{}", outcome.result.message);
            if let Some(similarity) = outcome.result.similarity {
                println!("Similarity: {similarity:.4}");
            }
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_authorize(
    outcome: &AuthorizeOutcome,
    mode: OutputMode,
    verbose: bool,
) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            emit_logs(&outcome.logs, verbose);
            println!("{}", outcome.result.reason);
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_recognize(
    outcome: &RecognizeOutcome,
    mode: OutputMode,
    verbose: bool,
) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            emit_logs(&outcome.logs, verbose);
            match outcome.recognition.recognized_identity() {
                Some(identity) => match identity.confidence {
                    Some(confidence) => {
                        println!("Recognized '{}' (confidence {confidence:.4})", identity.id)
                    }
                    None => println!("Recognized '{}'", identity.id),
                },
                None => println!(
                    "{}",
                    outcome
                        .recognition
                        .message
                        .as_deref()
                        .unwrap_or("No matching user found")
                ),
            }
            if let Some(authorization) = &outcome.authorization {
                println!("{}", authorization.reason);
            }
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_status(outcome: &StatusOutcome, mode: OutputMode, _verbose: bool) -> AppResult<()> {
    match mode {
        OutputMode::Human => {
            if outcome.registered {
                println!(
                    "'{}' is enrolled ({} dimensions, since {})",
                    outcome.principal,
                    outcome.encoding_len.unwrap_or_default(),
                    outcome.enrolled_at.as_deref().unwrap_or("unknown")
                );
            } else {
                println!("'{}' has no enrolled face", outcome.principal);
            }
            println!("Encoding store: {}", outcome.store_path.display());
        }
        OutputMode::Json => write_json(outcome)?,
    }
    Ok(())
}

pub fn render_error(err: &AppError, mode: OutputMode) {
    match mode {
        OutputMode::Human => {
            eprintln!("error: {}", err.human_message());
            if let Some(source) = err.source() {
                eprintln!("cause: {source}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "success": false,
                "error": err.human_message(),
            });
            if let Ok(json) = serde_json::to_string(&payload) {
                println!("{json}");
            }
        }
    }
}

fn emit_logs(logs: &[String], verbose: bool) {
    if verbose {
        for line in logs {
            tracing::info!("{line}");
        }
    }
}

fn write_json<T: Serialize>(value: &T) -> AppResult<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let payload = serde_json::to_string(value)?;
    handle.write_all(payload.as_bytes())?;
    handle.write_all(b"\n")?;
    Ok(())
}
