use std::any::Any;
use std::process::ExitCode;

use facegate_core::authorization::ensure_owner;
use facegate_core::remote::RecognizedIdentity;

use crate::cli::{Commands, OutputMode};
use crate::errors::AppResult;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode>;
    fn as_any(&self) -> &dyn Any;
}

mod admin;
mod authenticate;
mod authorize;
mod enroll;
mod recognize;
mod status;

pub use admin::AdminHandler;
pub use authenticate::AuthenticateHandler;
pub use authorize::AuthorizeHandler;
pub use enroll::EnrollHandler;
pub use recognize::RecognizeHandler;
pub use status::StatusHandler;

/// Exit status for a command that ran but whose result was negative.
pub const DENIED_EXIT_CODE: u8 = 1;

impl From<Commands> for Box<dyn CommandHandler> {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Enroll(args) => Box::new(EnrollHandler::new(args)),
            Commands::Authenticate(args) => Box::new(AuthenticateHandler::new(args)),
            Commands::Authorize(args) => Box::new(AuthorizeHandler::new(args)),
            Commands::Recognize(args) => Box::new(RecognizeHandler::new(args)),
            Commands::Admin(args) => Box::new(AdminHandler::new(args)),
            Commands::Status(args) => Box::new(StatusHandler::new(args)),
        }
    }
}

fn exit_for(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(DENIED_EXIT_CODE)
    }
}

/// A face recognized as someone other than the resource owner exits with
/// the `AuthorizationMismatch` code; an unrecognized face is a plain denial.
fn exit_for_access(resource: &str, recognized: Option<&RecognizedIdentity>) -> ExitCode {
    match ensure_owner(resource, recognized) {
        Ok(granted) => exit_for(granted),
        Err(err) => {
            tracing::debug!(error = %err, "authorization mismatch");
            err.exit_code()
        }
    }
}
