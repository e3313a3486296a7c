use std::any::Any;
use std::process::ExitCode;

use crate::cli::{AuthenticateArgs, OutputMode};
use crate::commands::{exit_for, CommandHandler};
use crate::errors::AppResult;
use crate::output::render_authenticate;
use crate::workflows::{self, AuthenticateOutcome};

pub struct AuthenticateHandler {
    args: AuthenticateArgs,
    run: Box<dyn Fn(&AuthenticateArgs) -> AppResult<AuthenticateOutcome> + Send + Sync>,
    render: Box<dyn Fn(&AuthenticateOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl AuthenticateHandler {
    pub fn new(args: AuthenticateArgs) -> Self {
        Self::with_dependencies(args, workflows::run_authenticate, render_authenticate)
    }

    pub fn with_dependencies(
        args: AuthenticateArgs,
        run: impl Fn(&AuthenticateArgs) -> AppResult<AuthenticateOutcome> + Send + Sync + 'static,
        render: impl Fn(&AuthenticateOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for AuthenticateHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(exit_for(outcome.result.success))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
