use std::any::Any;
use std::process::ExitCode;

use crate::cli::{AuthorizeArgs, OutputMode};
use crate::commands::{exit_for_access, CommandHandler};
use crate::errors::AppResult;
use crate::output::render_authorize;
use crate::workflows::{self, AuthorizeOutcome};

pub struct AuthorizeHandler {
    args: AuthorizeArgs,
    run: Box<dyn Fn(&AuthorizeArgs) -> AppResult<AuthorizeOutcome> + Send + Sync>,
    render: Box<dyn Fn(&AuthorizeOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl AuthorizeHandler {
    pub fn new(args: AuthorizeArgs) -> Self {
        Self::with_dependencies(args, workflows::run_authorize, render_authorize)
    }

    pub fn with_dependencies(
        args: AuthorizeArgs,
        run: impl Fn(&AuthorizeArgs) -> AppResult<AuthorizeOutcome> + Send + Sync + 'static,
        render: impl Fn(&AuthorizeOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for AuthorizeHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(exit_for_access(&outcome.resource, outcome.recognized.as_ref()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
