use std::any::Any;
use std::process::ExitCode;

use crate::cli::{OutputMode, StatusArgs};
use crate::commands::{exit_for, CommandHandler};
use crate::errors::AppResult;
use crate::output::render_status;
use crate::workflows::{self, StatusOutcome};

pub struct StatusHandler {
    args: StatusArgs,
    run: Box<dyn Fn(&StatusArgs) -> AppResult<StatusOutcome> + Send + Sync>,
    render: Box<dyn Fn(&StatusOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl StatusHandler {
    pub fn new(args: StatusArgs) -> Self {
        Self::with_dependencies(args, workflows::run_status, render_status)
    }

    pub fn with_dependencies(
        args: StatusArgs,
        run: impl Fn(&StatusArgs) -> AppResult<StatusOutcome> + Send + Sync + 'static,
        render: impl Fn(&StatusOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for StatusHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(exit_for(outcome.registered))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
