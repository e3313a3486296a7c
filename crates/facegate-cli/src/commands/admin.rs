use std::any::Any;
use std::process::ExitCode;

use crate::cli::{AdminArgs, OutputMode};
use crate::commands::{exit_for, CommandHandler};
use crate::errors::AppResult;
use crate::output::render_admin;
use crate::workflows::{self, AdminOutcome};

pub struct AdminHandler {
    args: AdminArgs,
    run: Box<dyn Fn(&AdminArgs) -> AppResult<AdminOutcome> + Send + Sync>,
    render: Box<dyn Fn(&AdminOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl AdminHandler {
    pub fn new(args: AdminArgs) -> Self {
        Self::with_dependencies(args, workflows::run_admin, render_admin)
    }

    pub fn with_dependencies(
        args: AdminArgs,
        run: impl Fn(&AdminArgs) -> AppResult<AdminOutcome> + Send + Sync + 'static,
        render: impl Fn(&AdminOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for AdminHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        Ok(exit_for(outcome.result.success))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
