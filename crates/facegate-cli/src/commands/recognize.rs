use std::any::Any;
use std::process::ExitCode;

use crate::cli::{OutputMode, RecognizeArgs};
use crate::commands::{exit_for, exit_for_access, CommandHandler};
use crate::errors::AppResult;
use crate::output::render_recognize;
use crate::workflows::{self, RecognizeOutcome};

pub struct RecognizeHandler {
    args: RecognizeArgs,
    run: Box<dyn Fn(&RecognizeArgs) -> AppResult<RecognizeOutcome> + Send + Sync>,
    render: Box<dyn Fn(&RecognizeOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync>,
}

impl RecognizeHandler {
    pub fn new(args: RecognizeArgs) -> Self {
        Self::with_dependencies(args, workflows::run_recognize, render_recognize)
    }

    pub fn with_dependencies(
        args: RecognizeArgs,
        run: impl Fn(&RecognizeArgs) -> AppResult<RecognizeOutcome> + Send + Sync + 'static,
        render: impl Fn(&RecognizeOutcome, OutputMode, bool) -> AppResult<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            args,
            run: Box::new(run),
            render: Box::new(render),
        }
    }
}

impl CommandHandler for RecognizeHandler {
    fn execute(&self, mode: OutputMode, verbose: bool) -> AppResult<ExitCode> {
        let outcome = (self.run)(&self.args)?;
        (self.render)(&outcome, mode, verbose)?;
        let identity = outcome.recognition.recognized_identity();
        Ok(match outcome.resource.as_deref() {
            Some(resource) => exit_for_access(resource, identity),
            None => exit_for(identity.is_some()),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
