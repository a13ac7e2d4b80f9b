use std::io::BufRead;
use std::process::ExitCode;

use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use sdbcpu::{MemoryError, Riscv32};
use sdbexpr::Engine;
use thiserror::Error;

use crate::cli::Cli;
use crate::command::{CommandError, Flow, Monitor};
use crate::editor::{Editor, EditorRead};
use crate::report::{Report, SimpleReport};

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("could not read image '{path}': {source}")]
    Image {
        path:   String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Memory(#[from] MemoryError),
}

impl Report for SetupError {
    fn diagnose(&self) -> Diagnostic<()> {
        Diagnostic::error().with_message(self)
    }
}

pub struct Driver {
    monitor:    Monitor,
    batch:      bool,
    quiet:      bool,
    max_errors: usize,
}

impl Driver {
    pub fn from_config(cfg: Cli) -> Result<Self, SetupError> {
        let machine = match &cfg.image {
            Some(path) => {
                let image = std::fs::read(path).map_err(|source| SetupError::Image {
                    path: path.clone(),
                    source,
                })?;
                Riscv32::with_image(cfg.mem_size, &image)?
            }
            None => Riscv32::new(cfg.mem_size)?,
        };

        let engine = Engine::new()
            .with_strategy(cfg.parser.into())
            .with_limit(cfg.max_tokens);

        Ok(Self {
            monitor: Monitor::new(machine, engine),
            batch: cfg.batch,
            quiet: cfg.quiet,
            max_errors: cfg.max_errors,
        })
    }

    pub fn run(self) -> ExitCode {
        let result = if self.batch {
            self.batch()
        } else {
            self.repl()
        };

        result.unwrap_or_else(|err| {
            if !self.quiet {
                SimpleReport::new(err.to_string()).report(&SimpleFile::new("<stdin>", ""));
            }
            ExitCode::FAILURE
        })
    }

    fn report_error(&self, err: &CommandError) {
        if self.quiet {
            return;
        }
        err.report(&SimpleFile::new("<expr>", err.expression()));
    }

    fn repl(&self) -> std::io::Result<ExitCode> {
        let mut editor = Editor::default();
        let mut out = StandardStream::stdout(ColorChoice::Auto);
        loop {
            let signal = editor.read()?;
            let input = match signal {
                EditorRead::Read(input) => input,
                EditorRead::Break => break,
                EditorRead::Continue => continue,
            };

            match self.monitor.execute(&input, &mut out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => self.report_error(&err),
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    fn batch(&self) -> std::io::Result<ExitCode> {
        let mut out = StandardStream::stdout(ColorChoice::Auto);
        let mut failed = 0;
        let mut emitted = 0;

        for line in std::io::stdin().lock().lines() {
            let line = line?;
            match self.monitor.execute(&line, &mut out) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(err) => {
                    failed += 1;
                    if !self.quiet && emitted < self.max_errors {
                        self.report_error(&err);
                        emitted += 1;
                    }
                }
            }
        }

        if failed == 0 {
            return Ok(ExitCode::SUCCESS);
        }

        if !self.quiet {
            let message = format!(
                "{} {} failed ({} emitted)",
                failed,
                if failed > 1 { "commands" } else { "command" },
                emitted
            );
            SimpleReport::new(message).report(&SimpleFile::new("<stdin>", ""));
        }
        Ok(ExitCode::FAILURE)
    }
}
