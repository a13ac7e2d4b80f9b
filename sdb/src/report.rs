use std::error::Error;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::Files;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use sdbexpr::ExprError;
use sdbspan::Spand;

use crate::command::CommandError;

pub trait Report {
    fn diagnose(&self) -> Diagnostic<()>;

    fn report<'a, F>(&self, file: &'a F)
    where
        F: Files<'a, FileId = ()>,
    {
        let writer = StandardStream::stderr(ColorChoice::Always);
        let config = codespan_reporting::term::Config::default();

        let report = self.diagnose();
        let mut writer = writer.lock();
        let _ = term::emit(&mut writer, &config, file, &report);
    }
}

pub struct SimpleReport {
    message: String,
}

impl SimpleReport {
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

impl Report for SimpleReport {
    fn diagnose(&self) -> Diagnostic<()> {
        Diagnostic::error().with_message(&self.message)
    }
}

impl<T: Error> Report for Spand<T> {
    fn diagnose(&self) -> Diagnostic<()> {
        Diagnostic::error()
            .with_message(self.kind())
            .with_label(Label::primary((), self.span))
    }
}

impl Report for ExprError {
    fn diagnose(&self) -> Diagnostic<()> {
        match self {
            Self::Lex(err) => err.diagnose(),
            Self::Parse(err) => err.diagnose(),
            Self::Eval(err) => err.diagnose(),
        }
    }
}

/// Expression errors are labelled inside the expression text, so they must
/// be reported against it rather than against the whole command line.
impl Report for CommandError {
    fn diagnose(&self) -> Diagnostic<()> {
        match self {
            Self::Expr { source, .. } => source
                .diagnose()
                .with_notes(vec![format!("in expression '{}'", self.expression())]),
            _ => Diagnostic::error().with_message(self),
        }
    }
}

impl CommandError {
    /// Text the diagnostic labels point into, when there is one.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Expr { input, .. } => input,
            _ => "",
        }
    }
}
