mod cli;
mod command;
mod driver;
mod editor;
mod report;

use std::process::ExitCode;

use clap::Parser;
use codespan_reporting::files::SimpleFile;

use crate::cli::Cli;
use crate::driver::Driver;
use crate::report::Report;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = cli.quiet;
    match Driver::from_config(cli) {
        Ok(driver) => driver.run(),
        Err(err) => {
            if !quiet {
                err.report(&SimpleFile::new("<image>", ""));
            }
            ExitCode::FAILURE
        }
    }
}
