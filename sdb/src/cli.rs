use clap::builder::styling::{AnsiColor, Effects, Style, Styles};
use sdbcpu::NoMachine;
use sdbcpu::memory::DEFAULT_MSIZE;
use sdbexpr::lexer::MAX_TOKENS;
use sdbexpr::{ExprError, Strategy};

#[derive(clap::Parser, Debug, Clone)]
#[clap(styles = CARGO_STYLING)]
pub struct Cli {
    /// Raw binary image loaded at the start of guest memory
    pub image: Option<String>,

    /// Do not print diagnostics
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    /// Read commands from stdin, one per line, without a prompt
    #[arg(short, long, default_value_t = false)]
    pub batch: bool,

    /// Maximum amount of tokens in one expression
    #[arg(long, value_name = "max-tokens", default_value_t = MAX_TOKENS)]
    pub max_tokens: usize,

    /// How expressions are evaluated
    #[arg(long, value_enum, default_value_t = ParserKind::Span)]
    pub parser: ParserKind,

    /// Size of guest memory in bytes, any expression such as 0x8000000
    #[arg(long, value_name = "bytes", default_value_t = DEFAULT_MSIZE, value_parser = parse_size)]
    pub mem_size: usize,

    /// Maximum amount of errors to report in batch mode
    #[arg(long, value_name = "max-errors", default_value_t = 4)]
    pub max_errors: usize,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserKind {
    /// Split token spans at their main operator
    #[default]
    Span,
    /// Build an expression tree by precedence climbing
    Tree,
}

impl From<ParserKind> for Strategy {
    fn from(value: ParserKind) -> Self {
        match value {
            ParserKind::Span => Self::Span,
            ParserKind::Tree => Self::Tree,
        }
    }
}

fn parse_size(arg: &str) -> Result<usize, ExprError> {
    sdbexpr::evaluate(arg, &NoMachine).map(|size| size as usize)
}

const HEADER: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
const USAGE: Style = AnsiColor::Green.on_default().effects(Effects::BOLD);
const LITERAL: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
const PLACEHOLDER: Style = AnsiColor::Cyan.on_default();
const ERROR: Style = AnsiColor::Red.on_default().effects(Effects::BOLD);
const VALID: Style = AnsiColor::Cyan.on_default().effects(Effects::BOLD);
const INVALID: Style = AnsiColor::Yellow.on_default().effects(Effects::BOLD);

/// Cargo's color style
/// [source](https://github.com/crate-ci/clap-cargo/blob/master/src/style.rs)
const CARGO_STYLING: Styles = Styles::styled()
    .header(HEADER)
    .usage(USAGE)
    .literal(LITERAL)
    .placeholder(PLACEHOLDER)
    .error(ERROR)
    .valid(VALID)
    .invalid(INVALID);
