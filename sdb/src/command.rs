use codespan_reporting::term::termcolor::{Color, ColorSpec, WriteColor};
use sdbcpu::reg::RegClass;
use sdbcpu::{Machine, MemoryError, Riscv32, Word};
use sdbexpr::{Engine, ExprError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("{problem}, usage: {usage}")]
    Usage {
        problem: String,
        usage:   &'static str,
    },
    #[error("invalid count '{0}', must be a positive integer")]
    InvalidCount(String),
    #[error("invalid expression '{input}'")]
    Expr {
        input:  String,
        #[source]
        source: ExprError,
    },
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CommandError {
    fn usage(problem: impl Into<String>, usage: &'static str) -> Self {
        Self::Usage {
            problem: problem.into(),
            usage,
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

type Handler = fn(&Monitor, Option<&str>, &mut dyn WriteColor) -> CommandResult<Flow>;

pub struct Command {
    pub name:        &'static str,
    pub description: &'static str,
    handler:         Handler,
}

pub const COMMANDS: &[Command] = &[
    Command {
        name:        "help",
        description: "Display information about all supported commands",
        handler:     cmd_help,
    },
    Command {
        name:        "q",
        description: "Exit the monitor",
        handler:     cmd_q,
    },
    Command {
        name:        "info",
        description: "Print program status: 'info r' for registers",
        handler:     cmd_info,
    },
    Command {
        name:        "x",
        description: "Print N 4-byte values starting at address EXPR",
        handler:     cmd_x,
    },
    Command {
        name:        "p",
        description: "Evaluate and print the value of expression EXPR",
        handler:     cmd_p,
    },
];

fn find(name: &str) -> Option<&'static Command> {
    COMMANDS.iter().find(|cmd| cmd.name == name)
}

/// Machine under inspection plus the engine its expressions go through.
pub struct Monitor {
    machine: Riscv32,
    engine:  Engine,
}

impl Monitor {
    #[must_use]
    pub const fn new(machine: Riscv32, engine: Engine) -> Self {
        Self { machine, engine }
    }

    /// Runs one command line. The first word names the command, the rest,
    /// if any, is handed over as its argument string.
    pub fn execute(&self, line: &str, out: &mut dyn WriteColor) -> CommandResult<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (name, args) = match line.split_once(char::is_whitespace) {
            Some((name, args)) => (name, Some(args.trim()).filter(|args| !args.is_empty())),
            None => (line, None),
        };

        let cmd = find(name).ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
        (cmd.handler)(self, args, out)
    }

    fn evaluate(&self, input: &str) -> CommandResult<Word> {
        self.engine
            .evaluate(input, &self.machine)
            .map_err(|source| CommandError::Expr {
                input: input.to_string(),
                source,
            })
    }
}

fn cmd_help(_: &Monitor, args: Option<&str>, out: &mut dyn WriteColor) -> CommandResult<Flow> {
    match args.and_then(|args| args.split_whitespace().next()) {
        None => {
            for cmd in COMMANDS {
                writeln!(out, "{} - {}", cmd.name, cmd.description)?;
            }
        }
        Some(name) => {
            let cmd = find(name).ok_or_else(|| CommandError::UnknownCommand(name.to_string()))?;
            writeln!(out, "{} - {}", cmd.name, cmd.description)?;
        }
    }
    Ok(Flow::Continue)
}

fn cmd_q(_: &Monitor, _: Option<&str>, _: &mut dyn WriteColor) -> CommandResult<Flow> {
    Ok(Flow::Quit)
}

const INFO_USAGE: &str = "info r";

fn cmd_info(monitor: &Monitor, args: Option<&str>, out: &mut dyn WriteColor) -> CommandResult<Flow> {
    let mut args = args.unwrap_or_default().split_whitespace();
    let sub = args
        .next()
        .ok_or_else(|| CommandError::usage("missing subcommand", INFO_USAGE))?;
    if args.next().is_some() {
        return Err(CommandError::usage("too many arguments", INFO_USAGE));
    }

    match sub {
        "r" => display_registers(&monitor.machine, out)?,
        _ => {
            return Err(CommandError::usage(
                format!("invalid subcommand '{sub}'"),
                INFO_USAGE,
            ));
        }
    }
    Ok(Flow::Continue)
}

fn class_color(class: RegClass) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match class {
        RegClass::Pc => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        RegClass::Special => spec.set_fg(Some(Color::Blue)).set_bold(true),
        RegClass::Argument => spec.set_fg(Some(Color::Green)),
        RegClass::Saved => spec.set_fg(Some(Color::Cyan)),
        RegClass::Temporary => spec.set_fg(Some(Color::Magenta)),
        RegClass::Other => &mut spec,
    };
    spec
}

fn display_registers(machine: &Riscv32, out: &mut dyn WriteColor) -> std::io::Result<()> {
    for (name, value, class) in machine.regs.rows() {
        out.set_color(&class_color(class))?;
        write!(out, "{name}")?;
        out.reset()?;
        writeln!(out, "\t0x{value:08x}\t{value}")?;
    }
    Ok(())
}

const X_USAGE: &str = "x N EXPR";

fn cmd_x(monitor: &Monitor, args: Option<&str>, out: &mut dyn WriteColor) -> CommandResult<Flow> {
    let (count, expr) = args
        .and_then(|args| args.split_once(char::is_whitespace))
        .ok_or_else(|| CommandError::usage("missing arguments", X_USAGE))?;

    let count = count
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| CommandError::InvalidCount(count.to_string()))?;
    let base = monitor.evaluate(expr.trim())?;

    let mut addr_color = ColorSpec::new();
    addr_color.set_fg(Some(Color::Blue));

    for i in 0..count {
        let addr = base.wrapping_add(i.wrapping_mul(4));
        if i % 4 == 0 {
            out.set_color(&addr_color)?;
            write!(out, "0x{addr:08x}")?;
            out.reset()?;
            write!(out, ":")?;
        }
        let Some(data) = monitor.machine.read_word(addr) else {
            if i % 4 != 0 {
                writeln!(out)?;
            }
            return Err(MemoryError::OutOfBound(addr).into());
        };
        write!(out, " 0x{data:08x}")?;
        if i % 4 == 3 {
            writeln!(out)?;
        }
    }

    if count % 4 != 0 {
        writeln!(out)?;
    }
    Ok(Flow::Continue)
}

fn cmd_p(monitor: &Monitor, args: Option<&str>, out: &mut dyn WriteColor) -> CommandResult<Flow> {
    let expr = args.ok_or_else(|| CommandError::usage("missing expression", "p EXPR"))?;
    let value = monitor.evaluate(expr)?;
    writeln!(out, "{value} (0x{value:08x})")?;
    Ok(Flow::Continue)
}
