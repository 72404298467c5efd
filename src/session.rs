//! The read-eval-print loop of the calculator.

use std::{
    env,
    io::{BufRead, Write},
};

use colored::Colorize;
use tracing::{debug, trace, warn};

use crate::{
    error::{ArithmeticError, CommandError},
    evaluate::{evaluate, Domain, Zp, Q},
    parser::{parse_command, Command, FieldKind, ValueKind},
    printer::{MatrixPrinter, PrintMode},
    state::{State, Value},
    tensors::matrix::Matrix,
};

const HELP: &str = "\
Commands:
  DEF <type> <name>            define a variable, its value is read from the next line
  DEF Matrix[<field>] <name> <rows> <cols>
                               define a matrix, its rows are read from the next lines
  EVAL <type>                  evaluate the expression on the next line
  SHOW <name>                  print a variable
  HELP                         print this message
  EXIT                         leave the calculator

Types are Q, Z <p>, Matrix[Q] and Matrix[Z <p>], where p is a prime.

Expressions are written in prefix notation:
  numbers:  <literal> | <name> | + a b | - a b | * a b | / a b | ^ a <n>
            | neg a | inv a | det M | rank M
  matrices: <name> | + M N | - M N | * M N | rref M | neg M | scale a M

A number may be written with spaces around its `/`, as in `1 / 2`. Matrix
entries are separated by spaces or commas and are written without spaces.";

/// Options of a session, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub hide_banner: bool,
    pub prompt: String,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hide_banner: false,
            prompt: "> ".to_owned(),
            color: true,
        }
    }
}

impl Settings {
    /// Read `EXACTA_HIDE_BANNER`, `EXACTA_PROMPT` and `EXACTA_NO_COLOR`.
    pub fn from_env() -> Settings {
        let defaults = Settings::default();
        Settings {
            hide_banner: env::var_os("EXACTA_HIDE_BANNER").is_some(),
            prompt: env::var("EXACTA_PROMPT").unwrap_or(defaults.prompt),
            color: env::var_os("EXACTA_NO_COLOR").is_none(),
        }
    }

    /// Settings for non-interactive use: no banner, no prompt and no colours.
    pub fn quiet() -> Settings {
        Settings {
            hide_banner: true,
            prompt: String::new(),
            color: false,
        }
    }
}

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A calculator session that reads commands from `input` and writes
/// results and errors to `output`.
pub struct Session<R: BufRead, W: Write> {
    state: State,
    input: R,
    output: W,
    settings: Settings,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, settings: Settings) -> Session<R, W> {
        Session {
            state: State::new(),
            input,
            output,
            settings,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn banner(&mut self) -> std::io::Result<()> {
        let title = format!("exacta {}", env!("EXACTA_VERSION"));
        if self.settings.color {
            writeln!(self.output, "{}", title.bold().green())?;
        } else {
            writeln!(self.output, "{}", title)?;
        }
        writeln!(self.output, "Type HELP for a list of commands.")
    }

    /// Read a line without its line ending, or `None` at the end of the input.
    fn read_line(&mut self) -> Result<Option<String>, CommandError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let len = line.trim_end_matches(&['\n', '\r'][..]).len();
        line.truncate(len);
        Ok(Some(line))
    }

    /// Read a line that a command requires.
    fn expect_line(&mut self) -> Result<String, CommandError> {
        self.read_line()?.ok_or(CommandError::MissingInput)
    }

    /// Read the lines holding the value of a definition, then parse them.
    /// All lines are consumed even when the type turns out to be invalid.
    fn read_value(
        &mut self,
        kind: ValueKind,
        shape: Option<(u32, u32)>,
    ) -> Result<Value, CommandError> {
        let count = shape.map_or(1, |(nrows, _)| nrows);
        let lines = (0..count)
            .map(|_| self.expect_line())
            .collect::<Result<Vec<_>, _>>()?;

        match kind.field() {
            FieldKind::Rational => parse_value(&Q, &lines, shape),
            FieldKind::Residue(p) => parse_value(&Zp::new(p)?, &lines, shape),
        }
    }

    fn write_result(output: &mut W, value: &Value) -> std::io::Result<()> {
        match value {
            Value::RationalMatrix(_) | Value::ResidueMatrix(_) => {
                writeln!(output, "RESULT:")?;
                writeln!(output, "{}", value)
            }
            Value::Rational(_) | Value::Residue(_) => writeln!(output, "RESULT: {}", value),
        }
    }

    fn write_error(&mut self, error: &CommandError) -> std::io::Result<()> {
        if self.settings.color {
            writeln!(self.output, "{} {}", "ERROR:".red().bold(), error)
        } else {
            writeln!(self.output, "ERROR: {}", error)
        }
    }

    /// Execute a single command line, reading any lines it requires from the input.
    pub fn execute(&mut self, line: &str) -> Result<Flow, CommandError> {
        trace!(line = line, "executing command");

        match parse_command(line)? {
            Command::Exit => return Ok(Flow::Exit),
            Command::Help => writeln!(self.output, "{}", HELP)?,
            Command::Define { kind, name, shape } => {
                let value = self.read_value(kind, shape)?;
                match &value {
                    Value::RationalMatrix(m) => debug!(
                        name = name.as_str(),
                        %kind,
                        value = %MatrixPrinter::new_with_mode(m, PrintMode::Nested),
                        "defined"
                    ),
                    Value::ResidueMatrix(m) => debug!(
                        name = name.as_str(),
                        %kind,
                        value = %MatrixPrinter::new_with_mode(m, PrintMode::Nested),
                        "defined"
                    ),
                    _ => debug!(name = name.as_str(), %kind, value = %value, "defined"),
                }
                self.state.insert(name, value);
            }
            Command::Eval { kind } => {
                let expr = self.expect_line()?;
                trace!(%kind, expr = expr.as_str(), "evaluating");
                let value = evaluate(&self.state, kind, &expr)?;
                Self::write_result(&mut self.output, &value)?;
            }
            Command::Show { name } => {
                let value = self
                    .state
                    .get(&name)
                    .ok_or_else(|| CommandError::UndefinedVariable(name.to_string()))?;
                Self::write_result(&mut self.output, value)?;
            }
        }

        Ok(Flow::Continue)
    }

    /// Run the loop until `EXIT` or the end of the input. Errors of single
    /// commands are printed and the loop continues; only I/O errors end it.
    pub fn run(&mut self) -> Result<(), CommandError> {
        if !self.settings.hide_banner {
            self.banner()?;
        }

        loop {
            write!(self.output, "{}", self.settings.prompt)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };

            if line.trim().is_empty() {
                continue;
            }

            match self.execute(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(CommandError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    warn!(line = line.as_str(), error = %e, "command failed");
                    self.write_error(&e)?;
                }
            }
        }

        self.output.flush()?;
        Ok(())
    }
}

/// Parse a single number. Spaces around the `/` of a fraction are allowed.
fn parse_number<D: Domain>(domain: &D, line: &str) -> Result<Value, CommandError> {
    let literal = line.split('/').map(str::trim).collect::<Vec<_>>().join("/");
    Ok(domain.wrap_number(domain.parse(&literal)?))
}

/// Parse rows of entries separated by whitespace or commas. Each row is
/// checked against `ncols` before its entries are stored.
fn parse_matrix<D: Domain>(
    domain: &D,
    lines: &[String],
    nrows: u32,
    ncols: u32,
) -> Result<Value, CommandError> {
    if nrows == 0 || ncols == 0 {
        return Err(ArithmeticError::EmptyMatrix.into());
    }

    let mut data = Vec::new();
    for (row, line) in lines.iter().enumerate() {
        let entries: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|e| !e.is_empty())
            .collect();

        if entries.len() != ncols as usize {
            return Err(ArithmeticError::NotRectangular {
                row,
                expected: ncols as usize,
                found: entries.len(),
            }
            .into());
        }

        data.reserve(entries.len());
        for e in entries {
            data.push(domain.parse(e)?);
        }
    }

    Ok(domain.wrap_matrix(Matrix::from_linear(data, nrows, ncols)?))
}

fn parse_value<D: Domain>(
    domain: &D,
    lines: &[String],
    shape: Option<(u32, u32)>,
) -> Result<Value, CommandError> {
    match shape {
        Some((nrows, ncols)) => parse_matrix(domain, lines, nrows, ncols),
        None => match lines.first() {
            Some(line) => parse_number(domain, line),
            None => Err(CommandError::MissingInput),
        },
    }
}
