//! Error types of the arithmetic kernel and of the calculator layer.

use thiserror::Error;

/// Failures raised by the exact arithmetic kernel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("invalid digit `{0}`")]
    InvalidDigit(char),
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid integer")]
    InvalidInteger,
    #[error("{0} is not a prime modulus")]
    CompositeModulo(u32),
    #[error("cannot combine elements of Z_{0} and Z_{1}")]
    IncompatibleModulo(u32, u32),
    #[error("incompatible dimensions: {}x{} and {}x{}", .lhs.0, .lhs.1, .rhs.0, .rhs.1)]
    IncompatibleDimensions { lhs: (u32, u32), rhs: (u32, u32) },
    #[error("a matrix needs at least one row and one column")]
    EmptyMatrix,
    #[error("dimension {0} does not fit in 32 bits")]
    DimensionTooLarge(usize),
    #[error("row {row} has {found} entries instead of {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures raised while reading, parsing or executing calculator commands.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("unknown character `{0}`")]
    UnknownCharacter(char),
    #[error("invalid syntax: {0}")]
    InvalidSyntax(String),
    #[error("variable `{0}` does not hold a value of the requested type")]
    IncompatibleType(String),
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("unexpected end of input")]
    MissingInput,
    #[error(transparent)]
    Arithmetic(#[from] ArithmeticError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CommandError {
    pub(crate) fn syntax(msg: impl Into<String>) -> CommandError {
        CommandError::InvalidSyntax(msg.into())
    }
}
