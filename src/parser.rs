//! Tokenizing and parsing of calculator commands and prefix expressions.

use std::{
    fmt::{self, Display, Write},
    iter::Peekable,
    str::{Chars, FromStr},
};

use smartstring::{LazyCompact, SmartString};

use crate::error::CommandError;

/// A variable name or a literal as it appears in the input.
pub type Name = SmartString<LazyCompact>;

const SPECIAL_CHARS: &str = "+*/^[]()";

/// Words with a meaning in expressions, which can therefore not be used as variable names.
const RESERVED: [&str; 6] = ["neg", "inv", "det", "rank", "rref", "scale"];

/// The deepest nesting of operators an expression may have. Parsing and
/// evaluation recurse once per level.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An operator or a bracket.
    Special(char),
    /// A run of digits, possibly preceded by a minus sign.
    Literal(Name),
    /// A letter followed by letters, digits or underscores.
    Name(Name),
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Special(c) => f.write_char(*c),
            Token::Literal(l) => f.write_str(l),
            Token::Name(n) => f.write_str(n),
        }
    }
}

/// Splits a line into [Token]s.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Lexer<'a> {
        Lexer {
            chars: text.chars().peekable(),
        }
    }

    fn take_while(&mut self, buffer: &mut Name, pred: impl Fn(char) -> bool) {
        while let Some(&c) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            buffer.push(c);
            self.chars.next();
        }
    }

    /// Read the next token, or `None` at the end of the line.
    pub fn next_token(&mut self) -> Result<Option<Token>, CommandError> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        let Some(c) = self.chars.next() else {
            return Ok(None);
        };

        if SPECIAL_CHARS.contains(c) {
            return Ok(Some(Token::Special(c)));
        }

        if c == '-' || c.is_ascii_digit() {
            if c == '-' && !self.chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                return Ok(Some(Token::Special('-')));
            }

            let mut literal = Name::new();
            literal.push(c);
            self.take_while(&mut literal, |d| d.is_ascii_digit());
            return Ok(Some(Token::Literal(literal)));
        }

        if c.is_ascii_alphabetic() {
            let mut name = Name::new();
            name.push(c);
            self.take_while(&mut name, |d| d.is_ascii_alphanumeric() || d == '_');
            return Ok(Some(Token::Name(name)));
        }

        Err(CommandError::UnknownCharacter(c))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, CommandError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Split a line into tokens.
pub fn tokenize(text: &str) -> Result<Vec<Token>, CommandError> {
    Lexer::new(text).collect()
}

/// The field a value lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Rational,
    /// The integers modulo a prime.
    Residue(u32),
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Rational => f.write_str("Q"),
            FieldKind::Residue(p) => write!(f, "Z {}", p),
        }
    }
}

/// The type of a value: a number or a matrix over some field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number(FieldKind),
    Matrix(FieldKind),
}

impl ValueKind {
    pub fn field(&self) -> FieldKind {
        match self {
            ValueKind::Number(f) | ValueKind::Matrix(f) => *f,
        }
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, ValueKind::Matrix(_))
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number(field) => field.fmt(f),
            ValueKind::Matrix(field) => write!(f, "Matrix[{}]", field),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Exit,
    Help,
    /// Define a variable. The value follows on the next line, or on the
    /// next `shape.0` lines for a matrix.
    Define {
        kind: ValueKind,
        name: Name,
        shape: Option<(u32, u32)>,
    },
    /// Evaluate the expression on the next line.
    Eval { kind: ValueKind },
    Show { name: Name },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    fn from_char(c: char) -> Option<Operator> {
        match c {
            '+' => Some(Operator::Add),
            '-' => Some(Operator::Sub),
            '*' => Some(Operator::Mul),
            '/' => Some(Operator::Div),
            _ => None,
        }
    }
}

/// An expression that evaluates to a field element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarExpr {
    Literal(Name),
    Variable(Name),
    Binary(Operator, Box<ScalarExpr>, Box<ScalarExpr>),
    Pow(Box<ScalarExpr>, u64),
    Neg(Box<ScalarExpr>),
    Inv(Box<ScalarExpr>),
    Det(Box<MatrixExpr>),
    Rank(Box<MatrixExpr>),
}

/// An expression that evaluates to a matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixExpr {
    Variable(Name),
    /// Addition, subtraction or multiplication of two matrices.
    Binary(Operator, Box<MatrixExpr>, Box<MatrixExpr>),
    Rref(Box<MatrixExpr>),
    Neg(Box<MatrixExpr>),
    Scale(Box<ScalarExpr>, Box<MatrixExpr>),
}

struct TokenStream<'a> {
    tokens: &'a [Token],
    position: usize,
    depth: usize,
}

impl<'a> TokenStream<'a> {
    fn new(tokens: &'a [Token]) -> TokenStream<'a> {
        TokenStream {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    fn next(&mut self) -> Result<&'a Token, CommandError> {
        let token = self
            .tokens
            .get(self.position)
            .ok_or_else(|| CommandError::syntax("unexpected end of line"))?;
        self.position += 1;
        Ok(token)
    }

    fn name(&mut self, what: &str) -> Result<&'a Name, CommandError> {
        match self.next()? {
            Token::Name(n) => Ok(n),
            t => Err(CommandError::syntax(format!("expected {}, found `{}`", what, t))),
        }
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T, CommandError> {
        match self.next()? {
            Token::Literal(l) => l
                .parse()
                .map_err(|_| CommandError::syntax(format!("expected {}, found `{}`", what, l))),
            t => Err(CommandError::syntax(format!("expected {}, found `{}`", what, t))),
        }
    }

    fn special(&mut self, c: char) -> Result<(), CommandError> {
        match self.next()? {
            Token::Special(s) if *s == c => Ok(()),
            t => Err(CommandError::syntax(format!("expected `{}`, found `{}`", c, t))),
        }
    }

    fn finish(&self) -> Result<(), CommandError> {
        match self.tokens.get(self.position) {
            Some(t) => Err(CommandError::syntax(format!("unexpected `{}`", t))),
            None => Ok(()),
        }
    }

    fn variable_name(&mut self) -> Result<Name, CommandError> {
        let name = self.name("a variable name")?;
        if RESERVED.contains(&name.as_str()) {
            return Err(CommandError::syntax(format!(
                "`{}` is reserved and cannot be a variable name",
                name
            )));
        }
        Ok(name.clone())
    }

    fn field(&mut self) -> Result<FieldKind, CommandError> {
        let name = self.name("a field")?;
        match name.as_str() {
            "Q" => Ok(FieldKind::Rational),
            "Z" => Ok(FieldKind::Residue(self.number("a prime modulus")?)),
            other => Err(CommandError::syntax(format!("unknown field `{}`", other))),
        }
    }

    /// Parse `Q`, `Z p`, `Matrix[Q]` or `Matrix[Z p]`.
    fn kind(&mut self) -> Result<ValueKind, CommandError> {
        let name = self.name("a type")?;
        match name.as_str() {
            "Q" => Ok(ValueKind::Number(FieldKind::Rational)),
            "Z" => Ok(ValueKind::Number(FieldKind::Residue(
                self.number("a prime modulus")?,
            ))),
            "Matrix" => {
                let close = match self.next()? {
                    Token::Special('[') => ']',
                    Token::Special('(') => ')',
                    t => {
                        return Err(CommandError::syntax(format!(
                            "expected `[` or `(`, found `{}`",
                            t
                        )))
                    }
                };
                let field = self.field()?;
                self.special(close)?;
                Ok(ValueKind::Matrix(field))
            }
            other => Err(CommandError::syntax(format!("unknown type `{}`", other))),
        }
    }

    fn command(&mut self) -> Result<Command, CommandError> {
        let keyword = self.name("a command")?;
        match keyword.as_str() {
            "EXIT" => Ok(Command::Exit),
            "HELP" => Ok(Command::Help),
            "DEF" => {
                let kind = self.kind()?;
                let name = self.variable_name()?;
                let shape = if kind.is_matrix() {
                    Some((
                        self.number("the number of rows")?,
                        self.number("the number of columns")?,
                    ))
                } else {
                    None
                };
                Ok(Command::Define { kind, name, shape })
            }
            "EVAL" => Ok(Command::Eval { kind: self.kind()? }),
            "SHOW" => Ok(Command::Show {
                name: self.name("a variable name")?.clone(),
            }),
            other => Err(CommandError::syntax(format!("unknown command `{}`", other))),
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, CommandError>,
    ) -> Result<T, CommandError> {
        if self.depth == MAX_DEPTH {
            return Err(CommandError::syntax("expression nested too deeply"));
        }

        self.depth += 1;
        let r = parse(self);
        self.depth -= 1;
        r
    }

    fn scalar(&mut self) -> Result<ScalarExpr, CommandError> {
        self.nested(Self::scalar_term)
    }

    fn matrix(&mut self) -> Result<MatrixExpr, CommandError> {
        self.nested(Self::matrix_term)
    }

    fn scalar_term(&mut self) -> Result<ScalarExpr, CommandError> {
        match self.next()? {
            Token::Literal(l) => Ok(ScalarExpr::Literal(l.clone())),
            Token::Special('^') => {
                let base = self.scalar()?;
                let exp = self.number("a non-negative integer exponent")?;
                Ok(ScalarExpr::Pow(Box::new(base), exp))
            }
            Token::Special(c) => match Operator::from_char(*c) {
                Some(op) => {
                    let lhs = self.scalar()?;
                    let rhs = self.scalar()?;
                    Ok(ScalarExpr::Binary(op, Box::new(lhs), Box::new(rhs)))
                }
                None => Err(CommandError::syntax(format!("unexpected `{}`", c))),
            },
            Token::Name(n) => match n.as_str() {
                "neg" => Ok(ScalarExpr::Neg(Box::new(self.scalar()?))),
                "inv" => Ok(ScalarExpr::Inv(Box::new(self.scalar()?))),
                "det" => Ok(ScalarExpr::Det(Box::new(self.matrix()?))),
                "rank" => Ok(ScalarExpr::Rank(Box::new(self.matrix()?))),
                "rref" | "scale" => Err(CommandError::syntax(format!(
                    "`{}` yields a matrix, not a number",
                    n
                ))),
                _ => Ok(ScalarExpr::Variable(n.clone())),
            },
        }
    }

    fn matrix_term(&mut self) -> Result<MatrixExpr, CommandError> {
        match self.next()? {
            Token::Special(c @ ('+' | '-' | '*')) => {
                let op = Operator::from_char(*c).ok_or_else(|| CommandError::syntax("unknown operator"))?;
                let lhs = self.matrix()?;
                let rhs = self.matrix()?;
                Ok(MatrixExpr::Binary(op, Box::new(lhs), Box::new(rhs)))
            }
            Token::Name(n) => match n.as_str() {
                "rref" => Ok(MatrixExpr::Rref(Box::new(self.matrix()?))),
                "neg" => Ok(MatrixExpr::Neg(Box::new(self.matrix()?))),
                "scale" => {
                    let factor = self.scalar()?;
                    let m = self.matrix()?;
                    Ok(MatrixExpr::Scale(Box::new(factor), Box::new(m)))
                }
                "inv" | "det" | "rank" => Err(CommandError::syntax(format!(
                    "`{}` yields a number, not a matrix",
                    n
                ))),
                _ => Ok(MatrixExpr::Variable(n.clone())),
            },
            t => Err(CommandError::syntax(format!(
                "expected a matrix expression, found `{}`",
                t
            ))),
        }
    }
}

/// Parse a single command line.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let tokens = tokenize(line)?;
    let mut stream = TokenStream::new(&tokens);
    let command = stream.command()?;
    stream.finish()?;
    Ok(command)
}

/// Parse a prefix expression that yields a number.
pub fn parse_scalar_expr(line: &str) -> Result<ScalarExpr, CommandError> {
    let tokens = tokenize(line)?;
    let mut stream = TokenStream::new(&tokens);
    let expr = stream.scalar()?;
    stream.finish()?;
    Ok(expr)
}

/// Parse a prefix expression that yields a matrix.
pub fn parse_matrix_expr(line: &str) -> Result<MatrixExpr, CommandError> {
    let tokens = tokenize(line)?;
    let mut stream = TokenStream::new(&tokens);
    let expr = stream.matrix()?;
    stream.finish()?;
    Ok(expr)
}

#[cfg(test)]
mod test {
    use crate::error::CommandError;

    use super::{
        parse_command, parse_matrix_expr, parse_scalar_expr, tokenize, Command, FieldKind,
        MatrixExpr, Operator, ScalarExpr, Token, ValueKind, MAX_DEPTH,
    };

    #[test]
    fn lexer() {
        let tokens = tokenize("+ -3 - x_1 ^(Z 7)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Special('+'),
                Token::Literal("-3".into()),
                Token::Special('-'),
                Token::Name("x_1".into()),
                Token::Special('^'),
                Token::Special('('),
                Token::Name("Z".into()),
                Token::Literal("7".into()),
                Token::Special(')'),
            ]
        );

        assert_eq!(tokenize("  \t ").unwrap(), vec![]);
        assert!(matches!(
            tokenize("a % b"),
            Err(CommandError::UnknownCharacter('%'))
        ));
        assert!(matches!(
            tokenize("_a"),
            Err(CommandError::UnknownCharacter('_'))
        ));
    }

    #[test]
    fn commands() {
        assert_eq!(parse_command("EXIT").unwrap(), Command::Exit);
        assert_eq!(parse_command("  HELP ").unwrap(), Command::Help);
        assert_eq!(
            parse_command("DEF Q x").unwrap(),
            Command::Define {
                kind: ValueKind::Number(FieldKind::Rational),
                name: "x".into(),
                shape: None
            }
        );
        assert_eq!(
            parse_command("DEF Matrix[Z 7] m 2 3").unwrap(),
            Command::Define {
                kind: ValueKind::Matrix(FieldKind::Residue(7)),
                name: "m".into(),
                shape: Some((2, 3))
            }
        );
        assert_eq!(
            parse_command("EVAL Matrix(Q)").unwrap(),
            Command::Eval {
                kind: ValueKind::Matrix(FieldKind::Rational)
            }
        );
        assert_eq!(
            parse_command("SHOW m").unwrap(),
            Command::Show { name: "m".into() }
        );
    }

    #[test]
    fn malformed_commands() {
        for line in [
            "",
            "exit",
            "EXIT now",
            "DEF Q",
            "DEF R x",
            "DEF Z x",
            "DEF Matrix[Q) m 2 2",
            "DEF Matrix[Q] m 2",
            "DEF Matrix[Q] m -2 2",
            "DEF Q det",
            "EVAL Matrix Q",
        ] {
            assert!(
                matches!(parse_command(line), Err(CommandError::InvalidSyntax(_))),
                "{}",
                line
            );
        }
    }

    #[test]
    fn scalar_expressions() {
        assert_eq!(
            parse_scalar_expr("+ x * -2 inv y").unwrap(),
            ScalarExpr::Binary(
                Operator::Add,
                Box::new(ScalarExpr::Variable("x".into())),
                Box::new(ScalarExpr::Binary(
                    Operator::Mul,
                    Box::new(ScalarExpr::Literal("-2".into())),
                    Box::new(ScalarExpr::Inv(Box::new(ScalarExpr::Variable("y".into()))))
                ))
            )
        );
        assert_eq!(
            parse_scalar_expr("^ det m 3").unwrap(),
            ScalarExpr::Pow(
                Box::new(ScalarExpr::Det(Box::new(MatrixExpr::Variable("m".into())))),
                3
            )
        );

        assert!(parse_scalar_expr("^ x -1").is_err());
        assert!(parse_scalar_expr("+ 1").is_err());
        assert!(parse_scalar_expr("+ 1 2 3").is_err());
        assert!(parse_scalar_expr("rref m").is_err());
    }

    #[test]
    fn matrix_expressions() {
        assert_eq!(
            parse_matrix_expr("* rref a scale / 1 2 neg b").unwrap(),
            MatrixExpr::Binary(
                Operator::Mul,
                Box::new(MatrixExpr::Rref(Box::new(MatrixExpr::Variable("a".into())))),
                Box::new(MatrixExpr::Scale(
                    Box::new(ScalarExpr::Binary(
                        Operator::Div,
                        Box::new(ScalarExpr::Literal("1".into())),
                        Box::new(ScalarExpr::Literal("2".into()))
                    )),
                    Box::new(MatrixExpr::Neg(Box::new(MatrixExpr::Variable("b".into()))))
                ))
            )
        );

        assert_eq!(
            ValueKind::Matrix(FieldKind::Residue(11)).to_string(),
            "Matrix[Z 11]"
        );
        assert!(parse_matrix_expr("/ a b").is_err());
        assert!(parse_matrix_expr("det a").is_err());
        assert!(parse_matrix_expr("3").is_err());
    }

    #[test]
    fn nesting_limit() {
        let deepest = format!("{}1", "neg ".repeat(MAX_DEPTH - 1));
        assert!(parse_scalar_expr(&deepest).is_ok());

        let too_deep = format!("{}1", "neg ".repeat(MAX_DEPTH));
        assert!(matches!(
            parse_scalar_expr(&too_deep),
            Err(CommandError::InvalidSyntax(m)) if m == "expression nested too deeply"
        ));

        let too_deep = format!("{}m", "rref ".repeat(200_000));
        assert!(matches!(
            parse_matrix_expr(&too_deep),
            Err(CommandError::InvalidSyntax(_))
        ));
    }
}
