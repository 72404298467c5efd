//! Evaluation of parsed expressions against the variables of a [State].
//!
//! Evaluation is generic over a [Domain], which fixes the field all
//! numbers and matrix entries of an expression live in.

use tracing::trace;

use crate::{
    domains::{
        finite_field::{is_prime, Residue},
        natural::Natural,
        rational::Rational,
        Field,
    },
    error::{ArithmeticError, CommandError},
    parser::{
        parse_matrix_expr, parse_scalar_expr, FieldKind, MatrixExpr, Operator, ScalarExpr,
        ValueKind,
    },
    state::{State, Value},
    tensors::matrix::Matrix,
};

/// The field an expression is evaluated in, and the conversions between
/// its elements and stored [Value]s.
pub trait Domain {
    type Element: Field;

    /// Parse a literal as an element of the field.
    fn parse(&self, literal: &str) -> Result<Self::Element, ArithmeticError>;
    /// The image of the natural number `n` in the field.
    fn nth(&self, n: usize) -> Self::Element;
    /// Extract a number of this field from a stored value.
    fn number(&self, name: &str, value: &Value) -> Result<Self::Element, CommandError>;
    /// Extract a matrix over this field from a stored value.
    fn matrix<'a>(
        &self,
        name: &str,
        value: &'a Value,
    ) -> Result<&'a Matrix<Self::Element>, CommandError>;
    fn wrap_number(&self, e: Self::Element) -> Value;
    fn wrap_matrix(&self, m: Matrix<Self::Element>) -> Value;
}

/// The rational numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Q;

impl Domain for Q {
    type Element = Rational;

    fn parse(&self, literal: &str) -> Result<Rational, ArithmeticError> {
        literal.parse()
    }

    fn nth(&self, n: usize) -> Rational {
        Rational::from(Natural::from(n as u64))
    }

    fn number(&self, name: &str, value: &Value) -> Result<Rational, CommandError> {
        match value {
            Value::Rational(r) => Ok(r.clone()),
            _ => Err(CommandError::IncompatibleType(name.to_string())),
        }
    }

    fn matrix<'a>(&self, name: &str, value: &'a Value) -> Result<&'a Matrix<Rational>, CommandError> {
        match value {
            Value::RationalMatrix(m) => Ok(m),
            _ => Err(CommandError::IncompatibleType(name.to_string())),
        }
    }

    fn wrap_number(&self, e: Rational) -> Value {
        Value::Rational(e)
    }

    fn wrap_matrix(&self, m: Matrix<Rational>) -> Value {
        Value::RationalMatrix(m)
    }
}

/// The integers modulo a prime `p`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Zp {
    p: u32,
}

impl Zp {
    pub fn new(p: u32) -> Result<Zp, ArithmeticError> {
        if !is_prime(p) {
            return Err(ArithmeticError::CompositeModulo(p));
        }

        Ok(Zp { p })
    }

    pub fn modulus(&self) -> u32 {
        self.p
    }

    fn check_modulus(&self, r: &Residue) -> Result<(), CommandError> {
        if r.modulus() != self.p {
            return Err(ArithmeticError::IncompatibleModulo(r.modulus(), self.p).into());
        }
        Ok(())
    }
}

impl Domain for Zp {
    type Element = Residue;

    fn parse(&self, literal: &str) -> Result<Residue, ArithmeticError> {
        Residue::parse(literal, self.p)
    }

    fn nth(&self, n: usize) -> Residue {
        Residue::new_unchecked((n as u64 % self.p as u64) as u32, self.p)
    }

    fn number(&self, name: &str, value: &Value) -> Result<Residue, CommandError> {
        match value {
            Value::Residue(r) => {
                self.check_modulus(r)?;
                Ok(*r)
            }
            _ => Err(CommandError::IncompatibleType(name.to_string())),
        }
    }

    fn matrix<'a>(&self, name: &str, value: &'a Value) -> Result<&'a Matrix<Residue>, CommandError> {
        match value {
            Value::ResidueMatrix(m) => {
                self.check_modulus(&m[(0, 0)])?;
                Ok(m)
            }
            _ => Err(CommandError::IncompatibleType(name.to_string())),
        }
    }

    fn wrap_number(&self, e: Residue) -> Value {
        Value::Residue(e)
    }

    fn wrap_matrix(&self, m: Matrix<Residue>) -> Value {
        Value::ResidueMatrix(m)
    }
}

/// Evaluates expressions in the domain `D`, looking up variables in a [State].
pub struct Evaluator<'a, D: Domain> {
    state: &'a State,
    domain: &'a D,
}

impl<'a, D: Domain> Evaluator<'a, D> {
    pub fn new(state: &'a State, domain: &'a D) -> Evaluator<'a, D> {
        Evaluator { state, domain }
    }

    fn lookup(&self, name: &str) -> Result<&'a Value, CommandError> {
        self.state
            .get(name)
            .ok_or_else(|| CommandError::UndefinedVariable(name.to_string()))
    }

    pub fn number(&self, expr: &ScalarExpr) -> Result<D::Element, CommandError> {
        match expr {
            ScalarExpr::Literal(l) => Ok(self.domain.parse(l)?),
            ScalarExpr::Variable(name) => self.domain.number(name, self.lookup(name)?),
            ScalarExpr::Binary(op, lhs, rhs) => {
                let lhs = self.number(lhs)?;
                let rhs = self.number(rhs)?;
                let r = match op {
                    Operator::Add => lhs.add(&rhs),
                    Operator::Sub => lhs.sub(&rhs),
                    Operator::Mul => lhs.mul(&rhs),
                    Operator::Div => lhs.div(&rhs),
                };
                Ok(r?)
            }
            ScalarExpr::Pow(base, exp) => Ok(self.number(base)?.pow(*exp)?),
            ScalarExpr::Neg(e) => Ok(self.number(e)?.neg()),
            ScalarExpr::Inv(e) => Ok(self.number(e)?.inv()?),
            ScalarExpr::Det(m) => Ok(self.matrix(m)?.det()?),
            ScalarExpr::Rank(m) => Ok(self.domain.nth(self.matrix(m)?.rank()?)),
        }
    }

    pub fn matrix(&self, expr: &MatrixExpr) -> Result<Matrix<D::Element>, CommandError> {
        match expr {
            MatrixExpr::Variable(name) => Ok(self.domain.matrix(name, self.lookup(name)?)?.clone()),
            MatrixExpr::Binary(op, lhs, rhs) => {
                let lhs = self.matrix(lhs)?;
                let rhs = self.matrix(rhs)?;
                let r = match op {
                    Operator::Add => lhs.add(&rhs),
                    Operator::Sub => lhs.sub(&rhs),
                    Operator::Mul => lhs.mul(&rhs),
                    Operator::Div => return Err(CommandError::syntax("matrices cannot be divided")),
                };
                Ok(r?)
            }
            MatrixExpr::Rref(m) => Ok(self.matrix(m)?.rref()?.0),
            MatrixExpr::Neg(m) => Ok(self.matrix(m)?.neg()),
            MatrixExpr::Scale(factor, m) => {
                let factor = self.number(factor)?;
                Ok(self.matrix(m)?.mul_scalar(&factor)?)
            }
        }
    }
}

fn evaluate_in<D: Domain>(
    state: &State,
    domain: &D,
    matrix: bool,
    line: &str,
) -> Result<Value, CommandError> {
    let evaluator = Evaluator::new(state, domain);
    if matrix {
        let expr = parse_matrix_expr(line)?;
        trace!(?expr, "evaluating");
        Ok(domain.wrap_matrix(evaluator.matrix(&expr)?))
    } else {
        let expr = parse_scalar_expr(line)?;
        trace!(?expr, "evaluating");
        Ok(domain.wrap_number(evaluator.number(&expr)?))
    }
}

/// Parse and evaluate `line` as an expression of type `kind`.
pub fn evaluate(state: &State, kind: ValueKind, line: &str) -> Result<Value, CommandError> {
    match kind.field() {
        FieldKind::Rational => evaluate_in(state, &Q, kind.is_matrix(), line),
        FieldKind::Residue(p) => evaluate_in(state, &Zp::new(p)?, kind.is_matrix(), line),
    }
}
