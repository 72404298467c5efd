use std::fmt::{self, Display};

use ahash::{HashMap, HashMapExt};

use crate::{
    domains::{finite_field::Residue, rational::Rational},
    parser::Name,
    tensors::matrix::Matrix,
};

/// A value that can be stored in a variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Rational(Rational),
    Residue(Residue),
    RationalMatrix(Matrix<Rational>),
    ResidueMatrix(Matrix<Residue>),
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Rational(r) => r.fmt(f),
            Value::Residue(r) => r.fmt(f),
            Value::RationalMatrix(m) => m.fmt(f),
            Value::ResidueMatrix(m) => m.fmt(f),
        }
    }
}

/// The variables of a calculator session.
pub struct State {
    variables: HashMap<Name, Value>,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl State {
    pub fn new() -> State {
        State {
            variables: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Store a value, returning the value it replaces.
    pub fn insert(&mut self, name: Name, value: Value) -> Option<Value> {
        self.variables.insert(name, value)
    }
}
