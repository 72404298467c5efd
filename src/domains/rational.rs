use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::ArithmeticError;

use super::{integer::Integer, natural::Natural, Field};

/// A rational number `p/q` in lowest terms with `q > 0`.
///
/// Every constructor simplifies, so two equal rationals always have the
/// same representation and structural equality is numeric equality.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rational {
    numerator: Integer,
    denominator: Integer,
}

impl From<Integer> for Rational {
    fn from(numerator: Integer) -> Self {
        Rational {
            numerator,
            denominator: Integer::one(),
        }
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::from(Integer::from(value))
    }
}

impl From<Natural> for Rational {
    fn from(value: Natural) -> Self {
        Rational::from(Integer::from(value))
    }
}

impl Rational {
    /// Create the fraction `numerator/denominator` in lowest terms.
    pub fn new(numerator: Integer, denominator: Integer) -> Result<Rational, ArithmeticError> {
        if denominator.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        let gcd = numerator.abs().gcd(denominator.abs());
        let negative = numerator.is_negative() ^ denominator.is_negative();
        let (num, _) = numerator.abs().div_rem(&gcd)?;
        let (den, _) = denominator.abs().div_rem(&gcd)?;

        Ok(Rational {
            numerator: Integer::new(negative, num),
            denominator: Integer::from(den),
        })
    }

    pub fn numerator(&self) -> &Integer {
        &self.numerator
    }

    pub fn denominator(&self) -> &Integer {
        &self.denominator
    }

    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }
}

impl Field for Rational {
    fn add(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        Rational::new(
            self.numerator
                .mul(&rhs.denominator)
                .add(&rhs.numerator.mul(&self.denominator)),
            self.denominator.mul(&rhs.denominator),
        )
    }

    fn sub(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        Rational::new(
            self.numerator
                .mul(&rhs.denominator)
                .sub(&rhs.numerator.mul(&self.denominator)),
            self.denominator.mul(&rhs.denominator),
        )
    }

    fn mul(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        Rational::new(
            self.numerator.mul(&rhs.numerator),
            self.denominator.mul(&rhs.denominator),
        )
    }

    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        if rhs.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        Rational::new(
            self.numerator.mul(&rhs.denominator),
            self.denominator.mul(&rhs.numerator),
        )
    }

    fn inv(&self) -> Result<Self, ArithmeticError> {
        Rational::new(self.denominator.clone(), self.numerator.clone())
    }

    fn neg(&self) -> Self {
        Rational {
            numerator: self.numerator.neg(),
            denominator: self.denominator.clone(),
        }
    }

    fn zero(&self) -> Self {
        Rational::from(Integer::zero())
    }

    fn one(&self) -> Self {
        Rational::from(Integer::one())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.numerator.is_one() && self.denominator.is_one()
    }
}

impl FromStr for Rational {
    type Err = ArithmeticError;

    /// Parse `p` or `p/q`, where both parts are integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((num, den)) => Rational::new(num.parse()?, den.parse()?),
            None => Ok(Rational::from(s.parse::<Integer>()?)),
        }
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_integer() {
            Display::fmt(&self.numerator, f)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}
