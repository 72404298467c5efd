use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::ArithmeticError;

use super::natural::Natural;

/// A signed integer of arbitrary size, stored as a sign and a magnitude.
/// Zero is never negative.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Integer {
    negative: bool,
    magnitude: Natural,
}

impl From<Natural> for Integer {
    fn from(magnitude: Natural) -> Self {
        Integer {
            negative: false,
            magnitude,
        }
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::new(value < 0, Natural::from(value.unsigned_abs()))
    }
}

impl Integer {
    /// Create an integer from a sign and a magnitude. A negative zero
    /// is turned into zero.
    pub fn new(negative: bool, magnitude: Natural) -> Integer {
        Integer {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        }
    }

    pub fn zero() -> Integer {
        Integer::default()
    }

    pub fn one() -> Integer {
        Integer::from(Natural::one())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        !self.negative && self.magnitude.is_one()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// The absolute value.
    #[inline]
    pub fn abs(&self) -> &Natural {
        &self.magnitude
    }

    pub fn neg(&self) -> Integer {
        Integer::new(!self.negative, self.magnitude.clone())
    }

    pub fn add(&self, other: &Integer) -> Integer {
        if self.negative == other.negative {
            return Integer::new(self.negative, self.magnitude.add(&other.magnitude));
        }

        // the signs differ, so the magnitudes are subtracted and the sign of
        // the larger one wins
        let (diff, underflow) = self.magnitude.monus(&other.magnitude);
        if underflow {
            Integer::new(other.negative, other.magnitude.monus(&self.magnitude).0)
        } else {
            Integer::new(self.negative, diff)
        }
    }

    pub fn sub(&self, other: &Integer) -> Integer {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Integer) -> Integer {
        Integer::new(
            self.negative ^ other.negative,
            self.magnitude.mul(&other.magnitude),
        )
    }

    /// Divide by a natural, truncating towards zero.
    pub fn div_natural(&self, divisor: &Natural) -> Result<Integer, ArithmeticError> {
        let (q, _) = self.magnitude.div_rem(divisor)?;
        Ok(Integer::new(self.negative, q))
    }
}

impl FromStr for Integer {
    type Err = ArithmeticError;

    /// Parse an optional `-` followed by decimal digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s == "-" {
            return Err(ArithmeticError::InvalidInteger);
        }

        match s.strip_prefix('-') {
            Some(digits) => Ok(Integer::new(true, digits.parse()?)),
            None => Ok(Integer::from(s.parse::<Natural>()?)),
        }
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        Display::fmt(&self.magnitude, f)
    }
}
