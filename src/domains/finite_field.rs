use std::fmt::{Display, Formatter};

use crate::error::ArithmeticError;

use super::{integer::Integer, natural::Natural, Field};

/// Check if `n` is prime by trial division.
pub fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let n = n as u64;
    let mut d = 3u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }

    true
}

#[inline]
fn add_mod(a: u32, b: u32, p: u32) -> u32 {
    ((a as u64 + b as u64) % p as u64) as u32
}

/// An element of the prime field `Z_p`, stored as a value in `[0, p)`
/// together with the prime `p`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Residue {
    value: u32,
    modulus: u32,
}

impl Residue {
    /// Create the residue of `value` modulo the prime `modulus`.
    pub fn new(value: u32, modulus: u32) -> Result<Residue, ArithmeticError> {
        if !is_prime(modulus) {
            return Err(ArithmeticError::CompositeModulo(modulus));
        }

        Ok(Residue::new_unchecked(value, modulus))
    }

    /// Create a residue without checking that `modulus` is prime.
    #[inline]
    pub(crate) fn new_unchecked(value: u32, modulus: u32) -> Residue {
        Residue {
            value: value % modulus,
            modulus,
        }
    }

    /// Map an integer of any size and sign into `[0, p)`.
    pub fn from_integer(n: &Integer, modulus: u32) -> Result<Residue, ArithmeticError> {
        if !is_prime(modulus) {
            return Err(ArithmeticError::CompositeModulo(modulus));
        }

        let (_, r) = n.abs().div_rem(&Natural::from(modulus))?;
        // the remainder is smaller than the modulus, so it is a single block
        let r = r.blocks()[0];
        let value = if n.is_negative() && r != 0 {
            modulus - r
        } else {
            r
        };

        Ok(Residue::new_unchecked(value, modulus))
    }

    /// Parse an integer literal and reduce it modulo `modulus`.
    pub fn parse(text: &str, modulus: u32) -> Result<Residue, ArithmeticError> {
        Residue::from_integer(&text.parse()?, modulus)
    }

    /// The representative in `[0, p)`.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    #[inline]
    fn check_modulus(&self, rhs: &Residue) -> Result<(), ArithmeticError> {
        if self.modulus != rhs.modulus {
            Err(ArithmeticError::IncompatibleModulo(self.modulus, rhs.modulus))
        } else {
            Ok(())
        }
    }

    /// Multiply by doubling and adding, so that no intermediate exceeds `2p`.
    fn mul_unchecked(&self, rhs: &Residue) -> Residue {
        let p = self.modulus;
        let mut acc = 0;
        let mut addend = self.value;
        let mut bits = rhs.value;
        while bits != 0 {
            if bits & 1 == 1 {
                acc = add_mod(acc, addend, p);
            }
            addend = add_mod(addend, addend, p);
            bits >>= 1;
        }

        Residue {
            value: acc,
            modulus: p,
        }
    }
}

impl Field for Residue {
    fn add(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.check_modulus(rhs)?;
        Ok(Residue {
            value: add_mod(self.value, rhs.value, self.modulus),
            modulus: self.modulus,
        })
    }

    fn sub(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.check_modulus(rhs)?;
        let value = if self.value >= rhs.value {
            self.value - rhs.value
        } else {
            self.modulus - (rhs.value - self.value)
        };

        Ok(Residue {
            value,
            modulus: self.modulus,
        })
    }

    fn mul(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.check_modulus(rhs)?;
        Ok(self.mul_unchecked(rhs))
    }

    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError> {
        self.check_modulus(rhs)?;
        Ok(self.mul_unchecked(&rhs.inv()?))
    }

    /// Compute the inverse as `x^(p-2)`, using Fermat's little theorem.
    fn inv(&self) -> Result<Self, ArithmeticError> {
        if self.value == 0 {
            return Err(ArithmeticError::DivisionByZero);
        }

        self.pow(self.modulus as u64 - 2)
    }

    fn neg(&self) -> Self {
        if self.value == 0 {
            *self
        } else {
            Residue {
                value: self.modulus - self.value,
                modulus: self.modulus,
            }
        }
    }

    #[inline]
    fn zero(&self) -> Self {
        Residue {
            value: 0,
            modulus: self.modulus,
        }
    }

    #[inline]
    fn one(&self) -> Self {
        Residue::new_unchecked(1, self.modulus)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.value == 0
    }

    #[inline]
    fn is_one(&self) -> bool {
        self.value == 1
    }
}

impl Display for Residue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.value, f)
    }
}

#[cfg(test)]
mod test {
    use crate::{domains::Field, error::ArithmeticError};

    use super::{is_prime, Residue};

    fn r(value: u32, p: u32) -> Residue {
        Residue::new(value, p).unwrap()
    }

    #[test]
    fn primes() {
        let small: Vec<u32> = (0..50).filter(|&n| is_prime(n)).collect();
        assert_eq!(
            small,
            [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
        assert!(is_prime(4294967291));
        assert!(!is_prime(4294967295));
        assert!(!is_prime(65537 * 65521));
    }

    #[test]
    fn construction() {
        assert_eq!(r(12, 7).value(), 5);
        assert_eq!(Residue::new(3, 8), Err(ArithmeticError::CompositeModulo(8)));
        assert_eq!(Residue::new(3, 1), Err(ArithmeticError::CompositeModulo(1)));
        assert_eq!(Residue::new(3, 0), Err(ArithmeticError::CompositeModulo(0)));
        assert_eq!(Residue::parse("-3", 7), Ok(r(4, 7)));
        assert_eq!(Residue::parse("-14", 7), Ok(r(0, 7)));
        assert_eq!(
            Residue::parse("123456789012345678901234567891", 7),
            Ok(r(1, 7))
        );
        assert_eq!(
            Residue::parse("1/2", 7),
            Err(ArithmeticError::InvalidDigit('/'))
        );
    }

    #[test]
    fn arithmetic() {
        assert_eq!(r(5, 7).add(&r(4, 7)), Ok(r(2, 7)));
        assert_eq!(r(2, 7).sub(&r(5, 7)), Ok(r(4, 7)));
        assert_eq!(r(3, 7).mul(&r(5, 7)), Ok(r(1, 7)));
        assert_eq!(r(1, 7).div(&r(3, 7)), Ok(r(5, 7)));
        assert_eq!(r(3, 7).neg(), r(4, 7));
        assert_eq!(r(0, 7).neg(), r(0, 7));
        assert_eq!(r(3, 7).pow(6), Ok(r(1, 7)));
        assert_eq!(r(1, 2).inv(), Ok(r(1, 2)));
    }

    #[test]
    fn large_prime() {
        let p = 4294967291;
        let a = r(p - 1, p);
        assert_eq!(a.add(&a), Ok(r(p - 2, p)));
        assert_eq!(a.mul(&a), Ok(r(1, p)));
        assert_eq!(a.inv(), Ok(a));

        let b = r(123456789, p);
        assert_eq!(b.mul(&b.inv().unwrap()), Ok(r(1, p)));
    }

    #[test]
    fn errors() {
        assert_eq!(
            r(1, 7).add(&r(1, 11)),
            Err(ArithmeticError::IncompatibleModulo(7, 11))
        );
        assert_eq!(r(1, 7).div(&r(0, 7)), Err(ArithmeticError::DivisionByZero));
        assert_eq!(r(0, 7).inv(), Err(ArithmeticError::DivisionByZero));
    }

    #[test]
    fn display() {
        assert_eq!(r(10, 7).to_string(), "3");
    }
}
