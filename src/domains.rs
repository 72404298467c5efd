//! Defines the exact number types and the [Field] trait shared by them.
//!
//! The number types build on each other:
//! - [Natural](natural::Natural) is an unsigned integer of arbitrary size.
//! - [Integer](integer::Integer) adds a sign to a [Natural](natural::Natural).
//! - [Rational](rational::Rational) is a fraction of integers in lowest terms.
//! - [Residue](finite_field::Residue) is an element of the prime field `Z_p`.
//!
//! Rationals and residues implement [Field], which is what the generic
//! [Matrix](crate::tensors::matrix::Matrix) requires of its entries.
//! Unlike the integers, field elements carry everything needed to produce
//! the identities of their field: a residue knows its prime, so
//! [`Field::zero`] and [`Field::one`] are derived from an existing element.
pub mod finite_field;
pub mod integer;
pub mod natural;
pub mod rational;

use std::fmt::{Debug, Display};

use crate::error::ArithmeticError;

/// A field is a set with addition and multiplication in which every
/// non-zero element has a multiplicative inverse.
///
/// Binary operations are fallible: division by zero is an error for every
/// field, and elements of two different prime fields cannot be combined.
pub trait Field: Clone + PartialEq + Debug + Display {
    fn add(&self, rhs: &Self) -> Result<Self, ArithmeticError>;
    fn sub(&self, rhs: &Self) -> Result<Self, ArithmeticError>;
    fn mul(&self, rhs: &Self) -> Result<Self, ArithmeticError>;
    fn div(&self, rhs: &Self) -> Result<Self, ArithmeticError>;
    /// Compute the multiplicative inverse. Fails for zero.
    fn inv(&self) -> Result<Self, ArithmeticError>;
    fn neg(&self) -> Self;
    /// The additive identity of the field `self` belongs to.
    fn zero(&self) -> Self;
    /// The multiplicative identity of the field `self` belongs to.
    fn one(&self) -> Self;
    fn is_zero(&self) -> bool;

    fn is_one(&self) -> bool {
        *self == self.one()
    }

    /// Compute `self^e` by repeated squaring.
    fn pow(&self, mut e: u64) -> Result<Self, ArithmeticError> {
        let mut base = self.clone();
        let mut result = self.one();
        while e != 0 {
            if e & 1 == 1 {
                result = result.mul(&base)?;
            }
            e >>= 1;
            if e != 0 {
                base = base.mul(&base)?;
            }
        }

        Ok(result)
    }
}
