use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use smallvec::{smallvec, SmallVec};

use crate::error::ArithmeticError;

const BLOCK_BITS: u32 = u32::BITS;

/// An unsigned integer of arbitrary size.
///
/// The value is stored as 32-bit blocks, least significant block first.
/// The representation is canonical: there are no trailing zero blocks,
/// except for zero itself, which is the single block `[0]`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Natural {
    blocks: SmallVec<[u32; 4]>,
}

impl Default for Natural {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u32> for Natural {
    #[inline]
    fn from(value: u32) -> Self {
        Natural {
            blocks: smallvec![value],
        }
    }
}

impl From<u64> for Natural {
    #[inline]
    fn from(value: u64) -> Self {
        Natural::from_blocks([value as u32, (value >> BLOCK_BITS) as u32])
    }
}

impl Natural {
    pub fn zero() -> Natural {
        Natural {
            blocks: smallvec![0],
        }
    }

    pub fn one() -> Natural {
        Natural {
            blocks: smallvec![1],
        }
    }

    /// Create a natural from blocks of 32 bits, least significant first.
    pub fn from_blocks(blocks: impl IntoIterator<Item = u32>) -> Natural {
        let mut n = Natural {
            blocks: blocks.into_iter().collect(),
        };
        n.normalize();
        n
    }

    /// The 32-bit blocks of the number, least significant first.
    pub fn blocks(&self) -> &[u32] {
        &self.blocks
    }

    /// Strip the most significant zero blocks.
    fn normalize(&mut self) {
        while self.blocks.len() > 1 && self.blocks[self.blocks.len() - 1] == 0 {
            self.blocks.pop();
        }

        if self.blocks.is_empty() {
            self.blocks.push(0);
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0] == 0
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0] == 1
    }

    /// The number of significant bits. Zero has no significant bits.
    pub fn bits(&self) -> usize {
        let top = self.blocks[self.blocks.len() - 1];
        (self.blocks.len() - 1) * BLOCK_BITS as usize + (BLOCK_BITS - top.leading_zeros()) as usize
    }

    /// The bit at position `index`, counting from the least significant bit.
    #[inline]
    fn bit(&self, index: usize) -> bool {
        let (block, offset) = (index / BLOCK_BITS as usize, index % BLOCK_BITS as usize);
        (self.blocks[block] >> offset) & 1 == 1
    }

    /// Add two naturals, carrying between blocks. The result grows by one
    /// block when the most significant block overflows.
    pub fn add(&self, other: &Natural) -> Natural {
        let (long, short) = if self.blocks.len() >= other.blocks.len() {
            (self, other)
        } else {
            (other, self)
        };

        let mut blocks = SmallVec::with_capacity(long.blocks.len() + 1);
        let mut carry = false;
        for (i, &a) in long.blocks.iter().enumerate() {
            let b = short.blocks.get(i).copied().unwrap_or(0);
            let (sum, c1) = a.overflowing_add(b);
            let (sum, c2) = sum.overflowing_add(carry as u32);
            blocks.push(sum);
            carry = c1 || c2;
        }

        if carry {
            blocks.push(1);
        }

        Natural { blocks }
    }

    /// Compute the truncated difference `self - other`.
    ///
    /// The flag is `true` when `self < other`; the difference is then zero
    /// instead of wrapping around.
    pub fn monus(&self, other: &Natural) -> (Natural, bool) {
        let len = self.blocks.len().max(other.blocks.len());

        let mut blocks = SmallVec::with_capacity(len);
        let mut borrow = false;
        for i in 0..len {
            let a = self.blocks.get(i).copied().unwrap_or(0);
            let b = other.blocks.get(i).copied().unwrap_or(0);
            let (diff, b1) = a.overflowing_sub(b);
            let (diff, b2) = diff.overflowing_sub(borrow as u32);
            blocks.push(diff);
            borrow = b1 || b2;
        }

        if borrow {
            return (Natural::zero(), true);
        }

        let mut diff = Natural { blocks };
        diff.normalize();
        (diff, false)
    }

    /// Return `true` iff `self > other`.
    #[inline]
    pub fn greater_than(&self, other: &Natural) -> bool {
        other.monus(self).1
    }

    #[inline]
    fn double(&self) -> Natural {
        self.add(self)
    }

    /// Multiply two naturals by doubling and adding, walking the bits of
    /// `other` from most to least significant.
    pub fn mul(&self, other: &Natural) -> Natural {
        let mut result = Natural::zero();
        for index in (0..other.bits()).rev() {
            result = result.double();
            if other.bit(index) {
                result = result.add(self);
            }
        }

        result
    }

    /// Compute the quotient and remainder of `self / divisor`.
    pub fn div_rem(&self, divisor: &Natural) -> Result<(Natural, Natural), ArithmeticError> {
        if divisor.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }

        Ok(self.div_rem_unchecked(divisor))
    }

    /// Restoring long division, one bit at a time. `divisor` must be non-zero.
    fn div_rem_unchecked(&self, divisor: &Natural) -> (Natural, Natural) {
        let mut quotient: SmallVec<[u32; 4]> = smallvec![0; self.blocks.len()];
        let mut remainder = Natural::zero();

        for index in (0..self.bits()).rev() {
            remainder = remainder.double();
            remainder.blocks[0] |= self.bit(index) as u32;

            if !divisor.greater_than(&remainder) {
                remainder = remainder.monus(divisor).0;
                quotient[index / BLOCK_BITS as usize] |= 1 << (index % BLOCK_BITS as usize);
            }
        }

        let mut quotient = Natural { blocks: quotient };
        quotient.normalize();
        (quotient, remainder)
    }

    /// Compute the greatest common divisor with Euclid's algorithm.
    /// The gcd of zero and zero is zero.
    pub fn gcd(&self, other: &Natural) -> Natural {
        let mut a = self.clone();
        let mut b = other.clone();

        while !b.is_zero() {
            let (_, r) = a.div_rem_unchecked(&b);
            a = b;
            b = r;
        }

        a
    }
}

impl Ord for Natural {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.greater_than(other) {
            Ordering::Greater
        } else if other.greater_than(self) {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

impl PartialOrd for Natural {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Natural {
    type Err = ArithmeticError;

    /// Parse a string of decimal digits. The empty string is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ten = Natural::from(10u32);

        let mut result = Natural::zero();
        for c in s.chars() {
            let digit = c.to_digit(10).ok_or(ArithmeticError::InvalidDigit(c))?;
            result = result.mul(&ten).add(&Natural::from(digit));
        }

        Ok(result)
    }
}

impl Display for Natural {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }

        let ten = Natural::from(10u32);
        let mut digits = vec![];
        let mut n = self.clone();
        while !n.is_zero() {
            let (q, r) = n.div_rem_unchecked(&ten);
            digits.push(char::from(b'0' + r.blocks[0] as u8));
            n = q;
        }

        let s: String = digits.iter().rev().collect();
        f.write_str(&s)
    }
}

#[cfg(test)]
mod test {
    use crate::error::ArithmeticError;

    use super::Natural;

    fn n(s: &str) -> Natural {
        s.parse().unwrap()
    }

    #[test]
    fn parse_and_print() {
        assert_eq!(n("12345").to_string(), "12345");
        assert_eq!(Natural::zero().to_string(), "0");
        assert_eq!(n("0000").to_string(), "0");
        assert_eq!(n("").to_string(), "0");
        assert_eq!(
            n("340282366920938463463374607431768211456").to_string(),
            "340282366920938463463374607431768211456"
        );
        assert_eq!(
            "12a4".parse::<Natural>(),
            Err(ArithmeticError::InvalidDigit('a'))
        );
        assert_eq!("-1".parse::<Natural>(), Err(ArithmeticError::InvalidDigit('-')));
    }

    #[test]
    fn canonical_form() {
        let a = Natural::from_blocks([5, 0, 0]);
        assert_eq!(a.blocks(), &[5]);
        assert_eq!(Natural::from_blocks(Vec::new()).blocks(), &[0]);
        assert_eq!(Natural::from(1u64 << 32).blocks(), &[0, 1]);
        assert_eq!(Natural::from(7u64).blocks(), &[7]);

        let (d, negative) = Natural::from_blocks([0, 1]).monus(&Natural::one());
        assert!(!negative);
        assert_eq!(d.blocks(), &[u32::MAX]);
    }

    #[test]
    fn add_carries() {
        let a = Natural::from(u32::MAX);
        assert_eq!(a.add(&Natural::one()).blocks(), &[0, 1]);

        let b = Natural::from_blocks([u32::MAX, u32::MAX]);
        assert_eq!(b.add(&Natural::one()).blocks(), &[0, 0, 1]);
        assert_eq!(Natural::one().add(&b).blocks(), &[0, 0, 1]);
    }

    #[test]
    fn monus() {
        let (d, negative) = n("1000").monus(&n("1"));
        assert_eq!((d.to_string().as_str(), negative), ("999", false));

        let (d, negative) = n("1").monus(&n("1000"));
        assert!(negative);
        assert!(d.is_zero());

        let (d, negative) = n("18446744073709551616").monus(&n("18446744073709551616"));
        assert!(!negative);
        assert_eq!(d.blocks(), &[0]);

        assert!(n("10").greater_than(&n("9")));
        assert!(!n("9").greater_than(&n("9")));
        assert!(n("4294967296").greater_than(&n("4294967295")));
        assert!(n("3") < n("18446744073709551616"));
    }

    #[test]
    fn multiply() {
        assert_eq!(n("123456789").mul(&n("987654321")).to_string(), "121932631112635269");
        assert_eq!(
            n("18446744073709551615").mul(&n("18446744073709551615")).to_string(),
            "340282366920938463426481119284349108225"
        );
        assert!(n("0").mul(&n("123")).is_zero());
        assert!(n("123").mul(&n("0")).is_zero());
    }

    #[test]
    fn divide() {
        let (q, r) = n("121932631112635270").div_rem(&n("987654321")).unwrap();
        assert_eq!(q.to_string(), "123456789");
        assert_eq!(r.to_string(), "1");

        let (q, r) = n("7").div_rem(&n("10")).unwrap();
        assert!(q.is_zero());
        assert_eq!(r.to_string(), "7");

        assert_eq!(
            n("5").div_rem(&Natural::zero()),
            Err(ArithmeticError::DivisionByZero)
        );
    }

    #[test]
    fn gcd() {
        fn slow_gcd(a: u32, b: u32) -> u32 {
            (1..=a.max(b))
                .rev()
                .find(|d| a % d == 0 && b % d == 0)
                .unwrap_or(0)
        }

        for a in 0..40u32 {
            for b in 0..40u32 {
                let g = Natural::from(a).gcd(&Natural::from(b));
                assert_eq!(g, Natural::from(slow_gcd(a, b)), "gcd({}, {})", a, b);
            }
        }

        assert_eq!(
            n("36893488147419103232").gcd(&n("12")).to_string(),
            "4"
        );
    }

    #[test]
    fn bits() {
        assert_eq!(Natural::zero().bits(), 0);
        assert_eq!(Natural::one().bits(), 1);
        assert_eq!(Natural::from(1u64 << 32).bits(), 33);
        assert_eq!(n("340282366920938463463374607431768211455").bits(), 128);
    }
}
