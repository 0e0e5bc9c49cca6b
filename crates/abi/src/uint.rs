use crate::{Error, Result};
use num_bigint::{BigInt, BigUint, Sign};

/// Bit-width-parameterised conversions between signed and unsigned integer
/// interpretations of the same two's-complement bit pattern.
///
/// `to_unsigned`/`to_signed` operate on fixed-width machine integers and are
/// valid for widths up to 64 bits; the `_big` variants cover the full 1..=256
/// range. All four are total over their checked domains: any out-of-range
/// input is rejected with [`Error::InvalidRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uint {
    bits: u32,
}

impl Uint {
    /// Creates a converter for the given width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is zero or greater than 256.
    pub fn new(bits: u32) -> Self {
        assert!((1..=256).contains(&bits), "bits out of range: {bits}");
        Self { bits }
    }

    /// The configured bit width.
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// Reinterprets a signed value as unsigned: non-negative values pass
    /// through, negative values gain `2^bits`.
    ///
    /// `signed` must fit in `bits - 1` bits plus sign.
    pub fn to_unsigned(&self, signed: i64) -> Result<u64> {
        self.check_narrow()?;
        let n = signed_bit_len(signed);
        if n >= self.bits {
            return Err(Error::InvalidRange(format!(
                "signed has too many bits: {n} is not less than {}",
                self.bits
            )));
        }
        if signed >= 0 {
            Ok(signed as u64)
        } else {
            Ok(((1i128 << self.bits) + i128::from(signed)) as u64)
        }
    }

    /// Reinterprets an unsigned value as signed: values below `2^(bits-1)`
    /// pass through, the rest lose `2^bits`.
    ///
    /// `unsigned` must fit in `bits` bits.
    pub fn to_signed(&self, unsigned: u64) -> Result<i64> {
        self.check_narrow()?;
        let n = bit_len(unsigned);
        if n > self.bits {
            return Err(Error::InvalidRange(format!(
                "unsigned has too many bits: {n} > {}",
                self.bits
            )));
        }
        if u128::from(unsigned) < 1u128 << (self.bits - 1) {
            Ok(unsigned as i64)
        } else {
            Ok((i128::from(unsigned) - (1i128 << self.bits)) as i64)
        }
    }

    /// Arbitrary-precision form of [`to_unsigned`](Self::to_unsigned).
    pub fn to_unsigned_big(&self, signed: &BigInt) -> Result<BigUint> {
        let n = signed_bit_len_big(signed);
        if n >= u64::from(self.bits) {
            return Err(Error::InvalidRange(format!(
                "signed has too many bits: {n} is not less than {}",
                self.bits
            )));
        }
        let unsigned = if signed.sign() == Sign::Minus {
            signed + (BigInt::from(1u8) << self.bits)
        } else {
            signed.clone()
        };
        match unsigned.to_biguint() {
            Some(u) => Ok(u),
            None => Err(Error::InvalidRange("conversion produced a negative value".to_string())),
        }
    }

    /// Arbitrary-precision form of [`to_signed`](Self::to_signed).
    pub fn to_signed_big(&self, unsigned: &BigUint) -> Result<BigInt> {
        let n = unsigned.bits();
        if n > u64::from(self.bits) {
            return Err(Error::InvalidRange(format!(
                "unsigned has too many bits: {n} > {}",
                self.bits
            )));
        }
        let half = BigUint::from(1u8) << (self.bits - 1);
        if *unsigned < half {
            Ok(BigInt::from(unsigned.clone()))
        } else {
            Ok(BigInt::from(unsigned.clone()) - (BigInt::from(1u8) << self.bits))
        }
    }

    fn check_narrow(&self) -> Result<()> {
        if self.bits > 64 {
            return Err(Error::InvalidRange(format!(
                "unsupported bit width for fixed-width conversion: {} > 64",
                self.bits
            )));
        }
        Ok(())
    }
}

/// Minimal two's-complement length of `x`, excluding the sign bit.
///
/// Matches arbitrary-precision `bitLength` conventions: `0` and `-1` are zero
/// bits, `127` and `-128` are seven.
pub(crate) fn signed_bit_len(x: i64) -> u32 {
    if x >= 0 {
        64 - x.leading_zeros()
    } else {
        64 - x.leading_ones()
    }
}

/// Minimal unsigned length of `x`.
pub(crate) fn bit_len(x: u64) -> u32 {
    64 - x.leading_zeros()
}

/// [`signed_bit_len`] over arbitrary-precision integers.
pub(crate) fn signed_bit_len_big(x: &BigInt) -> u64 {
    match x.sign() {
        Sign::NoSign => 0,
        Sign::Plus => x.bits(),
        Sign::Minus => (x.magnitude().clone() - 1u8).bits(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bit_lengths() {
        assert_eq!(signed_bit_len(0), 0);
        assert_eq!(signed_bit_len(-1), 0);
        assert_eq!(signed_bit_len(127), 7);
        assert_eq!(signed_bit_len(-128), 7);
        assert_eq!(signed_bit_len(128), 8);
        assert_eq!(signed_bit_len(-129), 8);
        assert_eq!(signed_bit_len(i64::MIN), 63);
        assert_eq!(bit_len(0), 0);
        assert_eq!(bit_len(255), 8);
    }

    #[test]
    fn reinterpret_u8() {
        let uint8 = Uint::new(8);
        assert_eq!(uint8.to_unsigned(-1).unwrap(), 255);
        assert_eq!(uint8.to_unsigned(127).unwrap(), 127);
        assert_eq!(uint8.to_signed(255).unwrap(), -1);
        assert_eq!(uint8.to_signed(127).unwrap(), 127);
        assert_eq!(uint8.to_signed(128).unwrap(), -128);
    }

    #[test]
    fn width_violations() {
        let uint8 = Uint::new(8);
        let err = uint8.to_unsigned(128).unwrap_err();
        assert_eq!(err.to_string(), "signed has too many bits: 8 is not less than 8");
        let err = uint8.to_signed(256).unwrap_err();
        assert_eq!(err.to_string(), "unsigned has too many bits: 9 > 8");

        let err = Uint::new(8).to_unsigned_big(&BigInt::from(128)).unwrap_err();
        assert_eq!(err.to_string(), "signed has too many bits: 8 is not less than 8");
        let err = Uint::new(8).to_signed_big(&BigUint::from(256u32)).unwrap_err();
        assert_eq!(err.to_string(), "unsigned has too many bits: 9 > 8");
    }

    #[test]
    fn full_width_64() {
        let uint64 = Uint::new(64);
        assert_eq!(uint64.to_unsigned(-1).unwrap(), u64::MAX);
        assert_eq!(uint64.to_unsigned(i64::MIN).unwrap(), 1u64 << 63);
        assert_eq!(uint64.to_signed(u64::MAX).unwrap(), -1);
        assert_eq!(uint64.to_signed(i64::MAX as u64).unwrap(), i64::MAX);
    }

    proptest! {
        #[test]
        fn symmetry(bits in 1u32..=64, x in any::<i64>()) {
            let uint = Uint::new(bits);
            if let Ok(u) = uint.to_unsigned(x) {
                prop_assert_eq!(uint.to_signed(u).unwrap(), x);
            }
        }

        #[test]
        fn symmetry_unsigned(bits in 1u32..=64, y in any::<u64>()) {
            let uint = Uint::new(bits);
            if let Ok(s) = uint.to_signed(y) {
                prop_assert_eq!(uint.to_unsigned(s).unwrap(), y);
            }
        }

        #[test]
        fn symmetry_big(bits in 1u32..=256, x in any::<i128>()) {
            let uint = Uint::new(bits);
            let x = BigInt::from(x);
            if let Ok(u) = uint.to_unsigned_big(&x) {
                prop_assert_eq!(uint.to_signed_big(&u).unwrap(), x);
            }
        }
    }
}
