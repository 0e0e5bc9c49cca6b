//! Value validation against type schemas.
//!
//! `validate` doubles as the sizing pass for the standard encoder: on success
//! it returns the number of bytes the value occupies in the standard
//! encoding of its subtree (head plus tail, excluding any offset slot an
//! enclosing tuple would add for it).

use crate::{
    uint::{bit_len, signed_bit_len, signed_bit_len_big},
    utils::padded_len,
    Error, Result, TupleType, Type, Value, UNIT_LEN,
};
use num_bigint::{BigInt, Sign};

/// Checks a signed value against a two's-complement bit width.
pub(crate) fn check_int(v: i64, bits: u32) -> Result<()> {
    let n = signed_bit_len(v) + 1;
    if n > bits {
        return Err(Error::bit_limit(n as usize, bits as usize));
    }
    Ok(())
}

/// Checks an unsigned value against a bit width.
pub(crate) fn check_uint(v: u64, bits: u32) -> Result<()> {
    let n = bit_len(v);
    if n > bits {
        return Err(Error::bit_limit(n as usize, bits as usize));
    }
    Ok(())
}

/// Checks an arbitrary-precision value against a bit width and signedness.
pub(crate) fn check_big(v: &BigInt, bits: u32, unsigned: bool) -> Result<()> {
    if unsigned {
        if v.sign() == Sign::Minus {
            return Err(Error::negative_unsigned());
        }
        let n = v.bits();
        if n > u64::from(bits) {
            return Err(Error::bit_limit(n as usize, bits as usize));
        }
    } else {
        let n = signed_bit_len_big(v) + 1;
        if n > u64::from(bits) {
            return Err(Error::bit_limit(n as usize, bits as usize));
        }
    }
    Ok(())
}

fn class_mismatch(ty: &Type, value: &Value) -> Error {
    Error::invalid_value(format!(
        "class mismatch: {} not assignable to {}",
        value.kind(),
        ty.canonical()
    ))
}

impl Type {
    /// Checks whether `value` is a legal argument for this type, returning
    /// the byte length of its standard encoding.
    pub fn validate(&self, value: &Value) -> Result<usize> {
        match (self, value) {
            (Self::Bool, Value::Bool(_)) => Ok(UNIT_LEN),
            (Self::Byte, Value::Int(v)) => {
                check_int(*v, 8)?;
                Ok(UNIT_LEN)
            }
            (Self::Int { bits, unsigned: false }, Value::Int(v))
            | (Self::Long { bits, unsigned: false }, Value::Int(v)) => {
                check_int(*v, *bits)?;
                Ok(UNIT_LEN)
            }
            (Self::Int { bits, unsigned: true }, Value::Uint(v))
            | (Self::Long { bits, unsigned: true }, Value::Uint(v)) => {
                check_uint(*v, *bits)?;
                Ok(UNIT_LEN)
            }
            (Self::BigInt { bits, unsigned }, Value::BigInt(v)) => {
                check_big(v, *bits, *unsigned)?;
                Ok(UNIT_LEN)
            }
            (Self::BigDecimal { bits, scale, unsigned }, Value::BigDecimal(dec)) => {
                if dec.scale != *scale {
                    return Err(Error::invalid_value(format!(
                        "big decimal scale mismatch: actual != expected: {} != {scale}",
                        dec.scale
                    )));
                }
                check_big(&dec.unscaled, *bits, *unsigned)?;
                Ok(UNIT_LEN)
            }
            (Self::Address, Value::Address(_)) => Ok(UNIT_LEN),
            (Self::FixedBytes(len), Value::FixedBytes(bytes)) => {
                if bytes.len() != *len {
                    return Err(Error::invalid_value(format!(
                        "array length mismatch: actual != expected: {} != {len}",
                        bytes.len()
                    )));
                }
                Ok(UNIT_LEN)
            }
            (Self::Bytes, Value::Bytes(bytes)) => Ok(UNIT_LEN + padded_len(bytes.len())),
            (Self::String, Value::String(s)) => Ok(UNIT_LEN + padded_len(s.len())),
            (Self::Array { elem, len }, Value::Array(values)) => {
                if let Some(len) = len {
                    if values.len() != *len {
                        return Err(Error::invalid_value(format!(
                            "array length mismatch: actual != expected: {} != {len}",
                            values.len()
                        )));
                    }
                }
                let mut total = if len.is_none() { UNIT_LEN } else { 0 };
                let dynamic_elem = elem.is_dynamic();
                for (i, v) in values.iter().enumerate() {
                    let n = elem.validate(v).map_err(|e| e.at_array_index(i))?;
                    total += n + if dynamic_elem { UNIT_LEN } else { 0 };
                }
                Ok(total)
            }
            (Self::Tuple(tuple), Value::Tuple(values)) => tuple.validate(values),
            _ => Err(class_mismatch(self, value)),
        }
    }
}

impl TupleType {
    /// Checks `values` element-wise against this tuple, returning the byte
    /// length of the standard encoding of the whole sequence.
    pub fn validate(&self, values: &[Value]) -> Result<usize> {
        if values.len() != self.size() {
            return Err(Error::invalid_value(format!(
                "tuple length mismatch: actual != expected: {} != {}",
                values.len(),
                self.size()
            )));
        }
        let mut total = 0;
        for (i, (ty, v)) in self.types().zip(values).enumerate() {
            let n = ty.validate(v).map_err(|e| e.at_tuple_index(i))?;
            total += n + if ty.is_dynamic() { UNIT_LEN } else { 0 };
        }
        Ok(total)
    }
}

/// Byte length of a validated value's standard encoding.
///
/// Must only be called on `(type, value)` pairs that `validate` has accepted.
pub(crate) fn byte_len(ty: &Type, value: &Value) -> usize {
    match (ty, value) {
        (Type::Bytes, Value::Bytes(b)) => UNIT_LEN + padded_len(b.len()),
        (Type::String, Value::String(s)) => UNIT_LEN + padded_len(s.len()),
        (Type::Array { elem, len }, Value::Array(values)) => {
            let per_elem = if elem.is_dynamic() { UNIT_LEN } else { 0 };
            let base = if len.is_none() { UNIT_LEN } else { 0 };
            base + values.iter().map(|v| byte_len(elem, v) + per_elem).sum::<usize>()
        }
        (Type::Tuple(tuple), Value::Tuple(values)) => tuple
            .types()
            .zip(values)
            .map(|(t, v)| byte_len(t, v) + if t.is_dynamic() { UNIT_LEN } else { 0 })
            .sum(),
        _ => UNIT_LEN,
    }
}
