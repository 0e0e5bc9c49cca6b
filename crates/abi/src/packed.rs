//! Packed codec.
//!
//! The packed encoding strips all padding and length prefixes: integers take
//! their declared width in bytes, `bytes<L>` takes L bytes, dynamic byte
//! sequences are written raw, and tuples and arrays concatenate their
//! elements (each integer element at its full declared width). The format is
//! ambiguous in general; decoding is only defined when the schema contains at
//! most one dynamic component, which receives the bytes left over after both
//! fixed-size flanks are consumed.

use crate::{Error, Result, TupleType, Type, Uint, Value};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::ToPrimitive;

/// Byte length of a validated value's packed encoding.
fn packed_byte_len(ty: &Type, value: &Value) -> usize {
    match (ty, value) {
        (Type::Bytes, Value::Bytes(b)) => b.len(),
        (Type::String, Value::String(s)) => s.len(),
        (Type::Array { elem, .. }, Value::Array(values)) => {
            values.iter().map(|v| packed_byte_len(elem, v)).sum()
        }
        (Type::Tuple(tuple), Value::Tuple(values)) => {
            tuple.types().zip(values).map(|(t, v)| packed_byte_len(t, v)).sum()
        }
        _ => ty.packed_width().unwrap_or(0),
    }
}

fn encode_packed_value(ty: &Type, value: &Value, buf: &mut Vec<u8>) {
    match (ty, value) {
        (Type::Bool, Value::Bool(b)) => buf.push(u8::from(*b)),
        (Type::Byte, Value::Int(v)) => buf.push(*v as u8),
        (Type::Int { bits, unsigned: false }, Value::Int(v))
        | (Type::Long { bits, unsigned: false }, Value::Int(v)) => {
            let w = *bits as usize / 8;
            buf.extend_from_slice(&v.to_be_bytes()[8 - w..]);
        }
        (Type::Int { bits, unsigned: true }, Value::Uint(v))
        | (Type::Long { bits, unsigned: true }, Value::Uint(v)) => {
            let w = *bits as usize / 8;
            buf.extend_from_slice(&v.to_be_bytes()[8 - w..]);
        }
        (Type::BigInt { bits, .. }, Value::BigInt(v)) => {
            extend_big(v, *bits as usize / 8, buf);
        }
        (Type::BigDecimal { bits, .. }, Value::BigDecimal(dec)) => {
            extend_big(&dec.unscaled, *bits as usize / 8, buf);
        }
        (Type::Address, Value::Address(a)) => buf.extend_from_slice(a.as_bytes()),
        (Type::FixedBytes(_), Value::FixedBytes(bytes)) => buf.extend_from_slice(bytes),
        (Type::Bytes, Value::Bytes(bytes)) => buf.extend_from_slice(bytes),
        (Type::String, Value::String(s)) => buf.extend_from_slice(s.as_bytes()),
        (Type::Array { elem, .. }, Value::Array(values)) => {
            for v in values {
                encode_packed_value(elem, v, buf);
            }
        }
        (Type::Tuple(tuple), Value::Tuple(values)) => {
            for (t, v) in tuple.types().zip(values) {
                encode_packed_value(t, v, buf);
            }
        }
        _ => unreachable!("value was not validated against this type"),
    }
}

/// Writes `v` as a `width`-byte big-endian two's-complement quantity.
fn extend_big(v: &BigInt, width: usize, buf: &mut Vec<u8>) {
    let start = buf.len();
    if v.sign() == Sign::Minus {
        let bytes = v.to_signed_bytes_be();
        buf.resize(start + width - bytes.len(), 0xff);
        buf.extend_from_slice(&bytes);
    } else {
        let bytes = v.magnitude().to_bytes_be();
        buf.resize(start + width - bytes.len(), 0x00);
        buf.extend_from_slice(&bytes);
    }
}

impl TupleType {
    /// Validates and packed-encodes `values`.
    pub fn encode_packed(&self, values: &[Value]) -> Result<Vec<u8>> {
        self.validate(values)?;
        let size = self.types().zip(values).map(|(t, v)| packed_byte_len(t, v)).sum();
        let mut buf = Vec::with_capacity(size);
        for (ty, v) in self.types().zip(values) {
            encode_packed_value(ty, v, &mut buf);
        }
        Ok(buf)
    }

    /// Decodes a packed encoding of this tuple.
    ///
    /// The schema must contain at most one dynamic component, transitively;
    /// otherwise the decomposition is ambiguous and the call fails with
    /// [`Error::PackedAmbiguous`]. The decoded values are re-validated before
    /// being returned.
    pub fn decode_packed(&self, data: &[u8]) -> Result<Vec<Value>> {
        let dynamics: usize = self.types().map(Type::count_dynamics).sum();
        if dynamics > 1 {
            return Err(Error::PackedAmbiguous("multiple dynamic elements".to_string()));
        }
        let values = decode_packed_tuple(self, data, 0, data.len())?;
        self.validate(&values)?;
        Ok(values)
    }
}

/// Decodes a tuple frame spanning `data[start..end]`.
///
/// Fixed-size elements are consumed from the right until the dynamic element
/// (if any) is reached, then from the left up to it; the dynamic element
/// receives whatever remains.
fn decode_packed_tuple(
    tuple: &TupleType,
    data: &[u8],
    start: usize,
    mut end: usize,
) -> Result<Vec<Value>> {
    let types: Vec<&Type> = tuple.types().collect();
    let mut values = vec![Value::Absent; types.len()];

    let mut mark = None;
    for i in (0..types.len()).rev() {
        let ty = types[i];
        if ty.is_dynamic() {
            mark = Some(i);
            break;
        }
        let width = static_packed_width(ty)?;
        let elem_start = end.checked_sub(width).filter(|&s| s >= start).ok_or_else(|| {
            Error::invalid_encoding(format!("buffer underflow: {width} bytes needed"))
        })?;
        let (v, _) = decode_packed_value(ty, data, elem_start, end)?;
        values[i] = v;
        end = elem_start;
    }

    if let Some(mark) = mark {
        let mut idx = start;
        for (i, value) in values.iter_mut().enumerate().take(mark + 1) {
            let (v, consumed) = decode_packed_value(types[i], data, idx, end)?;
            *value = v;
            idx += consumed;
        }
    } else if end != start {
        return Err(Error::invalid_encoding(format!(
            "unconsumed bytes: {} remaining",
            end - start
        )));
    }
    Ok(values)
}

fn static_packed_width(ty: &Type) -> Result<usize> {
    ty.packed_width()
        .ok_or_else(|| Error::invalid_encoding(format!("no fixed packed width: {ty}")))
}

fn slice<'a>(data: &'a [u8], start: usize, end: usize) -> Result<&'a [u8]> {
    data.get(start..end).ok_or_else(|| {
        Error::invalid_encoding(format!(
            "buffer underflow: {} bytes remaining, {} needed",
            data.len().saturating_sub(start),
            end.saturating_sub(start)
        ))
    })
}

/// Decodes one packed value at `data[idx..]`, bounded by `end`. Returns the
/// value and the number of bytes consumed.
fn decode_packed_value(
    ty: &Type,
    data: &[u8],
    idx: usize,
    end: usize,
) -> Result<(Value, usize)> {
    match ty {
        Type::Bool => {
            let b = slice(data, idx, idx + 1)?[0];
            Ok((Value::Bool(b != 0), 1))
        }
        Type::Byte => {
            let b = slice(data, idx, idx + 1)?[0];
            Ok((Value::Int(i64::from(b as i8)), 1))
        }
        Type::Int { bits, unsigned } | Type::Long { bits, unsigned } => {
            let w = *bits as usize / 8;
            let v = packed_int(slice(data, idx, idx + w)?, *bits, *unsigned)?;
            Ok((v, w))
        }
        Type::BigInt { bits, unsigned } => {
            let w = *bits as usize / 8;
            let v = packed_big(slice(data, idx, idx + w)?, *unsigned);
            Ok((Value::BigInt(v), w))
        }
        Type::BigDecimal { bits, scale, unsigned } => {
            let w = *bits as usize / 8;
            let unscaled = packed_big(slice(data, idx, idx + w)?, *unsigned);
            Ok((Value::BigDecimal(crate::BigDecimal { unscaled, scale: *scale }), w))
        }
        Type::Address => {
            let bytes = slice(data, idx, idx + 20)?;
            let mut a = [0u8; 20];
            a.copy_from_slice(bytes);
            Ok((Value::Address(crate::Address::new(a)), 20))
        }
        Type::FixedBytes(len) => {
            Ok((Value::FixedBytes(slice(data, idx, idx + len)?.to_vec()), *len))
        }
        Type::Bytes => Ok((Value::Bytes(slice(data, idx, end)?.to_vec()), end - idx)),
        Type::String => {
            let bytes = slice(data, idx, end)?;
            Ok((Value::String(String::from_utf8_lossy(bytes).into_owned()), end - idx))
        }
        Type::Array { elem, len } => {
            let Some(elem_width) = elem.packed_width() else {
                return Err(Error::PackedAmbiguous(format!(
                    "dynamic element in packed array: {elem}"
                )));
            };
            let count = match len {
                Some(len) => *len,
                None => {
                    if elem_width == 0 {
                        return Err(Error::invalid_encoding(
                            "can't decode dynamic number of zero-length elements",
                        ));
                    }
                    let avail = end.checked_sub(idx).ok_or_else(|| {
                        Error::invalid_encoding("buffer underflow: array out of bounds")
                    })?;
                    if avail % elem_width != 0 {
                        return Err(Error::invalid_encoding(format!(
                            "array payload not a multiple of element size: {avail} % {elem_width}"
                        )));
                    }
                    avail / elem_width
                }
            };
            let mut values = Vec::with_capacity(count);
            let mut pos = idx;
            for _ in 0..count {
                let (v, consumed) = decode_packed_value(elem, data, pos, pos + elem_width)?;
                values.push(v);
                pos += consumed;
            }
            Ok((Value::Array(values), pos - idx))
        }
        Type::Tuple(inner) => {
            if inner.is_dynamic() {
                let values = decode_packed_tuple(inner, data, idx, end)?;
                Ok((Value::Tuple(values), end - idx))
            } else {
                let width = static_packed_width(ty)?;
                let frame_end = idx + width;
                if frame_end > end {
                    return Err(Error::invalid_encoding(format!(
                        "buffer underflow: {width} bytes needed"
                    )));
                }
                let values = decode_packed_tuple(inner, data, idx, frame_end)?;
                Ok((Value::Tuple(values), width))
            }
        }
    }
}

fn packed_int(bytes: &[u8], bits: u32, unsigned: bool) -> Result<Value> {
    let v = BigInt::from_signed_bytes_be(bytes);
    let Some(signed) = v.to_i64() else {
        return Err(Error::invalid_encoding("packed integer exceeds 64 bits"));
    };
    if unsigned {
        Ok(Value::Uint(Uint::new(bits).to_unsigned(signed)?))
    } else {
        Ok(Value::Int(signed))
    }
}

fn packed_big(bytes: &[u8], unsigned: bool) -> BigInt {
    if unsigned {
        BigUint::from_bytes_be(bytes).into()
    } else {
        BigInt::from_signed_bytes_be(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn tt(s: &str) -> TupleType {
        TupleType::parse(s).unwrap()
    }

    #[test]
    fn dense_layout() {
        let encoded = tt("(uint40,bool,address,bytes3)")
            .encode_packed(&[
                Value::Uint(0x0102030405),
                Value::Bool(true),
                Value::Address(crate::Address::new([0x11; 20])),
                Value::FixedBytes(b"abc".to_vec()),
            ])
            .unwrap();
        let expected = hex!("010203040501" "1111111111111111111111111111111111111111" "616263");
        assert_eq!(encoded, expected);
    }

    #[test]
    fn integers_keep_declared_width_in_arrays() {
        let encoded = tt("(uint24[3])")
            .encode_packed(&[Value::Array(vec![
                Value::Uint(1),
                Value::Uint(2),
                Value::Uint(3),
            ])])
            .unwrap();
        assert_eq!(encoded, hex!("000001" "000002" "000003"));
    }

    #[test]
    fn negative_widths_sign_extend() {
        let encoded = tt("(int24,int72)")
            .encode_packed(&[Value::Int(-2), Value::BigInt(BigInt::from(-2))])
            .unwrap();
        assert_eq!(encoded, hex!("fffffe" "fffffffffffffffffe"));
    }

    #[test]
    fn raw_payloads() {
        let encoded = tt("(string,uint8)")
            .encode_packed(&[Value::String("dave".to_string()), Value::Uint(7)])
            .unwrap();
        assert_eq!(encoded, hex!("64617665" "07"));
    }

    #[test]
    fn roundtrip_trailing_dynamic() {
        let t = tt("(uint16,bytes)");
        let values = vec![Value::Uint(300), Value::Bytes(vec![1, 2, 3, 4, 5])];
        let encoded = t.encode_packed(&values).unwrap();
        assert_eq!(t.decode_packed(&encoded).unwrap(), values);
    }

    #[test]
    fn roundtrip_middle_dynamic() {
        let t = tt("(uint16,uint8[],address,bool)");
        let values = vec![
            Value::Uint(7),
            Value::Array(vec![Value::Uint(1), Value::Uint(2), Value::Uint(3)]),
            Value::Address(crate::Address::new([0x22; 20])),
            Value::Bool(false),
        ];
        let encoded = t.encode_packed(&values).unwrap();
        assert_eq!(encoded.len(), 2 + 3 + 20 + 1);
        assert_eq!(t.decode_packed(&encoded).unwrap(), values);
    }

    #[test]
    fn roundtrip_static_only() {
        let t = tt("(int24,(bool,uint40),bytes2[2])");
        let values = vec![
            Value::Int(-5),
            Value::Tuple(vec![Value::Bool(true), Value::Uint(77)]),
            Value::Array(vec![
                Value::FixedBytes(vec![1, 2]),
                Value::FixedBytes(vec![3, 4]),
            ]),
        ];
        let encoded = t.encode_packed(&values).unwrap();
        assert_eq!(encoded.len(), 3 + 6 + 4);
        assert_eq!(t.decode_packed(&encoded).unwrap(), values);
    }

    #[test]
    fn roundtrip_nested_dynamic_tuple() {
        let t = tt("(uint8,(uint16,string))");
        let values = vec![
            Value::Uint(1),
            Value::Tuple(vec![Value::Uint(515), Value::String("abcdef".to_string())]),
        ];
        let encoded = t.encode_packed(&values).unwrap();
        assert_eq!(t.decode_packed(&encoded).unwrap(), values);
    }

    #[test]
    fn ambiguous_rejected() {
        let err = tt("(bytes,bytes)").decode_packed(&[0; 4]).unwrap_err();
        assert_eq!(err, Error::PackedAmbiguous("multiple dynamic elements".to_string()));
        let err = tt("(uint8[],string)").decode_packed(&[0; 4]).unwrap_err();
        assert!(matches!(err, Error::PackedAmbiguous(_)));
    }

    #[test]
    fn static_leftover_rejected() {
        let t = tt("(uint16,bool)");
        let err = t.decode_packed(&[0, 1, 1, 9]).unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)), "{err}");
    }

    #[test]
    fn misaligned_dynamic_array_rejected() {
        let t = tt("(uint16[])");
        let err = t.decode_packed(&[0, 1, 2]).unwrap_err();
        assert!(matches!(err, Error::InvalidEncoding(_)), "{err}");
    }
}
