//! Standard head/tail encoder.
//!
//! Encoding is a two-pass walk: heads first (static values in place, 32-byte
//! offset words for dynamic elements), then the dynamic tails in order. A
//! suffix-offset stack tracks where the next tail will land relative to the
//! current frame. Buffers are pre-sized from `validate`, which the public
//! entry points run first; the encoding walk itself is infallible.

use crate::{utils::padded_len, validate::byte_len, Result, TupleType, Type, Value};
use num_bigint::{BigInt, Sign};

pub(crate) type Word = [u8; 32];

pub(crate) struct Encoder {
    buf: Vec<u8>,
    suffix_offset: Vec<usize>,
}

impl Encoder {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        Self { buf: Vec::with_capacity(bytes), suffix_offset: Vec::new() }
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn append_word(&mut self, word: Word) {
        self.buf.extend_from_slice(&word);
    }

    fn append_usize(&mut self, n: usize) {
        self.append_word(word_u64(n as u64));
    }

    /// Writes the current suffix offset as a 32-byte pointer word.
    fn append_indirection(&mut self) {
        let offset = self.suffix_offset.last().copied().unwrap_or(0);
        self.append_usize(offset);
    }

    fn append_seq_len(&mut self, len: usize) {
        self.append_usize(len);
    }

    /// Appends a length-prefixed byte sequence, zero-padded to a word.
    fn append_packed_seq(&mut self, bytes: &[u8]) {
        self.append_seq_len(bytes.len());
        self.append_padded(bytes);
    }

    fn append_padded(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        let target = self.buf.len() + padded_len(bytes.len()) - bytes.len();
        self.buf.resize(target, 0);
    }

    fn push_offset(&mut self, bytes: usize) {
        self.suffix_offset.push(bytes);
    }

    fn bump_offset(&mut self, bytes: usize) {
        if let Some(last) = self.suffix_offset.last_mut() {
            *last += bytes;
        }
    }

    fn pop_offset(&mut self) {
        self.suffix_offset.pop();
    }
}

pub(crate) fn word_i64(v: i64) -> Word {
    let mut w = if v < 0 { [0xff; 32] } else { [0; 32] };
    w[24..].copy_from_slice(&v.to_be_bytes());
    w
}

pub(crate) fn word_u64(v: u64) -> Word {
    let mut w = [0; 32];
    w[24..].copy_from_slice(&v.to_be_bytes());
    w
}

pub(crate) fn word_big(v: &BigInt) -> Word {
    if v.sign() == Sign::Minus {
        let bytes = v.to_signed_bytes_be();
        let mut w = [0xff; 32];
        w[32 - bytes.len()..].copy_from_slice(&bytes);
        w
    } else {
        let bytes = v.magnitude().to_bytes_be();
        let mut w = [0; 32];
        w[32 - bytes.len()..].copy_from_slice(&bytes);
        w
    }
}

/// Encodes a sequence of typed values as a head/tail frame.
pub(crate) fn encode_seq<'a, I>(types: I, values: &[Value], enc: &mut Encoder)
where
    I: Iterator<Item = &'a Type> + Clone,
{
    let head: usize = types.clone().map(Type::static_byte_len).sum();
    enc.push_offset(head);
    for (ty, v) in types.clone().zip(values) {
        if ty.is_dynamic() {
            enc.append_indirection();
            enc.bump_offset(byte_len(ty, v));
        } else {
            encode_tail(ty, v, enc);
        }
    }
    for (ty, v) in types.zip(values) {
        if ty.is_dynamic() {
            encode_tail(ty, v, enc);
        }
    }
    enc.pop_offset();
}

/// Writes the full encoding of a single value (for dynamic types, the tail).
pub(crate) fn encode_tail(ty: &Type, value: &Value, enc: &mut Encoder) {
    match (ty, value) {
        (Type::Bool, Value::Bool(b)) => enc.append_word(word_u64(u64::from(*b))),
        (Type::Byte, Value::Int(v))
        | (Type::Int { unsigned: false, .. }, Value::Int(v))
        | (Type::Long { unsigned: false, .. }, Value::Int(v)) => enc.append_word(word_i64(*v)),
        (Type::Int { unsigned: true, .. }, Value::Uint(v))
        | (Type::Long { unsigned: true, .. }, Value::Uint(v)) => enc.append_word(word_u64(*v)),
        (Type::BigInt { .. }, Value::BigInt(v)) => enc.append_word(word_big(v)),
        (Type::BigDecimal { .. }, Value::BigDecimal(dec)) => {
            enc.append_word(word_big(&dec.unscaled));
        }
        (Type::Address, Value::Address(a)) => {
            let mut w = [0; 32];
            w[12..].copy_from_slice(a.as_bytes());
            enc.append_word(w);
        }
        (Type::FixedBytes(_), Value::FixedBytes(bytes)) => {
            let mut w = [0; 32];
            w[..bytes.len()].copy_from_slice(bytes);
            enc.append_word(w);
        }
        (Type::Bytes, Value::Bytes(bytes)) => enc.append_packed_seq(bytes),
        (Type::String, Value::String(s)) => enc.append_packed_seq(s.as_bytes()),
        (Type::Array { elem, len }, Value::Array(values)) => {
            if len.is_none() {
                enc.append_seq_len(values.len());
            }
            encode_seq(std::iter::repeat(elem.as_ref()).take(values.len()), values, enc);
        }
        (Type::Tuple(tuple), Value::Tuple(values)) => encode_seq(tuple.types(), values, enc),
        _ => unreachable!("value was not validated against this type"),
    }
}

impl TupleType {
    /// Validates and ABI-encodes `values` as function parameters.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>> {
        let size = self.validate(values)?;
        let mut enc = Encoder::with_capacity(size);
        encode_seq(self.types(), values, &mut enc);
        Ok(enc.into_bytes())
    }
}

impl Type {
    /// Validates and ABI-encodes a single value.
    ///
    /// Dynamic values are written without a leading offset word: `bytes`
    /// encodes as its length plus padded payload.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let size = self.validate(value)?;
        let mut enc = Encoder::with_capacity(size);
        encode_tail(self, value, &mut enc);
        Ok(enc.into_bytes())
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
    fn static_pair() {
        let encoded = tt("(uint32,bool)")
            .encode(&[Value::Uint(69), Value::Bool(true)])
            .unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000045"
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn negative_int_sign_extends() {
        let encoded = tt("(int8,int256)")
            .encode(&[Value::Int(-1), Value::BigInt(crate::BigInt::from(-2))])
            .unwrap();
        let expected = hex!(
            "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
            "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffe"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn uint256_max() {
        let max = (crate::BigInt::from(1u8) << 256) - 1;
        let encoded = tt("(uint256)").encode(&[Value::BigInt(max)]).unwrap();
        assert_eq!(encoded, [0xff; 32]);
    }

    #[test]
    fn dynamic_tail_layout() {
        // sam(bytes,bool,uint256[]) body from the Solidity ABI examples
        let encoded = tt("(bytes,bool,uint256[])")
            .encode(&[
                Value::Bytes(b"dave".to_vec()),
                Value::Bool(true),
                Value::Array(vec![
                    Value::BigInt(1.into()),
                    Value::BigInt(2.into()),
                    Value::BigInt(3.into()),
                ]),
            ])
            .unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000060"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "00000000000000000000000000000000000000000000000000000000000000a0"
            "0000000000000000000000000000000000000000000000000000000000000004"
            "6461766500000000000000000000000000000000000000000000000000000000"
            "0000000000000000000000000000000000000000000000000000000000000003"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000002"
            "0000000000000000000000000000000000000000000000000000000000000003"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn fixed_bytes_right_pad() {
        let encoded = tt("(bytes3[2])")
            .encode(&[Value::Array(vec![
                Value::FixedBytes(b"abc".to_vec()),
                Value::FixedBytes(b"def".to_vec()),
            ])])
            .unwrap();
        let expected = hex!(
            "6162630000000000000000000000000000000000000000000000000000000000"
            "6465660000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn nested_dynamic_offsets_are_frame_relative() {
        let encoded = tt("(uint8[][])")
            .encode(&[Value::Array(vec![
                Value::Array(vec![Value::Uint(1)]),
                Value::Array(vec![Value::Uint(2)]),
            ])])
            .unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000002"
            "0000000000000000000000000000000000000000000000000000000000000040"
            "0000000000000000000000000000000000000000000000000000000000000080"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000001"
            "0000000000000000000000000000000000000000000000000000000000000002"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn empty_dynamic_array() {
        let encoded = tt("(uint8[])").encode(&[Value::Array(vec![])]).unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000020"
            "0000000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(encoded, expected);
    }

    #[test]
    fn single_dynamic_value() {
        let encoded = Type::Bytes.encode(&Value::Bytes(vec![0x12, 0x34])).unwrap();
        let expected = hex!(
            "0000000000000000000000000000000000000000000000000000000000000002"
            "1234000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(encoded, expected);
    }
}
