//! Standard head/tail decoder.
//!
//! The decoder walks a frame's heads first, collecting offset words for the
//! dynamic elements, then revisits the dynamic elements in order. Offsets are
//! interpreted relative to the frame start. Forward jumps past padding are
//! tolerated (lenient mode); backwards jumps and offsets below one unit are
//! rejected. All buffer reads are bounds-checked and surface as
//! [`Error::InvalidEncoding`]; numeric words are re-validated against their
//! type's range on read.

use crate::{
    utils::padded_len,
    validate::check_big,
    BigDecimal, Error, Result, TupleType, Type, Value, UNIT_LEN,
};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub(crate) struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::invalid_encoding(format!(
                "buffer underflow: position {pos} exceeds length {}",
                self.data.len()
            )));
        }
        self.pos = pos;
        Ok(())
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.data.len()).ok_or_else(
            || {
                Error::invalid_encoding(format!(
                    "buffer underflow: {} bytes remaining, {n} needed",
                    self.data.len() - self.pos
                ))
            },
        )?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_word(&mut self) -> Result<&'a [u8]> {
        self.read_bytes(UNIT_LEN)
    }

    /// Reads a 32-byte word holding an unsigned integer that must fit in 31
    /// bits, the representation used for offsets and sequence lengths.
    fn read_u31(&mut self) -> Result<usize> {
        let word = self.read_word()?;
        if word[..28].iter().any(|&b| b != 0) || word[28] & 0x80 != 0 {
            return Err(Error::invalid_encoding("unsigned value exceeds 31 bits"));
        }
        let mut tail = [0u8; 4];
        tail.copy_from_slice(&word[28..]);
        Ok(u32::from_be_bytes(tail) as usize)
    }
}

/// Decodes one value of type `ty` at the decoder's current position.
pub(crate) fn decode_value(ty: &Type, d: &mut Decoder<'_>) -> Result<Value> {
    match ty {
        Type::Bool => {
            let word = d.read_word()?;
            if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
                return Err(Error::invalid_encoding("exceeds bit limit: boolean word not 0 or 1"));
            }
            Ok(Value::Bool(word[31] == 1))
        }
        Type::Byte => decode_signed_word(d, 8),
        Type::Int { bits, unsigned } | Type::Long { bits, unsigned } => {
            if *unsigned {
                decode_unsigned_word(d, *bits)
            } else {
                decode_signed_word(d, *bits)
            }
        }
        Type::BigInt { bits, unsigned } => {
            let v = read_big(d, *bits, *unsigned)?;
            Ok(Value::BigInt(v))
        }
        Type::BigDecimal { bits, scale, unsigned } => {
            let unscaled = read_big(d, *bits, *unsigned)?;
            Ok(Value::BigDecimal(BigDecimal { unscaled, scale: *scale }))
        }
        Type::Address => {
            let word = d.read_word()?;
            if word[..12].iter().any(|&b| b != 0) {
                return Err(Error::invalid_encoding("exceeds bit limit: address wider than 160 bits"));
            }
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(&word[12..]);
            Ok(Value::Address(crate::Address::new(bytes)))
        }
        Type::FixedBytes(len) => {
            let word = d.read_word()?;
            Ok(Value::FixedBytes(word[..*len].to_vec()))
        }
        Type::Bytes => Ok(Value::Bytes(read_packed_seq(d)?.to_vec())),
        Type::String => {
            let bytes = read_packed_seq(d)?;
            Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
        }
        Type::Array { elem, len } => {
            let n = match len {
                Some(n) => *n,
                None => d.read_u31()?,
            };
            let values = decode_seq(d, std::iter::repeat(elem.as_ref()).take(n))?;
            Ok(Value::Array(values))
        }
        Type::Tuple(tuple) => Ok(Value::Tuple(decode_seq(d, tuple.types())?)),
    }
}

fn decode_signed_word(d: &mut Decoder<'_>, bits: u32) -> Result<Value> {
    let v = read_big(d, bits, false)?;
    match v.to_i64() {
        Some(x) => Ok(Value::Int(x)),
        None => Err(Error::invalid_encoding("signed word exceeds 64 bits")),
    }
}

fn decode_unsigned_word(d: &mut Decoder<'_>, bits: u32) -> Result<Value> {
    let v = read_big(d, bits, true)?;
    match v.to_u64() {
        Some(x) => Ok(Value::Uint(x)),
        None => Err(Error::invalid_encoding("unsigned word exceeds 64 bits")),
    }
}

/// Reads a 32-byte two's-complement word and re-validates it against the
/// declared width and signedness.
fn read_big(d: &mut Decoder<'_>, bits: u32, unsigned: bool) -> Result<BigInt> {
    let word = d.read_word()?;
    let v = BigInt::from_signed_bytes_be(word);
    check_big(&v, bits, unsigned).map_err(Error::into_encoding)?;
    Ok(v)
}

/// Reads a length-prefixed byte sequence and consumes its zero padding.
fn read_packed_seq<'a>(d: &mut Decoder<'a>) -> Result<&'a [u8]> {
    let len = d.read_u31()?;
    let bytes = d.read_bytes(len)?;
    d.read_bytes(padded_len(len) - len)?;
    Ok(bytes)
}

enum Slot {
    Done(Value),
    Offset(usize),
}

/// Decodes a head/tail frame of the given element types.
pub(crate) fn decode_seq<'a, I>(d: &mut Decoder<'_>, types: I) -> Result<Vec<Value>>
where
    I: Iterator<Item = &'a Type> + Clone,
{
    let start = d.position();
    let mut slots = Vec::new();
    for ty in types.clone() {
        if ty.is_dynamic() {
            slots.push(Slot::Offset(d.read_u31()?));
        } else {
            slots.push(Slot::Done(decode_value(ty, d)?));
        }
    }
    let mut values = Vec::with_capacity(slots.len());
    for (ty, slot) in types.zip(slots) {
        match slot {
            Slot::Done(v) => values.push(v),
            Slot::Offset(offset) => {
                if offset < UNIT_LEN {
                    return Err(Error::invalid_encoding("offset less than 0x20"));
                }
                let jump = start.checked_add(offset).ok_or_else(|| {
                    Error::invalid_encoding("offset overflows buffer position")
                })?;
                let pos = d.position();
                if jump < pos {
                    return Err(Error::invalid_encoding(format!(
                        "illegal backwards jump: ({start}+{offset}={jump})<{pos}"
                    )));
                }
                if jump != pos {
                    // lenient mode: forward jumps over padding are tolerated
                    d.set_position(jump)?;
                }
                values.push(decode_value(ty, d)?);
            }
        }
    }
    Ok(values)
}

impl TupleType {
    /// Decodes a full standard encoding of this tuple.
    ///
    /// The input must be exactly consumed: trailing bytes past the decoded
    /// region are rejected.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Value>> {
        let mut d = Decoder::new(data);
        let values = decode_seq(&mut d, self.types())?;
        let remaining = data.len() - d.position();
        if remaining != 0 {
            return Err(Error::invalid_encoding(format!(
                "unconsumed bytes: {remaining} remaining"
            )));
        }
        Ok(values)
    }

    /// Decodes only the element at `index`, skipping the rest of the frame.
    pub fn decode_index(&self, data: &[u8], index: usize) -> Result<Value> {
        let Some(ty) = self.get(index) else {
            return Err(Error::invalid_value(format!("bad index: {index}")));
        };
        let mut d = Decoder::new(data);
        let head: usize = self.types().take(index).map(Type::static_byte_len).sum();
        d.set_position(head)?;
        if ty.is_dynamic() {
            let offset = d.read_u31()?;
            d.set_position(offset)?;
        }
        decode_value(ty, &mut d)
    }

    /// Decodes only the elements at the given indices, which must be strictly
    /// increasing. Positions not selected hold [`Value::Absent`].
    pub fn decode_indices(&self, data: &[u8], indices: &[usize]) -> Result<Vec<Value>> {
        debug_assert!(
            indices.windows(2).all(|w| w[0] < w[1]),
            "indices must be strictly increasing"
        );
        let mut values = vec![Value::Absent; self.size()];
        for &index in indices {
            values[index] = self.decode_index(data, index)?;
        }
        Ok(values)
    }
}

impl Type {
    /// Decodes a full standard encoding of a single value of this type.
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        let mut d = Decoder::new(data);
        let value = decode_value(self, &mut d)?;
        let remaining = data.len() - d.position();
        if remaining != 0 {
            return Err(Error::invalid_encoding(format!(
                "unconsumed bytes: {remaining} remaining"
            )));
        }
        Ok(value)
    }
}
