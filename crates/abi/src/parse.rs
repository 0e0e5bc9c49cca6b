//! Canonical type-descriptor parser.
//!
//! Descriptors follow the grammar of the contract ABI specification, with the
//! usual aliases (`uint` for `uint256`, `fixed` for `fixed128x18`). Base
//! types are interned in a process-wide table keyed by canonical name; parsed
//! nodes for those names are clones of the table singletons.

use crate::{Error, Result, TupleType, Type};
use once_cell::sync::Lazy;
use std::{collections::HashMap, str::FromStr};

/// Longest accepted descriptor, in bytes.
const MAX_LEN: usize = 8192;
/// Deepest accepted tuple nesting.
const MAX_DEPTH: usize = 64;

fn int_type(bits: u32, unsigned: bool) -> Type {
    match bits {
        1..=32 => Type::Int { bits, unsigned },
        33..=64 => Type::Long { bits, unsigned },
        _ => Type::BigInt { bits, unsigned },
    }
}

static BASE_TYPES: Lazy<HashMap<String, Type>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("bool".to_string(), Type::Bool);
    table.insert("address".to_string(), Type::Address);
    table.insert("bytes".to_string(), Type::Bytes);
    table.insert("string".to_string(), Type::String);
    for bits in (8..=256).step_by(8) {
        table.insert(format!("int{bits}"), int_type(bits as u32, false));
        table.insert(format!("uint{bits}"), int_type(bits as u32, true));
    }
    for len in 1..=32 {
        table.insert(format!("bytes{len}"), Type::FixedBytes(len));
    }
    // aliases record their expanded canonical form
    table.insert("int".to_string(), Type::BigInt { bits: 256, unsigned: false });
    table.insert("uint".to_string(), Type::BigInt { bits: 256, unsigned: true });
    for (name, unsigned) in [("fixed", false), ("ufixed", true)] {
        let ty = Type::BigDecimal { bits: 128, scale: 18, unsigned };
        table.insert(name.to_string(), ty.clone());
        table.insert(format!("{name}128x18"), ty);
    }
    table
});

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self> {
        if src.len() > MAX_LEN {
            return Err(Error::parse(0, format!("type string exceeds {MAX_LEN} bytes")));
        }
        Ok(Self { src, pos: 0 })
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn parse_type(&mut self, depth: usize) -> Result<Type> {
        let base = if self.peek() == Some(b'(') {
            self.parse_tuple(depth)?
        } else {
            self.parse_base()?
        };
        self.parse_suffixes(base)
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<Type> {
        if depth >= MAX_DEPTH {
            return Err(Error::parse(self.pos, format!("exceeds nesting limit: {MAX_DEPTH}")));
        }
        self.bump(); // '('
        let mut elements = Vec::new();
        if self.peek() == Some(b')') {
            self.bump();
            return Ok(Type::Tuple(TupleType::empty()));
        }
        loop {
            elements.push(self.parse_type(depth + 1)?);
            match self.peek() {
                Some(b',') => self.bump(),
                Some(b')') => {
                    self.bump();
                    return Ok(Type::tuple(elements));
                }
                _ => return Err(Error::parse(self.pos, "expected ',' or ')'")),
            }
        }
    }

    fn parse_base(&mut self) -> Result<Type> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.bump();
        }
        let token = &self.src[start..self.pos];
        if token.is_empty() {
            return Err(Error::parse(start, "expected a type"));
        }
        if let Some(ty) = BASE_TYPES.get(token) {
            return Ok(ty.clone());
        }
        self.resolve_sized(token, start)
    }

    /// Resolves a base token that missed the interning table: a sized
    /// primitive with a size outside the table, or garbage.
    fn resolve_sized(&self, token: &str, start: usize) -> Result<Type> {
        if let Some(size) = token.strip_prefix("uint") {
            let bits = parse_size(size, start + 4)?;
            return int_width(bits, true, token, start);
        }
        if let Some(size) = token.strip_prefix("int") {
            let bits = parse_size(size, start + 3)?;
            return int_width(bits, false, token, start);
        }
        if let Some(size) = token.strip_prefix("bytes") {
            let len = parse_size(size, start + 5)?;
            if (1..=32).contains(&len) {
                return Ok(Type::FixedBytes(len as usize));
            }
            return Err(Error::parse(start, format!("unrecognized type: \"{token}\"")));
        }
        for (prefix, unsigned) in [("ufixed", true), ("fixed", false)] {
            if let Some(size) = token.strip_prefix(prefix) {
                return fixed_width(size, unsigned, token, start + prefix.len());
            }
        }
        Err(Error::parse(start, format!("unrecognized type: \"{token}\"")))
    }

    fn parse_suffixes(&mut self, base: Type) -> Result<Type> {
        let mut ty = base;
        while self.peek() == Some(b'[') {
            self.bump();
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            let digits = &self.src[start..self.pos];
            if self.peek() != Some(b']') {
                return Err(Error::parse(self.pos, "expected ']'"));
            }
            self.bump();
            let len = if digits.is_empty() {
                None
            } else {
                Some(parse_size(digits, start)? as usize)
            };
            ty = Type::array_of(ty, len);
        }
        Ok(ty)
    }
}

/// Parses a decimal size: non-empty, digits only, no leading zero (a lone
/// zero is passed through for the caller's range check to reject).
fn parse_size(digits: &str, offset: usize) -> Result<u32> {
    if digits.is_empty() || !digits.bytes().all(|c| c.is_ascii_digit()) {
        return Err(Error::parse(offset, format!("invalid size: \"{digits}\"")));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(Error::parse(offset, format!("leading zero in size: \"{digits}\"")));
    }
    digits
        .parse::<u32>()
        .map_err(|_| Error::parse(offset, format!("size out of range: \"{digits}\"")))
}

fn int_width(bits: u32, unsigned: bool, token: &str, start: usize) -> Result<Type> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(Error::parse(start, format!("unrecognized type: \"{token}\"")));
    }
    Ok(int_type(bits, unsigned))
}

fn fixed_width(size: &str, unsigned: bool, token: &str, offset: usize) -> Result<Type> {
    let Some((m, n)) = size.split_once('x') else {
        return Err(Error::parse(offset, format!("unrecognized type: \"{token}\"")));
    };
    let bits = parse_size(m, offset)?;
    let scale = parse_size(n, offset + m.len() + 1)?;
    if bits == 0 || bits > 256 || bits % 8 != 0 || scale > 80 {
        return Err(Error::parse(offset, format!("unrecognized type: \"{token}\"")));
    }
    Ok(Type::BigDecimal { bits, scale, unsigned })
}

pub(crate) fn parse_type_str(s: &str) -> Result<Type> {
    let mut parser = Parser::new(s)?;
    let ty = parser.parse_type(0)?;
    if parser.pos != s.len() {
        return Err(Error::parse(parser.pos, "unexpected trailing characters"));
    }
    Ok(ty)
}

/// Applies a textual array suffix such as `"[4][]"` to an already-built base
/// type. Used for JSON `tuple[…]` parameters.
pub(crate) fn apply_suffix(base: Type, suffix: &str) -> Result<Type> {
    let mut parser = Parser::new(suffix)?;
    let ty = parser.parse_suffixes(base)?;
    if parser.pos != suffix.len() {
        return Err(Error::parse(parser.pos, "unexpected trailing characters"));
    }
    Ok(ty)
}

impl Type {
    /// Parses a canonical type descriptor, e.g. `(uint256,bytes,int8[3])`.
    pub fn parse(s: &str) -> Result<Self> {
        parse_type_str(s)
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TupleType {
    /// Parses a tuple descriptor such as `(uint256,bool)`.
    ///
    /// The descriptor must denote a tuple, not an array of tuples.
    pub fn parse(s: &str) -> Result<Self> {
        match Type::parse(s)? {
            Type::Tuple(tuple) => Ok(tuple),
            other => Err(Error::Parse(format!("not a tuple type: \"{other}\""))),
        }
    }

    /// Builds a tuple type from individual element descriptors.
    pub fn of(types: &[&str]) -> Result<Self> {
        types.iter().map(|s| Type::parse(s)).collect()
    }
}

impl FromStr for TupleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
