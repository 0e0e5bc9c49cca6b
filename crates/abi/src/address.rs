use crate::{utils::keccak256, Error, Result};
use num_bigint::BigUint;
use std::{fmt, str::FromStr};

/// A 20-byte account address.
///
/// The canonical string form is the EIP-55 mixed-case hex rendering: the
/// case of each hex digit encodes one bit of the Keccak-256 hash of the
/// lowercase rendering, which makes the string self-checking.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// Width in bytes.
    pub const LEN: usize = 20;

    /// Wraps raw address bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// The raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Builds an address from its 160-bit unsigned integer value.
    pub fn from_biguint(value: &BigUint) -> Result<Self> {
        if value.bits() > 160 {
            return Err(Error::InvalidRange(format!("invalid bit length: {}", value.bits())));
        }
        let be = value.to_bytes_be();
        let mut bytes = [0u8; 20];
        bytes[20 - be.len()..].copy_from_slice(&be);
        Ok(Self(bytes))
    }

    /// The 160-bit unsigned integer value.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Renders the EIP-55 checksummed string, `0x`-prefixed.
    pub fn checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.bytes().enumerate() {
            let nibble = (hash[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
            out.push(if nibble >= 8 { c.to_ascii_uppercase() as char } else { c as char });
        }
        out
    }

    /// Parses a 42-character `0x`-prefixed address string, verifying the
    /// EIP-55 checksum byte for byte.
    pub fn parse(s: &str) -> Result<Self> {
        let Some(body) = s.strip_prefix("0x") else {
            return Err(Error::invalid_value("expected prefix 0x not found"));
        };
        if s.len() != 42 {
            return Err(Error::invalid_value(format!(
                "expected address length: 42; actual: {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(body, &mut bytes).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, index } => Error::invalid_hex(index + 2, c),
            other => Error::InvalidHex(other.to_string()),
        })?;
        let address = Self(bytes);
        if address.checksum() != s {
            return Err(Error::ChecksumMismatch("invalid checksum".to_string()));
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address").field(&self.checksum()).finish()
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
