use std::fmt;

/// Result alias with the crate error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// ABI error, one variant per failure class.
///
/// Every variant carries a pre-rendered message; the constructors below build
/// the payloads. Validation errors accumulate an index path as they bubble out
/// of nested tuples and arrays, e.g. `tuple index 2: array index 0: <cause>`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed type descriptor or canonical signature.
    #[error("{0}")]
    Parse(String),
    /// Number out of the signed/unsigned range of its declared bit width.
    #[error("{0}")]
    InvalidRange(String),
    /// Class mismatch, arity mismatch, scale mismatch, or length mismatch.
    #[error("{0}")]
    InvalidValue(String),
    /// Structurally invalid standard encoding.
    #[error("{0}")]
    InvalidEncoding(String),
    /// Packed decoding attempted on a schema with several dynamic elements.
    #[error("{0}")]
    PackedAmbiguous(String),
    /// EIP-55 checksum verification failure.
    #[error("{0}")]
    ChecksumMismatch(String),
    /// Non-hex character in a hex string.
    #[error("{0}")]
    InvalidHex(String),
}

impl Error {
    pub(crate) fn parse(offset: usize, cause: impl fmt::Display) -> Self {
        Self::Parse(format!("parse error at offset {offset}: {cause}"))
    }

    pub(crate) fn bit_limit(actual: usize, limit: usize) -> Self {
        Self::InvalidRange(format!("exceeds bit limit: {actual} > {limit}"))
    }

    pub(crate) fn negative_unsigned() -> Self {
        Self::InvalidRange("signed value given for unsigned type".to_string())
    }

    pub(crate) fn invalid_value(cause: impl fmt::Display) -> Self {
        Self::InvalidValue(cause.to_string())
    }

    pub(crate) fn invalid_encoding(cause: impl fmt::Display) -> Self {
        Self::InvalidEncoding(cause.to_string())
    }

    pub(crate) fn invalid_hex(offset: usize, c: char) -> Self {
        Self::InvalidHex(format!("non-hex character '{c}' at offset {offset}"))
    }

    /// Prefixes `tuple index i: ` onto the message, preserving the kind.
    pub(crate) fn at_tuple_index(self, i: usize) -> Self {
        self.prefixed(format_args!("tuple index {i}"))
    }

    /// Prefixes `array index i: ` onto the message, preserving the kind.
    pub(crate) fn at_array_index(self, i: usize) -> Self {
        self.prefixed(format_args!("array index {i}"))
    }

    fn prefixed(self, prefix: fmt::Arguments<'_>) -> Self {
        let wrap = |m: String| format!("{prefix}: {m}");
        match self {
            Self::Parse(m) => Self::Parse(wrap(m)),
            Self::InvalidRange(m) => Self::InvalidRange(wrap(m)),
            Self::InvalidValue(m) => Self::InvalidValue(wrap(m)),
            Self::InvalidEncoding(m) => Self::InvalidEncoding(wrap(m)),
            Self::PackedAmbiguous(m) => Self::PackedAmbiguous(wrap(m)),
            Self::ChecksumMismatch(m) => Self::ChecksumMismatch(wrap(m)),
            Self::InvalidHex(m) => Self::InvalidHex(wrap(m)),
        }
    }

    /// Re-kinds a range violation detected while reading encoded bytes.
    ///
    /// Out-of-range words inside an encoding are a property of the byte
    /// stream, not of a caller-supplied value.
    pub(crate) fn into_encoding(self) -> Self {
        match self {
            Self::InvalidRange(m) | Self::InvalidValue(m) => Self::InvalidEncoding(m),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_path_keeps_kind() {
        let e = Error::bit_limit(9, 8).at_array_index(3).at_tuple_index(2);
        assert!(matches!(e, Error::InvalidRange(_)));
        assert_eq!(e.to_string(), "tuple index 2: array index 3: exceeds bit limit: 9 > 8");
    }
}
