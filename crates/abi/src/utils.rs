//! Shared helpers: Keccak-256 and word arithmetic.

use tiny_keccak::{Hasher, Keccak};

/// Computes the Keccak-256 digest of `bytes`.
///
/// A fresh hasher is created per call; the function is safe to use from any
/// thread.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut out);
    out
}

/// Number of 32-byte words needed to hold `len` bytes.
pub(crate) const fn words_for_len(len: usize) -> usize {
    len.div_ceil(32)
}

/// `len` rounded up to the next 32-byte boundary.
pub(crate) const fn padded_len(len: usize) -> usize {
    words_for_len(len) * 32
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn keccak_empty() {
        assert_eq!(
            keccak256([]),
            hex!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn padding() {
        assert_eq!(padded_len(0), 0);
        assert_eq!(padded_len(1), 32);
        assert_eq!(padded_len(32), 32);
        assert_eq!(padded_len(33), 64);
    }
}
