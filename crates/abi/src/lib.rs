//! Ethereum contract ABI type system and codecs.
//!
//! The crate models the contract ABI type grammar as an immutable tree
//! ([`Type`], [`TupleType`]), validates caller-supplied [`Value`]s against it,
//! and implements the two canonical byte encodings plus the non-standard
//! packed encoding:
//!
//! - the standard 32-byte-word head/tail encoding with offset pointers,
//! - the packed encoding used for signing digests,
//! - the EIP-55 mixed-case [`Address`] string codec.
//!
//! Schemas can be built from canonical type descriptors or from Solidity ABI
//! JSON fragments, and expose canonical signatures and 4-byte selectors.
//!
//! # Examples
//!
//! ```
//! use solabi::{Function, Value};
//!
//! let f = Function::parse("baz(uint32,bool)")?;
//! assert_eq!(f.selector(), [0xcd, 0xcd, 0x77, 0xc0]);
//!
//! let call = f.encode_call(&[Value::Uint(69), Value::Bool(true)])?;
//! assert_eq!(call.len(), 4 + 64);
//! assert_eq!(f.decode_call(&call)?, vec![Value::Uint(69), Value::Bool(true)]);
//! # Ok::<(), solabi::Error>(())
//! ```

mod error;
pub use error::{Error, Result};

mod uint;
pub use uint::Uint;

mod ty;
pub use ty::{Field, TupleType, Type};

mod parse;

mod value;
pub use value::{BigDecimal, Value};

mod validate;

mod encode;
mod decode;
mod packed;

mod address;
pub use address::Address;

mod function;
pub use function::{ContractError, Event, Function, FunctionKind};

mod json;
pub use json::{parse_abi, AbiObject};

pub mod utils;

pub use num_bigint::{BigInt, BigUint};
pub use solabi_json_abi as json_abi;

/// The 32-byte word granularity of the standard encoding.
pub const UNIT_LEN: usize = 32;
