use crate::{utils::keccak256, Error, Result, TupleType, Value};
use std::fmt;

/// The variant of a function fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    /// An ordinary named function.
    Function,
    /// The contract constructor.
    Constructor,
    /// The unnamed fallback function.
    Fallback,
    /// The ether-receive function.
    Receive,
}

impl FunctionKind {
    /// The JSON `type` string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Constructor => "constructor",
            Self::Fallback => "fallback",
            Self::Receive => "receive",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks the ABI name charset: printable ASCII excluding `(`.
fn check_name(name: &str) -> Result<()> {
    for (i, b) in name.bytes().enumerate() {
        if !(0x20..=0x7e).contains(&b) || b == b'(' {
            return Err(Error::Parse(format!("illegal character in name at index {i}")));
        }
    }
    Ok(())
}

/// A function schema: kind, optional name, input and output tuples, and an
/// optional state-mutability string.
///
/// The selector of a named function is the first four bytes of the
/// Keccak-256 hash of its canonical signature.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    kind: FunctionKind,
    name: Option<String>,
    inputs: TupleType,
    outputs: TupleType,
    state_mutability: Option<String>,
}

impl Function {
    /// Builds a function schema, enforcing the per-kind shape rules.
    pub fn new(
        kind: FunctionKind,
        name: Option<String>,
        inputs: TupleType,
        outputs: TupleType,
        state_mutability: Option<String>,
    ) -> Result<Self> {
        match kind {
            FunctionKind::Function => {
                let Some(name) = &name else {
                    return Err(Error::invalid_value(
                        "type is \"function\"; functions of this type must define name",
                    ));
                };
                check_name(name)?;
            }
            FunctionKind::Constructor | FunctionKind::Fallback => {
                if name.is_some() {
                    return Err(Error::invalid_value(format!(
                        "type is \"{kind}\"; functions of this type must not define name"
                    )));
                }
                if !outputs.is_empty() {
                    return Err(Error::invalid_value(format!(
                        "type is \"{kind}\"; functions of this type must define no outputs"
                    )));
                }
            }
            FunctionKind::Receive => {
                if let Some(name) = &name {
                    check_name(name)?;
                }
                if !inputs.is_empty() {
                    return Err(Error::invalid_value(
                        "type is \"receive\"; functions of this type must define no inputs",
                    ));
                }
                if !outputs.is_empty() {
                    return Err(Error::invalid_value(
                        "type is \"receive\"; functions of this type must define no outputs",
                    ));
                }
                if state_mutability.as_deref() != Some("payable") {
                    return Err(Error::invalid_value(
                        "type is \"receive\"; functions of this type must define stateMutability as \"payable\"",
                    ));
                }
            }
        }
        Ok(Self { kind, name, inputs, outputs, state_mutability })
    }

    /// Parses an ordinary function from its canonical signature, e.g.
    /// `baz(uint32,bool)`. The resulting schema has no outputs.
    pub fn parse(signature: &str) -> Result<Self> {
        let Some(split) = signature.find('(') else {
            return Err(Error::parse(signature.len(), "expected '('"));
        };
        let name = &signature[..split];
        let inputs = TupleType::parse(&signature[split..])?;
        Self::new(
            FunctionKind::Function,
            Some(name.to_string()),
            inputs,
            TupleType::empty(),
            None,
        )
    }

    /// The fragment kind.
    pub fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// The function name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The input tuple.
    pub fn inputs(&self) -> &TupleType {
        &self.inputs
    }

    /// The output tuple.
    pub fn outputs(&self) -> &TupleType {
        &self.outputs
    }

    /// The declared state mutability, if any.
    pub fn state_mutability(&self) -> Option<&str> {
        self.state_mutability.as_deref()
    }

    /// The canonical signature: name followed by the canonical input tuple,
    /// with no whitespace.
    pub fn signature(&self) -> String {
        let mut out = self.name.clone().unwrap_or_default();
        self.inputs.write_canonical(&mut out);
        out
    }

    /// The 4-byte selector: the leading bytes of the Keccak-256 hash of the
    /// canonical signature. Only meaningful for named functions.
    pub fn selector(&self) -> [u8; 4] {
        let digest = keccak256(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// The selector as lowercase hex.
    pub fn selector_hex(&self) -> String {
        hex::encode(self.selector())
    }

    /// Encodes a call: selector followed by the encoded input tuple.
    pub fn encode_call(&self, values: &[Value]) -> Result<Vec<u8>> {
        let body = self.inputs.encode(values)?;
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&self.selector());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes a call produced by [`encode_call`](Self::encode_call),
    /// checking the selector.
    pub fn decode_call(&self, data: &[u8]) -> Result<Vec<Value>> {
        let selector = self.selector();
        let Some(body) = data.strip_prefix(selector.as_slice()) else {
            return Err(Error::invalid_encoding(format!(
                "expected selector {}",
                self.selector_hex()
            )));
        };
        self.inputs.decode(body)
    }

    /// Encodes return values against the output tuple.
    pub fn encode_return(&self, values: &[Value]) -> Result<Vec<u8>> {
        self.outputs.encode(values)
    }

    /// Decodes return data against the output tuple.
    pub fn decode_return(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.outputs.decode(data)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// An event schema: name, input tuple, per-input indexed manifest, and the
/// anonymous flag.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    name: String,
    inputs: TupleType,
    indexed: Vec<bool>,
    anonymous: bool,
}

impl Event {
    /// Builds an event schema. The manifest arity must match the inputs.
    pub fn new(
        name: impl Into<String>,
        inputs: TupleType,
        indexed: Vec<bool>,
        anonymous: bool,
    ) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        if indexed.len() != inputs.size() {
            return Err(Error::invalid_value(format!(
                "indexed manifest length mismatch: actual != expected: {} != {}",
                indexed.len(),
                inputs.size()
            )));
        }
        Ok(Self { name, inputs, indexed, anonymous })
    }

    /// The event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full input tuple, indexed and non-indexed alike.
    pub fn inputs(&self) -> &TupleType {
        &self.inputs
    }

    /// The indexed manifest, parallel to the inputs.
    pub fn indexed(&self) -> &[bool] {
        &self.indexed
    }

    /// Whether the event was declared `anonymous`.
    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// The canonical signature over the full inputs; indexed-ness is not
    /// part of it.
    pub fn signature(&self) -> String {
        let mut out = self.name.clone();
        self.inputs.write_canonical(&mut out);
        out
    }

    /// The topic-0 hash, unless the event is anonymous.
    pub fn topic(&self) -> Option<[u8; 32]> {
        (!self.anonymous).then(|| keccak256(self.signature().as_bytes()))
    }

    /// The tuple of indexed parameters.
    pub fn indexed_params(&self) -> TupleType {
        // arity was checked at construction
        self.inputs.sub_tuple(&self.indexed).unwrap_or_default()
    }

    /// The tuple of non-indexed parameters.
    pub fn non_indexed_params(&self) -> TupleType {
        self.inputs.sub_tuple_negative(&self.indexed).unwrap_or_default()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

/// A custom error schema: name plus input tuple. The selector derivation is
/// identical to a function's.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractError {
    name: String,
    inputs: TupleType,
}

impl ContractError {
    /// Builds an error schema.
    pub fn new(name: impl Into<String>, inputs: TupleType) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self { name, inputs })
    }

    /// The error name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The input tuple.
    pub fn inputs(&self) -> &TupleType {
        &self.inputs
    }

    /// The canonical signature.
    pub fn signature(&self) -> String {
        let mut out = self.name.clone();
        self.inputs.write_canonical(&mut out);
        out
    }

    /// The 4-byte selector.
    pub fn selector(&self) -> [u8; 4] {
        let digest = keccak256(self.signature().as_bytes());
        [digest[0], digest[1], digest[2], digest[3]]
    }

    /// Encodes revert data: selector followed by the encoded inputs.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>> {
        let body = self.inputs.encode(values)?;
        let mut out = Vec::with_capacity(4 + body.len());
        out.extend_from_slice(&self.selector());
        out.extend_from_slice(&body);
        Ok(out)
    }

    /// Decodes revert data, checking the selector.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Value>> {
        let selector = self.selector();
        let Some(body) = data.strip_prefix(selector.as_slice()) else {
            return Err(Error::invalid_encoding(format!(
                "expected selector {}",
                hex::encode(selector)
            )));
        };
        self.inputs.decode(body)
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors() {
        assert_eq!(Function::parse("foo()").unwrap().selector_hex(), "c2985578");
        assert_eq!(Function::parse("baz(uint32,bool)").unwrap().selector_hex(), "cdcd77c0");
        assert_eq!(Function::parse("bar(bytes3[2])").unwrap().selector_hex(), "fce353f6");
        assert_eq!(
            Function::parse("sam(bytes,bool,uint256[])").unwrap().selector_hex(),
            "a5643bf2"
        );
    }

    #[test]
    fn signature_uses_canonical_types() {
        let f = Function::parse("transfer(address,uint)").unwrap();
        assert_eq!(f.signature(), "transfer(address,uint256)");
    }

    #[test]
    fn kind_rules() {
        let bool_out = TupleType::parse("(bool)").unwrap();
        let err = Function::new(
            FunctionKind::Constructor,
            None,
            TupleType::empty(),
            bool_out.clone(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type is \"constructor\"; functions of this type must define no outputs"
        );

        let err = Function::new(
            FunctionKind::Fallback,
            Some("foo".to_string()),
            TupleType::empty(),
            TupleType::empty(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type is \"fallback\"; functions of this type must not define name"
        );

        let err = Function::new(
            FunctionKind::Receive,
            None,
            TupleType::empty(),
            TupleType::empty(),
            None,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type is \"receive\"; functions of this type must define stateMutability as \"payable\""
        );

        assert!(Function::new(
            FunctionKind::Receive,
            None,
            TupleType::empty(),
            TupleType::empty(),
            Some("payable".to_string()),
        )
        .is_ok());

        let err =
            Function::new(FunctionKind::Function, None, TupleType::empty(), TupleType::empty(), None)
                .unwrap_err();
        assert!(err.to_string().contains("must define name"));
    }

    #[test]
    fn name_charset() {
        assert!(Function::parse("fo(o()").is_err());
        assert!(Function::parse("f\u{7f}oo()").is_err());
        assert!(Function::parse("a b()").is_ok()); // space is printable ASCII
    }

    #[test]
    fn call_roundtrip() {
        let f = Function::parse("baz(uint32,bool)").unwrap();
        let call = f.encode_call(&[Value::Uint(69), Value::Bool(true)]).unwrap();
        assert_eq!(call.len(), 68);
        assert_eq!(&call[..4], &[0xcd, 0xcd, 0x77, 0xc0]);
        assert_eq!(f.decode_call(&call).unwrap(), vec![Value::Uint(69), Value::Bool(true)]);

        let mut wrong = call.clone();
        wrong[0] ^= 0xff;
        assert!(f.decode_call(&wrong).is_err());
    }

    #[test]
    fn event_topic_and_projections() {
        let inputs = TupleType::parse("(address,address,uint256)").unwrap();
        let event = Event::new("Transfer", inputs, vec![true, true, false], false).unwrap();
        assert_eq!(event.signature(), "Transfer(address,address,uint256)");
        assert_eq!(
            hex::encode(event.topic().unwrap()),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
        assert_eq!(event.indexed_params().canonical(), "(address,address)");
        assert_eq!(event.non_indexed_params().canonical(), "(uint256)");

        let anon = Event::new("Transfer", event.inputs().clone(), vec![true, true, false], true)
            .unwrap();
        assert!(anon.topic().is_none());
    }

    #[test]
    fn event_manifest_arity() {
        let inputs = TupleType::parse("(address)").unwrap();
        assert!(Event::new("E", inputs, vec![true, false], false).is_err());
    }

    #[test]
    fn error_selector() {
        let inputs = TupleType::parse("(uint256,uint256)").unwrap();
        let e = ContractError::new("InsufficientBalance", inputs).unwrap();
        assert_eq!(e.signature(), "InsufficientBalance(uint256,uint256)");
        let data = e
            .encode(&[Value::BigInt(1.into()), Value::BigInt(2.into())])
            .unwrap();
        assert_eq!(data.len(), 68);
        assert_eq!(
            e.decode(&data).unwrap(),
            vec![Value::BigInt(1.into()), Value::BigInt(2.into())]
        );
    }
}
