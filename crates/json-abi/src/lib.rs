//! Serde model of the Solidity contract ABI JSON dialect.
//!
//! This crate contains only the wire shapes: fragments tagged by `"type"`
//! (`function`, `constructor`, `fallback`, `receive`, `event`, `error`) and
//! the recursive parameter objects they carry. It performs no type-string
//! parsing and no schema validation; consumers resolve the textual types
//! into their own representations.

mod item;
pub use item::{AbiItem, Constructor, ErrorItem, EventItem, Fallback, FunctionItem, Receive};

mod param;
pub use param::Param;

mod state_mutability;
pub use state_mutability::StateMutability;

use serde::{Deserialize, Serialize};

/// A full contract ABI: an ordered list of fragments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonAbi(pub Vec<AbiItem>);

impl JsonAbi {
    /// Deserializes a JSON array of ABI fragments.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes back to a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the ABI contains no fragments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the contained function fragments.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionItem> {
        self.0.iter().filter_map(|item| match item {
            AbiItem::Function(f) => Some(f),
            _ => None,
        })
    }

    /// Iterates over the contained event fragments.
    pub fn events(&self) -> impl Iterator<Item = &EventItem> {
        self.0.iter().filter_map(|item| match item {
            AbiItem::Event(e) => Some(e),
            _ => None,
        })
    }

    /// Iterates over the contained error fragments.
    pub fn errors(&self) -> impl Iterator<Item = &ErrorItem> {
        self.0.iter().filter_map(|item| match item {
            AbiItem::Error(e) => Some(e),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_abi() {
        let json = r#"[
            {"type":"function","name":"transfer","stateMutability":"nonpayable",
             "inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],
             "outputs":[{"name":"","type":"bool"}]},
            {"type":"event","name":"Transfer","anonymous":false,
             "inputs":[{"name":"from","type":"address","indexed":true},
                       {"name":"to","type":"address","indexed":true},
                       {"name":"value","type":"uint256","indexed":false}]},
            {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}],
             "stateMutability":"nonpayable"}
        ]"#;
        let abi = JsonAbi::from_json(json).unwrap();
        assert_eq!(abi.len(), 3);
        assert_eq!(abi.functions().count(), 1);
        assert_eq!(abi.events().count(), 1);

        let f = abi.functions().next().unwrap();
        assert_eq!(f.name, "transfer");
        assert_eq!(f.state_mutability, Some(StateMutability::NonPayable));
        assert_eq!(f.inputs.len(), 2);
        assert_eq!(f.inputs[1].ty, "uint256");
    }

    #[test]
    fn roundtrip_tuple_components() {
        let json = r#"[{"type":"function","name":"submit","inputs":[{"name":"order","type":"tuple[2]","components":[{"name":"id","type":"uint64"},{"name":"payload","type":"bytes"}]}],"outputs":[]}]"#;
        let abi = JsonAbi::from_json(json).unwrap();
        let AbiItem::Function(f) = &abi.0[0] else { panic!("expected function") };
        let components = f.inputs[0].components.as_deref().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[1].ty, "bytes");

        let reparsed = JsonAbi::from_json(&abi.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, abi);
    }
}
