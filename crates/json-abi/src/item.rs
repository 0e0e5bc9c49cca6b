use crate::{Param, StateMutability};
use serde::{Deserialize, Serialize};

/// A single ABI fragment, tagged by its `"type"` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    /// An ordinary named function.
    Function(FunctionItem),
    /// The contract constructor.
    Constructor(Constructor),
    /// The unnamed fallback function.
    Fallback(Fallback),
    /// The ether-receive function.
    Receive(Receive),
    /// An event declaration.
    Event(EventItem),
    /// A custom error declaration.
    Error(ErrorItem),
}

/// `{"type": "function", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionItem {
    /// Function name.
    pub name: String,
    /// Input parameters.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Output parameters.
    #[serde(default)]
    pub outputs: Vec<Param>,
    /// State mutability; absent means `nonpayable` in modern JSON.
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

/// `{"type": "constructor", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    /// Input parameters.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// State mutability.
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

/// `{"type": "fallback", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fallback {
    /// State mutability.
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

/// `{"type": "receive", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Receive {
    /// State mutability; always `payable` for valid fragments.
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
}

/// `{"type": "event", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    /// Event name.
    pub name: String,
    /// Event parameters, each carrying an `indexed` flag.
    #[serde(default)]
    pub inputs: Vec<Param>,
    /// Whether the event was declared `anonymous`.
    #[serde(default)]
    pub anonymous: bool,
}

/// `{"type": "error", …}`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorItem {
    /// Error name.
    pub name: String,
    /// Error parameters.
    #[serde(default)]
    pub inputs: Vec<Param>,
}
