use serde::{Deserialize, Serialize};
use std::fmt;

/// The `stateMutability` of a function fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Reads no state.
    Pure,
    /// Reads but does not modify state.
    View,
    /// Modifies state and rejects value transfers.
    #[serde(rename = "nonpayable")]
    NonPayable,
    /// Modifies state and accepts value transfers.
    Payable,
}

impl StateMutability {
    /// The JSON string form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pure => "pure",
            Self::View => "view",
            Self::NonPayable => "nonpayable",
            Self::Payable => "payable",
        }
    }
}

impl fmt::Display for StateMutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
