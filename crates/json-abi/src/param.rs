use serde::{Deserialize, Serialize};

/// A function/event/error parameter object.
///
/// Tuple parameters carry `type: "tuple…"` (possibly with array suffixes,
/// e.g. `tuple[4][]`) together with a `components` array describing the
/// member types.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name. The empty string denotes an unnamed parameter.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Textual type descriptor, e.g. `uint256` or `tuple[]`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Member parameters of a `tuple…` type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Param>>,
    /// Whether an event parameter is indexed. Absent outside of events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    /// Compiler-internal type annotation, preserved verbatim.
    #[serde(rename = "internalType", default, skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl Param {
    /// A parameter with just a name and a type.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self { name: name.into(), ty: ty.into(), ..Self::default() }
    }

    /// Whether this parameter is a tuple (possibly wrapped in array suffixes).
    pub fn is_tuple(&self) -> bool {
        self.ty.starts_with("tuple")
    }

    /// The array suffix of a tuple parameter, e.g. `"[4][]"` for `tuple[4][]`.
    pub fn tuple_suffix(&self) -> Option<&str> {
        self.ty.strip_prefix("tuple")
    }
}
