//! Bridge between [`solabi_json_abi`] fragments and the core schema types.
//!
//! JSON parameters carry textual type descriptors; tuples appear as
//! `type: "tuple…"` with a `components` array, with any array suffix
//! (`tuple[4][]`) applied on top of the assembled component tuple.

use crate::{
    parse::apply_suffix, ContractError, Error, Event, Field, Function, FunctionKind, Result,
    TupleType, Type,
};
use solabi_json_abi::{
    AbiItem, Constructor, ErrorItem, EventItem, Fallback, FunctionItem, JsonAbi, Param, Receive,
    StateMutability,
};

fn resolve_param(param: &Param) -> Result<Field> {
    let ty = if let Some(suffix) = param.tuple_suffix() {
        let components = param.components.as_deref().unwrap_or_default();
        let tuple = resolve_params(components)?;
        apply_suffix(Type::Tuple(tuple), suffix)?
    } else {
        Type::parse(&param.ty)?
    };
    Ok(if param.name.is_empty() {
        Field::new(ty)
    } else {
        Field::named(param.name.clone(), ty)
    })
}

fn resolve_params(params: &[Param]) -> Result<TupleType> {
    params.iter().map(resolve_param).collect()
}

/// Decomposes a type into its JSON `type` string and, for tuple-based types,
/// its component parameters.
fn unresolve_type(ty: &Type) -> (String, Option<Vec<Param>>) {
    let mut base = ty;
    let mut suffixes = Vec::new();
    while let Type::Array { elem, len } = base {
        suffixes.push(match len {
            Some(len) => format!("[{len}]"),
            None => "[]".to_string(),
        });
        base = elem;
    }
    match base {
        Type::Tuple(tuple) => {
            let mut name = "tuple".to_string();
            for suffix in suffixes.iter().rev() {
                name.push_str(suffix);
            }
            let components = tuple.fields().iter().map(unresolve_field).collect();
            (name, Some(components))
        }
        _ => (ty.canonical(), None),
    }
}

fn unresolve_field(field: &Field) -> Param {
    let (ty, components) = unresolve_type(&field.ty);
    Param {
        name: field.name.clone().unwrap_or_default(),
        ty,
        components,
        indexed: None,
        internal_type: None,
    }
}

fn unresolve_params(tuple: &TupleType) -> Vec<Param> {
    tuple.fields().iter().map(unresolve_field).collect()
}

fn mutability_string(m: Option<StateMutability>) -> Option<String> {
    m.map(|m| m.as_str().to_string())
}

fn mutability_enum(s: Option<&str>) -> Option<StateMutability> {
    match s {
        Some("pure") => Some(StateMutability::Pure),
        Some("view") => Some(StateMutability::View),
        Some("nonpayable") => Some(StateMutability::NonPayable),
        Some("payable") => Some(StateMutability::Payable),
        _ => None,
    }
}

fn json_error(e: serde_json::Error) -> Error {
    Error::Parse(format!("malformed ABI JSON: {e}"))
}

impl Function {
    /// Builds a function schema from any function-shaped ABI fragment.
    pub fn from_item(item: &AbiItem) -> Result<Self> {
        match item {
            AbiItem::Function(f) => Self::new(
                FunctionKind::Function,
                Some(f.name.clone()),
                resolve_params(&f.inputs)?,
                resolve_params(&f.outputs)?,
                mutability_string(f.state_mutability),
            ),
            AbiItem::Constructor(c) => Self::new(
                FunctionKind::Constructor,
                None,
                resolve_params(&c.inputs)?,
                TupleType::empty(),
                mutability_string(c.state_mutability),
            ),
            AbiItem::Fallback(f) => Self::new(
                FunctionKind::Fallback,
                None,
                TupleType::empty(),
                TupleType::empty(),
                mutability_string(f.state_mutability),
            ),
            AbiItem::Receive(r) => Self::new(
                FunctionKind::Receive,
                None,
                TupleType::empty(),
                TupleType::empty(),
                mutability_string(r.state_mutability),
            ),
            AbiItem::Event(_) | AbiItem::Error(_) => {
                Err(Error::invalid_value("not a function fragment"))
            }
        }
    }

    /// Parses a single JSON function fragment.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_item(&serde_json::from_str(json).map_err(json_error)?)
    }

    /// Rebuilds the JSON fragment for this schema.
    pub fn to_item(&self) -> AbiItem {
        let state_mutability = mutability_enum(self.state_mutability());
        match self.kind() {
            FunctionKind::Function => AbiItem::Function(FunctionItem {
                name: self.name().unwrap_or_default().to_string(),
                inputs: unresolve_params(self.inputs()),
                outputs: unresolve_params(self.outputs()),
                state_mutability,
            }),
            FunctionKind::Constructor => AbiItem::Constructor(Constructor {
                inputs: unresolve_params(self.inputs()),
                state_mutability,
            }),
            FunctionKind::Fallback => AbiItem::Fallback(Fallback { state_mutability }),
            FunctionKind::Receive => AbiItem::Receive(Receive { state_mutability }),
        }
    }

    /// Serializes the JSON fragment for this schema.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.to_item()).map_err(json_error)
    }
}

impl Event {
    /// Builds an event schema from a JSON fragment.
    pub fn from_item(item: &EventItem) -> Result<Self> {
        let inputs = resolve_params(&item.inputs)?;
        let indexed = item.inputs.iter().map(|p| p.indexed.unwrap_or(false)).collect();
        Self::new(item.name.clone(), inputs, indexed, item.anonymous)
    }

    /// Parses a single JSON event fragment.
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str(json).map_err(json_error)? {
            AbiItem::Event(e) => Self::from_item(&e),
            _ => Err(Error::invalid_value("not an event fragment")),
        }
    }

    /// Rebuilds the JSON fragment for this schema.
    pub fn to_item(&self) -> EventItem {
        let mut inputs = unresolve_params(self.inputs());
        for (param, &indexed) in inputs.iter_mut().zip(self.indexed()) {
            param.indexed = Some(indexed);
        }
        EventItem { name: self.name().to_string(), inputs, anonymous: self.is_anonymous() }
    }

    /// Serializes the JSON fragment for this schema.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&AbiItem::Event(self.to_item())).map_err(json_error)
    }
}

impl ContractError {
    /// Builds an error schema from a JSON fragment.
    pub fn from_item(item: &ErrorItem) -> Result<Self> {
        Self::new(item.name.clone(), resolve_params(&item.inputs)?)
    }

    /// Parses a single JSON error fragment.
    pub fn from_json(json: &str) -> Result<Self> {
        match serde_json::from_str(json).map_err(json_error)? {
            AbiItem::Error(e) => Self::from_item(&e),
            _ => Err(Error::invalid_value("not an error fragment")),
        }
    }

    /// Rebuilds the JSON fragment for this schema.
    pub fn to_item(&self) -> ErrorItem {
        ErrorItem { name: self.name().to_string(), inputs: unresolve_params(self.inputs()) }
    }

    /// Serializes the JSON fragment for this schema.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&AbiItem::Error(self.to_item())).map_err(json_error)
    }
}

/// A schema object parsed out of a contract ABI.
#[derive(Clone, Debug, PartialEq)]
pub enum AbiObject {
    /// A function-shaped fragment.
    Function(Function),
    /// An event.
    Event(Event),
    /// A custom error.
    Error(ContractError),
}

/// Parses a full contract ABI (a JSON array of fragments) into schemas.
pub fn parse_abi(json: &str) -> Result<Vec<AbiObject>> {
    let abi = JsonAbi::from_json(json).map_err(json_error)?;
    abi.0
        .iter()
        .map(|item| match item {
            AbiItem::Event(e) => Event::from_item(e).map(AbiObject::Event),
            AbiItem::Error(e) => ContractError::from_item(e).map(AbiObject::Error),
            other => Function::from_item(other).map(AbiObject::Function),
        })
        .collect()
}
