use ::std::collections::BTreeSet;

use ::serde::{Deserialize, Serialize};

use crate::{executor::ExecutorLocation, lattice::Consistency};

pub type FunctionName = String;

/// Prefix of the store key of every function body.
pub const FUNC_PREFIX: &str = "funcs/";
/// Store key of the list of all registered functions.
pub const FUNC_LIST_KEY: &str = "funcs/index-allfuncs";

/// Store key of the body of function `name`.
pub fn function_key(name: &str) -> String {
    format!("{}{}", FUNC_PREFIX, name)
}

/// Inverse of [function_key]
pub fn function_name(key: &str) -> Option<&str> {
    key.strip_prefix(FUNC_PREFIX)
}

/// Request body to register a function.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CreateFunctionRequest {
    pub name: FunctionName,
    /// Serialized function body, opaque to the control plane.
    pub body: Vec<u8>,
    pub consistency: Consistency,
}

/// Where a function is pinned and how often it has been called.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FunctionPlacement {
    pub locations: BTreeSet<ExecutorLocation>,
    pub call_frequency: u64,
}
