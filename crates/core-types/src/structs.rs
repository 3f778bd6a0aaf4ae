use crate::parameters::ParameterValue;
use serde::Deserialize;
use std::collections::BTreeMap;

/// A named database connection as declared in the configuration document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionRecord {
    /// Unique (case-insensitive) name that actions refer to.
    #[serde(default)]
    pub name: String,
    /// Selects the repository factory, e.g. `sqlite`.
    #[serde(default)]
    pub provider: String,
    /// Opaque, provider-specific connection string.
    #[serde(default)]
    pub connection_string: String,
}

/// A declared action: its type key, unique name and raw parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActionRecord {
    /// The action type key, e.g. `nonquery`.
    #[serde(default, rename = "action", alias = "type")]
    pub action_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterValue>,
}
