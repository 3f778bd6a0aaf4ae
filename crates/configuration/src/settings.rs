use core_types::{ActionRecord, ConnectionRecord};
use serde::Deserialize;

/// The only document version this build understands.
pub const SUPPORTED_VERSION: &str = "1.0.0";

/// The root structure of an action document.
#[derive(Debug, Clone, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
    /// Optional `[run]` settings. Defaults apply when the section is missing.
    #[serde(default)]
    pub run: RunSettings,
}

/// How a document's actions are run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSettings {
    /// Keep running later actions after one fails.
    #[serde(default)]
    pub continue_on_error: bool,
}
