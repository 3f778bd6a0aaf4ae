use actions::ActionError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to set up connection '{name}': {source}")]
    Connection {
        name: String,
        #[source]
        source: DbError,
    },

    #[error("Failed to build action '{name}': {source}")]
    ActionBuild {
        name: String,
        #[source]
        source: ActionError,
    },

    #[error("{} connection(s) failed to close: {}", .0.len(), .0.join(", "))]
    Shutdown(Vec<String>),
}
