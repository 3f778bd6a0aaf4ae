use core_types::CoreError;
use database::DbError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("An action builder for the type '{0}' is already registered.")]
    DuplicateActionBuilder(String),

    #[error("Action of type '{0}' not found or implemented")]
    ActionTypeNotFound(String),

    #[error("Action '{action}' requires a 'connection' parameter of text type.")]
    MissingConnectionParameter { action: String },

    #[error("Action '{action}' refers to connection '{connection}', which does not exist.")]
    ConnectionNotFound { action: String, connection: String },

    #[error("Action '{action}' requires a 'queries' parameter with at least one statement.")]
    MissingQueriesParameter { action: String },

    #[error("An action with the name '{0}' already exists.")]
    DuplicateActionName(String),

    #[error("Action parameter error: {0}")]
    Parameters(#[from] CoreError),

    #[error("Connection '{connection}' used by action '{action}' has been released.")]
    ConnectionReleased { action: String, connection: String },

    #[error("Action '{0}' is already running.")]
    AlreadyRunning(String),

    #[error("Action '{action}' failed: {source}")]
    Execution {
        action: String,
        #[source]
        source: DbError,
    },
}

impl ActionError {
    /// The underlying database error of a failed execution.
    pub fn execution_error(&self) -> Option<&DbError> {
        match self {
            ActionError::Execution { source, .. } => Some(source),
            _ => None,
        }
    }
}
