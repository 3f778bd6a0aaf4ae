use std::error::Error as StdError;
use thiserror::Error;

/// A type-erased driver error. Keeps the concrete driver type out of the API.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// One statement that failed at the driver boundary.
#[derive(Error, Debug)]
#[error("Unable to execute statement against database. ({sql}): {source}")]
pub struct StatementFailure {
    pub sql: String,
    #[source]
    pub source: BoxError,
}

impl StatementFailure {
    pub fn new(sql: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            sql: sql.into(),
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A repository provider with the key '{0}' is already registered.")]
    DuplicateProvider(String),

    #[error("No repository provider is registered with the key '{0}'.")]
    ProviderNotFound(String),

    #[error("A connection with the name '{0}' already exists.")]
    DuplicateConnection(String),

    #[error("Connection with the name '{0}' not found.")]
    ConnectionNotFound(String),

    #[error("Invalid connection string for provider '{provider}': {reason}")]
    InvalidConnectionString { provider: String, reason: String },

    #[error("The '{0}' repository has been disposed and cannot be used again.")]
    Disposed(String),

    #[error("Failed to {operation} the database connection: {source}")]
    Connection {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error(transparent)]
    StatementExecutionFailed(#[from] StatementFailure),

    #[error("{} statement(s) failed to complete:{}", .0.len(), summarize(.0))]
    AggregateExecutionFailure(Vec<StatementFailure>),
}

impl DbError {
    pub(crate) fn connection(operation: &'static str, source: impl Into<BoxError>) -> Self {
        DbError::Connection {
            operation,
            source: source.into(),
        }
    }

    /// The individual statement failures carried by this error, if any.
    pub fn statement_failures(&self) -> &[StatementFailure] {
        match self {
            DbError::StatementExecutionFailed(failure) => std::slice::from_ref(failure),
            DbError::AggregateExecutionFailure(failures) => failures,
            _ => &[],
        }
    }
}

fn summarize(failures: &[StatementFailure]) -> String {
    failures
        .iter()
        .map(|failure| format!("\n  - {failure}"))
        .collect()
}
