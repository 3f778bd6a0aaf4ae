use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("A parameter with the key '{0}' already exists.")]
    DuplicateParameter(String),

    #[error("The parameter '{0}' was not found.")]
    ParameterNotFound(String),

    #[error("The parameter '{key}' cannot be read as {expected} (found {found}).")]
    InvalidParameterType {
        key: String,
        expected: String,
        found: &'static str,
    },
}
