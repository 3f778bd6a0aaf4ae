pub mod enums;
pub mod error;
pub mod parameters;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ActionStatus, ConnectionState};
pub use error::CoreError;
pub use parameters::{FromParameter, ParameterBag, ParameterValue};
pub use structs::{ActionRecord, ConnectionRecord};
