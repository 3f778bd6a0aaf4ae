//! # SqlExec Database Crate
//!
//! This crate owns everything that touches a live database connection.
//!
//! ## Architectural Principles
//!
//! - **Capability, not driver:** the rest of the system only sees the
//!   `Repository` trait: open, close, run one statement. The driver error type
//!   never crosses this boundary; failures are reported as `DbError`.
//! - **Open provider set:** providers are registered in a `RepositoryRegistry`
//!   under a string key and build repositories from opaque connection strings.
//! - **Single owner:** live repositories are held by a `RepositoryCollection`,
//!   which alone controls their lifetime.
//!
//! ## Public API
//!
//! - `Repository`: The capability trait every connection handle implements.
//! - `SqlRepository`: The sqlx-backed implementation (`sqlite`, `postgres`).
//! - `RepositoryFactory` / `RepositoryRegistry`: provider key -> factory.
//! - `RepositoryCollection`: the named, live repositories used at run time.
//! - `DbError` / `StatementFailure`: The error types returned from this crate.

// Declare the modules that constitute this crate.
pub mod collection;
pub mod connection;
pub mod error;
pub mod registry;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use collection::RepositoryCollection;
pub use connection::{PostgresRepositoryFactory, SqliteRepositoryFactory};
pub use error::{DbError, StatementFailure};
pub use registry::{register_default_providers, RepositoryFactory, RepositoryRegistry};
pub use repository::{aggregate_statement_results, Repository, SqlRepository};
