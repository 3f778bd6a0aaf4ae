//! # SqlExec Action Library
//!
//! This crate turns declared action records into executable units of work.
//!
//! ## Architectural Principles
//!
//! - **Action Agnostic Engine:** callers run any built action through the
//!   `Action` trait without knowing its kind.
//! - **Extensibility:** adding an action kind means implementing `Action` and
//!   `ActionBuilder` and registering the builder under a type key in the
//!   `ActionRegistry`. No central match statement needs editing.
//! - **Borrowed connections:** actions hold non-owning handles to repositories;
//!   the `RepositoryCollection` keeps sole control of their lifetime.
//!
//! ## Public API
//!
//! - `Action`: The core trait all actions implement.
//! - `ActionBuilder`: The stateful builder contract, one per action type.
//! - `ActionRegistry`: type key -> builder, resolves connections by name.
//! - `ActionCollection`: the ordered, uniquely named set of built actions.
//! - `NonQueryAction` / `NonQueryActionBuilder`: the built-in `nonquery` kind.

// Declare all the modules that constitute this crate.
pub mod builder;
pub mod collection;
pub mod error;
pub mod non_query;
pub mod registry;

// Re-export the key components to create a clean, public-facing API.
pub use builder::ActionBuilder;
pub use collection::ActionCollection;
pub use error::ActionError;
pub use non_query::{NonQueryAction, NonQueryActionBuilder, NON_QUERY_TYPE};
pub use registry::ActionRegistry;

use async_trait::async_trait;
use core_types::ActionStatus;
use uuid::Uuid;

/// The core trait that all executable actions must implement.
///
/// `execute` takes `&self`: status is tracked with interior mutability so a
/// collection can hand out shared references while actions run.
#[async_trait]
pub trait Action: Send + Sync {
    fn id(&self) -> Uuid;

    fn name(&self) -> &str;

    /// The type key the action was built from, e.g. `nonquery`.
    fn action_type(&self) -> &str;

    fn status(&self) -> ActionStatus;

    /// Runs the action and returns the number of affected rows.
    ///
    /// # Returns
    ///
    /// * `Ok(rows)` - every unit of work succeeded; status is `Complete`.
    /// * `Err(ActionError)` - status is `Failed`, and the error carries every
    ///   individual failure, not only the first.
    ///
    /// Dropping the future before it resolves leaves the action `Failed`.
    /// Work already handed to the database may still complete.
    async fn execute(&self) -> Result<u64, ActionError>;
}
