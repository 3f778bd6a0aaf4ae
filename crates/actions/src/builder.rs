use crate::error::ActionError;
use crate::Action;
use core_types::ParameterBag;
use database::RepositoryCollection;

/// A stateful builder for one action type.
///
/// The registry feeds a builder a name and a parameter bag, asks it to build
/// against the live connections, and then resets it so the same instance can
/// serve the next action of its type.
pub trait ActionBuilder: Send + Sync {
    fn set_name(&mut self, name: &str);

    fn set_parameters(&mut self, parameters: ParameterBag);

    /// Constructs the action from the current name and parameters.
    fn build(&mut self, connections: &RepositoryCollection) -> Result<Box<dyn Action>, ActionError>;

    /// Clears the name and parameters.
    fn reset(&mut self);
}
