use crate::builder::ActionBuilder;
use crate::error::ActionError;
use crate::non_query::{NonQueryActionBuilder, NON_QUERY_TYPE};
use crate::Action;
use core_types::{ActionRecord, ParameterBag};
use database::RepositoryCollection;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps an action type key (case-insensitive) to the builder for that type.
///
/// Connections are resolved by name through the shared `RepositoryCollection`
/// at build time.
pub struct ActionRegistry {
    builders: HashMap<String, Box<dyn ActionBuilder>>,
    connections: Arc<RepositoryCollection>,
}

impl ActionRegistry {
    /// An empty registry resolving connections through `connections`.
    pub fn new(connections: Arc<RepositoryCollection>) -> Self {
        Self {
            builders: HashMap::new(),
            connections,
        }
    }

    /// A registry with the built-in `nonquery` builder registered.
    pub fn with_defaults(connections: Arc<RepositoryCollection>) -> Self {
        let mut registry = Self::new(connections);
        registry
            .builders
            .insert(NON_QUERY_TYPE.to_string(), Box::new(NonQueryActionBuilder::new()));
        registry
    }

    /// Registers `builder` for `action_type`. Existing keys are never replaced.
    pub fn register(
        &mut self,
        action_type: &str,
        builder: impl ActionBuilder + 'static,
    ) -> Result<(), ActionError> {
        let key = action_type.to_lowercase();
        if self.builders.contains_key(&key) {
            return Err(ActionError::DuplicateActionBuilder(action_type.to_string()));
        }
        self.builders.insert(key, Box::new(builder));
        Ok(())
    }

    /// Builds one action with the builder registered for `action_type`.
    ///
    /// The builder is reset afterwards whether or not the build succeeded.
    pub fn build(
        &mut self,
        name: &str,
        action_type: &str,
        parameters: ParameterBag,
    ) -> Result<Box<dyn Action>, ActionError> {
        let builder = self
            .builders
            .get_mut(&action_type.to_lowercase())
            .ok_or_else(|| ActionError::ActionTypeNotFound(action_type.to_string()))?;

        builder.set_name(name);
        builder.set_parameters(parameters);
        let result = builder.build(&self.connections);
        builder.reset();

        if let Err(e) = &result {
            tracing::warn!(action = name, action_type, error = %e, "Failed to build action.");
        }
        result
    }

    /// Builds an action straight from its declared record.
    pub fn build_record(&mut self, record: &ActionRecord) -> Result<Box<dyn Action>, ActionError> {
        let parameters = ParameterBag::from_entries(
            record
                .parameters
                .iter()
                .map(|(key, value)| (key.as_str(), value.clone())),
        )?;
        self.build(&record.name, &record.action_type, parameters)
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.builders.contains_key(&action_type.to_lowercase())
    }

    /// The registered type keys, sorted.
    pub fn action_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn connections(&self) -> &Arc<RepositoryCollection> {
        &self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{ActionStatus, ParameterValue};
    use database::{RepositoryFactory, SqliteRepositoryFactory};
    use std::collections::BTreeMap;

    fn connections() -> Arc<RepositoryCollection> {
        let mut connections = RepositoryCollection::new();
        connections
            .add("local", SqliteRepositoryFactory.build("sqlite::memory:").unwrap())
            .unwrap();
        Arc::new(connections)
    }

    fn non_query_parameters() -> ParameterBag {
        ParameterBag::from_entries([
            ("connection", ParameterValue::from("local")),
            ("queries", vec!["CREATE TABLE t (id INTEGER)"].into()),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_type_is_not_found() {
        let mut registry = ActionRegistry::with_defaults(connections());
        let err = registry
            .build("a", "tableload", non_query_parameters())
            .err()
            .unwrap();
        assert!(matches!(err, ActionError::ActionTypeNotFound(t) if t == "tableload"));
    }

    #[test]
    fn duplicate_builder_is_rejected() {
        let mut registry = ActionRegistry::with_defaults(connections());
        let err = registry
            .register("NonQuery", NonQueryActionBuilder::new())
            .unwrap_err();
        assert!(matches!(err, ActionError::DuplicateActionBuilder(_)));
        assert_eq!(registry.action_types(), vec![NON_QUERY_TYPE]);
    }

    #[test]
    fn builder_is_reusable_after_a_failed_build() {
        let mut registry = ActionRegistry::with_defaults(connections());

        let mut broken = ParameterBag::new();
        broken.add("queries", vec!["SELECT 1"]).unwrap();
        assert!(registry.build("first", "nonquery", broken).is_err());

        let action = registry
            .build("second", "NONQUERY", non_query_parameters())
            .unwrap();
        assert_eq!(action.name(), "second");
        assert_eq!(action.status(), ActionStatus::Pending);
    }

    #[test]
    fn builds_from_a_declared_record() {
        let mut registry = ActionRegistry::with_defaults(connections());
        let record = ActionRecord {
            action_type: "nonquery".to_string(),
            name: "create".to_string(),
            parameters: BTreeMap::from([
                ("connection".to_string(), ParameterValue::from("local")),
                ("queries".to_string(), vec!["CREATE TABLE t (id INTEGER)"].into()),
            ]),
        };

        let action = registry.build_record(&record).unwrap();
        assert_eq!(action.name(), "create");
    }

    #[test]
    fn record_with_case_colliding_keys_is_rejected() {
        let mut registry = ActionRegistry::with_defaults(connections());
        let record = ActionRecord {
            action_type: "nonquery".to_string(),
            name: "create".to_string(),
            parameters: BTreeMap::from([
                ("Connection".to_string(), ParameterValue::from("local")),
                ("connection".to_string(), ParameterValue::from("local")),
            ]),
        };

        let err = registry.build_record(&record).err().unwrap();
        assert!(matches!(err, ActionError::Parameters(_)));
    }
}
