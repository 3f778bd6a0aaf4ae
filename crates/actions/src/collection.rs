use crate::error::ActionError;
use crate::Action;
use std::collections::HashSet;

/// An ordered set of built actions with unique names.
///
/// Iteration follows insertion order. Dropping the collection drops the actions.
#[derive(Default)]
pub struct ActionCollection {
    actions: Vec<Box<dyn Action>>,
    names: HashSet<String>,
}

impl ActionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, action: Box<dyn Action>) -> Result<(), ActionError> {
        if !self.names.insert(action.name().to_string()) {
            return Err(ActionError::DuplicateActionName(action.name().to_string()));
        }
        self.actions.push(action);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Action> {
        self.actions
            .iter()
            .find(|action| action.name() == name)
            .map(|action| action.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|action| action.as_ref())
    }
}

impl<'a> IntoIterator for &'a ActionCollection {
    type Item = &'a Box<dyn Action>;
    type IntoIter = std::slice::Iter<'a, Box<dyn Action>>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::ActionStatus;
    use uuid::Uuid;

    struct NamedAction(&'static str);

    #[async_trait]
    impl Action for NamedAction {
        fn id(&self) -> Uuid {
            Uuid::nil()
        }

        fn name(&self) -> &str {
            self.0
        }

        fn action_type(&self) -> &str {
            "test"
        }

        fn status(&self) -> ActionStatus {
            ActionStatus::Pending
        }

        async fn execute(&self) -> Result<u64, ActionError> {
            Ok(0)
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut collection = ActionCollection::new();
        collection.add(Box::new(NamedAction("load"))).unwrap();

        let err = collection.add(Box::new(NamedAction("load"))).unwrap_err();
        assert!(matches!(err, ActionError::DuplicateActionName(name) if name == "load"));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut collection = ActionCollection::new();
        for name in ["c", "a", "b"] {
            collection.add(Box::new(NamedAction(name))).unwrap();
        }

        let names: Vec<&str> = collection.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert_eq!((&collection).into_iter().count(), 3);
        assert!(collection.get("a").is_some());
        assert!(collection.get("z").is_none());
    }
}
