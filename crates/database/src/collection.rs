use crate::error::DbError;
use crate::repository::Repository;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// The live, named repositories ("connections") used at run time.
///
/// The collection is the only owner of its repositories. Actions hold
/// `Weak` handles obtained through [`RepositoryCollection::handle`], so
/// removing a connection here ends its lifetime.
#[derive(Default)]
pub struct RepositoryCollection {
    repositories: HashMap<String, Arc<dyn Repository>>,
}

impl RepositoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository under `name` (case-insensitive).
    pub fn add(&mut self, name: &str, repository: Box<dyn Repository>) -> Result<(), DbError> {
        if name.trim().is_empty() {
            return Err(DbError::InvalidArgument(
                "connection name must not be empty".to_string(),
            ));
        }

        let key = name.to_lowercase();
        if self.repositories.contains_key(&key) {
            return Err(DbError::DuplicateConnection(name.to_string()));
        }

        tracing::debug!(connection = name, provider = repository.provider(), "Connection registered.");
        self.repositories.insert(key, Arc::from(repository));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Repository>, DbError> {
        self.repositories
            .get(&name.to_lowercase())
            .ok_or_else(|| DbError::ConnectionNotFound(name.to_string()))
    }

    /// A non-owning handle to the repository registered under `name`.
    pub fn handle(&self, name: &str) -> Result<Weak<dyn Repository>, DbError> {
        self.get(name).map(Arc::downgrade)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn Repository>> {
        self.repositories.remove(&name.to_lowercase())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.repositories.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// Iterates `(name, repository)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Repository>)> {
        self.repositories
            .iter()
            .map(|(name, repository)| (name.as_str(), repository))
    }

    /// Disposes every repository, returning the ones that failed to close.
    pub async fn close_all(&self) -> Vec<(String, DbError)> {
        let mut failures = Vec::new();
        for (name, repository) in &self.repositories {
            if let Err(e) = repository.dispose().await {
                tracing::error!(connection = %name, error = %e, "Failed to close connection.");
                failures.push((name.clone(), e));
            }
        }
        failures
    }
}
