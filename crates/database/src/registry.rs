use crate::connection::{
    PostgresRepositoryFactory, SqliteRepositoryFactory, POSTGRES_PROVIDER, SQLITE_PROVIDER,
};
use crate::error::DbError;
use crate::repository::Repository;
use std::collections::HashMap;

/// Turns an opaque connection string into a repository for one provider.
pub trait RepositoryFactory: Send + Sync {
    fn build(&self, connection_string: &str) -> Result<Box<dyn Repository>, DbError>;
}

/// Maps a provider key (case-insensitive) to the factory that serves it.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<String, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in `sqlite` and `postgres` providers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        register_default_providers(&mut registry);
        registry
    }

    /// Registers `factory` under `provider`. Existing keys are never replaced.
    pub fn register(
        &mut self,
        provider: &str,
        factory: impl RepositoryFactory + 'static,
    ) -> Result<(), DbError> {
        let key = provider.to_lowercase();
        if self.factories.contains_key(&key) {
            return Err(DbError::DuplicateProvider(provider.to_string()));
        }
        self.factories.insert(key, Box::new(factory));
        Ok(())
    }

    /// Builds a repository with the factory registered under `provider`.
    pub fn build(
        &self,
        provider: &str,
        connection_string: &str,
    ) -> Result<Box<dyn Repository>, DbError> {
        let factory = self
            .factories
            .get(&provider.to_lowercase())
            .ok_or_else(|| DbError::ProviderNotFound(provider.to_string()))?;
        factory.build(connection_string)
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.factories.contains_key(&provider.to_lowercase())
    }

    /// The registered provider keys, sorted.
    pub fn providers(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Registers the providers compiled into this crate.
pub fn register_default_providers(registry: &mut RepositoryRegistry) {
    for (key, factory) in [
        (SQLITE_PROVIDER, Box::new(SqliteRepositoryFactory) as Box<dyn RepositoryFactory>),
        (POSTGRES_PROVIDER, Box::new(PostgresRepositoryFactory)),
    ] {
        if registry.contains(key) {
            tracing::warn!(provider = key, "Provider already registered; keeping the existing factory.");
            continue;
        }
        registry.factories.insert(key.to_string(), factory);
    }
}
