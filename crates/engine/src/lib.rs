//! # SqlExec Engine
//!
//! Wires the declarative pieces together: connection records become
//! repositories, action records become actions, and the resulting
//! `ActionCollection` is run in declaration order.

use crate::error::EngineError;
use actions::{ActionCollection, ActionRegistry};
use chrono::Utc;
use configuration::Configuration;
use core_types::{ActionRecord, ConnectionRecord};
use database::{RepositoryCollection, RepositoryRegistry};
use std::sync::Arc;

pub mod error;
pub mod report;

pub use report::{ActionOutcome, ActionReport, RunPolicy, RunReport};

/// Builds one repository per connection record.
pub fn build_connections(
    records: &[ConnectionRecord],
    providers: &RepositoryRegistry,
) -> Result<RepositoryCollection, EngineError> {
    let mut connections = RepositoryCollection::new();
    for record in records {
        let wrap = |source| EngineError::Connection {
            name: record.name.clone(),
            source,
        };
        let repository = providers
            .build(&record.provider, &record.connection_string)
            .map_err(wrap)?;
        connections.add(&record.name, repository).map_err(wrap)?;
    }
    Ok(connections)
}

/// The built actions of one document together with the connections they use.
pub struct Engine {
    connections: Arc<RepositoryCollection>,
    actions: ActionCollection,
}

impl Engine {
    /// Builds every connection and action of a validated document, using the
    /// built-in action types.
    pub fn from_configuration(
        configuration: &Configuration,
        providers: &RepositoryRegistry,
    ) -> Result<Self, EngineError> {
        let connections = build_connections(&configuration.connections, providers)?;
        let mut registry = ActionRegistry::with_defaults(Arc::new(connections));
        Self::from_records(&configuration.actions, &mut registry)
    }

    /// Builds the actions with a caller-prepared registry, for documents that
    /// use custom action types.
    pub fn from_records(
        records: &[ActionRecord],
        registry: &mut ActionRegistry,
    ) -> Result<Self, EngineError> {
        let mut actions = ActionCollection::new();
        for record in records {
            let wrap = |source| EngineError::ActionBuild {
                name: record.name.clone(),
                source,
            };
            let action = registry.build_record(record).map_err(wrap)?;
            actions.add(action).map_err(wrap)?;
        }

        tracing::info!(
            connections = registry.connections().len(),
            actions = actions.len(),
            "Engine assembled."
        );
        Ok(Self {
            connections: Arc::clone(registry.connections()),
            actions,
        })
    }

    pub fn actions(&self) -> &ActionCollection {
        &self.actions
    }

    pub fn connections(&self) -> &RepositoryCollection {
        &self.connections
    }

    /// Runs every action once, sequentially, in insertion order.
    ///
    /// Only statements inside a single action run concurrently; actions never
    /// overlap, so a later action observes everything an earlier one applied.
    pub async fn run(&self, policy: RunPolicy) -> RunReport {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(self.actions.len());
        let mut halted = false;

        for action in self.actions.iter() {
            let outcome = if halted {
                ActionOutcome::Skipped
            } else {
                tracing::info!(action = action.name(), action_type = action.action_type(), "Running action.");
                match action.execute().await {
                    Ok(rows) => ActionOutcome::Completed { rows },
                    Err(e) => {
                        tracing::error!(action = action.name(), error = %e, "Action failed.");
                        halted = policy == RunPolicy::StopOnFailure;
                        ActionOutcome::Failed(e)
                    }
                }
            };

            reports.push(ActionReport {
                name: action.name().to_string(),
                action_type: action.action_type().to_string(),
                status: action.status(),
                outcome,
            });
        }

        RunReport {
            started_at,
            finished_at: Utc::now(),
            actions: reports,
        }
    }

    /// Closes every connection. Safe to call more than once.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let failures = self.connections.close_all().await;
        if failures.is_empty() {
            tracing::info!("All connections closed.");
            Ok(())
        } else {
            Err(EngineError::Shutdown(
                failures
                    .into_iter()
                    .map(|(name, e)| format!("{name} ({e})"))
                    .collect(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actions::ActionError;
    use core_types::{ActionStatus, ParameterValue};
    use database::DbError;
    use std::collections::BTreeMap;

    fn memory_connection(name: &str) -> ConnectionRecord {
        ConnectionRecord {
            name: name.to_string(),
            provider: "sqlite".to_string(),
            connection_string: "sqlite::memory:".to_string(),
        }
    }

    fn non_query(name: &str, statements: &[&str]) -> ActionRecord {
        ActionRecord {
            action_type: "nonquery".to_string(),
            name: name.to_string(),
            parameters: BTreeMap::from([
                ("connection".to_string(), ParameterValue::from("local")),
                (
                    "queries".to_string(),
                    ParameterValue::from(statements.to_vec()),
                ),
            ]),
        }
    }

    fn engine(actions: &[ActionRecord]) -> Engine {
        let providers = RepositoryRegistry::with_defaults();
        let connections = build_connections(&[memory_connection("local")], &providers).unwrap();
        let mut registry = ActionRegistry::with_defaults(Arc::new(connections));
        Engine::from_records(actions, &mut registry).ok().unwrap()
    }

    #[test]
    fn unknown_provider_names_the_connection() {
        let mut record = memory_connection("warehouse");
        record.provider = "oracle".to_string();

        let err = build_connections(&[record], &RepositoryRegistry::with_defaults())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            EngineError::Connection { ref name, source: DbError::ProviderNotFound(_) } if name == "warehouse"
        ));
    }

    #[test]
    fn duplicate_action_names_fail_the_build() {
        let providers = RepositoryRegistry::with_defaults();
        let connections = build_connections(&[memory_connection("local")], &providers).unwrap();
        let mut registry = ActionRegistry::with_defaults(Arc::new(connections));

        let records = [non_query("a", &["SELECT 1"]), non_query("a", &["SELECT 2"])];
        let err = Engine::from_records(&records, &mut registry).err().unwrap();
        assert!(matches!(
            err,
            EngineError::ActionBuild { source: ActionError::DuplicateActionName(_), .. }
        ));
    }

    #[tokio::test]
    async fn actions_run_in_order_and_stop_on_failure() {
        let engine = engine(&[
            non_query("create", &["CREATE TABLE t (id INTEGER)"]),
            non_query("broken", &["INSERT INTO missing VALUES (1)", "INSERT INTO t VALUES (1)"]),
            non_query("after", &["INSERT INTO t VALUES (2)"]),
        ]);

        let report = engine.run(RunPolicy::StopOnFailure).await;
        assert!(!report.succeeded());
        assert_eq!(report.get("create").unwrap().status, ActionStatus::Complete);

        let broken = report.get("broken").unwrap();
        assert_eq!(broken.status, ActionStatus::Failed);
        assert_eq!(broken.failed_statements(), vec!["INSERT INTO missing VALUES (1)"]);

        let after = report.get("after").unwrap();
        assert!(matches!(after.outcome, ActionOutcome::Skipped));
        assert_eq!(after.status, ActionStatus::Pending);

        engine.shutdown().await.unwrap();
        engine.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn continue_policy_runs_everything() {
        let engine = engine(&[
            non_query("create", &["CREATE TABLE t (id INTEGER)"]),
            non_query("broken", &["INSERT INTO missing VALUES (1)"]),
            non_query("fill", &["INSERT INTO t VALUES (1)", "INSERT INTO t VALUES (2)"]),
        ]);

        let report = engine.run(RunPolicy::ContinueOnFailure).await;
        assert_eq!(report.failures().count(), 1);
        assert_eq!(report.get("fill").unwrap().status, ActionStatus::Complete);
        assert_eq!(report.total_rows(), 2);
    }

    #[tokio::test]
    async fn actions_fail_after_shutdown() {
        let engine = engine(&[non_query("create", &["CREATE TABLE t (id INTEGER)"])]);
        engine.shutdown().await.unwrap();

        let report = engine.run(RunPolicy::StopOnFailure).await;
        let create = report.get("create").unwrap();
        assert_eq!(create.status, ActionStatus::Failed);
        assert_eq!(create.failed_statements(), vec!["CREATE TABLE t (id INTEGER)"]);
    }
}
