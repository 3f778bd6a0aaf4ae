use crate::builder::ActionBuilder;
use crate::error::ActionError;
use crate::Action;
use async_trait::async_trait;
use core_types::{ActionStatus, ParameterBag};
use database::{aggregate_statement_results, DbError, Repository, RepositoryCollection, StatementFailure};
use futures::future::join_all;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use uuid::Uuid;

/// The type key the built-in non-query action is registered under.
pub const NON_QUERY_TYPE: &str = "nonquery";

const CONNECTION_PARAMETER: &str = "connection";
const QUERIES_PARAMETER: &str = "queries";

/// Runs a list of SQL statements against one named connection.
///
/// Statements are treated as independent: each runs on its own task and they
/// complete in no particular order. Callers that need ordering (for example
/// `CREATE TABLE` followed by `INSERT`) must split them into separate actions.
pub struct NonQueryAction {
    id: Uuid,
    name: String,
    connection: String,
    repository: Weak<dyn Repository>,
    statements: Vec<String>,
    status: RwLock<ActionStatus>,
}

impl NonQueryAction {
    pub fn new(
        name: impl Into<String>,
        connection: impl Into<String>,
        repository: Weak<dyn Repository>,
        statements: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            connection: connection.into(),
            repository,
            statements,
            status: RwLock::new(ActionStatus::Pending),
        }
    }

    /// The name of the connection this action runs against.
    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    fn set_status(&self, status: ActionStatus) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Moves to `Started`, refusing to start twice concurrently.
    fn start(&self) -> Result<RunningGuard<'_>, ActionError> {
        let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
        if *status == ActionStatus::Started {
            return Err(ActionError::AlreadyRunning(self.name.clone()));
        }
        *status = ActionStatus::Started;
        Ok(RunningGuard { action: self })
    }

    /// Spawns one task per statement and waits for all of them.
    #[tracing::instrument(name = "non_query_execute", skip_all, fields(action = %self.name, statements = self.statements.len()))]
    async fn run_statements(&self, repository: Arc<dyn Repository>) -> Result<u64, DbError> {
        let tasks: Vec<_> = self
            .statements
            .iter()
            .map(|sql| {
                let repository = Arc::clone(&repository);
                let sql = sql.clone();
                tokio::spawn(async move { repository.run_statement(&sql).await })
            })
            .collect();

        let results = join_all(tasks).await.into_iter().zip(&self.statements).map(
            |(joined, sql)| {
                let result = joined.unwrap_or_else(|e| Err(StatementFailure::new(sql.as_str(), e).into()));
                if let Err(e) = &result {
                    tracing::warn!(sql = %sql, error = %e, "Statement failed.");
                }
                (sql.as_str(), result)
            },
        );

        aggregate_statement_results(results)
    }
}

/// Marks the action `Failed` if `execute` is dropped before it finished.
struct RunningGuard<'a> {
    action: &'a NonQueryAction,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        let mut status = self
            .action
            .status
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if *status == ActionStatus::Started {
            tracing::warn!(action = %self.action.name, "Execution cancelled before completion.");
            *status = ActionStatus::Failed;
        }
    }
}

#[async_trait]
impl Action for NonQueryAction {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn action_type(&self) -> &str {
        NON_QUERY_TYPE
    }

    fn status(&self) -> ActionStatus {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }

    async fn execute(&self) -> Result<u64, ActionError> {
        let _running = self.start()?;

        let Some(repository) = self.repository.upgrade() else {
            self.set_status(ActionStatus::Failed);
            return Err(ActionError::ConnectionReleased {
                action: self.name.clone(),
                connection: self.connection.clone(),
            });
        };

        match self.run_statements(repository).await {
            Ok(rows) => {
                self.set_status(ActionStatus::Complete);
                tracing::info!(action = %self.name, rows, "Action complete.");
                Ok(rows)
            }
            Err(source) => {
                self.set_status(ActionStatus::Failed);
                tracing::error!(
                    action = %self.name,
                    failures = source.statement_failures().len(),
                    "Action failed."
                );
                Err(ActionError::Execution {
                    action: self.name.clone(),
                    source,
                })
            }
        }
    }
}

/// Builds [`NonQueryAction`]s from a `connection` and a `queries` parameter.
#[derive(Debug, Default)]
pub struct NonQueryActionBuilder {
    name: String,
    parameters: ParameterBag,
}

impl NonQueryActionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single parameter to the pending build.
    pub fn add_parameter(
        &mut self,
        key: &str,
        value: impl Into<core_types::ParameterValue>,
    ) -> Result<&mut Self, ActionError> {
        self.parameters.add(key, value)?;
        Ok(self)
    }

    fn connection_name(&self) -> Result<String, ActionError> {
        self.parameters
            .get::<String>(CONNECTION_PARAMETER)
            .map_err(|_| ActionError::MissingConnectionParameter {
                action: self.name.clone(),
            })
    }

    fn statements(&self) -> Result<Vec<String>, ActionError> {
        match self.parameters.get::<Vec<String>>(QUERIES_PARAMETER) {
            Ok(statements) if !statements.is_empty() => Ok(statements),
            _ => Err(ActionError::MissingQueriesParameter {
                action: self.name.clone(),
            }),
        }
    }
}

impl ActionBuilder for NonQueryActionBuilder {
    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn set_parameters(&mut self, parameters: ParameterBag) {
        self.parameters = parameters;
    }

    fn build(&mut self, connections: &RepositoryCollection) -> Result<Box<dyn Action>, ActionError> {
        if self.name.trim().is_empty() {
            return Err(ActionError::InvalidArgument(
                "action name must not be empty".to_string(),
            ));
        }

        let connection = self.connection_name()?;
        let repository = connections.handle(&connection).map_err(|_| {
            ActionError::ConnectionNotFound {
                action: self.name.clone(),
                connection: connection.clone(),
            }
        })?;
        let statements = self.statements()?;

        tracing::debug!(action = %self.name, connection = %connection, statements = statements.len(), "Built non-query action.");
        Ok(Box::new(NonQueryAction::new(
            self.name.clone(),
            connection,
            repository,
            statements,
        )))
    }

    fn reset(&mut self) {
        self.name.clear();
        self.parameters.clear();
    }
}
