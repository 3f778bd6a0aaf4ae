use crate::error::{DbError, StatementFailure};
use async_trait::async_trait;
use core_types::ConnectionState;
use futures::future::join_all;
use sqlx::{AnyConnection, Connection};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// The capability contract for a single managed database connection.
///
/// A repository starts `Closed`. `open` and `close` are idempotent, and
/// `run_statement` opens the connection on demand. Implementations must wrap
/// driver failures in `DbError` so the driver error type never leaks.
#[async_trait]
pub trait Repository: Send + Sync {
    /// The provider key this repository was built by.
    fn provider(&self) -> &str;

    async fn state(&self) -> ConnectionState;

    /// Establishes the underlying connection. No-op when already open.
    async fn open(&self) -> Result<(), DbError>;

    /// Releases the underlying connection. No-op when already closed.
    async fn close(&self) -> Result<(), DbError>;

    /// Runs one SQL statement and returns the number of affected rows.
    async fn run_statement(&self, sql: &str) -> Result<u64, DbError>;

    /// Runs every statement concurrently and returns the summed row count.
    ///
    /// All statements run to completion even when some fail; the failures are
    /// then reported together as `DbError::AggregateExecutionFailure`.
    async fn run_statements(&self, statements: &[String]) -> Result<u64, DbError> {
        let results = join_all(statements.iter().map(|sql| self.run_statement(sql))).await;
        aggregate_statement_results(statements.iter().map(String::as_str).zip(results))
    }

    /// Releases the connection for good. Safe to call more than once.
    ///
    /// The default only closes. Implementations that reconnect on demand
    /// override it so that later `open` and `run_statement` calls fail with
    /// `DbError::Disposed`.
    async fn dispose(&self) -> Result<(), DbError> {
        self.close().await
    }
}

/// Folds per-statement results into a single outcome.
///
/// Succeeds with the sum of affected rows only when every statement
/// succeeded; otherwise collects every failure, converting non-statement
/// errors (e.g. a failed connect) into a `StatementFailure` for that statement.
pub fn aggregate_statement_results<'a, I>(results: I) -> Result<u64, DbError>
where
    I: IntoIterator<Item = (&'a str, Result<u64, DbError>)>,
{
    let mut total = 0u64;
    let mut failures = Vec::new();

    for (sql, result) in results {
        match result {
            Ok(rows) => total = total.saturating_add(rows),
            Err(DbError::StatementExecutionFailed(failure)) => failures.push(failure),
            Err(DbError::AggregateExecutionFailure(nested)) => failures.extend(nested),
            Err(other) => failures.push(StatementFailure::new(sql, other)),
        }
    }

    if failures.is_empty() {
        Ok(total)
    } else {
        Err(DbError::AggregateExecutionFailure(failures))
    }
}

/// A repository backed by one sqlx `AnyConnection`.
///
/// The connection slot is `None` while closed. Statements submitted
/// concurrently are serialized on the connection by the slot's mutex.
/// Once disposed, the repository never reconnects.
pub struct SqlRepository {
    provider: String,
    url: String,
    connection: Mutex<Option<AnyConnection>>,
    disposed: AtomicBool,
}

impl SqlRepository {
    /// Creates a closed repository. `url` must be a sqlx connection URL for a
    /// driver compiled into this crate.
    pub fn new(provider: impl Into<String>, url: impl Into<String>) -> Self {
        sqlx::any::install_default_drivers();
        Self {
            provider: provider.into(),
            url: url.into(),
            connection: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> Result<AnyConnection, DbError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(DbError::Disposed(self.provider.clone()));
        }
        tracing::debug!(provider = %self.provider, "Opening database connection.");
        AnyConnection::connect(&self.url)
            .await
            .map_err(|e| DbError::connection("open", e))
    }
}

#[async_trait]
impl Repository for SqlRepository {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn state(&self) -> ConnectionState {
        match *self.connection.lock().await {
            Some(_) => ConnectionState::Open,
            None => ConnectionState::Closed,
        }
    }

    async fn open(&self) -> Result<(), DbError> {
        let mut slot = self.connection.lock().await;
        if slot.is_none() {
            *slot = Some(self.connect().await?);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), DbError> {
        let mut slot = self.connection.lock().await;
        if let Some(connection) = slot.take() {
            tracing::debug!(provider = %self.provider, "Closing database connection.");
            connection
                .close()
                .await
                .map_err(|e| DbError::connection("close", e))?;
        }
        Ok(())
    }

    async fn run_statement(&self, sql: &str) -> Result<u64, DbError> {
        let mut slot = self.connection.lock().await;
        if slot.is_none() {
            *slot = Some(self.connect().await?);
        }
        let Some(connection) = slot.as_mut() else {
            return Err(DbError::connection("open", "connection slot is empty"));
        };

        let result = sqlx::query(sql)
            .execute(connection)
            .await
            .map_err(|e| StatementFailure::new(sql, e))?;

        tracing::debug!(rows = result.rows_affected(), sql, "Statement executed.");
        Ok(result.rows_affected())
    }

    async fn dispose(&self) -> Result<(), DbError> {
        // Flag and slot change under one lock so no statement reconnects in between.
        let connection = {
            let mut slot = self.connection.lock().await;
            self.disposed.store(true, Ordering::Release);
            slot.take()
        };

        if let Some(connection) = connection {
            tracing::debug!(provider = %self.provider, "Disposing database connection.");
            connection
                .close()
                .await
                .map_err(|e| DbError::connection("close", e))?;
        }
        Ok(())
    }
}
