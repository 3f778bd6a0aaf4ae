//! Built-in repository providers and their connection-string handling.

use crate::error::DbError;
use crate::registry::RepositoryFactory;
use crate::repository::{Repository, SqlRepository};

pub const SQLITE_PROVIDER: &str = "sqlite";
pub const POSTGRES_PROVIDER: &str = "postgres";

/// Builds SQLite repositories.
///
/// Accepts a sqlx URL (`sqlite://data.db`, `sqlite::memory:`), an ADO-style
/// `Data Source=data.db;Version=3;` string, or a bare file path. File paths are
/// opened in read-write-create mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteRepositoryFactory;

impl RepositoryFactory for SqliteRepositoryFactory {
    fn build(&self, connection_string: &str) -> Result<Box<dyn Repository>, DbError> {
        let url = sqlite_url(connection_string)?;
        Ok(Box::new(SqlRepository::new(SQLITE_PROVIDER, url)))
    }
}

/// Builds PostgreSQL repositories from `postgres://` / `postgresql://` URLs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresRepositoryFactory;

impl RepositoryFactory for PostgresRepositoryFactory {
    fn build(&self, connection_string: &str) -> Result<Box<dyn Repository>, DbError> {
        let url = connection_string.trim();
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(invalid(
                POSTGRES_PROVIDER,
                "expected a postgres:// or postgresql:// URL",
            ));
        }
        Ok(Box::new(SqlRepository::new(POSTGRES_PROVIDER, url)))
    }
}

fn invalid(provider: &str, reason: &str) -> DbError {
    DbError::InvalidConnectionString {
        provider: provider.to_string(),
        reason: reason.to_string(),
    }
}

/// Normalizes the accepted SQLite connection-string forms into a sqlx URL.
pub fn sqlite_url(connection_string: &str) -> Result<String, DbError> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(invalid(SQLITE_PROVIDER, "connection string is empty"));
    }
    if trimmed.starts_with("sqlite:") {
        return Ok(trimmed.to_string());
    }

    let path = if trimmed.contains('=') {
        data_source(trimmed)
            .ok_or_else(|| invalid(SQLITE_PROVIDER, "missing 'Data Source' entry"))?
    } else {
        trimmed
    };

    if path.eq_ignore_ascii_case(":memory:") {
        return Ok("sqlite::memory:".to_string());
    }
    Ok(format!("sqlite://{path}?mode=rwc"))
}

/// Extracts the `Data Source` value from a `key=value;` connection string.
fn data_source(connection_string: &str) -> Option<&str> {
    connection_string
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("data source"))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_url_forms() {
        assert_eq!(sqlite_url("sqlite::memory:").unwrap(), "sqlite::memory:");
        assert_eq!(
            sqlite_url("sqlite://data.db?mode=ro").unwrap(),
            "sqlite://data.db?mode=ro"
        );
        assert_eq!(sqlite_url("data.db").unwrap(), "sqlite://data.db?mode=rwc");
        assert_eq!(
            sqlite_url("Data Source=/tmp/x.db;Version=3;").unwrap(),
            "sqlite:///tmp/x.db?mode=rwc"
        );
        assert_eq!(
            sqlite_url("data source=:memory:;").unwrap(),
            "sqlite::memory:"
        );
    }

    #[test]
    fn sqlite_url_rejects_unusable_strings() {
        assert!(matches!(
            sqlite_url("  "),
            Err(DbError::InvalidConnectionString { .. })
        ));
        assert!(matches!(
            sqlite_url("Version=3;"),
            Err(DbError::InvalidConnectionString { .. })
        ));
    }

    #[test]
    fn postgres_factory_requires_a_url() {
        assert!(PostgresRepositoryFactory.build("host=localhost").is_err());

        let repository = PostgresRepositoryFactory
            .build("postgres://user:pw@localhost/app")
            .unwrap();
        assert_eq!(repository.provider(), POSTGRES_PROVIDER);
    }

    #[test]
    fn sqlite_factory_builds_a_closed_repository() {
        let repository = SqliteRepositoryFactory.build("sqlite::memory:").unwrap();
        assert_eq!(repository.provider(), SQLITE_PROVIDER);
    }
}
