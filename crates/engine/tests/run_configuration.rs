use configuration::load_configuration;
use core_types::ActionStatus;
use database::{Repository, RepositoryRegistry, SqlRepository};
use engine::{ActionOutcome, Engine, RunPolicy};
use std::path::Path;
use tempfile::TempDir;

fn write_document(dir: &TempDir, database: &Path, actions: &str) -> std::path::PathBuf {
    let document = format!(
        r#"
version: "1.0.0"
connections:
  - name: local
    provider: sqlite
    connection_string: "{}"
actions:
{actions}
"#,
        database.display()
    );
    let path = dir.path().join("actions.yaml");
    std::fs::write(&path, document).unwrap();
    path
}

async fn count_rows(database: &Path) -> u64 {
    let repository = SqlRepository::new("sqlite", format!("sqlite://{}", database.display()));
    let rows = repository
        .run_statement("UPDATE people SET name = name")
        .await
        .unwrap();
    repository.close().await.unwrap();
    rows
}

const ACTIONS: &str = r#"
  - action: nonquery
    name: create
    parameters:
      connection: local
      queries:
        - CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL)
  - action: nonquery
    name: seed
    parameters:
      connection: local
      queries:
        - INSERT INTO people (id, name) VALUES (1, 'ada')
        - INSERT INTO people (id, name) VALUES (2, 'grace')
        - INSERT INTO people (id, name) VALUES (3, 'linus')
  - action: nonquery
    name: broken
    parameters:
      connection: local
      queries:
        - INSERT INTO nowhere (id) VALUES (1)
  - action: nonquery
    name: more
    parameters:
      connection: local
      queries:
        - INSERT INTO people (id, name) VALUES (4, 'barbara')
"#;

#[tokio::test]
async fn document_runs_against_sqlite_and_stops_at_first_failure() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("people.db");
    let path = write_document(&dir, &database, ACTIONS);

    let configuration = load_configuration(&path).unwrap();
    assert!(!configuration.run.continue_on_error);

    let engine = Engine::from_configuration(&configuration, &RepositoryRegistry::with_defaults())
        .ok()
        .unwrap();
    let report = engine.run(RunPolicy::StopOnFailure).await;
    engine.shutdown().await.unwrap();

    assert!(!report.succeeded());
    assert_eq!(report.total_rows(), 3);
    assert_eq!(report.get("seed").unwrap().status, ActionStatus::Complete);
    assert_eq!(report.get("broken").unwrap().status, ActionStatus::Failed);
    assert!(matches!(
        report.get("more").unwrap().outcome,
        ActionOutcome::Skipped
    ));
    assert!(report.finished_at >= report.started_at);

    assert_eq!(count_rows(&database).await, 3);
}

#[tokio::test]
async fn continue_policy_runs_actions_after_a_failure() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("people.db");
    let path = write_document(&dir, &database, ACTIONS);

    let configuration = load_configuration(&path).unwrap();
    let engine = Engine::from_configuration(&configuration, &RepositoryRegistry::with_defaults())
        .ok()
        .unwrap();
    let report = engine.run(RunPolicy::ContinueOnFailure).await;
    engine.shutdown().await.unwrap();

    let failed: Vec<_> = report.failures().map(|r| r.name.as_str()).collect();
    assert_eq!(failed, vec!["broken"]);
    assert_eq!(report.get("more").unwrap().status, ActionStatus::Complete);
    assert_eq!(report.total_rows(), 4);

    assert_eq!(count_rows(&database).await, 4);
}

#[tokio::test]
async fn action_on_unknown_connection_fails_to_build() {
    let dir = TempDir::new().unwrap();
    let database = dir.path().join("people.db");
    let path = write_document(
        &dir,
        &database,
        r#"
  - action: nonquery
    name: orphan
    parameters:
      connection: elsewhere
      queries:
        - SELECT 1
"#,
    );

    let configuration = load_configuration(&path).unwrap();
    let err = Engine::from_configuration(&configuration, &RepositoryRegistry::with_defaults())
        .err()
        .unwrap();
    assert!(err.to_string().contains("orphan"));
}
