//! Shared helpers for integration tests that need PostgreSQL.
//!
//! Database reset uses `postgres` so `DROP DATABASE` runs outside any Diesel
//! transaction; schema setup runs the embedded Diesel migrations so the test
//! schema never drifts from `backend/migrations`.

pub mod pg_embed;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ledger_backend::domain::ports::PayerRepositoryError;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Render a `postgres` error with the SQLSTATE and server message.
///
/// The `Display` form collapses database errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when `SKIP_TEST_CLUSTER` is set, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Drop and recreate `name` on `cluster`.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<(), PayerRepositoryError> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls)
        .map_err(|err| PayerRepositoryError::connection(format_postgres_error(&err)))?;
    // Separate statements: a multi-statement batch runs as one transaction,
    // which `DROP DATABASE` refuses.
    for statement in [
        format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"),
        format!("CREATE DATABASE \"{name}\""),
    ] {
        client
            .batch_execute(&statement)
            .map_err(|err| PayerRepositoryError::query(format_postgres_error(&err)))?;
    }
    Ok(())
}

/// Run every pending migration against `url`.
pub fn migrate_schema(url: &str) -> Result<(), PayerRepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| PayerRepositoryError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PayerRepositoryError::query(format!("migration: {err:?}")))?;
    Ok(())
}
