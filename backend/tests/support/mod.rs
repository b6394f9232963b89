//! Embedded PostgreSQL plumbing shared by the Diesel suites.
//!
//! Each test gets its own temporary database on a process-wide cluster,
//! migrated with the same embedded migrations the server applies at start-up.
//! Set `SKIP_TEST_CLUSTER=1` where the cluster cannot start; suites then log a
//! skip marker instead of failing.

use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tasting_backend::outbound::persistence::run_pending_migrations;

const CLUSTER_ATTEMPTS: u32 = 3;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// True when `SKIP_TEST_CLUSTER` holds `1`, `true` or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when allowed, otherwise fail loudly so CI breakage stays visible.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// The process-wide cluster, retrying transient start-up failures.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt < CLUSTER_ATTEMPTS => {
                eprintln!("pg-embed: attempt {attempt}/{CLUSTER_ATTEMPTS} failed: {error:?}");
                std::thread::sleep(CLUSTER_RETRY_DELAY * attempt);
                attempt += 1;
            }
            Err(error) => return Err(format!("{error:?}")),
        }
    }
}

/// A fresh database with the tasting schema applied.
///
/// Must run outside any async runtime; migrations use a blocking connection.
pub fn migrated_database() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster()?;
    let name = format!("tasting_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("create database: {err:?}"))?;
    run_pending_migrations(database.url()).map_err(|err| err.to_string())?;
    Ok(database)
}
