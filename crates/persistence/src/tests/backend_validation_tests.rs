// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend validation tests for multi-database support.
//!
//! These tests validate that the ledger schema behaves the same on
//! `MariaDB` as on `SQLite`: migrations apply, constraints fire, and the
//! conditional capacity update holds its bounds.
//!
//! ## Test Execution
//!
//! - `SQLite` behavior is covered by the rest of this suite via `cargo test`
//! - MariaDB/MySQL tests are marked `#[ignore]` and run only via `cargo xtask test-mariadb`
//!
//! ## Infrastructure Requirements
//!
//! `MariaDB` tests require:
//! - `DATABASE_URL` environment variable (set by xtask)
//! - `PARKLEDGER_TEST_BACKEND=mariadb` environment variable
//! - Running `MariaDB` instance (provisioned by xtask)
//!
//! Tests fail fast if required infrastructure is missing. The database is
//! shared between tests, so each test works on rows it creates itself.

use diesel::MysqlConnection;
use diesel::prelude::*;
use parkledger_domain::VehicleClass;
use std::env;

use super::{activate, create_test_session_draft, create_test_slot_draft};
use crate::backend::mysql;
use crate::{LedgerStore, Persistence, PersistenceError};

/// Helper to get the `MariaDB` connection URL from environment.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set, indicating missing infrastructure.
fn get_mariadb_url() -> String {
    env::var("DATABASE_URL")
        .expect("DATABASE_URL not set - MariaDB tests must be run via `cargo xtask test-mariadb`")
}

/// Helper to verify we're running in the `MariaDB` test environment.
///
/// # Panics
///
/// Panics if `PARKLEDGER_TEST_BACKEND` is not set to `mariadb`.
fn verify_mariadb_test_environment() {
    let backend = env::var("PARKLEDGER_TEST_BACKEND").expect(
        "PARKLEDGER_TEST_BACKEND not set - MariaDB tests must be run via `cargo xtask test-mariadb`",
    );
    assert_eq!(backend, "mariadb", "PARKLEDGER_TEST_BACKEND must be 'mariadb'");
}

fn mariadb_persistence() -> Persistence {
    verify_mariadb_test_environment();
    Persistence::new_with_mysql(&get_mariadb_url()).expect("Failed to initialize MariaDB database")
}

fn insert_active_mariadb_slot(persistence: &mut Persistence) -> i64 {
    persistence
        .in_transaction(|store| {
            let slot_id: i64 = store.insert_slot(&create_test_slot_draft())?;
            activate(store, slot_id)?;
            Ok::<i64, PersistenceError>(slot_id)
        })
        .expect("Failed to create slot")
}

/// A vehicle number no other test run will have used.
fn unique_vehicle(prefix: &str, slot_id: i64) -> String {
    format!("{prefix}{slot_id:08}")
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_connection() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = MysqlConnection::establish(&url);
    assert!(
        result.is_ok(),
        "Failed to connect to MariaDB: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_migrations_apply_cleanly() {
    verify_mariadb_test_environment();
    let url = get_mariadb_url();

    let result = mysql::initialize_database(&url);
    assert!(
        result.is_ok(),
        "Failed to initialize MariaDB and run migrations: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_foreign_key_enforcement() {
    let mut persistence = mariadb_persistence();

    let result = persistence.verify_foreign_key_enforcement();
    assert!(
        result.is_ok(),
        "Foreign key enforcement verification failed: {:?}",
        result.err()
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_capacity_ceiling() {
    let mut persistence = mariadb_persistence();
    let slot_id: i64 = insert_active_mariadb_slot(&mut persistence);

    let results: Vec<bool> = (0..3)
        .map(|_| {
            persistence
                .in_transaction(|store| store.try_occupy(slot_id, VehicleClass::Car))
                .expect("try_occupy failed")
        })
        .collect();

    assert_eq!(results, vec![true, true, false]);
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_one_checked_in_session_per_vehicle() {
    let mut persistence = mariadb_persistence();
    let first_slot: i64 = insert_active_mariadb_slot(&mut persistence);
    let second_slot: i64 = insert_active_mariadb_slot(&mut persistence);
    let vehicle: String = unique_vehicle("MB", first_slot);

    persistence
        .in_transaction(|store| {
            store.insert_session(&create_test_session_draft(
                first_slot,
                &vehicle,
                VehicleClass::Car,
            ))
        })
        .expect("First session should open");

    let duplicate = persistence.in_transaction(|store| {
        store.insert_session(&create_test_session_draft(
            second_slot,
            &vehicle,
            VehicleClass::Car,
        ))
    });

    assert!(
        matches!(duplicate, Err(PersistenceError::UniqueViolation(_))),
        "The generated column key should reject a second open session: {duplicate:?}"
    );
}

#[test]
#[ignore = "requires MariaDB via cargo xtask test-mariadb"]
fn test_mariadb_transaction_rollback() {
    let mut persistence = mariadb_persistence();
    let slot_id: i64 = insert_active_mariadb_slot(&mut persistence);

    let result: Result<(), PersistenceError> = persistence.in_transaction(|store| {
        store.try_occupy(slot_id, VehicleClass::Car)?;
        Err(PersistenceError::InvariantViolation(String::from(
            "abort after occupying",
        )))
    });
    assert!(result.is_err());

    let slot = persistence
        .read(|store| store.find_slot(slot_id))
        .expect("Failed to read slot")
        .expect("Slot should exist");
    assert_eq!(slot.occupied(VehicleClass::Car), 0);
}
