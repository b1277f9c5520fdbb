// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the parking ledger.
//!
//! This crate stores slots, the per-class capacity ledger, sessions, dues,
//! staff assignments and audit events. It is built on Diesel and supports
//! multiple database backends.
//!
//! ## Database Backend Support
//!
//! - **`SQLite`** (default): Used for development, unit tests, and integration tests
//! - **`MariaDB`/`MySQL`**: Validated via explicit opt-in tests
//!
//! To run `MySQL` validation tests:
//! ```bash
//! cargo xtask test-mariadb
//! ```
//!
//! ## Transactions
//!
//! Every ledger operation runs inside [`Persistence::in_transaction`]. On
//! `SQLite` that is an `IMMEDIATE` transaction, so the write lock is taken
//! before the first read and two operations on the same slot serialize.
//! The capacity counter itself is only ever moved by a conditional update,
//! which holds the bound on either backend regardless of isolation level.
//!
//! ## Migration Strategy
//!
//! Due to `SQL` syntax differences between backends, we maintain separate
//! migration directories:
//!
//! - `migrations/`: `SQLite`-specific (default)
//! - `migrations_mysql/`: `MySQL`/`MariaDB`-specific
//!
//! Both produce identical schema semantics but use backend-appropriate syntax.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::{Connection, MysqlConnection, SqliteConnection};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Macro to generate monomorphic backend-specific query/mutation functions.
///
/// This macro generates two separate functions from a single function body:
/// - One suffixed with `_sqlite` taking `&mut SqliteConnection`
/// - One suffixed with `_mysql` taking `&mut MysqlConnection`
///
/// Diesel's type system requires concrete backend types at compile time and
/// cannot handle generic backend functions.
///
/// # Constraints
///
/// - The macro ONLY duplicates function bodies and substitutes connection types
/// - A generated body cannot call another generated function, since it has
///   no way to name its own suffix
/// - Backend dispatch happens exclusively in [`store::LedgerStore`] impls
///
/// # Usage
///
/// ```ignore
/// backend_fn! {
///     pub fn my_query(conn: &mut _, param: i64) -> Result<String, PersistenceError> {
///         diesel_schema::table::table
///             .filter(diesel_schema::table::id.eq(param))
///             .first::<String>(conn)
///             .map_err(Into::into)
///     }
/// }
/// ```
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            // Generate SQLite version
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            // Generate MySQL version
            $(#[$meta])*
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use data_models::{AuditRecord, CapacityRow, ClassDrift};
pub use error::PersistenceError;
pub use store::{LedgerStore, VehicleTotals};

use backend::PersistenceBackend;

/// Backend-specific database connection.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    Mysql(MysqlConnection),
}

/// Persistence adapter for the ledger.
///
/// Backend selection happens once at construction time and is transparent
/// to callers, who only ever see a [`LedgerStore`].
pub struct Persistence {
    pub(crate) conn: BackendConnection,
}

/// Carries either a database failure raised by Diesel itself (commit,
/// rollback, begin) or the operation's own error out of a transaction.
enum TxFailure<E> {
    Diesel(diesel::result::Error),
    Op(E),
}

impl<E> From<diesel::result::Error> for TxFailure<E> {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

impl<E: From<PersistenceError>> TxFailure<E> {
    fn into_inner(self) -> E {
        match self {
            Self::Diesel(error) => E::from(PersistenceError::from(error)),
            Self::Op(error) => error,
        }
    }
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique shared in-memory database, so tests are
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// Several adapters may open the same file; WAL mode and the busy
    /// timeout let them take turns on the write lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Creates a new persistence adapter with a `MySQL`/`MariaDB` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_mysql(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::initialize_database(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Mysql(conn),
        })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.verify_foreign_key_enforcement(),
            BackendConnection::Mysql(conn) => conn.verify_foreign_key_enforcement(),
        }
    }

    /// Runs `f` as one write transaction.
    ///
    /// Everything `f` writes commits together when it returns `Ok`, and
    /// nothing is kept when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a database error if the
    /// transaction could not be started or committed.
    pub fn in_transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut dyn LedgerStore) -> Result<T, E>,
    {
        let result: Result<T, TxFailure<E>> = match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                conn.immediate_transaction(|conn| f(conn).map_err(TxFailure::Op))
            }
            BackendConnection::Mysql(conn) => {
                conn.transaction(|conn| f(conn).map_err(TxFailure::Op))
            }
        };
        result.map_err(TxFailure::into_inner)
    }

    /// Runs `f` as a read-only transaction, giving it a consistent view.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`, or a database error.
    pub fn read<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        E: From<PersistenceError>,
        F: FnOnce(&mut dyn LedgerStore) -> Result<T, E>,
    {
        let result: Result<T, TxFailure<E>> = match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                conn.transaction(|conn| f(conn).map_err(TxFailure::Op))
            }
            BackendConnection::Mysql(conn) => {
                conn.transaction(|conn| f(conn).map_err(TxFailure::Op))
            }
        };
        result.map_err(TxFailure::into_inner)
    }
}
