//! Database initialization and the handle used by request handlers to run queries.

use std::{
    fmt,
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::{Connection, InterruptHandle, Row, functions::FunctionFlags};
use tokio::{sync::oneshot, task::JoinError};

use crate::{Error, transaction::create_transaction_table};

/// The name of the SQL function `contains_ignoring_case(haystack, needle)`.
///
/// It is true when `haystack` contains `needle` after both are lowercased
/// with Unicode case folding. `needle` is matched literally.
pub(crate) const CONTAINS_IGNORING_CASE: &str = "contains_ignoring_case";

/// Create the application's tables if they do not exist and register the
/// SQL functions the queries rely on.
///
/// Must be called on every connection the application uses.
///
/// # Errors
/// Returns an error if a table cannot be created or a function cannot be registered.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_transaction_table(connection)?;
    register_functions(connection)?;

    Ok(())
}

fn register_functions(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.create_scalar_function(
        CONTAINS_IGNORING_CASE,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let haystack = context.get::<String>(0)?;
            let needle = context.get::<String>(1)?;

            Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
        },
    )
}

/// Read a non-negative integer column, such as a `COUNT`, as a `u64`.
///
/// # Errors
/// Returns [rusqlite::Error::IntegralValueOutOfRange] if the value is negative.
pub(crate) fn get_count(row: &Row, index: usize) -> Result<u64, rusqlite::Error> {
    let value: i64 = row.get(index)?;

    u64::try_from(value).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(index, value))
}

/// A shared database connection plus the timeout applied to each use of it.
///
/// Queries run on tokio's blocking thread pool so that SQLite calls do not
/// stall the async workers. Queries take turns on the connection, and the
/// timeout of a query starts once it holds the connection, so time spent
/// waiting behind other queries does not count against it.
#[derive(Clone)]
pub struct DatabaseHandle {
    connection: Arc<Mutex<Connection>>,
    interrupt_handle: Arc<InterruptHandle>,
    query_timeout: Duration,
}

impl fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseHandle")
            .field("connection", &self.connection)
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}

impl DatabaseHandle {
    /// Wrap `connection` so that every call to [DatabaseHandle::run] gives up
    /// after `query_timeout`.
    pub fn new(connection: Connection, query_timeout: Duration) -> Self {
        Self {
            interrupt_handle: Arc::new(connection.get_interrupt_handle()),
            connection: Arc::new(Mutex::new(connection)),
            query_timeout,
        }
    }

    /// Run `query` with exclusive access to the connection, giving up after
    /// the configured query timeout.
    ///
    /// # Errors
    /// See [DatabaseHandle::run_with_timeout].
    pub async fn run<T, F>(&self, query: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
    {
        self.run_with_timeout(self.query_timeout, query).await
    }

    /// Run `query` with exclusive access to the connection, giving up
    /// `timeout` after the connection was acquired.
    ///
    /// On timeout the SQL statement running on the connection is interrupted,
    /// which releases the connection and rolls back an open SQL transaction.
    /// Work outside of SQLite calls cannot be interrupted and keeps the
    /// connection until it finishes.
    ///
    /// # Errors
    /// Returns the error from `query`, or a:
    /// - [Error::QueryTimeout] if the query did not finish in time,
    /// - [Error::DatabaseLockError] if the connection mutex is poisoned,
    /// - or [Error::BackgroundTaskFailed] if the query panicked.
    pub async fn run_with_timeout<T, F>(&self, timeout: Duration, query: F) -> Result<T, Error>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, Error> + Send + 'static,
    {
        let connection = self.connection.clone();
        let (acquired_sender, acquired_receiver) = oneshot::channel();

        let mut task = tokio::task::spawn_blocking(move || {
            let mut connection = connection
                .lock()
                .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
                .map_err(|_| Error::DatabaseLockError)?;

            // The caller may have given up already.
            let _ = acquired_sender.send(());

            query(&mut connection)
        });

        // The sender is only dropped unsent if the task failed before taking the lock.
        if acquired_receiver.await.is_err() {
            return flatten_task_result(task.await);
        }

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(result) => flatten_task_result(result),
            Err(_) => {
                tracing::warn!("database query did not finish within {timeout:?}, interrupting it");
                self.interrupt_handle.interrupt();
                Err(Error::QueryTimeout)
            }
        }
    }
}

fn flatten_task_result<T>(result: Result<Result<T, Error>, JoinError>) -> Result<T, Error> {
    match result {
        Ok(result) => result,
        Err(join_error) => {
            tracing::error!("database task failed: {join_error}");
            Err(Error::BackgroundTaskFailed(join_error.to_string()))
        }
    }
}
