//! A bounded pool of SQLite connections and the database schema.
//!
//! The pool is constructed once at start up and passed to the request
//! handlers through [crate::AppState]. At most `size` connections are checked
//! out at a time; further callers wait in line for a connection to be
//! returned rather than being rejected.

use std::{
    ops::{Deref, DerefMut},
    path::Path,
    sync::{Arc, Mutex},
    time::Duration,
};

use rusqlite::Connection;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::{Error, expense::create_expense_table, snapshot::create_snapshot_table};

/// The number of connections opened when no pool size is configured.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Create all of the application's tables.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_expense_table(connection)?;
    create_snapshot_table(connection)?;

    Ok(())
}

/// A fixed-size pool of SQLite connections.
///
/// Cloning the pool is cheap and every clone refers to the same connections.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

#[derive(Debug)]
struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    size: usize,
}

impl ConnectionPool {
    /// Open `size` connections to the SQLite database at `path` and initialize its tables.
    ///
    /// The database is put into WAL mode so that readers do not block the
    /// writer. A `size` of zero is treated as one.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self, Error> {
        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);

        for _ in 0..size {
            let connection = Connection::open(path.as_ref())?;
            connection.busy_timeout(BUSY_TIMEOUT)?;
            connection.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
            connections.push(connection);
        }

        initialize(&connections[0])?;

        tracing::info!(
            "Opened {size} connection(s) to the database at {}",
            path.as_ref().display()
        );

        Ok(Self::from_connections(connections))
    }

    /// Create a pool backed by a single in-memory database.
    ///
    /// Every in-memory connection is its own database, so this pool only ever
    /// holds one connection.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self, Error> {
        let connection = Connection::open_in_memory()?;
        initialize(&connection)?;

        Ok(Self::from_connections(vec![connection]))
    }

    fn from_connections(connections: Vec<Connection>) -> Self {
        let size = connections.len();

        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(connections),
                permits: Arc::new(Semaphore::new(size)),
                size,
            }),
        }
    }

    /// The total number of connections managed by the pool.
    pub fn size(&self) -> usize {
        self.inner.size
    }

    /// The number of connections that can be checked out without waiting.
    pub fn available(&self) -> usize {
        self.inner.permits.available_permits()
    }

    /// Check out a connection, waiting for one to be returned if all of them are in use.
    ///
    /// The connection goes back to the pool when the returned guard is dropped.
    ///
    /// # Errors
    /// Returns a [Error::PoolClosed] if the pool has been closed and a
    /// [Error::DatabaseLockError] if the lock on the idle connections is poisoned.
    pub async fn get(&self) -> Result<PooledConnection, Error> {
        let permit = self
            .inner
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::PoolClosed)?;

        let connection = self
            .inner
            .idle
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?
            .pop()
            .ok_or(Error::PoolClosed)?;

        Ok(PooledConnection {
            connection: Some(connection),
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Stop handing out connections and close the idle ones.
    ///
    /// Connections that are checked out are closed when they are returned.
    pub fn close(&self) {
        self.inner.permits.close();

        match self.inner.idle.lock() {
            Ok(mut idle) => idle.clear(),
            Err(error) => tracing::error!("could not close idle connections: {error}"),
        }

        tracing::info!("Closed the database connection pool");
    }
}

/// A connection checked out of a [ConnectionPool].
#[derive(Debug)]
pub struct PooledConnection {
    connection: Option<Connection>,
    pool: Arc<PoolInner>,
    // Released after the connection is back in the idle list.
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("connection is only taken when the guard is dropped")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("connection is only taken when the guard is dropped")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        if self.pool.permits.is_closed() {
            return;
        }

        match self.pool.idle.lock() {
            Ok(mut idle) => idle.push(connection),
            Err(error) => tracing::error!("could not return connection to the pool: {error}"),
        }
    }
}
