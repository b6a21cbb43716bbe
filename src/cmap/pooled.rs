use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use derive_where::derive_where;
use futures_util::future::{self, BoxFuture, FutureExt};

use super::{Connection, ConnectionPool};
use crate::{
    bson::Document,
    concern::WriteConcern,
    error::{Error, Result},
    trace::CONNECTION_TRACING_EVENT_TARGET,
    wire::Message,
};

/// A connection checked out of a [`ConnectionPool`]. The connection is checked back into the pool
/// when this value is dropped, so it is released on every exit path of the operation that holds
/// it. This type derefs into [`Connection`].
#[derive_where(Debug)]
pub(crate) struct PooledConnection {
    connection: Box<dyn Connection>,

    #[derive_where(skip)]
    pool: Arc<dyn ConnectionPool>,
}

impl PooledConnection {
    /// Checks a connection out of `pool`.
    pub(crate) async fn check_out(pool: &Arc<dyn ConnectionPool>) -> Result<Self> {
        let connection = pool.check_out().await?;
        tracing::trace!(
            target: CONNECTION_TRACING_EVENT_TARGET,
            maxMessageLength = connection.max_message_length(),
            "Connection checked out"
        );
        Ok(Self {
            connection,
            pool: pool.clone(),
        })
    }
}

impl Deref for PooledConnection {
    type Target = dyn Connection;

    fn deref(&self) -> &Self::Target {
        self.connection.as_ref()
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection.as_mut()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let connection = std::mem::replace(&mut self.connection, Box::new(CheckedIn));
        tracing::trace!(
            target: CONNECTION_TRACING_EVENT_TARGET,
            "Connection checked in"
        );
        self.pool.check_in(connection);
    }
}

/// Stands in for a connection that has already been returned to its pool.
#[derive(Debug)]
struct CheckedIn;

impl Connection for CheckedIn {
    fn max_message_length(&self) -> usize {
        0
    }

    fn send<'a>(
        &'a mut self,
        _message: &'a Message,
        _write_concern: &'a WriteConcern,
    ) -> BoxFuture<'a, Result<Option<Document>>> {
        future::ready(Err(checked_in_error())).boxed()
    }

    fn run_command<'a>(
        &'a mut self,
        _db: &'a str,
        _command: Document,
    ) -> BoxFuture<'a, Result<Document>> {
        future::ready(Err(checked_in_error())).boxed()
    }
}

fn checked_in_error() -> Error {
    Error::internal("connection used after being checked back into its pool")
}
