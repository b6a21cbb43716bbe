//! Connections and the pool they are checked out of.
//!
//! The collection engine only ever talks to the [`ConnectionPool`] and [`Connection`] traits. A
//! connection is checked out once per logical operation, wrapped in a [`PooledConnection`] guard,
//! and checked back in when that guard is dropped, whichever way the operation ends.


mod conn;
pub(crate) mod options;
mod pool;
mod pooled;

use std::fmt::Debug;

use futures_util::future::BoxFuture;

pub use self::{
    conn::StreamConnection,
    options::ConnectionPoolOptions,
    pool::TcpConnectionPool,
};
#[cfg(test)]
pub(crate) use self::conn::check_command_reply;
pub(crate) use self::pooled::PooledConnection;
use crate::{bson::Document, concern::WriteConcern, error::Result, wire::Message};

/// A connection to a server, exclusively owned by whoever checked it out.
pub trait Connection: Debug + Send {
    /// The largest message this connection may send, header included.
    fn max_message_length(&self) -> usize;

    /// Whether an earlier operation failed in a way that may have left the connection out of step
    /// with the server. Such a connection must not be reused.
    fn has_errored(&self) -> bool {
        false
    }

    /// Whether an operation was started and never finished, e.g. because its future was dropped
    /// while waiting for a reply. Such a connection must not be reused.
    fn is_executing(&self) -> bool {
        false
    }

    /// Sends a write message. When `write_concern` is acknowledged, a `getLastError` command
    /// carrying it is sent on the same connection right after the message and its reply is
    /// returned as the server sent it, without checking its `ok` field. `None` is returned
    /// exactly when the write concern is unacknowledged.
    fn send<'a>(
        &'a mut self,
        message: &'a Message,
        write_concern: &'a WriteConcern,
    ) -> BoxFuture<'a, Result<Option<Document>>>;

    /// Runs `command` against database `db` and returns the server's reply, failing with
    /// [`ErrorKind::Command`](crate::error::ErrorKind::Command) if the reply is not `ok`.
    fn run_command<'a>(
        &'a mut self,
        db: &'a str,
        command: Document,
    ) -> BoxFuture<'a, Result<Document>>;
}

/// A pool that hands out connections.
pub trait ConnectionPool: Debug + Send + Sync {
    /// Checks a connection out of the pool, waiting for one if the pool is exhausted.
    fn check_out(&self) -> BoxFuture<'_, Result<Box<dyn Connection>>>;

    /// Returns a connection to the pool. Connections that have errored or are still executing
    /// are closed rather than handed out again.
    fn check_in(&self, connection: Box<dyn Connection>);
}
