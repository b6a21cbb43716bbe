use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use tokio::{net::TcpStream, sync::Semaphore};

use super::{conn::StreamConnection, options::ConnectionPoolOptions, Connection, ConnectionPool};
use crate::{
    error::{ErrorKind, Result},
    trace::CONNECTION_TRACING_EVENT_TARGET,
    wire::DEFAULT_MAX_MESSAGE_LENGTH,
};

pub(crate) const DEFAULT_ADDRESS: &str = "localhost:27017";
pub(crate) const DEFAULT_MAX_POOL_SIZE: u32 = 10;

/// A [`ConnectionPool`] of TCP connections to a single server.
///
/// Connections are opened lazily on check-out when no idle connection is available and are kept
/// idle once checked back in, unless they errored or were dropped mid-operation, in which case
/// they are closed. The number of connections checked out at once is bounded by
/// `max_pool_size`. The pool does not monitor the server or the health of idle connections.
#[derive(Debug)]
pub struct TcpConnectionPool {
    address: String,
    max_message_length: usize,
    idle: Mutex<Vec<Box<dyn Connection>>>,
    permits: Arc<Semaphore>,
}

impl TcpConnectionPool {
    /// Creates a pool. No connection is opened until the first check-out.
    pub fn new(options: ConnectionPoolOptions) -> Self {
        let max_pool_size = options.max_pool_size.unwrap_or(DEFAULT_MAX_POOL_SIZE);
        tracing::debug!(
            target: CONNECTION_TRACING_EVENT_TARGET,
            address = options.address.as_deref().unwrap_or(DEFAULT_ADDRESS),
            maxPoolSize = max_pool_size,
            "Connection pool created"
        );

        Self {
            address: options
                .address
                .unwrap_or_else(|| DEFAULT_ADDRESS.to_string()),
            max_message_length: options
                .max_message_length
                .unwrap_or(DEFAULT_MAX_MESSAGE_LENGTH),
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(max_pool_size as usize)),
        }
    }

    /// The address connections are opened to.
    pub fn address(&self) -> &str {
        &self.address
    }

    fn take_idle(&self) -> Option<Box<dyn Connection>> {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
    }

    async fn establish(&self) -> Result<Box<dyn Connection>> {
        let permit = self.permits.acquire().await.map_err(|_| ErrorKind::ConnectionPool {
            message: "the connection pool has been closed".to_string(),
        })?;

        let connection = match self.take_idle() {
            Some(connection) => connection,
            None => {
                let stream = TcpStream::connect(&self.address).await?;
                stream.set_nodelay(true)?;
                tracing::debug!(
                    target: CONNECTION_TRACING_EVENT_TARGET,
                    address = self.address.as_str(),
                    "Connection created"
                );
                Box::new(StreamConnection::new(stream, self.max_message_length))
            }
        };

        // Returned by `check_in`.
        permit.forget();
        Ok(connection)
    }
}

impl ConnectionPool for TcpConnectionPool {
    fn check_out(&self) -> BoxFuture<'_, Result<Box<dyn Connection>>> {
        self.establish().boxed()
    }

    fn check_in(&self, connection: Box<dyn Connection>) {
        if connection.has_errored() || connection.is_executing() {
            tracing::debug!(
                target: CONNECTION_TRACING_EVENT_TARGET,
                address = self.address.as_str(),
                errored = connection.has_errored(),
                executing = connection.is_executing(),
                "Connection closed"
            );
            drop(connection);
        } else {
            self.idle
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(connection);
        }
        self.permits.add_permits(1);
    }
}
