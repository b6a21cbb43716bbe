use derive_where::derive_where;
use futures_util::{future::BoxFuture, FutureExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufStream};

use super::Connection;
use crate::{
    bson::{Bson, Document},
    bson_util,
    concern::WriteConcern,
    error::{CommandError, Error, ErrorKind, Result},
    trace::{TracingRepresentation, COMMAND_TRACING_EVENT_TARGET},
    wire::{Message, Query, Reply},
};

/// A [`Connection`] speaking the legacy wire protocol over any byte stream.
#[derive_where(Debug)]
pub struct StreamConnection<S> {
    #[derive_where(skip)]
    stream: BufStream<S>,

    /// The largest message that may be sent or received over this connection.
    max_message_length: usize,

    /// Set when a read or write failed or a reply could not be matched to its request. The
    /// stream may hold unread bytes, so the connection must not be reused.
    errored: bool,

    /// Set from the first byte written until the reply is read. Still set if the operation was
    /// dropped in between.
    executing: bool,
}

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wraps `stream`. Messages longer than `max_message_length` are rejected before they are
    /// written, and replies longer than it are rejected before their body is read.
    pub fn new(stream: S, max_message_length: usize) -> Self {
        Self {
            stream: BufStream::new(stream),
            max_message_length,
            errored: false,
            executing: false,
        }
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Clears the executing flag and records whether `result` left the stream out of step.
    /// Errors the server reported in a complete reply leave the stream usable.
    fn finish<T>(&mut self, result: &Result<T>) {
        self.executing = false;
        if let Err(ref error) = result {
            if !error.is_server_error() {
                self.errored = true;
            }
        }
    }

    async fn send_message(
        &mut self,
        message: &Message,
        write_concern: &WriteConcern,
    ) -> Result<Option<Document>> {
        write_concern.validate()?;
        if message.len() > self.max_message_length {
            return Err(Error::invalid_argument(format!(
                "message of {} bytes exceeds the maximum message length of {} bytes",
                message.len(),
                self.max_message_length
            )));
        }
        let bytes = message.to_bytes()?;
        let get_last_error = if write_concern.is_acknowledged() {
            Some(write_concern.to_get_last_error()?)
        } else {
            None
        };

        self.executing = true;
        let result = self.write_message(message, &bytes, get_last_error).await;
        self.finish(&result);
        result
    }

    async fn write_message(
        &mut self,
        message: &Message,
        bytes: &[u8],
        get_last_error: Option<Document>,
    ) -> Result<Option<Document>> {
        self.write_bytes(bytes).await?;
        tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            opCode = ?message.op_code(),
            namespace = message.namespace(),
            requestId = message.request_id(),
            length = message.len(),
            documents = message.document_count(),
            "Message sent"
        );

        let Some(get_last_error) = get_last_error else {
            return Ok(None);
        };

        // The acknowledgment is returned as the server sent it, `ok: 0` included: write errors
        // are reported inside it rather than as errors.
        let db = database_name(message.namespace());
        let reply = self.round_trip(db, get_last_error).await;
        trace_reply(db, &reply);
        reply.map(Some)
    }

    async fn execute(&mut self, db: &str, command: Document) -> Result<Document> {
        self.executing = true;
        let result = self
            .round_trip(db, command)
            .await
            .and_then(check_command_reply);
        self.finish(&result);
        trace_reply(db, &result);
        result
    }

    /// Writes `command` as a query against `db` and reads the reply to it.
    async fn round_trip(&mut self, db: &str, command: Document) -> Result<Document> {
        let query = Query::command(db, command);
        tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            databaseName = db,
            requestId = query.request_id,
            command = query.query.tracing_representation(),
            "Command started"
        );

        self.write_bytes(&query.to_bytes()?).await?;
        let reply = Reply::read_from(&mut self.stream, self.max_message_length).await?;
        if reply.response_to != query.request_id {
            return Err(Error::invalid_response(format!(
                "expected a reply to request {}, got a reply to request {}",
                query.request_id, reply.response_to
            )));
        }
        reply.into_command_document()
    }
}

fn trace_reply(db: &str, result: &Result<Document>) {
    match result {
        Ok(reply) => tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            databaseName = db,
            reply = reply.tracing_representation(),
            "Command succeeded"
        ),
        Err(error) => tracing::debug!(
            target: COMMAND_TRACING_EVENT_TARGET,
            databaseName = db,
            failure = error.tracing_representation(),
            "Command failed"
        ),
    }
}

impl<S> Connection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    fn has_errored(&self) -> bool {
        self.errored
    }

    fn is_executing(&self) -> bool {
        self.executing
    }

    fn send<'a>(
        &'a mut self,
        message: &'a Message,
        write_concern: &'a WriteConcern,
    ) -> BoxFuture<'a, Result<Option<Document>>> {
        self.send_message(message, write_concern).boxed()
    }

    fn run_command<'a>(
        &'a mut self,
        db: &'a str,
        command: Document,
    ) -> BoxFuture<'a, Result<Document>> {
        self.execute(db, command).boxed()
    }
}

/// Fails with a command error unless the reply reports `ok: 1`.
pub(crate) fn check_command_reply(reply: Document) -> Result<Document> {
    let ok = match reply.get("ok") {
        Some(Bson::Boolean(ok)) => *ok,
        Some(value) => bson_util::get_int(value) == Some(1),
        None => false,
    };

    if ok {
        Ok(reply)
    } else {
        Err(ErrorKind::Command(CommandError::from_reply(&reply)).into())
    }
}

/// The database part of a full collection name.
fn database_name(namespace: &str) -> &str {
    namespace
        .split_once('.')
        .map(|(db, _)| db)
        .unwrap_or(namespace)
}
