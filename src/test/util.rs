use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::{
    bson::{doc, Bson, Document},
    cmap::{check_command_reply, Connection, ConnectionPool},
    concern::WriteConcern,
    error::{Error, ErrorKind, Result},
    wire::{Message, OpCode, DEFAULT_MAX_MESSAGE_LENGTH},
    Collection,
    Database,
};

pub(crate) const DB_NAME: &str = "test";
pub(crate) const COLL_NAME: &str = "coll";

/// Something that happened to a [`MockPool`] or to one of its connections.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    CheckOut,
    CheckIn,
    Send(SentMessage),
    Command { db: String, command: Document },
}

/// A write message as a [`MockPool`] connection received it.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SentMessage {
    pub(crate) op_code: OpCode,
    pub(crate) namespace: String,
    pub(crate) flags: i32,
    pub(crate) length: usize,
    pub(crate) documents: Vec<Document>,
    pub(crate) write_concern: WriteConcern,
}

#[derive(Debug)]
struct MockState {
    events: Vec<Event>,
    max_message_length: usize,
    fail_check_out: bool,
    fail_sends: bool,
    command_error: Option<Document>,
    indexes: Vec<String>,
}

/// A [`ConnectionPool`] that records everything done with it instead of talking to a server.
///
/// Writes are acknowledged with `{ ok: 1, err: null, n: 0, batch: <index of the send> }` and
/// commands succeed with `{ ok: 1 }` unless told otherwise. Commands yield to the scheduler once
/// before completing so that concurrent callers interleave.
#[derive(Clone, Debug)]
pub(crate) struct MockPool {
    state: Arc<Mutex<MockState>>,
}

impl MockPool {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                events: Vec::new(),
                max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
                fail_check_out: false,
                fail_sends: false,
                command_error: None,
                indexes: vec!["_id_".to_string()],
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn set_max_message_length(&self, max_message_length: usize) {
        self.state().max_message_length = max_message_length;
    }

    pub(crate) fn set_fail_check_out(&self, fail: bool) {
        self.state().fail_check_out = fail;
    }

    pub(crate) fn set_fail_sends(&self, fail: bool) {
        self.state().fail_sends = fail;
    }

    /// Makes every command fail with `reply` until cleared with `None`.
    pub(crate) fn set_command_error(&self, reply: Option<Document>) {
        self.state().command_error = reply;
    }

    pub(crate) fn set_indexes(&self, names: &[&str]) {
        self.state().indexes = names.iter().map(|name| name.to_string()).collect();
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub(crate) fn clear_events(&self) {
        self.state().events.clear();
    }

    pub(crate) fn sends(&self) -> Vec<SentMessage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Send(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn commands(&self) -> Vec<Document> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Command { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    /// The commands whose first key is `name`.
    pub(crate) fn commands_named(&self, name: &str) -> Vec<Document> {
        self.commands()
            .into_iter()
            .filter(|command| command.keys().next().map(String::as_str) == Some(name))
            .collect()
    }

    pub(crate) fn check_outs(&self) -> usize {
        self.count(|event| matches!(event, Event::CheckOut))
    }

    pub(crate) fn check_ins(&self) -> usize {
        self.count(|event| matches!(event, Event::CheckIn))
    }

    fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.state().events.iter().filter(|e| predicate(e)).count()
    }

    pub(crate) fn database(&self) -> Database {
        Database::new(DB_NAME, Arc::new(self.clone()), None).unwrap()
    }

    pub(crate) fn collection(&self) -> Collection {
        self.database().collection(COLL_NAME).unwrap()
    }
}

impl ConnectionPool for MockPool {
    fn check_out(&self) -> BoxFuture<'_, Result<Box<dyn Connection>>> {
        let mut state = self.state();
        let result: Result<Box<dyn Connection>> = if state.fail_check_out {
            Err(ErrorKind::ConnectionPool {
                message: "mock pool refused the check-out".to_string(),
            }
            .into())
        } else {
            state.events.push(Event::CheckOut);
            Ok(Box::new(MockConnection {
                state: self.state.clone(),
            }))
        };
        future::ready(result).boxed()
    }

    fn check_in(&self, _connection: Box<dyn Connection>) {
        self.state().events.push(Event::CheckIn);
    }
}

#[derive(Debug)]
struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    fn record_send(&self, message: &Message, write_concern: &WriteConcern) -> Result<Option<Document>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_sends {
            return Err(Error::from(std::io::ErrorKind::BrokenPipe));
        }
        if message.len() > state.max_message_length {
            return Err(Error::invalid_argument(format!(
                "message of {} bytes exceeds the maximum message length of {} bytes",
                message.len(),
                state.max_message_length
            )));
        }

        let batch = state
            .events
            .iter()
            .filter(|event| matches!(event, Event::Send(_)))
            .count();
        state.events.push(Event::Send(SentMessage {
            op_code: message.op_code(),
            namespace: message.namespace().to_string(),
            flags: message.flags(),
            length: message.len(),
            documents: message.decode_documents()?,
            write_concern: write_concern.clone(),
        }));

        Ok(write_concern.is_acknowledged().then(|| {
            doc! { "ok": 1.0, "err": Bson::Null, "n": 0, "batch": batch as i32 }
        }))
    }

    fn record_command(&self, db: &str, command: Document) -> Result<Document> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::Command {
            db: db.to_string(),
            command: command.clone(),
        });

        if let Some(ref reply) = state.command_error {
            return check_command_reply(reply.clone());
        }

        let reply = if command.contains_key("listIndexes") {
            let first_batch: Vec<Bson> = state
                .indexes
                .iter()
                .map(|name| Bson::Document(doc! { "v": 2, "key": {}, "name": name }))
                .collect();
            doc! {
                "cursor": { "id": 0i64, "ns": format!("{}.{}", DB_NAME, COLL_NAME), "firstBatch": first_batch },
                "ok": 1.0,
            }
        } else {
            doc! { "ok": 1.0 }
        };
        check_command_reply(reply)
    }
}

impl Connection for MockConnection {
    fn max_message_length(&self) -> usize {
        self.state.lock().unwrap().max_message_length
    }

    fn send<'a>(
        &'a mut self,
        message: &'a Message,
        write_concern: &'a WriteConcern,
    ) -> BoxFuture<'a, Result<Option<Document>>> {
        future::ready(self.record_send(message, write_concern)).boxed()
    }

    fn run_command<'a>(
        &'a mut self,
        db: &'a str,
        command: Document,
    ) -> BoxFuture<'a, Result<Document>> {
        let result = self.record_command(db, command);
        async move {
            tokio::task::yield_now().await;
            result
        }
        .boxed()
    }
}

/// The encoded size of `document`.
pub(crate) fn encoded_len(document: &Document) -> usize {
    crate::bson::to_vec(document).unwrap().len()
}
