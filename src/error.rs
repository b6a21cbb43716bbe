//! Contains the `Error` and `Result` types that `mongodb_write_core` uses.

use std::{fmt, sync::Arc};

use serde::Deserialize;
use thiserror::Error;

use crate::bson::{Bson, Document};

/// The result type for all methods that can return an error in the `mongodb_write_core` crate.
pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `mongodb_write_core` crate. The inner
/// [`ErrorKind`](enum.ErrorKind.html) is wrapped in an `Arc` to allow the errors to be
/// cloned.
#[derive(Clone, Debug, Error)]
#[error("{kind}")]
#[non_exhaustive]
pub struct Error {
    /// The type of error that occurred.
    pub kind: Arc<ErrorKind>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ErrorKind::InvalidArgument {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn invalid_name(name: &str, reason: &str) -> Self {
        ErrorKind::InvalidName {
            message: format!("invalid name {:?}: {}", name, reason),
        }
        .into()
    }

    pub(crate) fn invalid_response(message: impl Into<String>) -> Self {
        ErrorKind::InvalidResponse {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn unsupported(operation: &'static str) -> Self {
        ErrorKind::Unsupported { operation }.into()
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        ErrorKind::Internal {
            message: message.into(),
        }
        .into()
    }

    /// Whether this error occurred while checking out a connection or while sending or receiving
    /// bytes over one.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self.kind.as_ref(),
            ErrorKind::Io(..) | ErrorKind::ConnectionPool { .. }
        )
    }

    /// Whether this error was raised while validating arguments, before any I/O was attempted.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.kind.as_ref(),
            ErrorKind::InvalidArgument { .. }
                | ErrorKind::InvalidName { .. }
                | ErrorKind::ArgumentOrder { .. }
        )
    }

    /// Whether this error was reported by the server in reply to a command.
    pub fn is_server_error(&self) -> bool {
        matches!(self.kind.as_ref(), ErrorKind::Command(_))
    }
}

impl<E> From<E> for Error
where
    ErrorKind: From<E>,
{
    fn from(err: E) -> Self {
        Self::new(err.into())
    }
}

impl std::ops::Deref for Error {
    type Target = Arc<ErrorKind>;

    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

/// The types of errors that can occur.
#[allow(missing_docs)]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid argument was provided to a database operation.
    #[error("An invalid argument was provided: {message}")]
    #[non_exhaustive]
    InvalidArgument { message: String },

    /// A database or collection name was rejected before the handle was created.
    #[error("{message}")]
    #[non_exhaustive]
    InvalidName { message: String },

    /// The query passed to an update contained an update modifier, which almost always means that
    /// the query and update arguments were passed in the wrong order.
    #[error(
        "Found update modifier {field:?} in the query document of an update; the query and \
         update arguments may have been swapped"
    )]
    #[non_exhaustive]
    ArgumentOrder { field: String },

    /// Wrapper around `bson::ser::Error`.
    #[error("{0}")]
    BsonEncode(#[from] crate::bson::ser::Error),

    /// Wrapper around `bson::de::Error`.
    #[error("{0}")]
    BsonDecode(#[from] crate::bson::de::Error),

    /// Wrapper around [`std::io::Error`](https://doc.rust-lang.org/std/io/struct.Error.html).
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// A connection could not be checked out of the connection pool.
    #[error("Unable to check out a connection: {message}")]
    #[non_exhaustive]
    ConnectionPool { message: String },

    /// The server returned an invalid reply to a database operation.
    #[error("The server returned an invalid reply to a database operation: {message}")]
    #[non_exhaustive]
    InvalidResponse { message: String },

    /// The server returned an error to an attempted command.
    #[error("Command failed {0}")]
    Command(CommandError),

    /// The operation is not implemented by this crate.
    #[error("{operation} is not supported")]
    #[non_exhaustive]
    Unsupported { operation: &'static str },

    /// An invariant of this crate was broken.
    #[error("Internal error: {message}")]
    #[non_exhaustive]
    Internal { message: String },
}

impl From<std::io::Error> for ErrorKind {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl From<std::io::ErrorKind> for ErrorKind {
    fn from(err: std::io::ErrorKind) -> Self {
        Self::Io(Arc::new(err.into()))
    }
}

/// An error that occurred due to a database command failing.
#[derive(Clone, Debug, Deserialize)]
#[non_exhaustive]
pub struct CommandError {
    /// Identifies the type of error.
    #[serde(default)]
    pub code: i32,

    /// The name associated with the error code.
    #[serde(rename = "codeName", default)]
    pub code_name: String,

    /// A description of the error that occurred.
    #[serde(rename = "errmsg", default)]
    pub message: String,
}

impl CommandError {
    /// Extracts the error from a command reply whose `ok` field is not 1. Replies without the
    /// expected fields still produce an error carrying whatever could be read.
    pub(crate) fn from_reply(reply: &Document) -> Self {
        crate::bson::from_document(reply.clone()).unwrap_or_else(|_| CommandError {
            code: 0,
            code_name: String::new(),
            message: match reply.get("errmsg") {
                Some(Bson::String(s)) => s.clone(),
                _ => format!("command failed: {}", reply),
            },
        })
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "({}): {}", self.code_name, self.message)
    }
}
