//! The legacy wire protocol: write messages, command queries and their replies.

mod flags;
mod header;
mod message;
mod query;
mod reply;

pub use self::{
    flags::{DeleteFlags, InsertFlags, UpdateFlags},
    header::OpCode,
    message::Message,
};

#[cfg(test)]
pub(crate) use self::header::Header;
pub(crate) use self::{query::Query, reply::Reply};

/// The largest message a server accepts unless it advertises otherwise.
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 48_000_000;
