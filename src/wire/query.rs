use super::{
    flags::QueryFlags,
    header::{next_request_id, Header, OpCode},
    message::write_cstring,
};
use crate::{
    bson::Document,
    error::{Error, Result},
};

/// An OP_QUERY message. The legacy protocol runs every command, `getLastError` included, as a
/// single-document query against the `<db>.$cmd` pseudo-collection.
#[derive(Debug)]
pub(crate) struct Query {
    pub(crate) request_id: i32,
    pub(crate) flags: QueryFlags,
    pub(crate) full_collection_name: String,
    pub(crate) num_to_skip: i32,
    pub(crate) num_to_return: i32,
    pub(crate) query: Document,
}

impl Query {
    /// Builds the query that runs `command` against database `db`.
    pub(crate) fn command(db: &str, command: Document) -> Self {
        Self {
            request_id: next_request_id(),
            flags: QueryFlags::empty(),
            full_collection_name: format!("{}.$cmd", db),
            num_to_skip: 0,
            num_to_return: -1,
            query: command,
        }
    }

    /// Serializes the query, header included.
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.flags.bits().to_le_bytes());
        write_cstring(&mut body, &self.full_collection_name);
        body.extend_from_slice(&self.num_to_skip.to_le_bytes());
        body.extend_from_slice(&self.num_to_return.to_le_bytes());
        self.query.to_writer(&mut body)?;

        let length = i32::try_from(Header::LENGTH + body.len())
            .map_err(|_| Error::invalid_argument("command is too large to send"))?;

        let mut bytes = Vec::with_capacity(Header::LENGTH + body.len());
        Header {
            length,
            request_id: self.request_id,
            response_to: 0,
            op_code: OpCode::Query,
        }
        .write_to(&mut bytes);
        bytes.extend(body);
        Ok(bytes)
    }
}
