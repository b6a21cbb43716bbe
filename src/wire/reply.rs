use tokio::io::{AsyncRead, AsyncReadExt};

use super::{
    flags::ResponseFlags,
    header::{Header, OpCode},
};
use crate::{
    bson::Document,
    error::{Error, Result},
};

/// The fixed part of an OP_REPLY following the header: flags, cursor id, starting offset and
/// number of documents returned. Command replies never open a cursor, so only the flags and the
/// document count are kept.
const REPLY_PRELUDE_LENGTH: usize = 4 + 8 + 4 + 4;

/// An OP_REPLY message sent by the server in response to an OP_QUERY.
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) response_to: i32,
    pub(crate) flags: ResponseFlags,
    pub(crate) docs: Vec<Document>,
}

impl Reply {
    /// Reads bytes from `reader` and deserializes them into a Reply. Replies longer than
    /// `max_length` are rejected before their body is read.
    pub(crate) async fn read_from<R: AsyncRead + Unpin>(
        reader: &mut R,
        max_length: usize,
    ) -> Result<Self> {
        let header = Header::read_from(reader).await?;
        if header.op_code != OpCode::Reply {
            return Err(Error::invalid_response(format!(
                "Invalid op code, expected {} and got {}",
                OpCode::Reply as i32,
                header.op_code as i32
            )));
        }

        let length = usize::try_from(header.length).unwrap_or(0);
        if length < Header::LENGTH + REPLY_PRELUDE_LENGTH || length > max_length {
            return Err(Error::invalid_response(format!(
                "Reply length {} outside of the valid range [{}, {}]",
                header.length,
                Header::LENGTH + REPLY_PRELUDE_LENGTH,
                max_length
            )));
        }

        let mut buf = vec![0u8; length - Header::LENGTH];
        reader.read_exact(&mut buf).await?;
        let mut body = buf.as_slice();

        let flags = ResponseFlags::from_bits_truncate(read_i32(&mut body)?);
        let _cursor_id = read_i64(&mut body)?;
        let _starting_from = read_i32(&mut body)?;
        let number_returned = read_i32(&mut body)?;

        let mut docs = Vec::new();
        while !body.is_empty() {
            docs.push(Document::from_reader(&mut body)?);
        }

        if usize::try_from(number_returned).ok() != Some(docs.len()) {
            return Err(Error::invalid_response(format!(
                "The server indicated that the reply would contain {} documents, but it \
                 instead contained {}",
                number_returned,
                docs.len()
            )));
        }

        Ok(Self {
            response_to: header.response_to,
            flags,
            docs,
        })
    }

    /// Serializes the reply, header included, the way a server would.
    #[cfg(test)]
    pub(crate) fn to_bytes(&self, request_id: i32) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        body.extend_from_slice(&self.flags.bits().to_le_bytes());
        body.extend_from_slice(&0i64.to_le_bytes());
        body.extend_from_slice(&0i32.to_le_bytes());
        body.extend_from_slice(&(self.docs.len() as i32).to_le_bytes());
        for doc in &self.docs {
            doc.to_writer(&mut body)?;
        }

        let mut bytes = Vec::new();
        Header {
            length: (Header::LENGTH + body.len()) as i32,
            request_id,
            response_to: self.response_to,
            op_code: OpCode::Reply,
        }
        .write_to(&mut bytes);
        bytes.extend(body);
        Ok(bytes)
    }

    /// Consumes the reply and returns its single document, as expected for command replies.
    pub(crate) fn into_command_document(self) -> Result<Document> {
        let mut docs = self.docs.into_iter();
        let document = docs.next().ok_or_else(|| {
            Error::invalid_response("The reply from the server did not contain a document")
        })?;

        if self.flags.contains(ResponseFlags::QUERY_FAILURE) {
            return Err(crate::error::ErrorKind::Command(
                crate::error::CommandError::from_reply(&query_failure_as_command_error(document)),
            )
            .into());
        }

        Ok(document)
    }
}

/// Query failures report `$err` rather than `errmsg`.
fn query_failure_as_command_error(mut document: Document) -> Document {
    if let Some(message) = document.remove("$err") {
        document.insert("errmsg", message);
    }
    document
}

fn read_i32(reader: &mut &[u8]) -> Result<i32> {
    let mut bytes = [0u8; 4];
    std::io::Read::read_exact(reader, &mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

fn read_i64(reader: &mut &[u8]) -> Result<i64> {
    let mut bytes = [0u8; 8];
    std::io::Read::read_exact(reader, &mut bytes)?;
    Ok(i64::from_le_bytes(bytes))
}
