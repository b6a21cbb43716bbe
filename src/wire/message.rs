use super::{
    flags::{DeleteFlags, InsertFlags, UpdateFlags},
    header::{next_request_id, Header, OpCode},
};
use crate::{bson::Document, coll::Namespace, error::Result};

/// A legacy write message (OP_INSERT, OP_UPDATE or OP_DELETE) under construction.
///
/// The message is kept as a fixed prelude (everything between the header and the first
/// document) plus the list of encoded documents that follow it, together with the running
/// byte length of the whole message including its header. Documents can be appended and the
/// last one taken back off, which is what lets an insert batch be split whenever it grows past
/// the maximum message length: append, notice the overflow, take the document back, flush, and
/// start the next message with it. Encoded bytes are never edited in place.
#[derive(Debug, Clone)]
pub struct Message {
    op_code: OpCode,
    request_id: i32,
    namespace: String,
    flags: i32,
    prelude: Vec<u8>,
    documents: Vec<Vec<u8>>,
    length: usize,
}

impl Message {
    fn new(op_code: OpCode, namespace: &Namespace, flags: i32, prelude: Vec<u8>) -> Self {
        let length = Header::LENGTH + prelude.len();
        Self {
            op_code,
            request_id: next_request_id(),
            namespace: namespace.to_string(),
            flags,
            prelude,
            documents: Vec::new(),
            length,
        }
    }

    /// Starts an OP_INSERT message with no documents.
    ///
    /// Layout: `int32 flags, cstring fullCollectionName, document* documents`.
    pub(crate) fn insert(namespace: &Namespace, flags: InsertFlags) -> Self {
        let mut prelude = Vec::new();
        prelude.extend_from_slice(&flags.bits().to_le_bytes());
        write_cstring(&mut prelude, &namespace.to_string());
        Self::new(OpCode::Insert, namespace, flags.bits(), prelude)
    }

    /// Builds an OP_UPDATE message.
    ///
    /// Layout: `int32 ZERO, cstring fullCollectionName, int32 flags, document selector,
    /// document update`.
    pub(crate) fn update(
        namespace: &Namespace,
        flags: UpdateFlags,
        selector: &Document,
        update: &Document,
    ) -> Result<Self> {
        let mut message = Self::new(
            OpCode::Update,
            namespace,
            flags.bits(),
            selector_prelude(namespace, flags.bits()),
        );
        message.append_document(crate::bson::to_vec(selector)?);
        message.append_document(crate::bson::to_vec(update)?);
        Ok(message)
    }

    /// Builds an OP_DELETE message.
    ///
    /// Layout: `int32 ZERO, cstring fullCollectionName, int32 flags, document selector`.
    pub(crate) fn delete(
        namespace: &Namespace,
        flags: DeleteFlags,
        selector: &Document,
    ) -> Result<Self> {
        let mut message = Self::new(
            OpCode::Delete,
            namespace,
            flags.bits(),
            selector_prelude(namespace, flags.bits()),
        );
        message.append_document(crate::bson::to_vec(selector)?);
        Ok(message)
    }

    /// Appends an encoded document to the end of the message.
    pub(crate) fn append_document(&mut self, document: Vec<u8>) {
        self.length += document.len();
        self.documents.push(document);
    }

    /// Takes the most recently appended document back off the message.
    pub(crate) fn remove_last_document(&mut self) -> Option<Vec<u8>> {
        let document = self.documents.pop()?;
        self.length -= document.len();
        Some(document)
    }

    /// Turns this message into a fresh message of the same kind, with a new request id and
    /// `first` as its only document.
    pub(crate) fn reset_with(&mut self, first: Vec<u8>) {
        self.documents.clear();
        self.length = Header::LENGTH + self.prelude.len();
        self.request_id = next_request_id();
        self.append_document(first);
    }

    /// The wire protocol op code of this message.
    pub fn op_code(&self) -> OpCode {
        self.op_code
    }

    /// The request id that will be written in this message's header.
    pub fn request_id(&self) -> i32 {
        self.request_id
    }

    /// The full name (`<db>.<collection>`) of the collection the message targets.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The raw op-specific flags of this message.
    pub fn flags(&self) -> i32 {
        self.flags
    }

    /// The encoded length of the whole message, header included.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the message carries no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The number of documents in the message. For updates this counts the selector and the
    /// update document; for deletes, the selector.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// The encoded documents of the message, in order.
    pub fn documents(&self) -> impl Iterator<Item = &[u8]> {
        self.documents.iter().map(Vec::as_slice)
    }

    /// Decodes the documents of the message. Mostly useful for logging and inspection.
    pub fn decode_documents(&self) -> Result<Vec<Document>> {
        self.documents()
            .map(|mut bytes| -> Result<Document> { Ok(Document::from_reader(&mut bytes)?) })
            .collect()
    }

    /// Serializes the message, header included.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let length = i32::try_from(self.length).map_err(|_| {
            crate::error::Error::invalid_argument(format!(
                "message length {} does not fit in the wire protocol header",
                self.length
            ))
        })?;

        let mut bytes = Vec::with_capacity(self.length);
        Header {
            length,
            request_id: self.request_id,
            response_to: 0,
            op_code: self.op_code,
        }
        .write_to(&mut bytes);
        bytes.extend_from_slice(&self.prelude);
        for document in &self.documents {
            bytes.extend_from_slice(document);
        }

        Ok(bytes)
    }
}

fn selector_prelude(namespace: &Namespace, flags: i32) -> Vec<u8> {
    let mut prelude = Vec::new();
    prelude.extend_from_slice(&0i32.to_le_bytes());
    write_cstring(&mut prelude, &namespace.to_string());
    prelude.extend_from_slice(&flags.to_le_bytes());
    prelude
}

/// Serializes `string` to bytes and appends them to `buf` with a null terminator.
pub(super) fn write_cstring(buf: &mut Vec<u8>, string: &str) {
    buf.extend_from_slice(string.as_bytes());
    buf.push(0);
}
