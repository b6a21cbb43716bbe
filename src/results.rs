//! Contains the types of results returned by write operations.

use crate::bson::{doc, Bson, Document};

/// The outcome of a write operation, shaped by its write concern and by how many messages it was
/// sent in.
///
/// Acknowledgment documents are the server's `getLastError` replies, returned unmodified: a write
/// the server rejected is reported inside them (in the `err` field) rather than as an
/// [`Error`](crate::error::Error). Use [`WriteResult::write_error`] to look for one.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum WriteResult {
    /// The write concern was unacknowledged, so no reply was read.
    Unacknowledged,

    /// The acknowledgment of the single message the operation was sent in.
    Acknowledged(Document),

    /// The acknowledgments of an insert that was split into several messages, in the order the
    /// messages were sent. Each batch succeeds or fails on its own, so every acknowledgment needs
    /// to be inspected.
    Batched(Vec<Document>),
}

impl WriteResult {
    pub(crate) fn from_acknowledgments(mut acknowledgments: Vec<Document>) -> Self {
        match acknowledgments.len() {
            1 => Self::Acknowledged(acknowledgments.remove(0)),
            _ => Self::Batched(acknowledgments),
        }
    }

    /// Whether a reply was read for this write.
    pub fn is_acknowledged(&self) -> bool {
        !matches!(self, Self::Unacknowledged)
    }

    /// All acknowledgment documents, in send order.
    pub fn acknowledgments(&self) -> &[Document] {
        match self {
            Self::Unacknowledged => &[],
            Self::Acknowledged(acknowledgment) => std::slice::from_ref(acknowledgment),
            Self::Batched(acknowledgments) => acknowledgments,
        }
    }

    /// The first write error reported by the server, if any.
    pub fn write_error(&self) -> Option<&str> {
        self.acknowledgments()
            .iter()
            .find_map(|acknowledgment| match acknowledgment.get("err") {
                Some(Bson::String(message)) => Some(message.as_str()),
                _ => None,
            })
    }

    /// The result as a single document: `None` when unacknowledged, the acknowledgment itself for
    /// a single message, and `{ batches: [...] }` listing every acknowledgment otherwise.
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Unacknowledged => None,
            Self::Acknowledged(acknowledgment) => Some(acknowledgment),
            Self::Batched(acknowledgments) => Some(doc! {
                "batches": acknowledgments.into_iter().map(Bson::Document).collect::<Vec<_>>(),
            }),
        }
    }
}
