use crate::bson::{Bson, Document};

pub(crate) const COMMAND_TRACING_EVENT_TARGET: &str = "mongodb_write_core::command";
pub(crate) const CONNECTION_TRACING_EVENT_TARGET: &str = "mongodb_write_core::connection";

/// Documents longer than this many bytes of extended JSON are truncated in tracing events.
pub(crate) const DEFAULT_MAX_DOCUMENT_LENGTH_BYTES: usize = 1000;

pub(crate) trait TracingRepresentation {
    type Representation;

    fn tracing_representation(&self) -> Self::Representation;
}

impl TracingRepresentation for Document {
    type Representation = String;

    fn tracing_representation(&self) -> String {
        let mut json = Bson::Document(self.clone())
            .into_relaxed_extjson()
            .to_string();
        truncate_on_char_boundary(&mut json, DEFAULT_MAX_DOCUMENT_LENGTH_BYTES);
        json
    }
}

impl TracingRepresentation for crate::error::Error {
    type Representation = String;

    fn tracing_representation(&self) -> String {
        self.to_string()
    }
}

/// Truncates `s` to at most `new_length` bytes, backing off to the previous character boundary,
/// and appends `...` when anything was cut.
pub(crate) fn truncate_on_char_boundary(s: &mut String, new_length: usize) {
    if s.len() <= new_length {
        return;
    }

    let mut boundary = new_length;
    while !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    s.truncate(boundary);
    s.push_str("...");
}
