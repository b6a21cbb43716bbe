mod cache;
pub mod options;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

pub(crate) use self::cache::IndexCache;
use self::options::IndexOptions;
use crate::{
    bson::{Bson, Document},
    bson_util,
    error::Result,
};

/// Specifies the fields and options for an index. See
/// [`Collection::ensure_index`](crate::Collection::ensure_index) and
/// [`Collection::create_index`](crate::Collection::create_index).
#[derive(Clone, Debug, Default, Deserialize, PartialEq, TypedBuilder, Serialize)]
#[builder(field_defaults(default, setter(into)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct IndexModel {
    /// Specifies the index's fields. For each field, specify a key-value pair in which the key is
    /// the name of the field to index and the value is the index type or direction.
    #[serde(rename = "key")]
    pub keys: Document,

    /// The options for the index.
    #[serde(flatten)]
    pub options: Option<IndexOptions>,
}

impl IndexModel {
    /// The name of the index: the explicit `name` option if one was given, otherwise the name
    /// derived from the keys.
    pub fn name(&self) -> String {
        self.options
            .as_ref()
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| canonical_index_name(&self.keys))
    }

    /// If the client did not specify a name, generate and set it. Otherwise, do nothing.
    pub(crate) fn update_name(&mut self) {
        if self
            .options
            .as_ref()
            .and_then(|o| o.name.as_ref())
            .is_none()
        {
            let name = canonical_index_name(&self.keys);
            self.options.get_or_insert_with(IndexOptions::default).name = Some(name);
        }
    }

    /// The entry describing this index in a `createIndexes` command.
    pub(crate) fn to_index_spec(&self) -> Result<Document> {
        let mut model = self.clone();
        model.update_name();
        Ok(crate::bson::to_document(&model)?)
    }
}

/// Derives the name the server gives an index from its keys: each field name followed by its
/// direction or type, joined with `_`. `{ a: 1, b: -1 }` is named `a_1_b_-1` and
/// `{ body: "text" }` is named `body_text`.
pub fn canonical_index_name(keys: &Document) -> String {
    keys.iter()
        .map(|(field, value)| format!("{}_{}", field, key_value_name(value)))
        .collect::<Vec<_>>()
        .join("_")
}

fn key_value_name(value: &Bson) -> String {
    match value {
        Bson::Int32(i) => i.to_string(),
        Bson::Int64(i) => i.to_string(),
        Bson::Double(f) => match bson_util::get_int(value) {
            Some(i) => i.to_string(),
            None => f.to_string(),
        },
        Bson::String(s) => s.replace(' ', "_"),
        _ => "x".to_string(),
    }
}
