use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use typed_builder::TypedBuilder;

use crate::{bson::Document, serde_util};

/// These are the valid options for specifying an [`IndexModel`](crate::IndexModel).
/// See the
/// [documentation](https://www.mongodb.com/docs/manual/reference/method/db.collection.createIndex/#options-for-all-index-types)
/// for more information on how to use these options.
#[skip_serializing_none]
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct IndexOptions {
    /// Tells the server to build the index in the background and not block other tasks.
    pub background: Option<bool>,

    /// Specifies a TTL to control how long the server retains documents in this collection.
    ///
    /// This applies only to [TTL](https://www.mongodb.com/docs/manual/reference/glossary/#term-ttl) indexes.
    #[serde(
        rename = "expireAfterSeconds",
        default,
        with = "serde_util::duration_option_as_int_seconds"
    )]
    pub expire_after: Option<Duration>,

    /// Specifies a name outside the default generated name.
    ///
    /// If none is provided, the name is derived from the keys in the format
    /// `<field>_<direction>[_<field>_<direction>...]`.
    pub name: Option<String>,

    /// If true, the index only references documents with the specified field.
    pub sparse: Option<bool>,

    /// Configures the storage engine on a per-index basis, in the form
    /// `{ <storage-engine-name>: <options> }`.
    pub storage_engine: Option<Document>,

    /// Creates a unique index so that the collection will not accept insertion or update of
    /// documents where the index key value matches an existing value in the index.
    pub unique: Option<bool>,

    /// Asks servers that still honor it to drop documents that would violate a new unique index
    /// while it is being built.
    pub drop_dups: Option<bool>,

    /// Specifies the version number of the index.
    #[serde(rename = "v")]
    pub version: Option<IndexVersion>,

    /// For text indexes, the language that determines the list of stop words and the rules for
    /// the stemmer and tokenizer.
    pub default_language: Option<String>,

    /// For text indexes, a document that contains field and weight pairs.
    pub weights: Option<Document>,

    /// If specified, the index only references documents that match the filter expression.
    pub partial_filter_expression: Option<Document>,
}

/// The version of the index.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum IndexVersion {
    /// Version 0.
    V0,
    /// Version 1.
    V1,
    /// Version 2.
    V2,
    /// A version not covered by the other variants.
    Custom(u32),
}

impl Serialize for IndexVersion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match *self {
            IndexVersion::V0 => serializer.serialize_i32(0),
            IndexVersion::V1 => serializer.serialize_i32(1),
            IndexVersion::V2 => serializer.serialize_i32(2),
            IndexVersion::Custom(i) => serializer.serialize_i64(i.into()),
        }
    }
}

impl<'de> Deserialize<'de> for IndexVersion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match u32::deserialize(deserializer)? {
            0 => Ok(IndexVersion::V0),
            1 => Ok(IndexVersion::V1),
            2 => Ok(IndexVersion::V2),
            i => Ok(IndexVersion::Custom(i)),
        }
    }
}
