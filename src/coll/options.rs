use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::concern::WriteConcern;

/// These are the valid options for creating a [`Collection`](crate::Collection) with
/// [`Database::collection_with_options`](crate::Database::collection_with_options).
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(strip_option)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct CollectionOptions {
    /// The default write concern for operations. Inherited from the database when unset.
    pub write_concern: Option<WriteConcern>,
}

/// Specifies the options to a [`Collection::insert_one`](crate::Collection::insert_one) or
/// [`Collection::insert_many`](crate::Collection::insert_many) operation.
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(strip_option)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct InsertOptions {
    /// The write concern for the operation.
    #[serde(skip_deserializing)]
    pub write_concern: Option<WriteConcern>,

    /// If true, the server keeps inserting the remaining documents of a message after one of them
    /// fails to insert.
    ///
    /// Defaults to false.
    pub continue_on_error: Option<bool>,
}

/// Specifies the options to a [`Collection::update`](crate::Collection::update) operation.
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(strip_option)))]
#[non_exhaustive]
pub struct UpdateOptions {
    /// If true, insert a document if no matching document is found.
    pub upsert: Option<bool>,

    /// If true, update every matching document rather than only the first one.
    pub multi: Option<bool>,

    /// The write concern for the operation.
    #[serde(skip_deserializing)]
    pub write_concern: Option<WriteConcern>,
}

/// Specifies the options to a [`Collection::remove`](crate::Collection::remove) operation.
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
#[builder(field_defaults(default, setter(strip_option)))]
#[non_exhaustive]
pub struct RemoveOptions {
    /// If true, remove at most one matching document.
    ///
    /// Always on for a query consisting only of an `ObjectId` `_id`.
    pub single: Option<bool>,

    /// The write concern for the operation.
    #[serde(skip_deserializing)]
    pub write_concern: Option<WriteConcern>,
}
