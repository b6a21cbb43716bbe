use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::concern::WriteConcern;

/// These are the valid options for creating a [`Database`](crate::Database) with
/// [`Database::new`](crate::Database::new).
#[derive(Clone, Debug, Default, Deserialize, TypedBuilder)]
#[builder(field_defaults(default, setter(strip_option)))]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct DatabaseOptions {
    /// The default write concern for operations on the database's collections.
    pub write_concern: Option<WriteConcern>,
}
