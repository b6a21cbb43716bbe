mod indexes;
pub mod options;
mod write;

use std::{fmt, str::FromStr, sync::Arc};

use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize};

use self::options::CollectionOptions;
use crate::{
    bson::{doc, Document},
    cmap::PooledConnection,
    concern::WriteConcern,
    error::{Error, Result},
    index::IndexCache,
    Database,
};

/// The longest collection name the server accepts, in bytes.
pub const MAX_COLLECTION_NAME_LENGTH: usize = 121;

/// `Collection` is the client-side abstraction of a MongoDB collection. It performs the
/// collection-level writes (insert, update, remove, save) and index management. A `Collection`
/// can be obtained through a [`Database`] by calling either [`Database::collection`] or
/// [`Database::collection_with_options`].
///
/// Writes accept anything implementing [`ToDocument`](crate::ToDocument): plain
/// [`Document`]s, which receive a generated `_id` when inserted without one, and serializable
/// values wrapped in [`Typed`](crate::Typed).
///
/// `Collection` uses [`std::sync::Arc`] internally, so it can safely be shared across threads or
/// async tasks. Clones share the same index cache.
///
/// # Example
/// ```rust
/// # use std::sync::Arc;
/// # use mongodb_write_core::{
/// #     bson::doc,
/// #     cmap::{ConnectionPool, ConnectionPoolOptions, TcpConnectionPool},
/// #     error::Result,
/// #     Database,
/// # };
/// #
/// # async fn insert() -> Result<()> {
/// let pool: Arc<dyn ConnectionPool> = Arc::new(TcpConnectionPool::new(
///     ConnectionPoolOptions::builder()
///         .address("localhost:27017".to_string())
///         .build(),
/// ));
/// let coll = Database::new("items", pool, None)?.collection("in_stock")?;
///
/// let mut item = doc! { "sku": "abc", "qty": 5 };
/// let result = coll.insert_one(&mut item, None).await?;
/// assert!(item.contains_key("_id"));
/// # let _ = result;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

#[derive(Debug)]
struct CollectionInner {
    db: Database,
    name: String,
    write_concern: Option<WriteConcern>,
    index_cache: IndexCache,
}

impl Collection {
    pub(crate) fn new(db: Database, name: &str, options: Option<CollectionOptions>) -> Result<Self> {
        validate_collection_name(name)?;

        let options = options.unwrap_or_default();
        let write_concern = options
            .write_concern
            .or_else(|| db.write_concern().cloned());
        if let Some(ref write_concern) = write_concern {
            write_concern.validate()?;
        }

        Ok(Self {
            inner: Arc::new(CollectionInner {
                db,
                name: name.to_string(),
                write_concern,
                index_cache: IndexCache::default(),
            }),
        })
    }

    /// Gets the name of the `Collection`.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gets the namespace of the `Collection`.
    ///
    /// The namespace of a collection is the concatenation of the name of the database containing
    /// it, the '.' character, and the name of the collection itself. For example, if a collection
    /// named "bar" is created in a database named "foo", the namespace of the collection is
    /// "foo.bar".
    pub fn namespace(&self) -> Namespace {
        Namespace {
            db: self.inner.db.name().into(),
            coll: self.name().into(),
        }
    }

    /// Gets the `Database` this collection belongs to.
    pub fn database(&self) -> &Database {
        &self.inner.db
    }

    /// Gets the write concern of the `Collection`.
    pub fn write_concern(&self) -> Option<&WriteConcern> {
        self.inner.write_concern.as_ref()
    }

    /// Drops the collection, deleting all data and indexes stored in it. The index cache is
    /// cleared whether or not the command succeeds.
    pub async fn drop(&self) -> Result<Document> {
        let command = doc! { "drop": self.name() };
        self.inner
            .index_cache
            .clear_after(|| self.inner.db.run_command(command))
            .await
    }

    /// Not supported: always fails with
    /// [`ErrorKind::Unsupported`](crate::error::ErrorKind::Unsupported).
    pub fn is_capped(&self) -> Result<bool> {
        Err(Error::unsupported("is_capped"))
    }

    /// Not supported: always fails with
    /// [`ErrorKind::Unsupported`](crate::error::ErrorKind::Unsupported).
    pub fn re_index(&self) -> Result<Document> {
        Err(Error::unsupported("re_index"))
    }

    /// The write concern an operation runs with: the operation's own, else the collection's, else
    /// the server default.
    fn resolve_write_concern(&self, write_concern: Option<WriteConcern>) -> Result<WriteConcern> {
        let write_concern = write_concern
            .or_else(|| self.inner.write_concern.clone())
            .unwrap_or_default();
        write_concern.validate()?;
        Ok(write_concern)
    }

    async fn check_out(&self) -> Result<PooledConnection> {
        PooledConnection::check_out(self.inner.db.pool()).await
    }

    pub(crate) fn index_cache(&self) -> &IndexCache {
        &self.inner.index_cache
    }
}

/// Checks `name` against the limits the server places on collection names.
pub(crate) fn validate_collection_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "collection names cannot be empty"));
    }
    if name.contains('\0') {
        return Err(Error::invalid_name(
            name,
            "collection names cannot contain the null character",
        ));
    }
    if name.len() > MAX_COLLECTION_NAME_LENGTH {
        return Err(Error::invalid_name(
            name,
            &format!(
                "collection names cannot be longer than {} bytes",
                MAX_COLLECTION_NAME_LENGTH
            ),
        ));
    }
    Ok(())
}

/// A struct modeling the canonical name for a collection in MongoDB.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// The name of the database associated with this namespace.
    pub db: String,

    /// The name of the collection this namespace corresponds to.
    pub coll: String,
}

impl Namespace {
    /// Construct a `Namespace` with the given database and collection.
    pub fn new(db: impl Into<String>, coll: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            coll: coll.into(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}.{}", self.db, self.coll)
    }
}

impl FromStr for Namespace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((db, coll)) if !db.is_empty() && !coll.is_empty() => Ok(Self::new(db, coll)),
            _ => Err(Error::invalid_argument(
                "Missing one or more fields in namespace",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
