pub mod options;

use std::sync::Arc;

use self::options::DatabaseOptions;
use crate::{
    bson::Document,
    cmap::{ConnectionPool, PooledConnection},
    coll::options::CollectionOptions,
    concern::WriteConcern,
    error::{Error, Result},
    Collection,
};

/// Characters the server does not allow in database names.
const ILLEGAL_DATABASE_NAME_CHARACTERS: &[char] = &['/', '\\', '.', ' ', '"', '$'];

/// `Database` is the client-side abstraction of a MongoDB database. It hands out [`Collection`]
/// handles and runs commands, all over connections checked out of one [`ConnectionPool`].
///
/// `Database` uses [`std::sync::Arc`] internally, so it can safely be shared across threads or
/// async tasks.
#[derive(Clone, Debug)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

#[derive(Debug)]
struct DatabaseInner {
    name: String,
    pool: Arc<dyn ConnectionPool>,
    write_concern: Option<WriteConcern>,
}

impl Database {
    /// Creates a handle to the database `name` whose operations use connections from `pool`.
    ///
    /// Fails with [`ErrorKind::InvalidName`](crate::error::ErrorKind::InvalidName) if the server
    /// would not accept `name`.
    pub fn new(
        name: impl AsRef<str>,
        pool: Arc<dyn ConnectionPool>,
        options: impl Into<Option<DatabaseOptions>>,
    ) -> Result<Self> {
        let name = name.as_ref();
        validate_database_name(name)?;

        let options = options.into().unwrap_or_default();
        if let Some(ref write_concern) = options.write_concern {
            write_concern.validate()?;
        }

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                name: name.to_string(),
                pool,
                write_concern: options.write_concern,
            }),
        })
    }

    /// Gets the name of the `Database`.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Gets the write concern of the `Database`.
    pub fn write_concern(&self) -> Option<&WriteConcern> {
        self.inner.write_concern.as_ref()
    }

    pub(crate) fn pool(&self) -> &Arc<dyn ConnectionPool> {
        &self.inner.pool
    }

    /// Gets a handle to a collection in this database with the provided name. The collection
    /// inherits the write concern of the database.
    ///
    /// Fails with [`ErrorKind::InvalidName`](crate::error::ErrorKind::InvalidName) if `name` is
    /// empty, contains a null character or is longer than
    /// [`MAX_COLLECTION_NAME_LENGTH`](crate::MAX_COLLECTION_NAME_LENGTH) bytes.
    pub fn collection(&self, name: &str) -> Result<Collection> {
        Collection::new(self.clone(), name, None)
    }

    /// Gets a handle to a collection in this database with the provided name.
    /// Operations done with this `Collection` will use the options specified by
    /// `options` and will otherwise default to those of this `Database`.
    pub fn collection_with_options(
        &self,
        name: &str,
        options: CollectionOptions,
    ) -> Result<Collection> {
        Collection::new(self.clone(), name, Some(options))
    }

    /// Runs a database-level command and returns the server's reply.
    ///
    /// Fails with [`ErrorKind::Command`](crate::error::ErrorKind::Command) if the reply is not
    /// `ok`.
    pub async fn run_command(&self, command: Document) -> Result<Document> {
        let mut connection = PooledConnection::check_out(self.pool()).await?;
        connection.run_command(self.name(), command).await
    }
}

fn validate_database_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_name(name, "database names cannot be empty"));
    }
    if name.contains('\0') {
        return Err(Error::invalid_name(
            name,
            "database names cannot contain the null character",
        ));
    }
    if let Some(c) = name.chars().find(|c| ILLEGAL_DATABASE_NAME_CHARACTERS.contains(c)) {
        return Err(Error::invalid_name(
            name,
            &format!("database names cannot contain {:?}", c),
        ));
    }
    Ok(())
}
