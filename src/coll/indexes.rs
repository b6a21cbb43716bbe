use serde::Deserialize;

use super::Collection;
use crate::{
    bson::{doc, Document},
    error::Result,
    index::{canonical_index_name, IndexModel},
};

impl Collection {
    /// Creates the index described by `model` unless this collection handle already knows it
    /// exists.
    ///
    /// Known index names are cached per collection handle (and shared by its clones), so repeated
    /// calls for the same index only reach the server once. Concurrent calls for the same index
    /// are serialized and create it once. Dropping indexes clears the cache.
    pub async fn ensure_index(&self, model: IndexModel) -> Result<()> {
        let name = model.name();
        self.index_cache()
            .get_or_create(&name, move || async move {
                self.create_index(model).await.map(|_| ())
            })
            .await?;
        Ok(())
    }

    /// Creates the index described by `model` and returns the server's reply. Unlike
    /// [`Collection::ensure_index`], this always contacts the server and does not consult or
    /// update the index cache.
    pub async fn create_index(&self, model: IndexModel) -> Result<Document> {
        let command = doc! {
            "createIndexes": self.name(),
            "indexes": [model.to_index_spec()?],
        };
        self.database().run_command(command).await
    }

    /// Drops the index with the given name, then clears the index cache.
    pub async fn drop_index(&self, name: impl AsRef<str>) -> Result<Document> {
        self.drop_indexes_matching(name.as_ref()).await
    }

    /// Drops the index whose name derives from `keys`, then clears the index cache.
    pub async fn drop_index_by_keys(&self, keys: &Document) -> Result<Document> {
        self.drop_indexes_matching(&canonical_index_name(keys)).await
    }

    /// Drops every index of the collection except the one on `_id`, then clears the index cache.
    pub async fn drop_indexes(&self) -> Result<Document> {
        self.drop_indexes_matching("*").await
    }

    /// Whether an index with the given name exists on the server. The index cache is neither
    /// consulted nor updated.
    pub async fn index_exists(&self, name: impl AsRef<str>) -> Result<bool> {
        #[derive(Deserialize)]
        struct ListIndexesReply {
            cursor: ListIndexesCursor,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct ListIndexesCursor {
            first_batch: Vec<Document>,
        }

        let reply = self
            .database()
            .run_command(doc! { "listIndexes": self.name() })
            .await?;
        let reply: ListIndexesReply = crate::bson::from_document(reply)?;

        let name = name.as_ref();
        Ok(reply
            .cursor
            .first_batch
            .iter()
            .any(|index| matches!(index.get_str("name"), Ok(n) if n == name)))
    }

    /// Forgets every index name cached by [`Collection::ensure_index`].
    pub async fn reset_index_cache(&self) {
        self.index_cache().clear().await;
    }

    async fn drop_indexes_matching(&self, index: &str) -> Result<Document> {
        let command = doc! { "dropIndexes": self.name(), "index": index };
        self.index_cache()
            .clear_after(|| self.database().run_command(command))
            .await
    }
}
