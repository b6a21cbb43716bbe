//! This crate contains the write and command core of a MongoDB client: the layer that turns
//! collection writes (insert, update, remove, save) and index management into legacy wire
//! protocol messages (`OP_INSERT`, `OP_UPDATE`, `OP_DELETE` and `OP_QUERY` commands), sends them
//! over pooled connections, and hands back the server's acknowledgments according to a
//! configurable [write concern](options::WriteConcern). It uses the [`bson`] crate for BSON
//! support and [`tokio`] for I/O.
//!
//! # Example Usage
//!
//! ## Obtaining a collection
//! A [`Database`] is created over a [`ConnectionPool`](cmap::ConnectionPool). The bundled
//! [`TcpConnectionPool`](cmap::TcpConnectionPool) lazily opens TCP connections to a single
//! server.
//!
//! ```rust
//! # use std::sync::Arc;
//! # use mongodb_write_core::{
//! #     cmap::{ConnectionPool, ConnectionPoolOptions, TcpConnectionPool},
//! #     error::Result,
//! #     options::{DatabaseOptions, WriteConcern},
//! #     Database,
//! # };
//! #
//! # fn make_collection() -> Result<()> {
//! let pool: Arc<dyn ConnectionPool> = Arc::new(TcpConnectionPool::new(
//!     ConnectionPoolOptions::builder()
//!         .address("localhost:27017".to_string())
//!         .max_pool_size(4)
//!         .build(),
//! ));
//! let options = DatabaseOptions::builder()
//!     .write_concern(WriteConcern::majority())
//!     .build();
//! let db = Database::new("shop", pool, options)?;
//! let coll = db.collection("books")?;
//! # let _ = coll;
//! # Ok(())
//! # }
//! ```
//!
//! ## Writing documents
//! Writes accept [`Document`](bson::Document)s and, through the [`Typed`] wrapper, any
//! serializable value. Documents inserted without an `_id` receive a generated `ObjectId` as
//! their first field.
//!
//! ```rust
//! # use mongodb_write_core::{bson::doc, error::Result, options::UpdateOptions, Collection};
//! #
//! # async fn write(coll: Collection) -> Result<()> {
//! let mut docs = vec![
//!     doc! { "title": "1984", "author": "George Orwell" },
//!     doc! { "title": "Animal Farm", "author": "George Orwell" },
//! ];
//! let result = coll.insert_many(docs.iter_mut(), None).await?;
//! if let Some(message) = result.write_error() {
//!     println!("insert failed: {}", message);
//! }
//!
//! coll.update(
//!     &doc! { "author": "George Orwell" },
//!     &doc! { "$set": { "checked_out": true } },
//!     UpdateOptions::builder().multi(true).build(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod options;

pub use ::bson;

mod bson_util;
pub mod cmap;
mod coll;
mod concern;
mod db;
mod document;
pub mod error;
mod index;
pub mod results;
mod serde_util;
mod trace;
pub mod wire;

pub use crate::{
    coll::{Collection, Namespace, MAX_COLLECTION_NAME_LENGTH},
    db::Database,
    document::{ToDocument, Typed},
    index::{canonical_index_name, IndexModel},
    results::WriteResult,
};
