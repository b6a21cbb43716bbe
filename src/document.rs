//! The capability shared by every value that can be written to a collection.

use std::borrow::Cow;

use serde::Serialize;

use crate::{bson::Document, error::Result};

/// A value that can be converted into the [`Document`] model before being encoded onto the wire.
///
/// Every write operation in this crate funnels its inputs through [`ToDocument::to_document`].
/// Values that *are* documents additionally expose themselves mutably through
/// [`ToDocument::document_mut`], which is how operations such as
/// [`Collection::insert_many`](crate::Collection::insert_many) and
/// [`Collection::save`](crate::Collection::save) assign an `_id` that the caller can observe
/// afterwards. Strongly typed values wrapped in [`Typed`] are left untouched: no `_id` is injected
/// into them, and the server assigns one when the document is stored.
pub trait ToDocument {
    /// Converts this value into a document.
    fn to_document(&self) -> Result<Cow<'_, Document>>;

    /// Mutable access to the underlying document, if this value is one.
    fn document_mut(&mut self) -> Option<&mut Document> {
        None
    }
}

impl ToDocument for Document {
    fn to_document(&self) -> Result<Cow<'_, Document>> {
        Ok(Cow::Borrowed(self))
    }

    fn document_mut(&mut self) -> Option<&mut Document> {
        Some(self)
    }
}

/// Wraps any [`Serialize`] value so that it can be written to a collection.
///
/// ```
/// # use mongodb_write_core::Typed;
/// #[derive(serde::Serialize)]
/// struct Book {
///     title: String,
/// }
///
/// let book = Typed(Book { title: "Dune".to_string() });
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Typed<T>(pub T);

impl<T: Serialize> ToDocument for Typed<T> {
    fn to_document(&self) -> Result<Cow<'_, Document>> {
        Ok(Cow::Owned(crate::bson::to_document(&self.0)?))
    }
}
