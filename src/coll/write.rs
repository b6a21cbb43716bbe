use super::{
    options::{InsertOptions, RemoveOptions, UpdateOptions},
    Collection,
};
use crate::{
    bson::{doc, Document},
    bson_util,
    concern::WriteConcern,
    document::ToDocument,
    error::{ErrorKind, Result},
    results::WriteResult,
    wire::{DeleteFlags, InsertFlags, Message, UpdateFlags},
};

impl Collection {
    /// Inserts `document` into the collection.
    ///
    /// A [`Document`] without an `_id` gets a generated `ObjectId` inserted as its first field,
    /// which the caller can read back once this returns.
    pub async fn insert_one<D>(
        &self,
        document: &mut D,
        options: impl Into<Option<InsertOptions>>,
    ) -> Result<WriteResult>
    where
        D: ToDocument + ?Sized,
    {
        self.insert_many(std::iter::once(document), options).await
    }

    /// Inserts the documents yielded by `documents` into the collection.
    ///
    /// The documents are sent on a single connection, in as many messages as needed to keep each
    /// message within the connection's maximum message length; a message is only allowed past
    /// that length when it holds a single document, which the connection then rejects. Documents
    /// keep their order across messages. The result holds one acknowledgment per message sent.
    ///
    /// As with [`Collection::insert_one`], [`Document`]s without an `_id` get one generated.
    pub async fn insert_many<'d, D, I>(
        &self,
        documents: I,
        options: impl Into<Option<InsertOptions>>,
    ) -> Result<WriteResult>
    where
        D: ToDocument + ?Sized + 'd,
        I: IntoIterator<Item = &'d mut D>,
    {
        let options = options.into().unwrap_or_default();
        let write_concern = self.resolve_write_concern(options.write_concern)?;
        let flags = if options.continue_on_error == Some(true) {
            InsertFlags::CONTINUE_ON_ERROR
        } else {
            InsertFlags::empty()
        };

        let mut connection = self.check_out().await?;
        let max_message_length = connection.max_message_length();
        let mut message = Message::insert(&self.namespace(), flags);
        let mut acknowledgments = Vec::new();

        for document in documents {
            message.append_document(prepare_insert(document)?);
            if message.len() <= max_message_length || message.document_count() == 1 {
                continue;
            }

            if let Some(overflow) = message.remove_last_document() {
                if let Some(acknowledgment) = connection.send(&message, &write_concern).await? {
                    acknowledgments.push(acknowledgment);
                }
                message.reset_with(overflow);
            }
        }

        if !message.is_empty() {
            if let Some(acknowledgment) = connection.send(&message, &write_concern).await? {
                acknowledgments.push(acknowledgment);
            }
        }

        Ok(if write_concern.is_acknowledged() {
            WriteResult::from_acknowledgments(acknowledgments)
        } else {
            WriteResult::Unacknowledged
        })
    }

    /// Updates the documents matching `query` with `update`, which is either a replacement
    /// document or a document of update operators.
    ///
    /// Fails with [`ErrorKind::ArgumentOrder`] without contacting the server when a top-level
    /// field of `query` starts with `$`, which usually means `query` and `update` were swapped.
    pub async fn update<Q, U>(
        &self,
        query: &Q,
        update: &U,
        options: impl Into<Option<UpdateOptions>>,
    ) -> Result<WriteResult>
    where
        Q: ToDocument + ?Sized,
        U: ToDocument + ?Sized,
    {
        let query = query.to_document()?;
        if let Some(field) = bson_util::find_update_modifier(&query) {
            return Err(ErrorKind::ArgumentOrder {
                field: field.to_string(),
            }
            .into());
        }
        let update = update.to_document()?;

        let options = options.into().unwrap_or_default();
        let write_concern = self.resolve_write_concern(options.write_concern)?;
        let mut flags = UpdateFlags::empty();
        if options.upsert == Some(true) {
            flags |= UpdateFlags::UPSERT;
        }
        if options.multi == Some(true) {
            flags |= UpdateFlags::MULTI;
        }

        let message = Message::update(&self.namespace(), flags, &query, &update)?;
        self.send_one(&message, &write_concern).await
    }

    /// Removes the documents matching `query`.
    ///
    /// A query made of nothing but an `ObjectId` `_id` can match at most one document, so it is
    /// always sent as a single remove.
    pub async fn remove<Q>(
        &self,
        query: &Q,
        options: impl Into<Option<RemoveOptions>>,
    ) -> Result<WriteResult>
    where
        Q: ToDocument + ?Sized,
    {
        let query = query.to_document()?;
        let options = options.into().unwrap_or_default();
        let write_concern = self.resolve_write_concern(options.write_concern)?;

        let mut flags = DeleteFlags::empty();
        if options.single == Some(true) || bson_util::is_object_id_query(&query) {
            flags |= DeleteFlags::SINGLE_REMOVE;
        }

        let message = Message::delete(&self.namespace(), flags, &query)?;
        self.send_one(&message, &write_concern).await
    }

    /// Removes every document in the collection.
    pub async fn remove_all(
        &self,
        options: impl Into<Option<RemoveOptions>>,
    ) -> Result<WriteResult> {
        self.remove(&Document::new(), options).await
    }

    /// Inserts `document` if it has no `_id`, or upserts it by its `_id` otherwise.
    ///
    /// A [`Document`] without an `_id` gets a generated one inserted as its first field. Other
    /// values are converted first and the `_id` is only added to the converted copy.
    pub async fn save<D>(
        &self,
        document: &mut D,
        write_concern: impl Into<Option<WriteConcern>>,
    ) -> Result<WriteResult>
    where
        D: ToDocument + ?Sized,
    {
        let write_concern = write_concern.into();
        let id = match document.document_mut() {
            Some(document) => document.get("_id").cloned(),
            None => document.to_document()?.get("_id").cloned(),
        };

        if let Some(id) = id {
            let options = UpdateOptions {
                upsert: Some(true),
                multi: None,
                write_concern,
            };
            return self.update(&doc! { "_id": id }, &*document, options).await;
        }

        let options = InsertOptions {
            write_concern,
            continue_on_error: None,
        };
        if document.document_mut().is_some() {
            return self.insert_one(document, options).await;
        }

        let mut converted = document.to_document()?.into_owned();
        bson_util::ensure_id(&mut converted);
        self.insert_one(&mut converted, options).await
    }

    async fn send_one(&self, message: &Message, write_concern: &WriteConcern) -> Result<WriteResult> {
        let mut connection = self.check_out().await?;
        Ok(match connection.send(message, write_concern).await? {
            Some(acknowledgment) => WriteResult::Acknowledged(acknowledgment),
            None => WriteResult::Unacknowledged,
        })
    }
}

/// Assigns an `_id` to `document` if it is a [`Document`] lacking one, checks its field names and
/// encodes it.
fn prepare_insert<D: ToDocument + ?Sized>(document: &mut D) -> Result<Vec<u8>> {
    if let Some(document) = document.document_mut() {
        bson_util::ensure_id(document);
    }

    let document = document.to_document()?;
    bson_util::validate_element_names(&document)?;
    Ok(crate::bson::to_vec(document.as_ref())?)
}
