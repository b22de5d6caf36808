//! Book storage: the `BookStore` seam and its MongoDB implementation

use async_trait::async_trait;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
    Collection,
};

use crate::{
    error::{AppError, AppResult},
    models::book::{BookDocument, UpdateBook},
};

/// Single-document operations on the book collection
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new document and return it as stored
    async fn insert(&self, book: BookDocument) -> AppResult<BookDocument>;

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>>;

    /// Apply a partial update, returning the document after the change
    async fn update_by_id(&self, id: ObjectId, patch: &UpdateBook)
        -> AppResult<Option<BookDocument>>;

    /// Remove a document, returning what was removed
    async fn delete_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>>;
}

/// MongoDB-backed store
#[derive(Clone)]
pub struct MongoBookStore {
    collection: Collection<BookDocument>,
}

impl MongoBookStore {
    pub fn new(collection: Collection<BookDocument>) -> Self {
        Self { collection }
    }
}

/// Build the `$set` document for a partial update
fn set_document(patch: &UpdateBook) -> Document {
    let mut set = Document::new();

    macro_rules! set_field {
        ($field:expr, $name:expr) => {
            if let Some(ref val) = $field {
                set.insert($name, val.clone());
            }
        };
    }

    set_field!(patch.title, "title");
    set_field!(patch.author, "author");
    set_field!(patch.genre, "genre");
    set_field!(patch.published_year, "publishedYear");
    set_field!(patch.available_copies, "availableCopies");

    set
}

#[async_trait]
impl BookStore for MongoBookStore {
    async fn insert(&self, book: BookDocument) -> AppResult<BookDocument> {
        self.collection.insert_one(&book).await?;
        Ok(book)
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        patch: &UpdateBook,
    ) -> AppResult<Option<BookDocument>> {
        let set = set_document(patch);

        // MongoDB rejects an empty `$set`
        if set.is_empty() {
            return self.find_by_id(id).await;
        }

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>> {
        Ok(self.collection.find_one_and_delete(doc! { "_id": id }).await?)
    }
}

/// Store used when no database client could be built; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedStore;

impl DisconnectedStore {
    fn unavailable<T>() -> AppResult<T> {
        Err(AppError::Internal("database is not connected".to_string()))
    }
}

#[async_trait]
impl BookStore for DisconnectedStore {
    async fn insert(&self, _book: BookDocument) -> AppResult<BookDocument> {
        Self::unavailable()
    }

    async fn find_by_id(&self, _id: ObjectId) -> AppResult<Option<BookDocument>> {
        Self::unavailable()
    }

    async fn update_by_id(
        &self,
        _id: ObjectId,
        _patch: &UpdateBook,
    ) -> AppResult<Option<BookDocument>> {
        Self::unavailable()
    }

    async fn delete_by_id(&self, _id: ObjectId) -> AppResult<Option<BookDocument>> {
        Self::unavailable()
    }
}
