//! In-process book store with the same semantics as the MongoDB one

use async_trait::async_trait;
use indexmap::IndexMap;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::books::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::book::{BookDocument, UpdateBook},
};

/// Books kept in insertion order, keyed by identifier
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<IndexMap<ObjectId, BookDocument>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn insert(&self, book: BookDocument) -> AppResult<BookDocument> {
        let mut books = self.books.write().await;
        if books.contains_key(&book.id) {
            return Err(AppError::Internal(format!(
                "duplicate key: _id {}",
                book.id.to_hex()
            )));
        }
        books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>> {
        Ok(self.books.read().await.get(&id).cloned())
    }

    async fn update_by_id(
        &self,
        id: ObjectId,
        patch: &UpdateBook,
    ) -> AppResult<Option<BookDocument>> {
        let mut books = self.books.write().await;
        Ok(books.get_mut(&id).map(|book| {
            patch.apply_to(book);
            book.clone()
        }))
    }

    async fn delete_by_id(&self, id: ObjectId) -> AppResult<Option<BookDocument>> {
        Ok(self.books.write().await.shift_remove(&id))
    }
}
