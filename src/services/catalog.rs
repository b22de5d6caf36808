//! Catalog management service

use mongodb::bson::oid::ObjectId;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

/// Parse a client-supplied identifier; a malformed one is a server-side cast failure
fn parse_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::MalformedId(id.to_string()))
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Validate required fields and persist a new book
    pub async fn create_book(&self, data: CreateBook) -> AppResult<Book> {
        let document = data.into_document()?;
        let created = self.repository.books.insert(document).await?;
        tracing::debug!("Created book id={}", created.id);
        Ok(created.into())
    }

    pub async fn get_book(&self, id: &str) -> AppResult<Book> {
        let id = parse_id(id)?;
        self.repository
            .books
            .find_by_id(id)
            .await?
            .map(Book::from)
            .ok_or_else(AppError::book_not_found)
    }

    /// Apply a partial update and return the record as it is afterwards
    pub async fn update_book(&self, id: &str, patch: &UpdateBook) -> AppResult<Book> {
        let id = parse_id(id)?;
        self.repository
            .books
            .update_by_id(id, patch)
            .await?
            .map(Book::from)
            .ok_or_else(AppError::book_not_found)
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<()> {
        let id = parse_id(id)?;
        match self.repository.books.delete_by_id(id).await? {
            Some(_) => {
                tracing::debug!("Deleted book id={}", id);
                Ok(())
            }
            None => Err(AppError::book_not_found()),
        }
    }
}
