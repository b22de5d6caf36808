//! Repository layer for database operations

pub mod books;
pub mod memory;

use mongodb::{bson::doc, Client};
use std::sync::Arc;

use crate::config::{DatabaseConfig, StorageBackend};

pub use books::{BookStore, DisconnectedStore, MongoBookStore};
pub use memory::InMemoryBookStore;

/// Collection holding book documents
pub const BOOKS_COLLECTION: &str = "books";

/// Main repository struct holding the storage handle
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a new repository over the given store
    pub fn new(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }

    /// Repository backed by process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBookStore::new()))
    }

    /// Build the repository for the configured backend.
    ///
    /// Never fails: connectivity is checked in the background and only logged,
    /// and an unusable connection string leaves the store disconnected so that
    /// each request fails on its own.
    pub async fn connect(config: &DatabaseConfig) -> Self {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!("Using in-memory book store");
                Self::in_memory()
            }
            StorageBackend::Mongodb => match Client::with_uri_str(&config.uri).await {
                Ok(client) => {
                    let database = client
                        .default_database()
                        .unwrap_or_else(|| client.database(&config.name));

                    let handle = database.clone();
                    tokio::spawn(async move {
                        match handle.run_command(doc! { "ping": 1 }).await {
                            Ok(_) => {
                                tracing::info!(database = handle.name(), "Connected to MongoDB")
                            }
                            Err(e) => tracing::error!("MongoDB connection error: {}", e),
                        }
                    });

                    Self::new(Arc::new(MongoBookStore::new(
                        database.collection(BOOKS_COLLECTION),
                    )))
                }
                Err(e) => {
                    tracing::error!("MongoDB connection error: {}", e);
                    Self::new(Arc::new(DisconnectedStore))
                }
            },
        }
    }
}
