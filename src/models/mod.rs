//! Data models for the library server

pub mod book;
pub mod cast;

// Re-export commonly used types
pub use book::{Book, BookDocument, CreateBook, MessageResponse, UpdateBook};
