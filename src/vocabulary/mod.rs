//! Tracked vocabulary for Lexis
//!
//! This module provides:
//! - The vocabulary item model and its learning status
//! - The item store boundary with JSON-file and SQLite implementations
//! - Word lifecycle operations (add, mark known, ignore, reset)

pub mod file_store;
pub mod models;
pub mod service;
pub mod sqlite_store;
pub mod store;

pub use file_store::FileVocabularyStore;
pub use models::*;
pub use service::{NewWord, VocabularyService};
pub use sqlite_store::SqliteVocabularyStore;
pub use store::{ItemFilter, ItemOrder, ItemQuery, StoreError, VocabularyStore};
