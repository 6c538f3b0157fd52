//! JSON file storage for vocabulary
//!
//! Directory structure:
//! ```text
//! vocabulary/
//! ├── items/
//! │   └── {item-id}.json     # One vocabulary item per file
//! └── reviews/
//!     └── {record-id}.json   # One review record per file
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::models::{ItemUpdate, ReviewRecord, VocabularyItem};
use super::store::{ItemQuery, Result, StoreError, VocabularyStore};

/// Storage manager writing each record to its own JSON file
pub struct FileVocabularyStore {
    /// Base path for vocabulary (e.g., ~/.local/share/lexis/vocabulary)
    base_path: PathBuf,
}

impl FileVocabularyStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            base_path: data_dir.join("vocabulary"),
        }
    }

    fn items_dir(&self) -> PathBuf {
        self.base_path.join("items")
    }

    fn reviews_dir(&self) -> PathBuf {
        self.base_path.join("reviews")
    }

    fn item_path(&self, id: Uuid) -> PathBuf {
        self.items_dir().join(format!("{}.json", id))
    }

    fn review_path(&self, id: Uuid) -> PathBuf {
        self.reviews_dir().join(format!("{}.json", id))
    }

    /// Create the storage directories
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.items_dir())?;
        fs::create_dir_all(self.reviews_dir())?;
        Ok(())
    }

    fn write_item(&self, item: &VocabularyItem) -> Result<()> {
        fs::write(self.item_path(item.id), serde_json::to_string_pretty(item)?)?;
        Ok(())
    }

    fn list_items(&self) -> Result<Vec<VocabularyItem>> {
        read_json_dir(&self.items_dir())
    }
}

/// Read every `.json` file in a directory; a missing directory is empty.
/// Files that cannot be read or parsed are skipped.
fn read_json_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.extension().map_or(false, |ext| ext == "json") {
            continue;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Skipping unreadable record {}: {}", path.display(), e);
                continue;
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => records.push(record),
            Err(e) => log::warn!("Skipping malformed record {}: {}", path.display(), e),
        }
    }
    Ok(records)
}

impl VocabularyStore for FileVocabularyStore {
    fn list_where(&self, query: &ItemQuery) -> Result<Vec<VocabularyItem>> {
        Ok(query.select(self.list_items()?))
    }

    fn get_item(&self, id: Uuid) -> Result<VocabularyItem> {
        let path = self.item_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn insert(&self, item: &VocabularyItem) -> Result<VocabularyItem> {
        self.init()?;
        self.write_item(item)?;
        log::info!("Stored vocabulary item {} ({})", item.id, item.word);
        Ok(item.clone())
    }

    fn update_fields(&self, id: Uuid, update: &ItemUpdate) -> Result<VocabularyItem> {
        let mut item = self.get_item(id)?;
        update.apply(&mut item);
        self.write_item(&item)?;
        Ok(item)
    }

    fn delete_language(&self, user_id: &str, language: &str) -> Result<usize> {
        let mut removed = 0;
        for item in self.list_items()? {
            if item.user_id == user_id && item.language == language {
                fs::remove_file(self.item_path(item.id))?;
                removed += 1;
            }
        }

        for record in self.list_reviews(user_id, language)? {
            let path = self.review_path(record.id);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }

        Ok(removed)
    }

    fn append_review(&self, record: &ReviewRecord) -> Result<()> {
        self.init()?;
        fs::write(
            self.review_path(record.id),
            serde_json::to_string_pretty(record)?,
        )?;
        Ok(())
    }

    fn list_reviews(&self, user_id: &str, language: &str) -> Result<Vec<ReviewRecord>> {
        let mut records: Vec<ReviewRecord> = read_json_dir(&self.reviews_dir())?;
        records.retain(|r| r.user_id == user_id && r.language == language);
        records.sort_by(|a, b| a.reviewed_at.cmp(&b.reviewed_at));
        Ok(records)
    }
}
