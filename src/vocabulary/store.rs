//! The item store boundary
//!
//! The scheduler and session builder only ever ask for the filters and
//! orderings expressible as an [`ItemQuery`].

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::{ItemUpdate, ReviewRecord, VocabularyItem, WordStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Vocabulary item not found: {0}")]
    NotFound(Uuid),

    #[error("Corrupt stored record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Which items a query selects
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemFilter {
    /// Every item of the user and language
    All,
    /// Learning items (status 1..=4) whose next review is at or before the instant
    DueAt(DateTime<Utc>),
    /// Items with status 1 that were never reviewed
    Unreviewed,
}

impl ItemFilter {
    pub fn matches(&self, item: &VocabularyItem) -> bool {
        match self {
            Self::All => true,
            Self::DueAt(now) => item.status.is_learning() && item.next_review_date <= *now,
            Self::Unreviewed => item.status == WordStatus::New && item.repetitions == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// Most overdue first
    NextReviewAsc,
    /// Oldest first
    CreatedAsc,
    /// Newest first
    CreatedDesc,
}

impl ItemOrder {
    pub fn compare(&self, a: &VocabularyItem, b: &VocabularyItem) -> Ordering {
        match self {
            Self::NextReviewAsc => a
                .next_review_date
                .cmp(&b.next_review_date)
                .then_with(|| a.created_at.cmp(&b.created_at)),
            Self::CreatedAsc => a.created_at.cmp(&b.created_at),
            Self::CreatedDesc => b.created_at.cmp(&a.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub user_id: String,
    pub language: String,
    pub filter: ItemFilter,
    pub order: ItemOrder,
    pub limit: Option<usize>,
}

impl ItemQuery {
    pub fn new(user_id: &str, language: &str, filter: ItemFilter, order: ItemOrder) -> Self {
        Self {
            user_id: user_id.to_string(),
            language: language.to_string(),
            filter,
            order,
            limit: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, item: &VocabularyItem) -> bool {
        item.user_id == self.user_id && item.language == self.language && self.filter.matches(item)
    }

    /// Filter, sort and truncate an in-memory list the way a store would
    pub fn select(&self, items: impl IntoIterator<Item = VocabularyItem>) -> Vec<VocabularyItem> {
        let mut selected: Vec<VocabularyItem> =
            items.into_iter().filter(|item| self.matches(item)).collect();
        selected.sort_by(|a, b| self.order.compare(a, b));
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

/// Persistence for vocabulary items and their review history
pub trait VocabularyStore {
    fn list_where(&self, query: &ItemQuery) -> Result<Vec<VocabularyItem>>;

    fn get_item(&self, id: Uuid) -> Result<VocabularyItem>;

    fn insert(&self, item: &VocabularyItem) -> Result<VocabularyItem>;

    /// Apply a partial update to one item and return the stored result
    fn update_fields(&self, id: Uuid, update: &ItemUpdate) -> Result<VocabularyItem>;

    /// Remove every item and review record of a user's language; returns the item count
    fn delete_language(&self, user_id: &str, language: &str) -> Result<usize>;

    fn append_review(&self, record: &ReviewRecord) -> Result<()>;

    fn list_reviews(&self, user_id: &str, language: &str) -> Result<Vec<ReviewRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn item(status: WordStatus, due_in_days: i64, created_offset: i64) -> VocabularyItem {
        let base = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let mut item = VocabularyItem::new("u1", "it", "parola", status, base);
        item.next_review_date = base + Duration::days(due_in_days);
        item.created_at = base + Duration::minutes(created_offset);
        item
    }

    #[test]
    fn test_due_filter_excludes_non_learning_and_future() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let filter = ItemFilter::DueAt(now);

        assert!(filter.matches(&item(WordStatus::Learning2, -1, 0)));
        assert!(filter.matches(&item(WordStatus::New, 0, 0)));
        assert!(!filter.matches(&item(WordStatus::Learning2, 1, 0)));
        assert!(!filter.matches(&item(WordStatus::Ignored, -3, 0)));
        assert!(!filter.matches(&item(WordStatus::Known, -3, 0)));
        assert!(!filter.matches(&item(WordStatus::Mastered, -3, 0)));
    }

    #[test]
    fn test_unreviewed_filter() {
        let mut reviewed = item(WordStatus::New, 0, 0);
        reviewed.repetitions = 1;
        assert!(!ItemFilter::Unreviewed.matches(&reviewed));
        assert!(!ItemFilter::Unreviewed.matches(&item(WordStatus::Learning1, 0, 0)));
        assert!(ItemFilter::Unreviewed.matches(&item(WordStatus::New, 5, 0)));
    }

    #[test]
    fn test_select_orders_and_limits() {
        let items = vec![
            item(WordStatus::New, -1, 2),
            item(WordStatus::New, -5, 1),
            item(WordStatus::New, -3, 0),
        ];
        let query = ItemQuery::new("u1", "it", ItemFilter::All, ItemOrder::NextReviewAsc).limit(2);
        let selected = query.select(items.clone());
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].id, items[1].id);
        assert_eq!(selected[1].id, items[2].id);

        let query = ItemQuery::new("u1", "it", ItemFilter::All, ItemOrder::CreatedAsc);
        let selected = query.select(items.clone());
        assert_eq!(selected[0].id, items[2].id);
    }

    #[test]
    fn test_select_scopes_user_and_language() {
        let mut other_lang = item(WordStatus::New, 0, 0);
        other_lang.language = "pt".to_string();
        let mut other_user = item(WordStatus::New, 0, 0);
        other_user.user_id = "u2".to_string();
        let query = ItemQuery::new("u1", "it", ItemFilter::All, ItemOrder::CreatedAsc);
        assert!(query.select(vec![other_lang, other_user]).is_empty());
    }
}
