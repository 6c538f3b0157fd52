//! Word lifecycle operations for one user and language
//!
//! The service keeps the user's vocabulary for the active language in memory
//! and refetches it from the store after every write.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::clock::Clock;

use super::models::{
    normalize_word, ExampleSentence, ItemUpdate, ReviewRecord, ReviewStats, VocabularyCounts, VocabularyItem,
    WordStatus, DEFAULT_NEW_WORD_EASE,
};
use super::store::{ItemFilter, ItemOrder, ItemQuery, Result, VocabularyStore};

/// Optional content attached when a word is first saved
#[derive(Debug, Clone, Default)]
pub struct NewWord {
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub lesson_id: Option<String>,
    pub example: Option<ExampleSentence>,
}

pub struct VocabularyService<'a, S: VocabularyStore + ?Sized, C: Clock + ?Sized> {
    store: &'a S,
    clock: &'a C,
    user_id: String,
    language: String,
    new_word_ease: f64,
    /// Newest first
    items: Vec<VocabularyItem>,
}

impl<'a, S: VocabularyStore + ?Sized, C: Clock + ?Sized> VocabularyService<'a, S, C> {
    /// Create the service and load the current vocabulary
    pub fn open(store: &'a S, clock: &'a C, user_id: &str, language: &str) -> Result<Self> {
        let mut service = Self {
            store,
            clock,
            user_id: user_id.to_string(),
            language: language.to_string(),
            new_word_ease: DEFAULT_NEW_WORD_EASE,
            items: Vec::new(),
        };
        service.refresh()?;
        Ok(service)
    }

    pub fn with_new_word_ease(mut self, ease_factor: f64) -> Self {
        self.new_word_ease = ease_factor;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Reload the vocabulary list from the store
    pub fn refresh(&mut self) -> Result<()> {
        let query = ItemQuery::new(&self.user_id, &self.language, ItemFilter::All, ItemOrder::CreatedDesc);
        self.items = self.store.list_where(&query)?;
        log::debug!(
            "Loaded {} vocabulary items for {}/{}",
            self.items.len(),
            self.user_id,
            self.language
        );
        Ok(())
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn find_word(&self, word: &str) -> Option<&VocabularyItem> {
        let normalized = normalize_word(word);
        self.items.iter().find(|item| item.word == normalized)
    }

    pub fn word_status(&self, word: &str) -> Option<WordStatus> {
        self.find_word(word).map(|item| item.status)
    }

    fn new_item(&self, word: &str, status: WordStatus) -> VocabularyItem {
        VocabularyItem::new(&self.user_id, &self.language, word, status, self.clock.now())
            .with_ease_factor(self.new_word_ease)
    }

    /// Start tracking a word; an already tracked word is returned unchanged
    pub fn add_word(&mut self, word: &str, content: NewWord) -> Result<VocabularyItem> {
        if let Some(existing) = self.find_word(word) {
            return Ok(existing.clone());
        }

        let mut item = self.new_item(word, WordStatus::New);
        item.translation = content.translation;
        item.definition = content.definition;
        item.source_lesson_id = content.lesson_id;
        item.examples.extend(content.example);

        let inserted = self.store.insert(&item)?;
        self.refresh()?;
        Ok(inserted)
    }

    pub fn update_status(&mut self, id: Uuid, status: WordStatus) -> Result<VocabularyItem> {
        let update = ItemUpdate {
            status: Some(status),
            updated_at: Some(self.clock.now()),
            ..ItemUpdate::default()
        };
        let updated = self.store.update_fields(id, &update)?;
        log::info!("Status of '{}' set to {}", updated.word, status.label());
        self.refresh()?;
        Ok(updated)
    }

    pub fn update_translation(
        &mut self,
        id: Uuid,
        translation: &str,
        definition: Option<&str>,
    ) -> Result<VocabularyItem> {
        let update = ItemUpdate {
            translation: Some(translation.to_string()),
            definition: definition.map(str::to_string),
            updated_at: Some(self.clock.now()),
            ..ItemUpdate::default()
        };
        let updated = self.store.update_fields(id, &update)?;
        self.refresh()?;
        Ok(updated)
    }

    fn set_word_status(&mut self, word: &str, status: WordStatus) -> Result<VocabularyItem> {
        if let Some(id) = self.find_word(word).map(|item| item.id) {
            return self.update_status(id, status);
        }

        let item = self.new_item(word, status);
        let inserted = self.store.insert(&item)?;
        self.refresh()?;
        Ok(inserted)
    }

    pub fn mark_known(&mut self, word: &str) -> Result<VocabularyItem> {
        self.set_word_status(word, WordStatus::Known)
    }

    pub fn ignore_word(&mut self, word: &str) -> Result<VocabularyItem> {
        self.set_word_status(word, WordStatus::Ignored)
    }

    /// Track every not-yet-tracked word as known; returns how many were added
    pub fn mark_all_known<I, W>(&mut self, words: I) -> Result<usize>
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let tracked: HashSet<String> = self.items.iter().map(|item| item.word.clone()).collect();
        let mut seen = HashSet::new();
        let mut marked = 0;

        for word in words {
            let word = normalize_word(word.as_ref());
            if word.is_empty() || tracked.contains(&word) || !seen.insert(word.clone()) {
                continue;
            }
            self.store.insert(&self.new_item(&word, WordStatus::Known))?;
            marked += 1;
        }

        self.refresh()?;
        log::info!("Marked {} words as known in {}", marked, self.language);
        Ok(marked)
    }

    pub fn counts(&self) -> VocabularyCounts {
        VocabularyCounts::from_items(&self.items)
    }

    /// Delete all vocabulary and review history for this language
    pub fn reset_language_progress(&mut self) -> Result<usize> {
        let removed = self.store.delete_language(&self.user_id, &self.language)?;
        log::info!(
            "Reset {} progress for {}: {} items removed",
            self.language,
            self.user_id,
            removed
        );
        self.refresh()?;
        Ok(removed)
    }

    /// Due and new counts plus today's review activity
    pub fn review_stats(&self) -> Result<ReviewStats> {
        let now = self.clock.now();
        let due_items = self.items.iter().filter(|item| item.is_due(now)).count();
        let new_items = self
            .items
            .iter()
            .filter(|item| ItemFilter::Unreviewed.matches(item))
            .count();

        let reviews = self.store.list_reviews(&self.user_id, &self.language)?;
        let today = now.date_naive();
        let todays: Vec<&ReviewRecord> = reviews
            .iter()
            .filter(|r| r.reviewed_at.date_naive() == today)
            .collect();

        Ok(ReviewStats {
            due_items,
            new_items,
            reviews_today: todays.len(),
            correct_today: todays.iter().filter(|r| r.is_correct()).count(),
            streak_days: review_streak(&reviews, today),
        })
    }
}

/// Consecutive days with at least one review, ending today or yesterday
fn review_streak(reviews: &[ReviewRecord], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = reviews.iter().map(|r| r.reviewed_at.date_naive()).collect();

    let mut check_date = if days.contains(&today) {
        today
    } else {
        // Today might not be over; check yesterday
        today - Duration::days(1)
    };

    let mut streak = 0;
    while days.contains(&check_date) {
        streak += 1;
        check_date = check_date - Duration::days(1);
    }
    streak
}
