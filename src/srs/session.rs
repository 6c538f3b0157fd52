//! Review session assembly
//!
//! Selects due and new words for one sitting, expands them into directional
//! cards, shuffles them, and applies review responses back to the store.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::vocabulary::models::{
    CardDirection, ExampleSentence, ItemUpdate, ReviewRecord, VocabularyItem,
};
use crate::vocabulary::store::{self, ItemFilter, ItemOrder, ItemQuery, VocabularyStore};

use super::algorithm::{clamp_quality, derive_status, next_state_for, preview_intervals};

/// Default number of words in one session, due and new combined
pub const DEFAULT_SESSION_CAP: usize = 20;

const NO_TRANSLATION: &str = "No translation";

/// One prompt shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    pub item: VocabularyItem,
    pub direction: CardDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<ExampleSentence>,
}

impl ReviewCard {
    pub fn new(item: VocabularyItem, direction: CardDirection) -> Self {
        let example = item.first_example().cloned();
        Self {
            item,
            direction,
            example,
        }
    }

    fn target_text(&self) -> &str {
        self.example
            .as_ref()
            .map(|e| e.text.as_str())
            .unwrap_or(&self.item.word)
    }

    fn native_text(&self) -> &str {
        self.example
            .as_ref()
            .and_then(|e| e.translation.as_deref())
            .or(self.item.translation.as_deref())
            .unwrap_or(NO_TRANSLATION)
    }

    /// Front of the card
    pub fn prompt(&self) -> &str {
        match self.direction {
            CardDirection::TargetToNative => self.target_text(),
            CardDirection::NativeToTarget => self.native_text(),
        }
    }

    /// Back of the card
    pub fn answer(&self) -> &str {
        match self.direction {
            CardDirection::TargetToNative => self.native_text(),
            CardDirection::NativeToTarget => self.target_text(),
        }
    }
}

/// Cards for one item: both directions while it is being learned, otherwise one
pub fn expand_item(item: &VocabularyItem) -> Vec<ReviewCard> {
    if item.status.is_learning() {
        vec![
            ReviewCard::new(item.clone(), CardDirection::TargetToNative),
            ReviewCard::new(item.clone(), CardDirection::NativeToTarget),
        ]
    } else {
        vec![ReviewCard::new(item.clone(), CardDirection::TargetToNative)]
    }
}

/// Builds review sessions against an item store
pub struct SessionBuilder<'a, S: VocabularyStore + ?Sized, C: Clock + ?Sized> {
    store: &'a S,
    clock: &'a C,
    session_cap: usize,
}

impl<'a, S: VocabularyStore + ?Sized, C: Clock + ?Sized> SessionBuilder<'a, S, C> {
    pub fn new(store: &'a S, clock: &'a C) -> Self {
        Self {
            store,
            clock,
            session_cap: DEFAULT_SESSION_CAP,
        }
    }

    pub fn with_session_cap(mut self, session_cap: usize) -> Self {
        self.session_cap = session_cap;
        self
    }

    pub fn session_cap(&self) -> usize {
        self.session_cap
    }

    /// Learning items whose review date has passed, most overdue first
    pub fn get_due_items(&self, user_id: &str, language: &str) -> Vec<VocabularyItem> {
        let query = ItemQuery::new(
            user_id,
            language,
            ItemFilter::DueAt(self.clock.now()),
            ItemOrder::NextReviewAsc,
        )
        .limit(self.session_cap);

        match self.store.list_where(&query) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to fetch due items for {}/{}: {}", user_id, language, e);
                Vec::new()
            }
        }
    }

    /// Never-reviewed new items, oldest first
    pub fn get_new_items(&self, user_id: &str, language: &str, limit: usize) -> Vec<VocabularyItem> {
        if limit == 0 {
            return Vec::new();
        }

        let query = ItemQuery::new(user_id, language, ItemFilter::Unreviewed, ItemOrder::CreatedAsc)
            .limit(limit);

        match self.store.list_where(&query) {
            Ok(items) => items,
            Err(e) => {
                log::warn!("Failed to fetch new items for {}/{}: {}", user_id, language, e);
                Vec::new()
            }
        }
    }

    /// Due items followed by new items, at most `session_cap` in total
    pub fn session_pool(&self, user_id: &str, language: &str) -> Vec<VocabularyItem> {
        let mut pool = self.get_due_items(user_id, language);
        let remaining = self.session_cap.saturating_sub(pool.len());

        if remaining == 0 {
            return pool;
        }

        // Over-fetch by the due count: new items already in the pool are dropped
        let mut seen: HashSet<Uuid> = pool.iter().map(|item| item.id).collect();
        let new_items = self.get_new_items(user_id, language, remaining + pool.len());
        pool.extend(
            new_items
                .into_iter()
                .filter(|item| seen.insert(item.id))
                .take(remaining),
        );
        pool
    }

    /// The shuffled cards for one sitting
    pub fn build_session<R: Rng + ?Sized>(
        &self,
        user_id: &str,
        language: &str,
        rng: &mut R,
    ) -> Vec<ReviewCard> {
        let pool = self.session_pool(user_id, language);
        let mut cards: Vec<ReviewCard> = pool.iter().flat_map(expand_item).collect();
        cards.shuffle(rng);

        log::debug!(
            "Built session for {}/{}: {} items, {} cards",
            user_id,
            language,
            pool.len(),
            cards.len()
        );
        cards
    }

    /// Intervals each grade would give the card's item right now.
    ///
    /// Uses the stored item when it can be read, since the other direction of
    /// the same word may already have been answered.
    pub fn preview_card(&self, card: &ReviewCard) -> [u32; 4] {
        let now = self.clock.now();
        match self.store.get_item(card.item.id) {
            Ok(item) => preview_intervals(&item, now),
            Err(e) => {
                log::debug!("Previewing {} from session copy: {}", card.item.id, e);
                preview_intervals(&card.item, now)
            }
        }
    }

    /// Apply a review response to the card's item.
    ///
    /// The item is re-read so both directions of one word in a session see
    /// each other's updates. SRS fields, status and review time are written
    /// in one update; the review is then appended to the history.
    pub fn submit_review(&self, card: &ReviewCard, quality: i32) -> store::Result<VocabularyItem> {
        let item = self.store.get_item(card.item.id)?;
        let now = self.clock.now();

        let outcome = next_state_for(&item, quality, now);
        let status = derive_status(item.status, quality, outcome.repetitions);

        let update = ItemUpdate {
            status: Some(status),
            ease_factor: Some(outcome.ease_factor),
            interval_days: Some(outcome.interval),
            repetitions: Some(outcome.repetitions),
            next_review_date: Some(outcome.next_review_date),
            last_reviewed_at: Some(now),
            updated_at: Some(now),
            ..ItemUpdate::default()
        };
        let updated = self.store.update_fields(item.id, &update)?;

        let record = ReviewRecord {
            id: Uuid::new_v4(),
            item_id: item.id,
            user_id: item.user_id.clone(),
            language: item.language.clone(),
            direction: card.direction,
            quality: clamp_quality(quality),
            interval: outcome.interval,
            ease_factor: outcome.ease_factor,
            reviewed_at: now,
        };
        if let Err(e) = self.store.append_review(&record) {
            // The schedule itself was saved; only the history entry is lost
            log::warn!("Failed to record review of {}: {}", item.id, e);
        }

        log::debug!(
            "Reviewed '{}' q={} -> {:?}, next in {}d",
            updated.word,
            record.quality,
            updated.status,
            outcome.interval
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::vocabulary::file_store::FileVocabularyStore;
    use crate::vocabulary::models::{ReviewRecord, WordStatus};
    use crate::vocabulary::sqlite_store::SqliteVocabularyStore;
    use crate::vocabulary::store::StoreError;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 7, 0, 0).unwrap()
    }

    struct Fixture {
        _dir: TempDir,
        store: FileVocabularyStore,
        clock: FixedClock,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let store = FileVocabularyStore::new(dir.path());
            Self {
                _dir: dir,
                store,
                clock: FixedClock::new(now()),
            }
        }

        fn builder(&self) -> SessionBuilder<'_, FileVocabularyStore, FixedClock> {
            SessionBuilder::new(&self.store, &self.clock)
        }

        fn add(&self, word: &str, status: WordStatus, due_offset_days: i64, reps: u32) -> VocabularyItem {
            let mut item = VocabularyItem::new("u1", "es", word, status, now() - Duration::days(30));
            item.next_review_date = now() + Duration::days(due_offset_days);
            item.repetitions = reps;
            self.store.insert(&item).unwrap()
        }
    }

    /// A store whose backend is gone
    struct UnreachableStore;

    impl VocabularyStore for UnreachableStore {
        fn list_where(&self, _query: &ItemQuery) -> store::Result<Vec<VocabularyItem>> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "offline").into())
        }
        fn get_item(&self, id: Uuid) -> store::Result<VocabularyItem> {
            Err(StoreError::NotFound(id))
        }
        fn insert(&self, item: &VocabularyItem) -> store::Result<VocabularyItem> {
            Ok(item.clone())
        }
        fn update_fields(&self, id: Uuid, _update: &ItemUpdate) -> store::Result<VocabularyItem> {
            Err(StoreError::NotFound(id))
        }
        fn delete_language(&self, _user_id: &str, _language: &str) -> store::Result<usize> {
            Ok(0)
        }
        fn append_review(&self, _record: &ReviewRecord) -> store::Result<()> {
            Ok(())
        }
        fn list_reviews(&self, _user_id: &str, _language: &str) -> store::Result<Vec<ReviewRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_due_items_respect_status_and_date() {
        let fx = Fixture::new();
        fx.add("uno", WordStatus::Learning1, -2, 2);
        fx.add("dos", WordStatus::Learning3, -5, 3);
        fx.add("tres", WordStatus::Learning2, 3, 2);
        fx.add("cuatro", WordStatus::Mastered, -9, 5);
        fx.add("cinco", WordStatus::Known, -9, 0);
        fx.add("seis", WordStatus::Ignored, -9, 0);

        let due = fx.builder().get_due_items("u1", "es");
        let words: Vec<_> = due.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["dos", "uno"]);
        for item in &due {
            assert!(item.status.is_learning());
            assert!(item.next_review_date <= now());
        }
    }

    #[test]
    fn test_due_items_capped() {
        let fx = Fixture::new();
        for i in 0..8 {
            fx.add(&format!("w{}", i), WordStatus::Learning1, -1 - i, 2);
        }
        let due = fx.builder().with_session_cap(5).get_due_items("u1", "es");
        assert_eq!(due.len(), 5);
        assert_eq!(due[0].word, "w7");
    }

    #[test]
    fn test_new_items_never_reviewed() {
        let fx = Fixture::new();
        fx.add("nuevo", WordStatus::New, 5, 0);
        fx.add("visto", WordStatus::New, 5, 1);
        fx.add("aprendiendo", WordStatus::Learning1, 5, 0);

        let new_items = fx.builder().get_new_items("u1", "es", 10);
        assert_eq!(new_items.len(), 1);
        assert_eq!(new_items[0].word, "nuevo");
        assert!(fx.builder().get_new_items("u1", "es", 0).is_empty());
    }

    #[test]
    fn test_new_items_oldest_first() {
        let fx = Fixture::new();
        let mut older = VocabularyItem::new("u1", "es", "viejo", WordStatus::New, now() - Duration::days(3));
        older.next_review_date = now() + Duration::days(1);
        let mut newer = VocabularyItem::new("u1", "es", "joven", WordStatus::New, now() - Duration::days(1));
        newer.next_review_date = now() + Duration::days(1);
        fx.store.insert(&newer).unwrap();
        fx.store.insert(&older).unwrap();

        let words: Vec<_> = fx
            .builder()
            .get_new_items("u1", "es", 5)
            .into_iter()
            .map(|i| i.word)
            .collect();
        assert_eq!(words, vec!["viejo", "joven"]);
    }

    #[test]
    fn test_session_pool_respects_cap() {
        let fx = Fixture::new();
        for i in 0..3 {
            fx.add(&format!("due{}", i), WordStatus::Learning2, -1, 2);
        }
        for i in 0..6 {
            fx.add(&format!("new{}", i), WordStatus::New, 1, 0);
        }
        let pool = fx.builder().with_session_cap(5).session_pool("u1", "es");
        assert_eq!(pool.len(), 5);
        assert!(pool[..3].iter().all(|i| i.word.starts_with("due")));
    }

    #[test]
    fn test_session_pool_no_duplicates() {
        let fx = Fixture::new();
        // New, never reviewed and already due: matched by both queries
        fx.add("ambos", WordStatus::New, -1, 0);
        let pool = fx.builder().session_pool("u1", "es");
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_session_pool_fills_cap_past_overlap() {
        let fx = Fixture::new();
        let new_word = |word: &str, created_days_ago: i64, due_offset_days: i64| {
            let created = now() - Duration::days(created_days_ago);
            let mut item = VocabularyItem::new("u1", "es", word, WordStatus::New, created);
            item.next_review_date = now() + Duration::days(due_offset_days);
            fx.store.insert(&item).unwrap()
        };
        // Oldest new word is also due, so the new query returns it first
        let overlap = new_word("primero", 10, -1);
        new_word("segundo", 9, 1);
        new_word("tercero", 8, 1);
        new_word("cuarto", 7, 1);

        let pool = fx.builder().with_session_cap(3).session_pool("u1", "es");
        let words: Vec<_> = pool.iter().map(|i| i.word.as_str()).collect();
        assert_eq!(words, vec!["primero", "segundo", "tercero"]);
        assert_eq!(pool[0].id, overlap.id);
    }

    #[test]
    fn test_preview_card_reads_stored_item() {
        let fx = Fixture::new();
        let stale = fx.add("nube", WordStatus::Learning1, -1, 0);
        let card = ReviewCard::new(stale.clone(), CardDirection::TargetToNative);
        assert_eq!(fx.builder().preview_card(&card), [1, 1, 1, 1]);

        let update = ItemUpdate {
            repetitions: Some(2),
            interval_days: Some(6),
            ease_factor: Some(2.5),
            ..ItemUpdate::default()
        };
        fx.store.update_fields(stale.id, &update).unwrap();
        assert_eq!(fx.builder().preview_card(&card), [1, 15, 15, 15]);

        let missing = VocabularyItem::new("u1", "es", "lluvia", WordStatus::New, now());
        let orphan = ReviewCard::new(missing, CardDirection::NativeToTarget);
        assert_eq!(fx.builder().preview_card(&orphan), [1, 1, 1, 1]);
    }

    #[test]
    fn test_sqlite_store_session() {
        let store = SqliteVocabularyStore::open_in_memory().unwrap();
        let clock = FixedClock::new(now());

        let mut due_now = VocabularyItem::new("u1", "es", "ahora", WordStatus::Learning1, now() - Duration::days(20));
        due_now.next_review_date = now();
        due_now.repetitions = 2;
        due_now.interval_days = 6;
        due_now.ease_factor = 2.5;
        let mut not_yet = VocabularyItem::new("u1", "es", "pronto", WordStatus::Learning2, now() - Duration::days(20));
        not_yet.next_review_date = now() + Duration::seconds(1);
        not_yet.repetitions = 3;
        let mut fresh = VocabularyItem::new("u1", "es", "nuevo", WordStatus::New, now() - Duration::days(2));
        fresh.next_review_date = now() + Duration::days(1);
        for item in [&due_now, &not_yet, &fresh] {
            store.insert(item).unwrap();
        }

        let builder = SessionBuilder::new(&store, &clock);
        let due = builder.get_due_items("u1", "es");
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].id, due_now.id);

        let mut rng = StdRng::seed_from_u64(3);
        let cards = builder.build_session("u1", "es", &mut rng);
        assert_eq!(cards.len(), 4);
        assert!(cards.iter().all(|c| c.item.id != not_yet.id));

        let card = ReviewCard::new(due_now.clone(), CardDirection::NativeToTarget);
        let updated = builder.submit_review(&card, 4).unwrap();
        assert_eq!(updated.repetitions, 3);
        assert_eq!(updated.interval_days, 15);
        assert_eq!(updated.status, WordStatus::Learning2);
        assert_eq!(store.list_reviews("u1", "es").unwrap().len(), 1);
        assert!(builder.get_due_items("u1", "es").is_empty());
    }

    #[test]
    fn test_build_session_expands_learning_items() {
        let fx = Fixture::new();
        fx.add("hola", WordStatus::Learning1, -1, 2);
        fx.add("adios", WordStatus::Learning3, -3, 3);
        fx.add("gracias", WordStatus::New, 2, 0);

        let mut rng = StdRng::seed_from_u64(7);
        let cards = fx.builder().build_session("u1", "es", &mut rng);
        assert_eq!(cards.len(), 6);

        for word in ["hola", "adios", "gracias"] {
            let directions: HashSet<_> = cards
                .iter()
                .filter(|c| c.item.word == word)
                .map(|c| c.direction)
                .collect();
            assert_eq!(directions.len(), 2, "{} should have both directions", word);
        }
    }

    #[test]
    fn test_expand_non_learning_item_single_card() {
        let item = VocabularyItem::new("u1", "es", "sabido", WordStatus::Known, now());
        let cards = expand_item(&item);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].direction, CardDirection::TargetToNative);

        let mastered = VocabularyItem::new("u1", "es", "dominado", WordStatus::Mastered, now());
        assert_eq!(expand_item(&mastered).len(), 1);
    }

    #[test]
    fn test_build_session_same_seed_same_order() {
        let fx = Fixture::new();
        for i in 0..6 {
            fx.add(&format!("p{}", i), WordStatus::Learning1, -1 - i, 2);
        }
        let order = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            fx.builder()
                .build_session("u1", "es", &mut rng)
                .into_iter()
                .map(|c| (c.item.word, c.direction))
                .collect::<Vec<_>>()
        };
        assert_eq!(order(99), order(99));
        assert_eq!(order(99).len(), 12);
    }

    #[test]
    fn test_store_unreachable_degrades_to_empty() {
        let clock = FixedClock::new(now());
        let builder = SessionBuilder::new(&UnreachableStore, &clock);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(builder.get_due_items("u1", "es").is_empty());
        assert!(builder.get_new_items("u1", "es", 10).is_empty());
        assert!(builder.build_session("u1", "es", &mut rng).is_empty());
    }

    #[test]
    fn test_card_text_with_and_without_example() {
        let mut item = VocabularyItem::new("u1", "es", "perro", WordStatus::New, now());
        let bare = ReviewCard::new(item.clone(), CardDirection::TargetToNative);
        assert_eq!(bare.prompt(), "perro");
        assert_eq!(bare.answer(), "No translation");

        item.translation = Some("dog".to_string());
        item.examples.push(ExampleSentence {
            text: "El perro ladra".to_string(),
            translation: Some("The dog barks".to_string()),
        });
        let reverse = ReviewCard::new(item, CardDirection::NativeToTarget);
        assert_eq!(reverse.prompt(), "The dog barks");
        assert_eq!(reverse.answer(), "El perro ladra");
    }

    #[test]
    fn test_submit_review_updates_item() {
        let fx = Fixture::new();
        let mut item = VocabularyItem::new("u1", "es", "luna", WordStatus::Learning1, now());
        item.repetitions = 2;
        item.interval_days = 6;
        item.ease_factor = 2.5;
        fx.store.insert(&item).unwrap();

        let card = ReviewCard::new(item.clone(), CardDirection::TargetToNative);
        let updated = fx.builder().submit_review(&card, 4).unwrap();

        assert_eq!(updated.repetitions, 3);
        assert_eq!(updated.interval_days, 15);
        assert_eq!(updated.status, WordStatus::Learning2);
        assert_eq!(updated.last_reviewed_at, Some(now()));
        assert_eq!(updated.next_review_date, now() + Duration::days(15));

        let history = fx.store.list_reviews("u1", "es").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].quality, 4);
    }

    #[test]
    fn test_second_card_sees_first_review() {
        let fx = Fixture::new();
        let item = fx.add("estrella", WordStatus::New, 0, 0);
        let cards = expand_item(&item);

        let builder = fx.builder();
        builder.submit_review(&cards[0], 5).unwrap();
        let after_second = builder.submit_review(&cards[1], 5).unwrap();

        assert_eq!(after_second.repetitions, 2);
        assert_eq!(after_second.interval_days, 6);
        assert_eq!(after_second.status, WordStatus::Learning1);
    }

    #[test]
    fn test_failed_review_drops_level() {
        let fx = Fixture::new();
        let item = fx.add("sol", WordStatus::Learning3, -1, 3);
        let card = ReviewCard::new(item, CardDirection::NativeToTarget);

        let updated = fx.builder().submit_review(&card, 1).unwrap();
        assert_eq!(updated.status, WordStatus::Learning2);
        assert_eq!(updated.repetitions, 0);
        assert_eq!(updated.interval_days, 1);
    }

    #[test]
    fn test_submit_review_for_deleted_item_is_noop() {
        let fx = Fixture::new();
        let item = VocabularyItem::new("u1", "es", "fantasma", WordStatus::New, now());
        let card = ReviewCard::new(item, CardDirection::TargetToNative);

        let result = fx.builder().submit_review(&card, 5);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(fx.store.list_reviews("u1", "es").unwrap().is_empty());
    }
}
