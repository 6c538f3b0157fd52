//! SQLite storage for vocabulary items and review history.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::models::{CardDirection, ExampleSentence, ItemUpdate, ReviewRecord, VocabularyItem, WordStatus};
use super::store::{ItemFilter, ItemOrder, ItemQuery, Result, StoreError, VocabularyStore};

const ITEM_COLUMNS: &str = "id, user_id, language, word, status, is_phrase, translation, \
     definition, notes, examples, source_lesson_id, ease_factor, interval_days, repetitions, \
     next_review_date, last_reviewed_at, created_at, updated_at";

/// Vocabulary store backed by a single SQLite database file.
///
/// Timestamps are stored as fixed-width RFC 3339 UTC text so that string
/// comparison in SQL matches chronological order.
pub struct SqliteVocabularyStore {
    conn: Connection,
}

impl SqliteVocabularyStore {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(db_path)?)
    }

    /// An in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS vocabulary (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                language TEXT NOT NULL,
                word TEXT NOT NULL,
                status INTEGER NOT NULL,
                is_phrase INTEGER NOT NULL DEFAULT 0,
                translation TEXT,
                definition TEXT,
                notes TEXT,
                examples TEXT NOT NULL DEFAULT '[]',
                source_lesson_id TEXT,
                ease_factor REAL NOT NULL,
                interval_days INTEGER NOT NULL DEFAULT 0,
                repetitions INTEGER NOT NULL DEFAULT 0,
                next_review_date TEXT NOT NULL,
                last_reviewed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS review_log (
                id TEXT PRIMARY KEY,
                item_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                language TEXT NOT NULL,
                direction TEXT NOT NULL,
                quality INTEGER NOT NULL,
                interval_days INTEGER NOT NULL,
                ease_factor REAL NOT NULL,
                reviewed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_vocabulary_owner ON vocabulary(user_id, language);
            CREATE INDEX IF NOT EXISTS idx_vocabulary_due ON vocabulary(next_review_date);
            CREATE INDEX IF NOT EXISTS idx_review_log_owner ON review_log(user_id, language);
            "#,
        )?;

        Ok(Self { conn })
    }

    fn write_item(&self, item: &VocabularyItem) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO vocabulary ({}) VALUES \
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                ITEM_COLUMNS
            ),
            params![
                item.id.to_string(),
                item.user_id,
                item.language,
                item.word,
                item.status.code(),
                item.is_phrase,
                item.translation,
                item.definition,
                item.notes,
                serde_json::to_string(&item.examples)?,
                item.source_lesson_id,
                item.ease_factor,
                item.interval_days,
                item.repetitions,
                timestamp(&item.next_review_date),
                item.last_reviewed_at.as_ref().map(timestamp),
                timestamp(&item.created_at),
                timestamp(&item.updated_at),
            ],
        )?;
        Ok(())
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::Corrupt(format!("bad timestamp {}", raw)))
}

/// Raw column values; conversion happens outside the rusqlite row callback
struct ItemRow {
    id: String,
    user_id: String,
    language: String,
    word: String,
    status: i32,
    is_phrase: bool,
    translation: Option<String>,
    definition: Option<String>,
    notes: Option<String>,
    examples: String,
    source_lesson_id: Option<String>,
    ease_factor: f64,
    interval_days: i64,
    repetitions: i64,
    next_review_date: String,
    last_reviewed_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            language: row.get(2)?,
            word: row.get(3)?,
            status: row.get(4)?,
            is_phrase: row.get(5)?,
            translation: row.get(6)?,
            definition: row.get(7)?,
            notes: row.get(8)?,
            examples: row.get(9)?,
            source_lesson_id: row.get(10)?,
            ease_factor: row.get(11)?,
            interval_days: row.get(12)?,
            repetitions: row.get(13)?,
            next_review_date: row.get(14)?,
            last_reviewed_at: row.get(15)?,
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }

    fn into_item(self) -> Result<VocabularyItem> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|_| StoreError::Corrupt(format!("bad item id {}", self.id)))?;
        // A damaged examples column should not hide the word itself
        let examples: Vec<ExampleSentence> = serde_json::from_str(&self.examples).unwrap_or_default();

        Ok(VocabularyItem {
            id,
            user_id: self.user_id,
            language: self.language,
            word: self.word,
            status: WordStatus::from_code(self.status),
            is_phrase: self.is_phrase,
            translation: self.translation,
            definition: self.definition,
            notes: self.notes,
            examples,
            source_lesson_id: self.source_lesson_id,
            ease_factor: self.ease_factor,
            interval_days: self.interval_days.clamp(0, u32::MAX as i64) as u32,
            repetitions: self.repetitions.clamp(0, u32::MAX as i64) as u32,
            next_review_date: parse_timestamp(&self.next_review_date)?,
            last_reviewed_at: self
                .last_reviewed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn direction_name(direction: CardDirection) -> &'static str {
    match direction {
        CardDirection::TargetToNative => "target_to_native",
        CardDirection::NativeToTarget => "native_to_target",
    }
}

fn parse_direction(raw: &str) -> CardDirection {
    match raw {
        "native_to_target" => CardDirection::NativeToTarget,
        _ => CardDirection::TargetToNative,
    }
}

impl VocabularyStore for SqliteVocabularyStore {
    fn list_where(&self, query: &ItemQuery) -> Result<Vec<VocabularyItem>> {
        let mut sql = format!(
            "SELECT {} FROM vocabulary WHERE user_id = ?1 AND language = ?2",
            ITEM_COLUMNS
        );
        let mut now_param = None;
        match query.filter {
            ItemFilter::All => {}
            ItemFilter::DueAt(now) => {
                sql.push_str(" AND status > 0 AND status < 5 AND next_review_date <= ?3");
                now_param = Some(timestamp(&now));
            }
            ItemFilter::Unreviewed => sql.push_str(" AND status = 1 AND repetitions = 0"),
        }
        sql.push_str(match query.order {
            ItemOrder::NextReviewAsc => " ORDER BY next_review_date ASC, created_at ASC",
            ItemOrder::CreatedAsc => " ORDER BY created_at ASC",
            ItemOrder::CreatedDesc => " ORDER BY created_at DESC",
        });
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match &now_param {
            Some(now) => stmt
                .query_map(params![query.user_id, query.language, now], ItemRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map(params![query.user_id, query.language], ItemRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        };

        rows.into_iter().map(ItemRow::into_item).collect()
    }

    fn get_item(&self, id: Uuid) -> Result<VocabularyItem> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM vocabulary WHERE id = ?1", ITEM_COLUMNS),
                params![id.to_string()],
                ItemRow::from_row,
            )
            .optional()?;

        row.ok_or(StoreError::NotFound(id))?.into_item()
    }

    fn insert(&self, item: &VocabularyItem) -> Result<VocabularyItem> {
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
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM vocabulary WHERE user_id = ?1 AND language = ?2",
            params![user_id, language],
        )?;
        tx.execute(
            "DELETE FROM review_log WHERE user_id = ?1 AND language = ?2",
            params![user_id, language],
        )?;
        tx.commit()?;
        Ok(removed)
    }

    fn append_review(&self, record: &ReviewRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO review_log \
             (id, item_id, user_id, language, direction, quality, interval_days, ease_factor, reviewed_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                record.item_id.to_string(),
                record.user_id,
                record.language,
                direction_name(record.direction),
                record.quality,
                record.interval,
                record.ease_factor,
                timestamp(&record.reviewed_at),
            ],
        )?;
        Ok(())
    }

    fn list_reviews(&self, user_id: &str, language: &str) -> Result<Vec<ReviewRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, direction, quality, interval_days, ease_factor, reviewed_at \
             FROM review_log WHERE user_id = ?1 AND language = ?2 ORDER BY reviewed_at ASC",
        )?;

        let rows = stmt
            .query_map(params![user_id, language], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut records = Vec::with_capacity(rows.len());
        for (id, item_id, direction, quality, interval, ease_factor, reviewed_at) in rows {
            let (Ok(id), Ok(item_id)) = (Uuid::parse_str(&id), Uuid::parse_str(&item_id)) else {
                log::warn!("Skipping review record with malformed id {}", id);
                continue;
            };
            records.push(ReviewRecord {
                id,
                item_id,
                user_id: user_id.to_string(),
                language: language.to_string(),
                direction: parse_direction(&direction),
                quality: quality.clamp(0, 5) as u8,
                interval: interval.clamp(0, u32::MAX as i64) as u32,
                ease_factor,
                reviewed_at: parse_timestamp(&reviewed_at)?,
            });
        }

        Ok(records)
    }
}
