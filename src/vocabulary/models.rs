//! Data models for tracked vocabulary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ease factor for words entered through the reader
pub const DEFAULT_NEW_WORD_EASE: f64 = 2.3;

/// Learning status of a word.
///
/// Stored as an integer: -1 ignored, 0 known, 1 new, 2-4 learning levels,
/// 5 mastered. Out-of-range stored values are clamped to the nearest status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum WordStatus {
    Ignored,
    Known,
    New,
    Learning1,
    Learning2,
    Learning3,
    Mastered,
}

impl WordStatus {
    pub const ALL: [WordStatus; 7] = [
        WordStatus::Ignored,
        WordStatus::Known,
        WordStatus::New,
        WordStatus::Learning1,
        WordStatus::Learning2,
        WordStatus::Learning3,
        WordStatus::Mastered,
    ];

    pub fn code(self) -> i32 {
        match self {
            Self::Ignored => -1,
            Self::Known => 0,
            Self::New => 1,
            Self::Learning1 => 2,
            Self::Learning2 => 3,
            Self::Learning3 => 4,
            Self::Mastered => 5,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code.clamp(-1, 5) {
            -1 => Self::Ignored,
            0 => Self::Known,
            1 => Self::New,
            2 => Self::Learning1,
            3 => Self::Learning2,
            4 => Self::Learning3,
            _ => Self::Mastered,
        }
    }

    /// New or one of the learning levels; these are the statuses that get scheduled
    pub fn is_learning(self) -> bool {
        (1..=4).contains(&self.code())
    }

    /// Known and mastered words both count as known in stats
    pub fn counts_as_known(self) -> bool {
        matches!(self, Self::Known | Self::Mastered)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Known => "known",
            Self::New => "new",
            Self::Learning1 => "learning 1",
            Self::Learning2 => "learning 2",
            Self::Learning3 => "learning 3",
            Self::Mastered => "mastered",
        }
    }
}

impl Default for WordStatus {
    fn default() -> Self {
        Self::New
    }
}

impl From<i32> for WordStatus {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<WordStatus> for i32 {
    fn from(status: WordStatus) -> Self {
        status.code()
    }
}

/// An example sentence the word was seen in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleSentence {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// One word or phrase a user is tracking for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: Uuid,
    pub user_id: String,
    pub language: String,
    /// Lowercased, trimmed
    pub word: String,
    #[serde(default)]
    pub status: WordStatus,
    #[serde(default)]
    pub is_phrase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub examples: Vec<ExampleSentence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lesson_id: Option<String>,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f64,
    #[serde(default)]
    pub interval_days: u32,
    #[serde(default)]
    pub repetitions: u32,
    pub next_review_date: DateTime<Utc>,
    #[serde(default)]
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_ease_factor() -> f64 {
    DEFAULT_NEW_WORD_EASE
}

impl VocabularyItem {
    /// A freshly tracked word, due immediately
    pub fn new(
        user_id: &str,
        language: &str,
        word: &str,
        status: WordStatus,
        now: DateTime<Utc>,
    ) -> Self {
        let word = normalize_word(word);
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            language: language.to_string(),
            is_phrase: word.contains(' '),
            word,
            status,
            translation: None,
            definition: None,
            notes: None,
            examples: Vec::new(),
            source_lesson_id: None,
            ease_factor: DEFAULT_NEW_WORD_EASE,
            interval_days: 0,
            repetitions: 0,
            next_review_date: now,
            last_reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_ease_factor(mut self, ease_factor: f64) -> Self {
        self.ease_factor = ease_factor;
        self
    }

    pub fn first_example(&self) -> Option<&ExampleSentence> {
        self.examples.first()
    }

    /// Whether the item is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_learning() && self.next_review_date <= now
    }
}

/// Lowercase and trim a word for lookup and storage
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// A partial update of a vocabulary item. `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub status: Option<WordStatus>,
    pub translation: Option<String>,
    pub definition: Option<String>,
    pub ease_factor: Option<f64>,
    pub interval_days: Option<u32>,
    pub repetitions: Option<u32>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ItemUpdate {
    pub fn status(status: WordStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn apply(&self, item: &mut VocabularyItem) {
        if let Some(status) = self.status {
            item.status = status;
        }
        if let Some(translation) = &self.translation {
            item.translation = Some(translation.clone());
        }
        if let Some(definition) = &self.definition {
            item.definition = Some(definition.clone());
        }
        if let Some(ease_factor) = self.ease_factor {
            item.ease_factor = ease_factor;
        }
        if let Some(interval_days) = self.interval_days {
            item.interval_days = interval_days;
        }
        if let Some(repetitions) = self.repetitions {
            item.repetitions = repetitions;
        }
        if let Some(next_review_date) = self.next_review_date {
            item.next_review_date = next_review_date;
        }
        if let Some(last_reviewed_at) = self.last_reviewed_at {
            item.last_reviewed_at = Some(last_reviewed_at);
        }
        if let Some(updated_at) = self.updated_at {
            item.updated_at = updated_at;
        }
    }
}

/// Direction a review card is asked in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardDirection {
    /// Prompt in the language being learned, answer in the native language
    TargetToNative,
    /// Prompt in the native language, answer in the language being learned
    NativeToTarget,
}

/// A record of a single review response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    pub user_id: String,
    pub language: String,
    pub direction: CardDirection,
    /// Quality rating (0-5, SM-2 scale)
    pub quality: u8,
    /// Interval scheduled by this review (days)
    pub interval: u32,
    /// Ease factor after this review
    pub ease_factor: f64,
    pub reviewed_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn is_correct(&self) -> bool {
        self.quality >= 3
    }
}

/// Word counts by status bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCounts {
    pub total: usize,
    pub known: usize,
    pub learning: usize,
    pub ignored: usize,
}

impl VocabularyCounts {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a VocabularyItem>) -> Self {
        let mut counts = Self::default();
        for item in items {
            counts.total += 1;
            if item.status.counts_as_known() {
                counts.known += 1;
            } else if item.status.is_learning() {
                counts.learning += 1;
            } else {
                counts.ignored += 1;
            }
        }
        counts
    }
}

/// Review activity for a user and language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub due_items: usize,
    pub new_items: usize,
    pub reviews_today: usize,
    pub correct_today: usize,
    pub streak_days: u32,
}
