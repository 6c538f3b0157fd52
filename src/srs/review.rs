//! Per-sitting review state: which card is showing, whether its answer is
//! revealed, and how the user has done so far.

use serde::{Deserialize, Serialize};

use super::algorithm::{clamp_quality, PASSING_QUALITY};
use super::session::ReviewCard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SessionState {
    /// Waiting for cards
    Loading,
    InProgress {
        card_index: usize,
        show_answer: bool,
    },
    Complete,
}

/// Totals reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
}

#[derive(Debug, Clone)]
pub struct ReviewSession {
    cards: Vec<ReviewCard>,
    state: SessionState,
    summary: SessionSummary,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            state: SessionState::Loading,
            summary: SessionSummary::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn cards(&self) -> &[ReviewCard] {
        &self.cards
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Hand the built cards to a loading session. Ignored in any other state.
    pub fn start(&mut self, cards: Vec<ReviewCard>) {
        if self.state != SessionState::Loading {
            log::debug!("Ignoring start in state {:?}", self.state);
            return;
        }

        self.cards = cards;
        self.state = if self.cards.is_empty() {
            SessionState::Complete
        } else {
            SessionState::InProgress {
                card_index: 0,
                show_answer: false,
            }
        };
    }

    pub fn current_card(&self) -> Option<&ReviewCard> {
        match self.state {
            SessionState::InProgress { card_index, .. } => self.cards.get(card_index),
            _ => None,
        }
    }

    /// Show the answer of the current card
    pub fn reveal(&mut self) {
        if let SessionState::InProgress { card_index, .. } = self.state {
            self.state = SessionState::InProgress {
                card_index,
                show_answer: true,
            };
        }
    }

    /// Count the answer to the current card and move on.
    ///
    /// Returns the card that was answered, or `None` when no card is showing.
    pub fn record(&mut self, quality: i32) -> Option<ReviewCard> {
        let SessionState::InProgress { card_index, .. } = self.state else {
            return None;
        };
        let card = self.cards.get(card_index)?.clone();

        self.summary.total += 1;
        if clamp_quality(quality) >= PASSING_QUALITY {
            self.summary.correct += 1;
        } else {
            self.summary.incorrect += 1;
        }

        let next = card_index + 1;
        self.state = if next < self.cards.len() {
            SessionState::InProgress {
                card_index: next,
                show_answer: false,
            }
        } else {
            SessionState::Complete
        };

        Some(card)
    }

    /// Go back to loading for a fresh session. Only allowed once complete.
    pub fn reload(&mut self) -> bool {
        if self.state != SessionState::Complete {
            return false;
        }
        *self = Self::new();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::session::expand_item;
    use crate::vocabulary::models::{VocabularyItem, WordStatus};
    use chrono::Utc;

    fn cards(words: &[&str]) -> Vec<ReviewCard> {
        words
            .iter()
            .flat_map(|w| expand_item(&VocabularyItem::new("u1", "sv", w, WordStatus::New, Utc::now())))
            .collect()
    }

    #[test]
    fn test_walk_through_session() {
        let mut session = ReviewSession::new();
        assert_eq!(session.state(), SessionState::Loading);
        assert!(session.current_card().is_none());

        session.start(cards(&["hus", "bil"]));
        assert_eq!(
            session.state(),
            SessionState::InProgress {
                card_index: 0,
                show_answer: false
            }
        );

        session.reveal();
        session.reveal();
        assert_eq!(
            session.state(),
            SessionState::InProgress {
                card_index: 0,
                show_answer: true
            }
        );

        session.record(5);
        assert_eq!(
            session.state(),
            SessionState::InProgress {
                card_index: 1,
                show_answer: false
            }
        );

        session.record(1);
        session.record(3);
        session.record(-2);
        assert!(session.is_complete());
        assert_eq!(
            session.summary(),
            SessionSummary {
                total: 4,
                correct: 2,
                incorrect: 2
            }
        );
        assert!(session.record(5).is_none());
    }

    #[test]
    fn test_empty_session_completes_immediately() {
        let mut session = ReviewSession::new();
        session.start(Vec::new());
        assert!(session.is_complete());
        assert_eq!(session.summary().total, 0);
    }

    #[test]
    fn test_reload_only_from_complete() {
        let mut session = ReviewSession::new();
        assert!(!session.reload());

        session.start(cards(&["ö"]));
        assert!(!session.reload());

        session.record(4);
        session.record(4);
        assert!(session.reload());
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(session.summary(), SessionSummary::default());
        assert!(session.cards().is_empty());
    }

    #[test]
    fn test_start_ignored_while_in_progress() {
        let mut session = ReviewSession::new();
        session.start(cards(&["ett"]));
        session.start(cards(&["två", "tre"]));
        assert_eq!(session.cards().len(), 2);
    }
}
