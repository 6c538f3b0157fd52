//! Spaced repetition for vocabulary
//!
//! This module provides:
//! - SM-2 scheduling and the status progression built on it
//! - Review session assembly (due and new words, directional cards)
//! - The per-sitting review state machine

pub mod algorithm;
pub mod review;
pub mod session;

pub use algorithm::{compute_next_state, derive_status, ReviewGrade, ReviewOutcome};
pub use review::{ReviewSession, SessionState, SessionSummary};
pub use session::{ReviewCard, SessionBuilder};
