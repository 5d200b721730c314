//! crates/academy_core/src/domain.rs
//!
//! Defines the pure, core data structures for the lead-capture chat and the
//! banner countdown. These structs are independent of any storage or
//! serialization format.

use chrono::{DateTime, Utc};

//=========================================================================================
// Conversation Entities
//=========================================================================================

/// The lead data collected from a visitor, one field per conversation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadProfile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub interested_course: String,
    pub current_class: String,
    pub weak_subjects: Vec<String>,
    pub strong_subjects: Vec<String>,
    pub target_exam_year: String,
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    Visitor,
    Engine,
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Strictly increasing within one conversation.
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Suggested answers. Only meaningful on the latest engine message.
    pub quick_replies: Option<Vec<String>>,
    /// Marks the message that should show the external-contact action.
    pub offer_external_handoff: bool,
}

/// The fixed, linear sequence of interview steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversationStep {
    Name,
    Phone,
    Email,
    Course,
    CurrentClass,
    WeakSubjects,
    StrongSubjects,
    TargetYear,
    Complete,
}

impl ConversationStep {
    /// The 0-based step index, or `None` once the script has completed.
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Name => Some(0),
            Self::Phone => Some(1),
            Self::Email => Some(2),
            Self::Course => Some(3),
            Self::CurrentClass => Some(4),
            Self::WeakSubjects => Some(5),
            Self::StrongSubjects => Some(6),
            Self::TargetYear => Some(7),
            Self::Complete => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Phone,
            Self::Phone => Self::Email,
            Self::Email => Self::Course,
            Self::Course => Self::CurrentClass,
            Self::CurrentClass => Self::WeakSubjects,
            Self::WeakSubjects => Self::StrongSubjects,
            Self::StrongSubjects => Self::TargetYear,
            Self::TargetYear | Self::Complete => Self::Complete,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Complete
    }

    /// Stable lowercase label, used by hosts when reporting progress.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Course => "course",
            Self::CurrentClass => "current_class",
            Self::WeakSubjects => "weak_subjects",
            Self::StrongSubjects => "strong_subjects",
            Self::TargetYear => "target_year",
            Self::Complete => "complete",
        }
    }
}

/// The observable state of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub current_step: ConversationStep,
    pub messages: Vec<Message>,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            current_step: ConversationStep::Name,
            messages: Vec::new(),
        }
    }
}

//=========================================================================================
// Countdown Entities
//=========================================================================================

/// Time left in the current countdown cycle. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemainingTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
    pub millis: u64,
}

impl RemainingTime {
    pub fn from_millis(millis: u64) -> Self {
        let total_seconds = millis / 1000;
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
            total_seconds,
            millis,
        }
    }
}

/// Why a countdown cycle restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverKind {
    /// The cycle ran out.
    Natural,
    /// `reset` was called.
    Manual,
}

/// Passed to the rollover callback each time a new cycle starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rollover {
    pub namespace: String,
    pub anchor_ms: i64,
    pub kind: RolloverKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_time_splits_into_clock_fields() {
        let remaining = RemainingTime::from_millis(12 * 3_600_000 - 1);
        assert_eq!(remaining.total_seconds, 43_199);
        assert_eq!(remaining.hours, 11);
        assert_eq!(remaining.minutes, 59);
        assert_eq!(remaining.seconds, 59);
    }

    #[test]
    fn steps_advance_linearly_to_complete() {
        let mut step = ConversationStep::Name;
        let mut seen = vec![];
        while let Some(i) = step.index() {
            seen.push(i);
            step = step.next();
        }
        assert_eq!(seen, (0..8).collect::<Vec<_>>());
        assert_eq!(step.next(), ConversationStep::Complete);
    }
}
