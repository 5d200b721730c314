//! crates/academy_core/src/conversation.rs
//!
//! The scripted lead-capture interview.
//!
//! `transition` is a pure function from (step, profile, input) to the next step,
//! the updated profile and the engine's replies. `ConversationEngine` owns the
//! transcript and applies each transition as a single unit.

use crate::domain::{ConversationState, ConversationStep, LeadProfile, Message, Sender};
use crate::script;
use chrono::Utc;
use thiserror::Error;
use tracing::debug;

//=========================================================================================
// Pure Transition
//=========================================================================================

/// An engine message produced by a transition, before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Option<Vec<String>>,
    pub offer_external_handoff: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: None,
            offer_external_handoff: false,
        }
    }

    fn with_options(mut self, values: &[&str]) -> Self {
        self.quick_replies = Some(script::options(values));
        self
    }

    fn handoff(text: impl Into<String>) -> Self {
        Self {
            offer_external_handoff: true,
            ..Self::text(text)
        }
    }
}

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next_step: ConversationStep,
    pub profile: LeadProfile,
    /// The trimmed visitor text that was accepted.
    pub accepted_input: String,
    pub replies: Vec<Reply>,
}

/// Reasons a submission is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("Conversation has already completed")]
    PostTerminalSubmission,
}

/// Computes the outcome of submitting `raw` at `step`.
pub fn transition(
    step: ConversationStep,
    profile: &LeadProfile,
    raw: &str,
) -> Result<Transition, TransitionError> {
    if step.is_terminal() {
        return Err(TransitionError::PostTerminalSubmission);
    }
    let input = raw.trim();
    if input.is_empty() {
        return Err(TransitionError::EmptyInput);
    }

    let mut profile = profile.clone();
    let replies = match step {
        ConversationStep::Name => {
            profile.name = input.to_string();
            vec![Reply::text(script::ask_phone(input))]
        }
        ConversationStep::Phone => {
            profile.phone = input.to_string();
            vec![Reply::text(script::ASK_EMAIL)]
        }
        ConversationStep::Email => {
            profile.email = input.to_string();
            vec![Reply::text(script::ASK_COURSE).with_options(&script::COURSE_OPTIONS)]
        }
        ConversationStep::Course => {
            profile.interested_course = input.to_string();
            vec![Reply::text(script::ASK_CLASS).with_options(&script::CLASS_OPTIONS)]
        }
        ConversationStep::CurrentClass => {
            profile.current_class = input.to_string();
            vec![Reply::text(script::ASK_WEAK_SUBJECTS).with_options(&script::SUBJECT_OPTIONS)]
        }
        ConversationStep::WeakSubjects => {
            profile.weak_subjects = script::split_subjects(input);
            vec![Reply::text(script::ASK_STRONG_SUBJECTS).with_options(&script::SUBJECT_OPTIONS)]
        }
        ConversationStep::StrongSubjects => {
            profile.strong_subjects = script::split_subjects(input);
            vec![Reply::text(script::ASK_TARGET_YEAR).with_options(&script::YEAR_OPTIONS)]
        }
        ConversationStep::TargetYear => {
            profile.target_exam_year = input.to_string();
            let closing = format!(
                "{}\n\n{}",
                script::recommendation(&profile.interested_course, &profile.weak_subjects),
                script::summary(&profile)
            );
            vec![Reply::text(closing), Reply::handoff(script::HANDOFF_OFFER)]
        }
        ConversationStep::Complete => return Err(TransitionError::PostTerminalSubmission),
    };

    Ok(Transition {
        next_step: step.next(),
        profile,
        accepted_input: input.to_string(),
        replies,
    })
}

//=========================================================================================
// Engine
//=========================================================================================

/// Drives one visitor's interview and keeps its transcript.
///
/// Callers must not interleave submissions; hosts serialise access per session.
#[derive(Debug, Clone, Default)]
pub struct ConversationEngine {
    state: ConversationState,
    profile: LeadProfile,
    next_message_id: u64,
}

impl ConversationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the greeting if the transcript is empty. Repeated calls are no-ops.
    pub fn start(&mut self) -> &ConversationState {
        if self.state.messages.is_empty() {
            self.state.current_step = ConversationStep::Name;
            self.push(Sender::Engine, Reply::text(script::GREETING));
        }
        &self.state
    }

    /// Records the visitor's answer for the current step and appends the engine's reply.
    ///
    /// Whitespace-only input and input after completion leave the state untouched.
    pub fn submit_visitor_input(&mut self, raw: &str) -> &ConversationState {
        let outcome = match transition(self.state.current_step, &self.profile, raw) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(step = self.state.current_step.label(), "Ignoring submission: {}", e);
                return &self.state;
            }
        };

        debug!(
            from = self.state.current_step.label(),
            to = outcome.next_step.label(),
            "Conversation advanced"
        );
        self.push(Sender::Visitor, Reply::text(outcome.accepted_input));
        for reply in outcome.replies {
            self.push(Sender::Engine, reply);
        }
        self.profile = outcome.profile;
        self.state.current_step = outcome.next_step;
        &self.state
    }

    /// Renders the current profile for the external contact channel.
    pub fn build_external_handoff_message(&self) -> String {
        script::handoff_message(&self.profile)
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn profile(&self) -> &LeadProfile {
        &self.profile
    }

    pub fn is_complete(&self) -> bool {
        self.state.current_step.is_terminal()
    }

    fn push(&mut self, sender: Sender, reply: Reply) {
        self.next_message_id += 1;
        self.state.messages.push(Message {
            id: self.next_message_id,
            sender,
            text: reply.text,
            timestamp: Utc::now(),
            quick_replies: reply.quick_replies,
            offer_external_handoff: reply.offer_external_handoff,
        });
    }
}
