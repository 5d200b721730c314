//! Property-based tests for the conversation engine
//!
//! These tests verify the transcript and step invariants hold across arbitrary inputs.

use crate::conversation::ConversationEngine;
use crate::domain::ConversationStep;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_answer() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9@.,]{1,12}[ ]{0,2}"
}

fn arb_blank() -> impl Strategy<Value = String> {
    "[ \t\n]{0,6}"
}

/// Either a real answer or whitespace the engine should ignore.
fn arb_submission() -> impl Strategy<Value = (bool, String)> {
    prop_oneof![
        arb_answer().prop_map(|s| (true, s)),
        arb_blank().prop_map(|s| (false, s)),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn steps_advance_one_at_a_time(answers in prop::collection::vec(arb_answer(), 8)) {
        let mut engine = ConversationEngine::new();
        engine.start();
        for (i, answer) in answers.iter().enumerate() {
            prop_assert_eq!(engine.state().current_step.index(), Some(i));
            engine.submit_visitor_input(answer);
        }
        prop_assert_eq!(engine.state().current_step, ConversationStep::Complete);
    }

    #[test]
    fn blank_input_never_changes_state(submissions in prop::collection::vec(arb_submission(), 0..20)) {
        let mut engine = ConversationEngine::new();
        engine.start();
        for (meaningful, text) in submissions {
            let before = engine.state().clone();
            let after = engine.submit_visitor_input(&text).clone();
            if !meaningful || before.current_step.is_terminal() {
                prop_assert_eq!(&after, &before);
            } else {
                prop_assert!(after.current_step > before.current_step);
                prop_assert!(after.messages.len() > before.messages.len());
                prop_assert_eq!(&after.messages[..before.messages.len()], &before.messages[..]);
            }
        }
    }

    #[test]
    fn completed_conversation_is_frozen(
        answers in prop::collection::vec(arb_answer(), 8),
        extra in prop::collection::vec(arb_answer(), 1..5),
    ) {
        let mut engine = ConversationEngine::new();
        engine.start();
        for answer in &answers {
            engine.submit_visitor_input(answer);
        }
        let state = engine.state().clone();
        let profile = engine.profile().clone();
        for text in &extra {
            engine.submit_visitor_input(text);
        }
        prop_assert_eq!(engine.state(), &state);
        prop_assert_eq!(engine.profile(), &profile);
    }

    #[test]
    fn weak_subjects_are_never_empty(answer in arb_answer()) {
        let mut engine = ConversationEngine::new();
        engine.start();
        for filler in ["n", "p", "e", "NEET", "11"] {
            engine.submit_visitor_input(filler);
        }
        engine.submit_visitor_input(&answer);
        prop_assert!(!engine.profile().weak_subjects.is_empty());
    }
}
