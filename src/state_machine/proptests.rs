//! Property-based tests for the request lifecycle
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::transcript::Sender;
use crate::workspace::WorkspaceUpdate;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_handle() -> impl Strategy<Value = RequestHandle> {
    (0u64..6).prop_map(|n| (0..n).fold(RequestHandle::first(), |h, _| h.next()))
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[a-zA-Z ]{1,30}",
    ]
}

fn arb_workspace_update() -> impl Strategy<Value = Option<WorkspaceUpdate>> {
    proptest::option::of(
        (
            proptest::option::of("[a-zA-Z ]{0,10}"),
            proptest::option::of("[a-zA-Z ]{0,10}"),
            proptest::option::of("[a-zA-Z ]{0,10}"),
        )
            .prop_map(|(status, next_module, objective)| WorkspaceUpdate {
                status,
                next_module,
                objective,
            }),
    )
}

fn arb_outcome() -> impl Strategy<Value = ChatOutcome> {
    prop_oneof![
        ("[a-zA-Z !]{0,30}", arb_workspace_update())
            .prop_map(|(text, update)| ChatOutcome::success(text, update)),
        "[a-z ]{1,20}".prop_map(ChatOutcome::failure),
    ]
}

fn arb_state() -> impl Strategy<Value = ChatRequestState> {
    prop_oneof![
        Just(ChatRequestState::Idle),
        ("[a-zA-Z ]{1,20}", arb_handle())
            .prop_map(|(text, handle)| ChatRequestState::Pending { text, handle }),
        "[a-z ]{1,20}".prop_map(|reason| ChatRequestState::Failed { reason }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        (arb_text(), arb_handle()).prop_map(|(text, handle)| Event::UserMessage { text, handle }),
        (arb_handle(), arb_outcome())
            .prop_map(|(handle, outcome)| Event::ChatCompleted { handle, outcome }),
    ]
}

// ============================================================================
// Validity Checkers
// ============================================================================

fn appended(effects: &[Effect]) -> Vec<Sender> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::AppendEntry { sender, .. } => Some(*sender),
            _ => None,
        })
        .collect()
}

fn effects_are_valid(effects: &[Effect], new_state: &ChatRequestState) -> bool {
    let requests = effects
        .iter()
        .filter(|e| matches!(e, Effect::RequestChat { .. }))
        .count();

    // RequestChat only ever accompanies the move into Pending
    if requests > 0 && !new_state.is_pending() {
        return false;
    }

    // A real transition appends exactly one entry and notifies once
    if !effects.is_empty() {
        let notifies = effects
            .iter()
            .filter(|e| matches!(e, Effect::NotifyStateChange))
            .count();
        if appended(effects).len() != 1 || notifies != 1 {
            return false;
        }
    }

    true
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: effects always match the state they lead to
    #[test]
    fn prop_transitions_produce_valid_effects(
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut state = ChatRequestState::Idle;

        for event in events {
            if let Ok(result) = transition(&state, event) {
                prop_assert!(
                    effects_are_valid(&result.effects, &result.new_state),
                    "Invalid effects for state {:?}: {:?}",
                    result.new_state,
                    result.effects
                );
                state = result.new_state;
            }
        }
    }

    // Invariant 2: blank text is always rejected and never reaches the backend
    #[test]
    fn prop_blank_text_rejected(state in arb_state(), handle in arb_handle(), spaces in " {0,5}") {
        let result = transition(&state, Event::UserMessage { text: spaces, handle });
        prop_assert!(result.is_err());
    }

    // Invariant 3: a pending request rejects every new message
    #[test]
    fn prop_pending_is_single_flight(
        text in "[a-zA-Z ]{1,20}",
        handle in arb_handle(),
        new_text in "[a-zA-Z]{1,20}",
        new_handle in arb_handle()
    ) {
        let state = ChatRequestState::Pending { text, handle };
        let result = transition(&state, Event::UserMessage { text: new_text, handle: new_handle });
        prop_assert_eq!(result.unwrap_err(), TransitionError::AgentBusy);
    }

    // Invariant 4: Failed is always recoverable
    #[test]
    fn prop_failed_always_recoverable(reason in "[a-z ]{1,20}", text in "[a-zA-Z]{1,20}") {
        let state = ChatRequestState::Failed { reason };
        let result = transition(&state, Event::UserMessage { text, handle: RequestHandle::first() });
        prop_assert!(result.is_ok(), "Recovery failed: {:?}", result);
        prop_assert!(result.unwrap().new_state.is_pending());
    }

    // Invariant 5: completions for anything but the pending handle change nothing
    #[test]
    fn prop_mismatched_completion_is_noop(
        state in arb_state(),
        handle in arb_handle(),
        outcome in arb_outcome()
    ) {
        prop_assume!(state.pending_handle() != Some(handle));
        let result = transition(&state, Event::ChatCompleted { handle, outcome }).unwrap();
        prop_assert!(result.is_noop());
        prop_assert_eq!(result.new_state, state);
    }

    // Invariant 6: a matching completion always leaves Pending, with the right sender
    #[test]
    fn prop_matching_completion_resolves(
        text in "[a-zA-Z ]{1,20}",
        handle in arb_handle(),
        outcome in arb_outcome()
    ) {
        let state = ChatRequestState::Pending { text, handle };
        let failed = matches!(outcome, ChatOutcome::Failure { .. });
        let result = transition(&state, Event::ChatCompleted { handle, outcome }).unwrap();

        prop_assert!(!result.new_state.is_pending());
        let expected = if failed { Sender::System } else { Sender::Remote };
        prop_assert_eq!(appended(&result.effects), vec![expected]);
    }
}
