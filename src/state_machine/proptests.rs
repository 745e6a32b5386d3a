//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use super::*;
use crate::catalog::{self, Category};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_mode() -> impl Strategy<Value = Mode> {
    proptest::sample::select(Mode::ALL.to_vec())
}

fn arb_option() -> impl Strategy<Value = OptionId> {
    prop_oneof![
        (0..catalog::PERSONAS.len()).prop_map(|i| OptionId::Persona(&catalog::PERSONAS[i])),
        (0..catalog::QUIZ_TOPICS.len()).prop_map(|i| OptionId::QuizTopic(&catalog::QUIZ_TOPICS[i])),
        (0..catalog::LANGUAGES.len()).prop_map(|i| OptionId::Language(&catalog::LANGUAGES[i])),
        proptest::sample::select(Category::ALL.to_vec()).prop_map(OptionId::Category),
        (0..catalog::MUSIC_GENRES.len())
            .prop_map(|i| OptionId::Genre(catalog::MUSIC_GENRES[i].id.to_string())),
        Just(OptionId::QuizNext),
        Just(OptionId::QuizRestart),
        Just(OptionId::QuizChangeTopic),
        Just(OptionId::Dislike),
        Just(OptionId::AskMore),
        "[a-z_]{1,12}".prop_map(|s| OptionId::parse(&s)),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_mode().prop_map(Event::EnterMode),
        arb_option().prop_map(Event::SelectOption),
        "[a-zA-Z ]{0,30}".prop_map(Event::TextInput),
        Just(Event::Cancel),
    ]
}

/// Apply a route the way the router does, minus the handlers
fn apply(state: Option<Mode>, route: &Route) -> Option<Mode> {
    match route {
        Route::Terminate => None,
        Route::Start => Some(Mode::Menu),
        Route::Enter(_) | Route::Input(..) => declared_next(route).or(state),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Any event sequence keeps the session in a declared mode, or without one
    // only after cancel or before the first entry command
    #[test]
    fn prop_sequences_stay_in_declared_states(events in proptest::collection::vec(arb_event(), 0..30)) {
        let mut state: Option<Mode> = None;
        for event in events {
            let was_cancel = event == Event::Cancel;
            let before = state;
            match transition(state, event) {
                Ok(route) => {
                    state = apply(state, &route);
                    if state.is_none() {
                        prop_assert!(was_cancel);
                    }
                }
                Err(_) => prop_assert_eq!(state, before),
            }
        }
    }

    // The entry command and cancel are accepted from every state
    #[test]
    fn prop_global_events_always_accepted(state in proptest::option::of(arb_mode())) {
        prop_assert_eq!(transition(state, Event::EnterMode(Mode::Menu)), Ok(Route::Start));
        prop_assert_eq!(transition(state, Event::Cancel), Ok(Route::Terminate));
    }

    // Without a session nothing reaches a handler
    #[test]
    fn prop_no_session_never_routes_to_handler(event in arb_event()) {
        if let Ok(route) = transition(None, event) {
            prop_assert!(matches!(route, Route::Start | Route::Terminate));
        }
    }

    // Handler input only ever targets the currently active mode
    #[test]
    fn prop_input_targets_active_mode(mode in arb_mode(), event in arb_event()) {
        if let Ok(Route::Input(target, _)) = transition(Some(mode), event) {
            prop_assert_eq!(target, mode);
            prop_assert_eq!(declared_next(&Route::Input(target, ModeInput::Text(String::new()))), Some(mode));
        }
    }

    // Menu, Fact and Recommend never accept text
    #[test]
    fn prop_text_rejected_outside_text_modes(text in "[a-zA-Z ]{0,30}") {
        for mode in [Mode::Menu, Mode::Fact, Mode::Recommend] {
            prop_assert!(transition(Some(mode), Event::TextInput(text.clone())).is_err());
        }
    }

    // Memory windows never exceed the pair cap, whatever the traffic
    #[test]
    fn prop_memory_window_capped(
        exchanges in proptest::collection::vec((arb_mode(), "[a-z]{1,8}", "[a-z]{1,8}"), 0..60)
    ) {
        let mut memory = ConversationMemory::default();
        for (mode, user, assistant) in &exchanges {
            memory.record_exchange(*mode, user, assistant);
        }
        for mode in Mode::ALL {
            prop_assert!(memory.len(mode) <= MEMORY_PAIR_CAP * 2);
            prop_assert_eq!(memory.len(mode) % 2, 0);
            let window = memory.window(mode);
            if let Some(first) = window.first() {
                prop_assert_eq!(first.role, Role::User);
            }
        }
    }

    // Score never reports more correct answers than questions
    #[test]
    fn prop_score_correct_never_exceeds_total(verdicts in proptest::collection::vec(any::<bool>(), 0..100)) {
        let mut score = Score::default();
        for verdict in &verdicts {
            score.record(*verdict);
            prop_assert!(score.correct() <= score.total());
        }
        prop_assert_eq!(u32::try_from(verdicts.len()).unwrap(), score.total());
    }

    // History buffers keep only the most recent items, in order
    #[test]
    fn prop_bounded_history_keeps_tail(items in proptest::collection::vec("[a-z]{1,5}", 0..40)) {
        let mut history = BoundedHistory::new(QUESTION_HISTORY_CAP);
        for item in &items {
            history.push(item.clone());
        }
        let kept: Vec<&str> = history.latest(QUESTION_HISTORY_CAP).collect();
        let skip = items.len().saturating_sub(QUESTION_HISTORY_CAP);
        let expected: Vec<&str> = items.iter().skip(skip).map(String::as_str).collect();
        prop_assert_eq!(kept, expected);
    }

    // The disliked list stays duplicate-free
    #[test]
    fn prop_dislikes_unique(titles in proptest::collection::vec("[a-c]{1,2}", 0..30)) {
        let mut rec = RecommendContext::default();
        for title in &titles {
            rec.add_disliked(title.clone());
        }
        let mut sorted = rec.disliked.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), rec.disliked.len());
    }
}
