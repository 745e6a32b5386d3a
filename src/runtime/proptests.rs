//! Property-based tests for routing real handlers
//!
//! Random button/text/cancel sequences are pushed through the router with a
//! mock model that sometimes fails. After every event:
//! - the session state is exactly what the transition table declares
//! - quiz score, memory windows and dislike lists keep their invariants
//! - a session sitting at Menu holds no conversation memory

use super::router::ConversationRouter;
use super::testing::{MockCompletionClient, RecordingRenderer};
use crate::llm::LlmError;
use crate::resources::ResourceCatalog;
use crate::state_machine::state::MEMORY_PAIR_CAP;
use crate::state_machine::{declared_next, transition, Event, Mode, Session, SessionId};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

const PAYLOADS: &[&str] = &[
    "start",
    "finish",
    "random",
    "gpt",
    "talk",
    "quiz",
    "translate",
    "recommendations",
    "talk_tolkien",
    "quiz_science",
    "quiz_next",
    "quiz_restart",
    "quiz_change",
    "lang_de",
    "rec_movies",
    "rec_books",
    "genre_action",
    "genre_fiction",
    "rec_dislike",
    "gpt_ask_more",
    "bogus",
];

/// Usable by every handler: a fact, a question, a verdict and a titled
/// recommendation at once
const UNIVERSAL_REPLY: &str = "Правильно! Назва: Твір номер один. Ще речення.";

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        6 => prop::sample::select(PAYLOADS.to_vec()).prop_map(Event::from_button),
        3 => "[а-яa-z ]{1,20}".prop_map(Event::TextInput),
        1 => Just(Event::Cancel),
    ]
}

fn check_invariants(session: &Session) -> Result<(), TestCaseError> {
    for mode in Mode::ALL {
        prop_assert!(session.memory.len(mode) <= MEMORY_PAIR_CAP * 2);
        if session.state == Mode::Menu {
            prop_assert_eq!(session.memory.len(mode), 0);
        }
    }
    if let Some(quiz) = session.quiz() {
        prop_assert!(quiz.score.correct() <= quiz.score.total());
        if quiz.awaiting_answer {
            prop_assert!(quiz.current_question.is_some());
        }
    }
    if let Some(rec) = session.recommend() {
        let unique: HashSet<&String> = rec.disliked.iter().collect();
        prop_assert_eq!(unique.len(), rec.disliked.len());
        if rec.awaiting_dislike {
            prop_assert!(rec.last_recommendation.is_some());
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_routed_sessions_stay_declared(
        steps in proptest::collection::vec((arb_event(), any::<bool>()), 1..40)
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let completion = Arc::new(MockCompletionClient::new());
        let router = ConversationRouter::new(
            Arc::new(ResourceCatalog::new(dir.path())),
            completion.clone(),
        );
        let renderer = RecordingRenderer::new();
        let id = SessionId::new("prop-user");
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let mut slot: Option<Session> = None;
        for (event, upstream_ok) in steps {
            // Handlers issue at most two completions per event
            for _ in 0..2 {
                if upstream_ok {
                    completion.queue_reply(UNIVERSAL_REPLY);
                } else {
                    completion.queue_error(LlmError::network("injected").into());
                }
            }

            let before = slot.as_ref().map(|s| s.state);
            let expected = match transition(before, event.clone()) {
                Ok(route) => declared_next(&route),
                Err(_) => before,
            };

            rt.block_on(router.dispatch(&mut slot, &id, event, renderer.clone()));

            prop_assert_eq!(slot.as_ref().map(|s| s.state), expected);
            if let Some(session) = &slot {
                check_invariants(session)?;
            }

            // Drop leftovers so the next step sees only its own replies
            completion.clear_queue();
        }
    }
}
