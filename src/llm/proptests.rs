//! Property-based tests for the provider translation layer
//!
//! - Responses without choices are rejected
//! - Response text survives normalization untouched
//! - Request translation keeps every message, in order, after the system prompt

use super::openai::{test_helpers, OpenAIChoice, OpenAIMessage, OpenAIResponse, OpenAIUsage};
use super::types::{LlmMessage, LlmRequest, MessageRole};
use proptest::prelude::*;

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (any::<bool>(), "[a-zA-Zа-яА-Я0-9 _.!?,]{0,80}").prop_map(|(user, text)| {
        if user {
            LlmMessage::user(text)
        } else {
            LlmMessage::assistant(text)
        }
    })
}

fn arb_request() -> impl Strategy<Value = LlmRequest> {
    (
        proptest::option::of("[a-zA-Z ]{0,40}"),
        proptest::collection::vec(arb_message(), 0..12),
        proptest::option::of(0.0f32..2.0),
    )
        .prop_map(|(system, messages, temperature)| LlmRequest {
            system,
            messages,
            max_tokens: None,
            temperature,
        })
}

fn response_with(text: Option<String>, finish_reason: Option<String>) -> OpenAIResponse {
    OpenAIResponse {
        choices: vec![OpenAIChoice {
            message: OpenAIMessage {
                role: "assistant".to_string(),
                content: text,
            },
            finish_reason,
        }],
        usage: Some(OpenAIUsage {
            prompt_tokens: 1,
            completion_tokens: 1,
        }),
    }
}

proptest! {
    #[test]
    fn prop_normalize_rejects_no_choices(with_usage in any::<bool>()) {
        let resp = OpenAIResponse {
            choices: vec![],
            usage: with_usage.then_some(OpenAIUsage { prompt_tokens: 0, completion_tokens: 0 }),
        };
        prop_assert!(test_helpers::normalize_response(resp).is_err());
    }

    #[test]
    fn prop_normalize_preserves_text(
        text in proptest::option::of("[a-zA-Zа-яА-Я0-9 \n.!?]{0,200}"),
        stop in any::<bool>(),
    ) {
        let finish = if stop { "stop" } else { "length" };
        let resp = response_with(text.clone(), Some(finish.to_string()));
        let normalized = test_helpers::normalize_response(resp).unwrap();
        prop_assert_eq!(normalized.text, text.unwrap_or_default());
        prop_assert_eq!(normalized.end_turn, stop);
    }

    #[test]
    fn prop_translate_keeps_messages_in_order(request in arb_request()) {
        let wire = test_helpers::translate_request(&request);
        let has_system = request.system.as_deref().is_some_and(|s| !s.is_empty());
        let offset = usize::from(has_system);
        prop_assert_eq!(wire.messages.len(), request.messages.len() + offset);
        if has_system {
            prop_assert_eq!(wire.messages[0].role.as_str(), "system");
        }
        for (msg, out) in request.messages.iter().zip(wire.messages.iter().skip(offset)) {
            let expected_role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "assistant",
            };
            prop_assert_eq!(out.role.as_str(), expected_role);
            prop_assert_eq!(out.content.as_deref(), Some(msg.text.as_str()));
        }
    }

    #[test]
    fn prop_translated_request_serializes(request in arb_request()) {
        let wire = test_helpers::translate_request(&request);
        let json = serde_json::to_value(&wire).unwrap();
        prop_assert!(json["messages"].is_array());
        prop_assert_eq!(json.get("temperature").is_some(), request.temperature.is_some());
    }
}
