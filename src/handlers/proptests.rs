//! Property-based tests for model output post-processing
//!
//! - Facts never exceed two ". "-separated sentences
//! - Persona replies stay within the cap plus an ellipsis
//! - Extracted questions are bounded and single-line unless the fallback fired
//! - A judgement starting with the negative verdict is never scored correct
//! - Extracted titles are bounded and free of markup

use super::text::{
    extract_first_question, extract_title, judge_verdict, truncate_fact, truncate_persona_reply,
};
use proptest::prelude::*;

fn arb_prose() -> impl Strategy<Value = String> {
    "[a-zA-Zа-яА-ЯіїєІЇЄ0-9 .!?,)*_\n]{0,700}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn prop_fact_has_at_most_two_sentences(text in arb_prose()) {
        let fact = truncate_fact(&text);
        prop_assert!(fact.split(". ").count() <= 2);
        prop_assert!(fact.chars().count() <= text.chars().count() + 1);
    }

    #[test]
    fn prop_persona_reply_is_capped(text in arb_prose()) {
        let reply = truncate_persona_reply(&text);
        prop_assert!(reply.chars().count() <= 503);
        if text.chars().count() <= 500 {
            prop_assert_eq!(reply, text);
        }
    }

    #[test]
    fn prop_question_is_bounded(text in arb_prose()) {
        let extracted = extract_first_question(&text);
        prop_assert!(extracted.text.chars().count() <= 300);
        if !extracted.used_fallback {
            prop_assert!(!extracted.text.contains('\n'));
            prop_assert!(!extracted.text.is_empty());
        }
    }

    #[test]
    fn prop_negative_verdict_never_correct(
        padding in "[ \n]{0,3}",
        case in prop::sample::select(vec!["Неправильно", "неправильно", "НЕПРАВИЛЬНО"]),
        rest in "[a-zA-Zа-яА-Я !.,-]{0,80}",
    ) {
        let judgement = format!("{padding}{case}{rest}");
        prop_assert!(!judge_verdict(&judgement));
    }

    #[test]
    fn prop_title_is_clean(text in arb_prose()) {
        let title = extract_title(&text);
        prop_assert!(!title.is_empty());
        prop_assert!(!title.contains('*') && !title.contains('_'));
        if !text.lines().any(|l| l.replace(['*', '_'], "").trim().starts_with("Назва")) {
            prop_assert!(title.chars().count() <= 100);
        }
    }
}
