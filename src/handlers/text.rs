//! Post-processing of model output and prompt fragments
//!
//! All length limits count chars, never bytes.

const FACT_SENTENCE_LIMIT: usize = 2;
const PERSONA_REPLY_LIMIT: usize = 500;
/// A persona reply is cut at a sentence end only past this char index
const PERSONA_SENTENCE_FLOOR: usize = 300;
const QUESTION_LIMIT: usize = 300;
const FALLBACK_QUESTION_LIMIT: usize = 200;
const TITLE_LIMIT: usize = 100;
const HISTORY_ITEM_LIMIT: usize = 100;

pub const UNKNOWN_TITLE: &str = "Невідомий твір";

const SECOND_QUESTION_MARKERS: [&str; 5] = ["2.", "2)", "2）", "Питання 2", "Question 2"];
const FIRST_QUESTION_MARKERS: [&str; 3] = ["1.", "1)", "1）"];
const AFFIRMATIVE_TOKENS: [&str; 3] = ["так", "вірно", "correct"];

fn take_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

/// At most `n` chars, backing off to the last space when a cut was needed
fn cut_at_word(text: &str, n: usize) -> String {
    if text.chars().count() <= n {
        return text.to_string();
    }
    let head = take_chars(text, n);
    match head.rsplit_once(' ') {
        Some((before, _)) => before.to_string(),
        None => head,
    }
}

fn strip_markup(text: &str) -> String {
    text.replace(['*', '_'], "")
}

/// Numbered list of earlier outputs, each cut short, for "do not repeat"
/// instructions
pub fn numbered_history<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .enumerate()
        .map(|(i, item)| format!("{}. {}...\n", i + 1, take_chars(item, HISTORY_ITEM_LIMIT)))
        .collect()
}

/// Keep only the first two sentences (split on ". ") and end with a period
pub fn truncate_fact(text: &str) -> String {
    let sentences: Vec<&str> = text.split(". ").collect();
    if sentences.len() <= FACT_SENTENCE_LIMIT {
        return text.to_string();
    }
    let mut fact = sentences[..FACT_SENTENCE_LIMIT].join(". ");
    if !fact.ends_with('.') {
        fact.push('.');
    }
    fact
}

/// Cap a persona reply at 500 chars, preferring to end on a sentence
/// terminator in the last 200 chars of the window
pub fn truncate_persona_reply(text: &str) -> String {
    if text.chars().count() <= PERSONA_REPLY_LIMIT {
        return text.to_string();
    }
    let window: Vec<char> = text.chars().take(PERSONA_REPLY_LIMIT).collect();
    match window.iter().rposition(|c| matches!(c, '.' | '!' | '?')) {
        Some(end) if end > PERSONA_SENTENCE_FLOOR => window[..=end].iter().collect(),
        _ => {
            let mut reply: String = window.into_iter().collect();
            reply.push_str("...");
            reply
        }
    }
}

/// Result of pulling a single question out of model output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedQuestion {
    pub text: String,
    /// No usable lines were found and the first paragraph was used instead
    pub used_fallback: bool,
}

/// Extract the first question when the model returns several.
///
/// Lines are collected until one carries a second-question marker; a
/// leading first-question marker is stripped.
pub fn extract_first_question(raw: &str) -> ExtractedQuestion {
    let mut parts: Vec<&str> = Vec::new();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if SECOND_QUESTION_MARKERS.iter().any(|m| line.contains(m)) {
            break;
        }
        if FIRST_QUESTION_MARKERS.iter().any(|m| line.contains(m)) {
            let cleaned = line.trim_start_matches(|c: char| {
                c.is_ascii_digit() || matches!(c, '.' | ')' | ' ')
            });
            if !cleaned.is_empty() {
                parts.push(cleaned);
            }
        } else {
            parts.push(line);
        }
    }

    if parts.is_empty() {
        return ExtractedQuestion {
            text: first_paragraph_question(raw),
            used_fallback: true,
        };
    }

    ExtractedQuestion {
        text: cut_at_word(parts.join(" ").trim(), QUESTION_LIMIT),
        used_fallback: false,
    }
}

fn first_paragraph_question(raw: &str) -> String {
    let paragraph = raw.trim().split("\n\n").next().unwrap_or_default().trim();
    if paragraph.chars().count() <= FALLBACK_QUESTION_LIMIT {
        return paragraph.to_string();
    }
    let sentence = paragraph.split(". ").next().unwrap_or(paragraph);
    let mut question = cut_at_word(sentence, FALLBACK_QUESTION_LIMIT - 1);
    if !question.ends_with('.') {
        question.push('.');
    }
    question
}

/// Decide whether the judge's free-text verdict means "correct".
///
/// A plain string heuristic over the model's wording; it can misread
/// phrasings such as "ой, неправильно!" that do not start with the verdict.
pub fn judge_verdict(judgement: &str) -> bool {
    let verdict = judgement.trim().to_lowercase();
    if verdict.starts_with("неправильно") {
        false
    } else if verdict.starts_with("правильно") || verdict.contains("правильно!") {
        true
    } else {
        AFFIRMATIVE_TOKENS.iter().any(|token| verdict.contains(token))
    }
}

/// Title of the recommended work: the "Назва:" / "Назва твору:" line if
/// present, otherwise the first line without markup
pub fn extract_title(recommendation: &str) -> String {
    for line in recommendation.lines() {
        let line = strip_markup(line);
        let line = line.trim();
        if line.starts_with("Назва:") || line.starts_with("Назва твору:") {
            let title = line.split_once(':').map_or("", |(_, rest)| rest).trim();
            if !title.is_empty() {
                return title.to_string();
            }
        }
    }

    let first_line = recommendation.lines().next().unwrap_or_default();
    let title = cut_at_word(strip_markup(first_line).trim(), TITLE_LIMIT);
    if title.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        title
    }
}
