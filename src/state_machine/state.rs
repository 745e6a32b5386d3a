//! Session state types

use crate::catalog::{Category, Genre, Language, Persona, QuizTopic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Most recent (user, assistant) pairs kept per mode
pub const MEMORY_PAIR_CAP: usize = 10;
/// Facts remembered to steer the model away from repeats
pub const FACT_HISTORY_CAP: usize = 20;
/// Quiz questions remembered to steer the model away from repeats
pub const QUESTION_HISTORY_CAP: usize = 10;

// ============================================================================
// Identity
// ============================================================================

/// Stable identity of the end user a session belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Mode
// ============================================================================

/// Top-level conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Menu,
    Fact,
    FreeChat,
    Persona,
    Quiz,
    Translate,
    Recommend,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Menu,
        Mode::Fact,
        Mode::FreeChat,
        Mode::Persona,
        Mode::Quiz,
        Mode::Translate,
        Mode::Recommend,
    ];

    /// Button payload that selects this mode
    pub fn selector(self) -> &'static str {
        match self {
            Mode::Menu => "start",
            Mode::Fact => "random",
            Mode::FreeChat => "gpt",
            Mode::Persona => "talk",
            Mode::Quiz => "quiz",
            Mode::Translate => "translate",
            Mode::Recommend => "recommendations",
        }
    }

    pub fn from_selector(payload: &str) -> Option<Self> {
        if payload == "finish" {
            return Some(Mode::Menu);
        }
        Self::ALL.into_iter().find(|m| m.selector() == payload)
    }

    /// Label shown on the main menu button
    pub fn menu_label(self) -> &'static str {
        match self {
            Mode::Menu => "🏠 Закінчити",
            Mode::Fact => "🎲 Цікавий факт",
            Mode::FreeChat => "🤖 Чат GPT",
            Mode::Persona => "👤 Чат із зіркою",
            Mode::Quiz => "❓ Квіз",
            Mode::Translate => "🌐 Перекладач",
            Mode::Recommend => "🎬 Рекомендації",
        }
    }

    /// Resource name for the mode's intro message and image
    pub fn resource_name(self) -> &'static str {
        match self {
            Mode::Menu => "main",
            Mode::Fact => "random",
            Mode::FreeChat => "gpt",
            Mode::Persona => "talk",
            Mode::Quiz => "quiz",
            Mode::Translate => "translate",
            Mode::Recommend => "recommendations",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Menu => "menu",
            Mode::Fact => "fact",
            Mode::FreeChat => "free_chat",
            Mode::Persona => "persona",
            Mode::Quiz => "quiz",
            Mode::Translate => "translate",
            Mode::Recommend => "recommend",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Conversation memory
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance in a conversation window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Per-mode sliding windows of recent turns, most recent last
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversationMemory {
    windows: HashMap<Mode, VecDeque<Turn>>,
}

impl ConversationMemory {
    /// Append a (user, assistant) pair, discarding the oldest pairs past the cap
    pub fn record_exchange(&mut self, mode: Mode, user: &str, assistant: &str) {
        let window = self.windows.entry(mode).or_default();
        window.push_back(Turn::user(user));
        window.push_back(Turn::assistant(assistant));
        while window.len() > MEMORY_PAIR_CAP * 2 {
            window.pop_front();
        }
    }

    pub fn window(&self, mode: Mode) -> Vec<Turn> {
        self.windows
            .get(&mode)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, mode: Mode) -> usize {
        self.windows.get(&mode).map_or(0, VecDeque::len)
    }

    pub fn clear(&mut self, mode: Mode) {
        self.windows.remove(&mode);
    }
}

/// Ring buffer keeping the `capacity` most recent items
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundedHistory {
    capacity: usize,
    items: VecDeque<String>,
}

impl BoundedHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push_back(item.into());
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    /// The last `n` items, oldest first
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &str> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Previously produced artifacts, fed back into prompts to avoid repetition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentOutputs {
    pub facts: BoundedHistory,
    pub quiz_questions: BoundedHistory,
}

impl Default for RecentOutputs {
    fn default() -> Self {
        Self {
            facts: BoundedHistory::new(FACT_HISTORY_CAP),
            quiz_questions: BoundedHistory::new(QUESTION_HISTORY_CAP),
        }
    }
}

// ============================================================================
// Mode context
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PersonaContext {
    pub persona: Option<&'static Persona>,
    pub system_prompt: Option<String>,
}

/// Running quiz score. `correct <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    correct: u32,
    total: u32,
}

impl Score {
    pub fn correct(self) -> u32 {
        self.correct
    }

    pub fn total(self) -> u32 {
        self.total
    }

    pub fn record(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuizContext {
    /// `None` while on the topic selection sub-step
    pub topic: Option<&'static QuizTopic>,
    pub score: Score,
    pub current_question: Option<String>,
    pub awaiting_answer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranslateContext {
    pub language: Option<&'static Language>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecommendContext {
    pub category: Option<Category>,
    pub last_genre: Option<&'static Genre>,
    pub last_recommendation: Option<String>,
    /// Insertion-ordered, duplicate-free
    pub disliked: Vec<String>,
    pub awaiting_dislike: bool,
}

impl RecommendContext {
    /// Returns false if the title was already disliked
    pub fn add_disliked(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.disliked.contains(&title) {
            return false;
        }
        self.disliked.push(title);
        true
    }
}

/// Mode-specific scratch state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeContext {
    /// Menu, Fact and FreeChat carry no scratch state
    #[default]
    Empty,
    Persona(PersonaContext),
    Quiz(QuizContext),
    Translate(TranslateContext),
    Recommend(RecommendContext),
}

impl ModeContext {
    /// Fresh context for a mode
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Menu | Mode::Fact | Mode::FreeChat => ModeContext::Empty,
            Mode::Persona => ModeContext::Persona(PersonaContext::default()),
            Mode::Quiz => ModeContext::Quiz(QuizContext::default()),
            Mode::Translate => ModeContext::Translate(TranslateContext::default()),
            Mode::Recommend => ModeContext::Recommend(RecommendContext::default()),
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// Per-user conversational state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub state: Mode,
    pub memory: ConversationMemory,
    pub mode_context: ModeContext,
    pub recent: RecentOutputs,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: Mode::Menu,
            memory: ConversationMemory::default(),
            mode_context: ModeContext::Empty,
            recent: RecentOutputs::default(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Tear everything down to defaults, keeping identity
    pub fn reset_to_menu(&mut self) {
        self.state = Mode::Menu;
        self.memory = ConversationMemory::default();
        self.mode_context = ModeContext::Empty;
        self.recent = RecentOutputs::default();
    }

    /// Install a fresh context for `mode` and drop the memory windows of both
    /// the mode being left and the one being entered. Recent outputs stay.
    ///
    /// Re-entering Recommend from within Recommend keeps the disliked list:
    /// it spans the whole mode instance, not a single category pick.
    pub fn enter_mode(&mut self, mode: Mode) {
        let carried = match (&mut self.mode_context, mode) {
            (ModeContext::Recommend(rec), Mode::Recommend) => std::mem::take(&mut rec.disliked),
            _ => Vec::new(),
        };
        self.mode_context = ModeContext::for_mode(mode);
        if let ModeContext::Recommend(rec) = &mut self.mode_context {
            rec.disliked = carried;
        }
        self.memory.clear(self.state);
        self.memory.clear(mode);
    }

    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    pub fn persona(&self) -> Option<&PersonaContext> {
        match &self.mode_context {
            ModeContext::Persona(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn persona_mut(&mut self) -> Option<&mut PersonaContext> {
        match &mut self.mode_context {
            ModeContext::Persona(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn quiz(&self) -> Option<&QuizContext> {
        match &self.mode_context {
            ModeContext::Quiz(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn quiz_mut(&mut self) -> Option<&mut QuizContext> {
        match &mut self.mode_context {
            ModeContext::Quiz(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn translate(&self) -> Option<&TranslateContext> {
        match &self.mode_context {
            ModeContext::Translate(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn translate_mut(&mut self) -> Option<&mut TranslateContext> {
        match &mut self.mode_context {
            ModeContext::Translate(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn recommend(&self) -> Option<&RecommendContext> {
        match &self.mode_context {
            ModeContext::Recommend(ctx) => Some(ctx),
            _ => None,
        }
    }

    pub fn recommend_mut(&mut self) -> Option<&mut RecommendContext> {
        match &mut self.mode_context {
            ModeContext::Recommend(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Quiz restart: zero the score and forget asked questions together
    pub fn reset_quiz_progress(&mut self) {
        self.recent.quiz_questions.clear();
        if let Some(quiz) = self.quiz_mut() {
            quiz.score = Score::default();
            quiz.current_question = None;
            quiz.awaiting_answer = false;
        }
    }
}
