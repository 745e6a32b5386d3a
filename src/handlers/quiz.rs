//! Topic quiz: the model asks one question at a time and judges answers

use super::text::{extract_first_question, judge_verdict, numbered_history};
use super::{apology, HandlerContext, ModeHandler, Outcome};
use crate::catalog::{self, QuizTopic};
use crate::runtime::traits::UpstreamError;
use crate::state_machine::{Mode, ModeInput, OptionId, RenderInstruction, Session};
use async_trait::async_trait;

const PICK_TOPIC_FIRST: &str = "Спочатку обери тему квізу!";
const CHECKING: &str = "🔄 Перевіряю відповідь...";
const NEXT_QUESTION: &str = "🔄 Генерую наступне питання...";
const RESTARTED: &str = "🔄 Рахунок обнулено! Генерую нове питання...";
/// Earlier questions quoted back to the model
const HISTORY_IN_PROMPT: usize = 5;

pub struct QuizHandler;

fn topic_menu(ctx: &HandlerContext) -> RenderInstruction {
    ctx.intro(Mode::Quiz)
        .with_options(catalog::QUIZ_TOPICS.iter().map(|t| (t.button, t.id)))
        .with_finish()
}

fn question_request(topic: &QuizTopic, asked: &[&str]) -> String {
    let mut history = String::new();
    if !asked.is_empty() {
        history.push_str("\n\nВАЖЛИВО: НЕ повторюй ці питання, які вже були задані:\n");
        history.push_str(&numbered_history(asked.iter().copied()));
    }
    format!(
        "{}\n\nВАЖЛИВО: Згенеруй ТІЛЬКИ ОДНЕ питання. НЕ більше одного.{history}\n\n\
         Згенеруй НОВЕ, унікальне питання, яке відрізняється від попередніх.",
        topic.id
    )
}

fn judge_request(question: &str, answer: &str) -> String {
    format!(
        "Питання: {question}\n\nВідповідь користувача: {answer}\n\n\
         Перевір, чи відповідь правильна. Якщо правильна або дуже схожа на правильну, \
         відповідь 'Правильно!'. Якщо неправильна, відповідь \
         'Неправильно! Правильна відповідь - [правильна відповідь]'."
    )
}

fn question_render(question: &str) -> RenderInstruction {
    RenderInstruction::text(format!("❓ Питання:\n{question}\n\n💬 Напиши свою відповідь:"))
        .with_finish()
}

fn reminder() -> Outcome {
    Outcome::new(
        RenderInstruction::text(PICK_TOPIC_FIRST).with_finish(),
        Mode::Quiz,
    )
}

impl QuizHandler {
    /// Ask the model for one new question. `fresh` ignores the asked-question
    /// history, for a new topic or a restart.
    async fn generate(
        session: &Session,
        topic: &QuizTopic,
        fresh: bool,
        ctx: &HandlerContext,
    ) -> Result<String, UpstreamError> {
        let asked: Vec<&str> = if fresh {
            Vec::new()
        } else {
            session
                .recent
                .quiz_questions
                .latest(HISTORY_IN_PROMPT)
                .collect()
        };
        let prompt = ctx.resources.load_prompt("quiz");
        let request = question_request(topic, &asked);
        let raw = ctx.complete(Mode::Quiz, &prompt, &request, &[]).await?;

        let extracted = extract_first_question(&raw);
        if extracted.used_fallback {
            tracing::warn!(
                session_id = %ctx.session_id,
                topic = topic.id,
                "No question line found in model output, using first paragraph"
            );
        }
        if extracted.text.is_empty() {
            return Err(UpstreamError::EmptyCompletion);
        }
        Ok(extracted.text)
    }

    /// Store a freshly generated question and ask it
    fn ask(session: &mut Session, question: String) -> Outcome {
        session.recent.quiz_questions.push(question.clone());
        if let Some(quiz) = session.quiz_mut() {
            quiz.current_question = Some(question.clone());
            quiz.awaiting_answer = true;
        }
        Outcome::new(question_render(&question), Mode::Quiz)
    }

    async fn select_topic(
        session: &mut Session,
        topic: &'static QuizTopic,
        ctx: &HandlerContext,
    ) -> Outcome {
        ctx.notice(format!(
            "✅ Обрано тему: {}\n\n🔄 Генерую питання...",
            topic.name
        ));
        let Ok(question) = Self::generate(session, topic, true, ctx).await else {
            return Outcome::new(apology(), Mode::Quiz);
        };

        session.reset_quiz_progress();
        if let Some(quiz) = session.quiz_mut() {
            quiz.topic = Some(topic);
        }
        Self::ask(session, question)
    }

    async fn next_question(session: &mut Session, restart: bool, ctx: &HandlerContext) -> Outcome {
        let Some(topic) = session.quiz().and_then(|q| q.topic) else {
            return reminder();
        };

        ctx.notice(if restart { RESTARTED } else { NEXT_QUESTION });
        let Ok(question) = Self::generate(session, topic, restart, ctx).await else {
            return Outcome::new(apology(), Mode::Quiz);
        };

        if restart {
            session.reset_quiz_progress();
        }
        Self::ask(session, question)
    }

    fn change_topic(session: &mut Session, ctx: &HandlerContext) -> Outcome {
        session.reset_quiz_progress();
        if let Some(quiz) = session.quiz_mut() {
            quiz.topic = None;
        }
        Outcome::new(topic_menu(ctx), Mode::Quiz)
    }

    async fn answer(session: &mut Session, answer: String, ctx: &HandlerContext) -> Outcome {
        let question = match session.quiz() {
            Some(quiz) if quiz.awaiting_answer => quiz.current_question.clone(),
            _ => None,
        };
        let Some(question) = question else {
            return reminder();
        };

        ctx.notice(CHECKING);
        let prompt = ctx.resources.load_prompt("quiz");
        let request = judge_request(&question, &answer);
        let Ok(judgement) = ctx.complete(Mode::Quiz, &prompt, &request, &[]).await else {
            return Outcome::new(apology(), Mode::Quiz);
        };

        let is_correct = judge_verdict(&judgement);
        let Some(quiz) = session.quiz_mut() else {
            return reminder();
        };
        quiz.score.record(is_correct);
        quiz.awaiting_answer = false;
        tracing::debug!(
            session_id = %ctx.session_id,
            is_correct,
            correct = quiz.score.correct(),
            total = quiz.score.total(),
            "Quiz answer judged"
        );

        let render = RenderInstruction::text(format!(
            "{judgement}\n\n📊 Правильних відповідей: {} з {}",
            quiz.score.correct(),
            quiz.score.total()
        ))
        .with_option("➡️ Наступне питання", OptionId::QuizNext.as_str())
        .with_option("🔄 Почати спочатку", OptionId::QuizRestart.as_str())
        .with_option("🔄 Змінити тему", OptionId::QuizChangeTopic.as_str())
        .with_finish();
        Outcome::new(render, Mode::Quiz)
    }
}

#[async_trait]
impl ModeHandler for QuizHandler {
    fn mode(&self) -> Mode {
        Mode::Quiz
    }

    async fn enter(&self, _session: &mut Session, ctx: &HandlerContext) -> Outcome {
        Outcome::new(topic_menu(ctx), Mode::Quiz)
    }

    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        match input {
            ModeInput::Option(OptionId::QuizTopic(topic)) => {
                Self::select_topic(session, topic, ctx).await
            }
            ModeInput::Option(OptionId::QuizNext) => Self::next_question(session, false, ctx).await,
            ModeInput::Option(OptionId::QuizRestart) => {
                Self::next_question(session, true, ctx).await
            }
            ModeInput::Option(OptionId::QuizChangeTopic) => Self::change_topic(session, ctx),
            ModeInput::Text(answer) => Self::answer(session, answer, ctx).await,
            ModeInput::Option(_) => Outcome::new(topic_menu(ctx), Mode::Quiz),
        }
    }
}
