//! Random fact: one-shot generation, then straight back to the menu

use super::text::{numbered_history, truncate_fact};
use super::{apology, HandlerContext, ModeHandler, Outcome};
use crate::state_machine::{Mode, RenderInstruction, Session};
use async_trait::async_trait;

const GENERATING: &str = "🎲 Генерую цікавий факт...";
const ANOTHER_FACT: &str = "🎲 Хочу ще факт";
/// Earlier facts quoted back to the model
const HISTORY_IN_PROMPT: usize = 10;

pub struct FactHandler;

fn fact_request(session: &Session) -> String {
    let mut history = String::new();
    if !session.recent.facts.is_empty() {
        history.push_str("\n\nВАЖЛИВО: НЕ повторюй ці факти, які вже були показані:\n");
        history.push_str(&numbered_history(
            session.recent.facts.latest(HISTORY_IN_PROMPT),
        ));
    }
    format!(
        "Дай мені цікавий випадковий факт.{history}\n\n\
         ВАЖЛИВО: 1. Згенеруй НОВИЙ, унікальний факт, який відрізняється від попередніх. \
         НЕ повторюй вже показані факти.\n\
         2. Факт має бути МАКСИМУМ у 2 реченнях. НЕ більше двох речень. \
         Будь коротким та лаконічним."
    )
}

#[async_trait]
impl ModeHandler for FactHandler {
    fn mode(&self) -> Mode {
        Mode::Fact
    }

    async fn enter(&self, session: &mut Session, ctx: &HandlerContext) -> Outcome {
        ctx.notice(GENERATING);

        let prompt = ctx.resources.load_prompt("random");
        let request = fact_request(session);
        let raw = match ctx.complete(Mode::Fact, &prompt, &request, &[]).await {
            Ok(raw) => raw,
            Err(_) => {
                let render = apology().with_option(ANOTHER_FACT, Mode::Fact.selector());
                return Outcome::new(render, Mode::Menu);
            }
        };

        let fact = truncate_fact(&raw);
        session.recent.facts.push(fact.clone());

        let render = RenderInstruction::text(fact)
            .with_image(ctx.resources.image_path("random"))
            .with_option(ANOTHER_FACT, Mode::Fact.selector())
            .with_finish();
        Outcome::new(render, Mode::Menu)
    }
}
