//! Role-play chat with a famous person

use super::text::truncate_persona_reply;
use super::{apology, HandlerContext, ModeHandler, Outcome, GENERATING_REPLY};
use crate::catalog::{self, Persona};
use crate::state_machine::{Mode, ModeInput, OptionId, RenderInstruction, Session};
use async_trait::async_trait;

/// Speaker name when text arrives before a persona was picked
const FALLBACK_NAME: &str = "Особистість";
const FALLBACK_PROMPT: &str = "default";
const BREVITY_SUFFIX: &str = "\n\nВАЖЛИВО: Відповідай коротко та лаконічно. \
     Максимум 2-3 речення (не більше 150 слів). Не пиши довгі абзаци.";

pub struct PersonaHandler;

fn persona_menu(ctx: &HandlerContext) -> RenderInstruction {
    ctx.intro(Mode::Persona)
        .with_options(catalog::PERSONAS.iter().map(|p| (p.button, p.id)))
        .with_finish()
}

impl PersonaHandler {
    fn select(session: &mut Session, persona: &'static Persona, ctx: &HandlerContext) -> Outcome {
        let system_prompt = ctx.resources.load_prompt(persona.id);
        if let Some(context) = session.persona_mut() {
            context.persona = Some(persona);
            context.system_prompt = Some(system_prompt);
        }
        session.memory.clear(Mode::Persona);

        let render = RenderInstruction::text(format!(
            "✅ Розмова з {}!\n\n💬 Напиши своє повідомлення:",
            persona.name
        ))
        .with_image(ctx.resources.image_path(persona.id))
        .with_finish();
        Outcome::new(render, Mode::Persona)
    }

    async fn reply(session: &mut Session, text: String, ctx: &HandlerContext) -> Outcome {
        let (name, prompt) = match session.persona() {
            Some(context) => match (context.persona, &context.system_prompt) {
                (Some(persona), Some(prompt)) => (persona.name, prompt.clone()),
                _ => (FALLBACK_NAME, ctx.resources.load_prompt(FALLBACK_PROMPT)),
            },
            None => (FALLBACK_NAME, ctx.resources.load_prompt(FALLBACK_PROMPT)),
        };

        ctx.notice(GENERATING_REPLY);
        let message = format!("{text}{BREVITY_SUFFIX}");
        let prior = session.memory.window(Mode::Persona);
        let Ok(raw) = ctx.complete(Mode::Persona, &prompt, &message, &prior).await else {
            return Outcome::new(apology(), Mode::Persona);
        };

        let reply = truncate_persona_reply(&raw);
        session.memory.record_exchange(Mode::Persona, &text, &reply);

        let render = RenderInstruction::text(format!("{name}:\n{reply}")).with_finish();
        Outcome::new(render, Mode::Persona)
    }
}

#[async_trait]
impl ModeHandler for PersonaHandler {
    fn mode(&self) -> Mode {
        Mode::Persona
    }

    async fn enter(&self, _session: &mut Session, ctx: &HandlerContext) -> Outcome {
        Outcome::new(persona_menu(ctx), Mode::Persona)
    }

    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        match input {
            ModeInput::Option(OptionId::Persona(persona)) => Self::select(session, persona, ctx),
            ModeInput::Text(text) => Self::reply(session, text, ctx).await,
            ModeInput::Option(_) => Outcome::new(persona_menu(ctx), Mode::Persona),
        }
    }
}
