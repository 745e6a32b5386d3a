//! Translation into a chosen language, one message at a time

use super::{apology, HandlerContext, ModeHandler, Outcome};
use crate::catalog::{self, Language};
use crate::resources::fill_template;
use crate::state_machine::{Mode, ModeInput, OptionId, RenderInstruction, Session};
use async_trait::async_trait;

const PICK_LANGUAGE_FIRST: &str = "Спочатку обери мову!";
const TRANSLATING: &str = "🔄 Перекладаю...";
const CHANGE_LANGUAGE: &str = "🔄 Змінити мову";

pub struct TranslateHandler;

fn language_menu(ctx: &HandlerContext) -> RenderInstruction {
    ctx.intro(Mode::Translate)
        .with_options(catalog::LANGUAGES.iter().map(|l| (l.button, l.id)))
        .with_finish()
}

impl TranslateHandler {
    fn select(session: &mut Session, language: &'static Language) -> Outcome {
        if let Some(context) = session.translate_mut() {
            context.language = Some(language);
        }
        let render = RenderInstruction::text(format!(
            "✅ Обрано: {}\n\n💬 Напиши текст для перекладу:",
            language.name
        ))
        .with_option(CHANGE_LANGUAGE, Mode::Translate.selector())
        .with_finish();
        Outcome::new(render, Mode::Translate)
    }

    async fn translate(session: &Session, text: &str, ctx: &HandlerContext) -> Outcome {
        let Some(language) = session.translate().and_then(|t| t.language) else {
            return Outcome::new(
                RenderInstruction::text(PICK_LANGUAGE_FIRST).with_finish(),
                Mode::Translate,
            );
        };

        ctx.notice(TRANSLATING);
        let prompt = fill_template(
            &ctx.resources.load_prompt("translate"),
            &[("lang_name", language.name)],
        );
        // Each message is translated on its own, without history
        let Ok(translation) = ctx.complete(Mode::Translate, &prompt, text, &[]).await else {
            return Outcome::new(apology(), Mode::Translate);
        };

        let render = RenderInstruction::text(format!("📝 Переклад:\n{translation}"))
            .with_option(CHANGE_LANGUAGE, Mode::Translate.selector())
            .with_finish();
        Outcome::new(render, Mode::Translate)
    }
}

#[async_trait]
impl ModeHandler for TranslateHandler {
    fn mode(&self) -> Mode {
        Mode::Translate
    }

    async fn enter(&self, _session: &mut Session, ctx: &HandlerContext) -> Outcome {
        Outcome::new(language_menu(ctx), Mode::Translate)
    }

    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        match input {
            ModeInput::Option(OptionId::Language(language)) => Self::select(session, language),
            ModeInput::Text(text) => Self::translate(session, &text, ctx).await,
            ModeInput::Option(_) => Outcome::new(language_menu(ctx), Mode::Translate),
        }
    }
}
