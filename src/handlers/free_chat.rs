//! Free chat with the assistant, remembering recent exchanges

use super::{apology, HandlerContext, ModeHandler, Outcome, GENERATING_REPLY};
use crate::state_machine::{Mode, ModeInput, OptionId, RenderInstruction, Session};
use async_trait::async_trait;

const ASK_MORE: &str = "💬 Запитати ще";

pub struct FreeChatHandler;

#[async_trait]
impl ModeHandler for FreeChatHandler {
    fn mode(&self) -> Mode {
        Mode::FreeChat
    }

    async fn enter(&self, _session: &mut Session, ctx: &HandlerContext) -> Outcome {
        Outcome::new(ctx.intro(Mode::FreeChat).with_finish(), Mode::FreeChat)
    }

    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        match input {
            ModeInput::Text(text) => {
                ctx.notice(GENERATING_REPLY);
                let prompt = ctx.resources.load_prompt("gpt");
                let prior = session.memory.window(Mode::FreeChat);

                let Ok(reply) = ctx.complete(Mode::FreeChat, &prompt, &text, &prior).await else {
                    return Outcome::new(apology(), Mode::FreeChat);
                };

                session
                    .memory
                    .record_exchange(Mode::FreeChat, &text, &reply);
                let render = RenderInstruction::text(reply)
                    .with_option(ASK_MORE, OptionId::AskMore.as_str())
                    .with_finish();
                Outcome::new(render, Mode::FreeChat)
            }
            ModeInput::Option(option) => {
                if option == OptionId::AskMore {
                    // A fresh question starts a fresh conversation
                    session.memory.clear(Mode::FreeChat);
                }
                let render =
                    RenderInstruction::text(ctx.resources.load_message("gpt")).with_finish();
                Outcome::new(render, Mode::FreeChat)
            }
        }
    }
}
