//! Movie, book and music recommendations with a dislike list

use super::text::extract_title;
use super::{apology, HandlerContext, ModeHandler, Outcome};
use crate::catalog::{Category, Genre};
use crate::resources::fill_template;
use crate::runtime::traits::UpstreamError;
use crate::state_machine::{Mode, ModeInput, OptionId, RenderInstruction, Session};
use async_trait::async_trait;

const PICK_CATEGORY_FIRST: &str = "Спочатку обери категорію!";
const GET_RECOMMENDATION_FIRST: &str = "Спочатку отримай рекомендації";
const GENERATING: &str = "🔄 Генерую рекомендацію...";
const DISLIKE: &str = "👎 Не подобається";

pub struct RecommendHandler;

fn category_menu(ctx: &HandlerContext) -> RenderInstruction {
    ctx.intro(Mode::Recommend)
        .with_options(Category::ALL.iter().map(|c| (c.button(), c.id())))
        .with_finish()
}

fn genre_menu(category: Category, heading: String) -> RenderInstruction {
    RenderInstruction::text(heading)
        .with_options(category.genres().iter().map(|g| (g.label, g.id)))
        .with_finish()
}

fn reminder(text: &str) -> Outcome {
    Outcome::new(RenderInstruction::text(text).with_finish(), Mode::Recommend)
}

/// System prompt for one recommendation, excluding every disliked title
fn system_prompt(
    ctx: &HandlerContext,
    category: Category,
    genre: &Genre,
    disliked: &[String],
) -> String {
    let rating = if category == Category::Movies {
        ctx.resources.load_prompt("rating_instruction")
    } else {
        String::new()
    };
    let mut prompt = fill_template(
        &ctx.resources.load_prompt("recommendations"),
        &[
            ("category", category.name()),
            ("category_singular", category.singular()),
            ("genre", genre.name()),
            ("rating_instruction", &rating),
        ],
    );
    if !disliked.is_empty() {
        prompt.push_str(&format!("\n\nНе рекомендуй: {}.", disliked.join(", ")));
    }
    prompt
}

impl RecommendHandler {
    fn select_category(session: &mut Session, category: Category) -> Outcome {
        if let Some(rec) = session.recommend_mut() {
            rec.category = Some(category);
            rec.last_genre = None;
            rec.last_recommendation = None;
            rec.awaiting_dislike = false;
        }
        let heading = format!(
            "✅ Категорія: {}\n\n{} Обери жанр:",
            category.name(),
            category.emoji()
        );
        Outcome::new(genre_menu(category, heading), Mode::Recommend)
    }

    async fn select_genre(session: &mut Session, genre_id: &str, ctx: &HandlerContext) -> Outcome {
        let Some(category) = session.recommend().and_then(|r| r.category) else {
            return reminder(PICK_CATEGORY_FIRST);
        };
        let Some(genre) = category.genre(genre_id) else {
            tracing::debug!(session_id = %ctx.session_id, genre_id, "Genre not in selected category");
            let heading = format!("{} Обери жанр:", category.emoji());
            return Outcome::new(genre_menu(category, heading), Mode::Recommend);
        };

        ctx.notice(GENERATING);
        Self::recommend(session, category, genre, None, ctx).await
    }

    async fn dislike(session: &mut Session, ctx: &HandlerContext) -> Outcome {
        let pending = session.recommend().and_then(|rec| {
            match (rec.awaiting_dislike, rec.category, rec.last_genre, &rec.last_recommendation) {
                (true, Some(category), Some(genre), Some(last)) => Some((category, genre, last.clone())),
                _ => None,
            }
        });
        let Some((category, genre, last)) = pending else {
            return reminder(GET_RECOMMENDATION_FIRST);
        };

        // Recorded only once the replacement arrives
        let title = extract_title(&last);
        tracing::debug!(session_id = %ctx.session_id, title = %title, "Recommendation disliked");

        ctx.notice(format!(
            "✅ Додано до списку небажаних: {title}\n\n🔄 Генерую нову рекомендацію..."
        ));
        Self::recommend(session, category, genre, Some(title), ctx).await
    }

    async fn recommend(
        session: &mut Session,
        category: Category,
        genre: &'static Genre,
        disliked: Option<String>,
        ctx: &HandlerContext,
    ) -> Outcome {
        match Self::generate(session, category, genre, disliked.as_deref(), ctx).await {
            Ok(recommendation) => {
                if let Some(rec) = session.recommend_mut() {
                    if let Some(title) = disliked {
                        rec.add_disliked(title);
                    }
                    rec.last_genre = Some(genre);
                    rec.last_recommendation = Some(recommendation.clone());
                    rec.awaiting_dislike = true;
                }
                let render = RenderInstruction::text(format!(
                    "📋 Рекомендація ({}):\n\n{recommendation}",
                    category.name()
                ))
                .with_option(DISLIKE, OptionId::Dislike.as_str())
                .with_finish();
                Outcome::new(render, Mode::Recommend)
            }
            Err(_) => Outcome::new(apology(), Mode::Recommend),
        }
    }

    async fn generate(
        session: &Session,
        category: Category,
        genre: &Genre,
        newly_disliked: Option<&str>,
        ctx: &HandlerContext,
    ) -> Result<String, UpstreamError> {
        let mut disliked = session
            .recommend()
            .map(|r| r.disliked.clone())
            .unwrap_or_default();
        if let Some(title) = newly_disliked {
            if !disliked.iter().any(|d| d == title) {
                disliked.push(title.to_string());
            }
        }
        let prompt = system_prompt(ctx, category, genre, &disliked);
        let request = format!(
            "Дай ТІЛЬКИ ОДИН {} у жанрі {}. НЕ більше одного.",
            category.singular(),
            genre.name()
        );
        ctx.complete(Mode::Recommend, &prompt, &request, &[]).await
    }
}

#[async_trait]
impl ModeHandler for RecommendHandler {
    fn mode(&self) -> Mode {
        Mode::Recommend
    }

    async fn enter(&self, _session: &mut Session, ctx: &HandlerContext) -> Outcome {
        Outcome::new(category_menu(ctx), Mode::Recommend)
    }

    async fn handle_input(
        &self,
        session: &mut Session,
        input: ModeInput,
        ctx: &HandlerContext,
    ) -> Outcome {
        match input {
            ModeInput::Option(OptionId::Category(category)) => {
                Self::select_category(session, category)
            }
            ModeInput::Option(OptionId::Genre(genre_id)) => {
                Self::select_genre(session, &genre_id, ctx).await
            }
            ModeInput::Option(OptionId::Dislike) => Self::dislike(session, ctx).await,
            ModeInput::Option(_) | ModeInput::Text(_) => {
                Outcome::new(category_menu(ctx), Mode::Recommend)
            }
        }
    }
}
