//! Static text templates, prompts and images
//!
//! Looks resources up under a root directory laid out as
//! `messages/<name>.txt`, `prompts/<name>.txt` and `images/<name>.jpg`.
//! A missing file is never an error for the caller: built-in defaults are
//! returned instead and the miss is logged.

use std::path::{Path, PathBuf};

const DEFAULT_PROMPT: &str = "Ти дружній асистент. Відповідай українською мовою.";

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("main", "👋 Привіт! Я твій AI-асистент.\n\nОбери дію нижче:"),
    ("random", "🎲 Випадковий факт\n\nЗараз згенерую цікавий факт!"),
    ("gpt", "🤖 ChatGPT режим\n\nНапиши своє запитання!"),
    ("talk", "👤 Діалог з особистістю\n\nОбери з ким хочеш поговорити:"),
    ("quiz", "❓ Квіз\n\nОбери тему для питань:"),
    ("translate", "🌐 Перекладач\n\nОбери мову для перекладу:"),
    ("recommendations", "🎬 Рекомендації\n\nОбери категорію:"),
];

const DEFAULT_PROMPTS: &[(&str, &str)] = &[
    (
        "random",
        "Ти ерудит, який знає безліч дивовижних фактів з науки, історії, природи та культури. \
         Відповідай українською мовою, коротко і без вступних фраз.",
    ),
    ("gpt", DEFAULT_PROMPT),
    (
        "quiz",
        "Ти ведучий вікторини. Коли отримуєш тему (quiz_geography, quiz_science, quiz_cinema, \
         quiz_sport), став одне цікаве питання середньої складності з цієї теми без варіантів \
         відповіді та без самої відповіді. Коли отримуєш питання і відповідь користувача, \
         оцінюй її. Відповідай українською мовою.",
    ),
    (
        "translate",
        "Ти професійний перекладач. Переклади текст користувача на {lang_name} мову. \
         Відповідай лише перекладом, без пояснень.",
    ),
    (
        "recommendations",
        "Ти експерт, який радить {category}. Порекомендуй рівно один {category_singular} \
         у жанрі {genre}. Почни відповідь з рядка \"Назва: <назва>\", далі коротко опиши, \
         чому варто звернути увагу.{rating_instruction} Відповідай українською мовою.",
    ),
    (
        "rating_instruction",
        " Додай рядок \"Рейтинг: <оцінка IMDb>\", якщо він відомий.",
    ),
    (
        "talk_cobain",
        "Ти Курт Кобейн, фронтмен гурту Nirvana. Говори від першої особи, щиро і трохи \
         похмуро. Відповідай українською мовою.",
    ),
    (
        "talk_queen",
        "Ти королева Єлизавета II. Говори стримано, ввічливо і з гідністю. \
         Відповідай українською мовою.",
    ),
    (
        "talk_tolkien",
        "Ти Джон Рональд Руел Толкін, письменник і філолог. Говори від першої особи, \
         охоче згадуй Середзем'я та мови. Відповідай українською мовою.",
    ),
    (
        "talk_nietzsche",
        "Ти Фрідріх Ніцше, філософ. Говори афористично і пристрасно. \
         Відповідай українською мовою.",
    ),
    (
        "talk_hawking",
        "Ти Стівен Гокінг, фізик-теоретик. Пояснюй складне просто і з гумором. \
         Відповідай українською мовою.",
    ),
    ("default", DEFAULT_PROMPT),
];

/// Read-only resource lookup, shared freely across sessions
#[derive(Debug, Clone)]
pub struct ResourceCatalog {
    root: PathBuf,
}

impl ResourceCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Message template by name, falling back to the built-in text
    pub fn load_message(&self, name: &str) -> String {
        let path = self.root.join("messages").join(format!("{name}.txt"));
        match read_trimmed(&path) {
            Some(text) => text,
            None => {
                tracing::warn!(path = %path.display(), "Message resource missing, using default");
                lookup(DEFAULT_MESSAGES, name)
                    .map_or_else(|| format!("Повідомлення для {name}"), str::to_string)
            }
        }
    }

    /// Prompt by name, falling back to the built-in prompt of that name, or
    /// to the generic assistant prompt
    pub fn load_prompt(&self, name: &str) -> String {
        let path = self.root.join("prompts").join(format!("{name}.txt"));
        match read_trimmed(&path) {
            Some(text) => text,
            None => {
                tracing::error!(path = %path.display(), "Prompt resource missing, using default");
                lookup(DEFAULT_PROMPTS, name)
                    .unwrap_or(DEFAULT_PROMPT)
                    .to_string()
            }
        }
    }

    /// Path to an image, only if the file exists
    pub fn image_path(&self, name: &str) -> Option<PathBuf> {
        let path = self.root.join("images").join(format!("{name}.jpg"));
        if path.is_file() {
            Some(path)
        } else {
            tracing::warn!(path = %path.display(), "Image resource missing");
            None
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|text| text.trim().to_string())
}

fn lookup(table: &'static [(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table.iter().find(|(key, _)| *key == name).map(|(_, v)| *v)
}

/// Substitute `{key}` placeholders. Unknown placeholders are left as-is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}
