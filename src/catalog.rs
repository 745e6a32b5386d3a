//! Fixed option vocabulary offered to the user
//!
//! Every selectable option id the messaging collaborator can send back lives
//! here, together with its display label and whatever the handlers need to
//! build a prompt from it.

use serde::Serialize;

/// A persona the user can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    /// Option id, also the prompt resource key and image name
    pub id: &'static str,
    pub name: &'static str,
    pub button: &'static str,
}

pub const PERSONAS: &[Persona] = &[
    Persona {
        id: "talk_cobain",
        name: "Курт Кобейн",
        button: "🎸 Курт Кобейн",
    },
    Persona {
        id: "talk_queen",
        name: "Єлизавета II",
        button: "👑 Єлизавета II",
    },
    Persona {
        id: "talk_tolkien",
        name: "Джон Толкін",
        button: "📖 Джон Толкін",
    },
    Persona {
        id: "talk_nietzsche",
        name: "Фрідріх Ніцше",
        button: "🧠 Фрідріх Ніцше",
    },
    Persona {
        id: "talk_hawking",
        name: "Стівен Гокінг",
        button: "🔬 Стівен Гокінг",
    },
];

/// Quiz topic. The id doubles as the quiz command sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizTopic {
    pub id: &'static str,
    pub name: &'static str,
    pub button: &'static str,
}

pub const QUIZ_TOPICS: &[QuizTopic] = &[
    QuizTopic {
        id: "quiz_geography",
        name: "Географія",
        button: "🌍 Географія",
    },
    QuizTopic {
        id: "quiz_science",
        name: "Наука",
        button: "🔬 Наука",
    },
    QuizTopic {
        id: "quiz_cinema",
        name: "Кіно",
        button: "🎬 Кіно",
    },
    QuizTopic {
        id: "quiz_sport",
        name: "Спорт",
        button: "⚽ Спорт",
    },
];

/// Translation target language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub id: &'static str,
    /// Accusative form, interpolated into the translate prompt
    pub name: &'static str,
    pub button: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        id: "lang_en",
        name: "англійську",
        button: "🇬🇧 Англійська",
    },
    Language {
        id: "lang_de",
        name: "німецьку",
        button: "🇩🇪 Німецька",
    },
    Language {
        id: "lang_fr",
        name: "французьку",
        button: "🇫🇷 Французька",
    },
    Language {
        id: "lang_es",
        name: "іспанську",
        button: "🇪🇸 Іспанська",
    },
    Language {
        id: "lang_pl",
        name: "польську",
        button: "🇵🇱 Польська",
    },
    Language {
        id: "lang_ru",
        name: "російську",
        button: "🇷🇺 Російська",
    },
];

/// A genre inside a recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: &'static str,
    pub label: &'static str,
}

impl Genre {
    /// Label without its leading emoji, as used in prompts
    pub fn name(&self) -> &'static str {
        self.label
            .split_once(' ')
            .map_or(self.label, |(_, name)| name.trim())
    }
}

const fn genre(id: &'static str, label: &'static str) -> Genre {
    Genre { id, label }
}

pub const MOVIE_GENRES: &[Genre] = &[
    genre("genre_action", "💥 Бойовик"),
    genre("genre_comedy", "😂 Комедія"),
    genre("genre_drama", "🎭 Драма"),
    genre("genre_thriller", "🔪 Трилер"),
    genre("genre_horror", "👻 Жахи"),
    genre("genre_sci_fi", "🚀 Наукова фантастика"),
    genre("genre_fantasy", "🧙 Фентезі"),
    genre("genre_romance", "💕 Романтика"),
    genre("genre_detective", "🔍 Детектив"),
    genre("genre_animation", "🎨 Мультфільм"),
];

pub const BOOK_GENRES: &[Genre] = &[
    genre("genre_fiction", "📖 Художня література"),
    genre("genre_mystery", "🔍 Детектив"),
    genre("genre_fantasy", "🧙 Фентезі"),
    genre("genre_sci_fi", "🚀 Наукова фантастика"),
    genre("genre_romance", "💕 Романтика"),
    genre("genre_thriller", "🔪 Трилер"),
    genre("genre_biography", "👤 Біографія"),
    genre("genre_history", "📜 Історія"),
    genre("genre_philosophy", "🤔 Філософія"),
    genre("genre_self_help", "💪 Саморозвиток"),
    genre("genre_adventure", "🗺️ Пригоди"),
    genre("genre_horror", "👻 Жахи"),
    genre("genre_poetry", "✍️ Поезія"),
    genre("genre_drama", "🎭 Драма"),
    genre("genre_classic", "📚 Класика"),
];

pub const MUSIC_GENRES: &[Genre] = &[
    genre("genre_pop", "🎵 Поп"),
    genre("genre_rock", "🎸 Рок"),
    genre("genre_jazz", "🎷 Джаз"),
    genre("genre_classical", "🎼 Класична"),
    genre("genre_electronic", "🎹 Електронна"),
    genre("genre_hip_hop", "🎤 Хіп-хоп"),
    genre("genre_country", "🤠 Кантрі"),
    genre("genre_blues", "🎸 Блюз"),
    genre("genre_reggae", "🌴 Реггі"),
    genre("genre_folk", "🪕 Фольк"),
    genre("genre_metal", "🤘 Метал"),
    genre("genre_indie", "🎧 Інді"),
    genre("genre_rnb", "🎵 R&B"),
    genre("genre_latin", "💃 Латинська"),
    genre("genre_world", "🌍 Світова музика"),
];

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movies,
    Books,
    Music,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Movies, Category::Books, Category::Music];

    pub fn id(self) -> &'static str {
        match self {
            Category::Movies => "rec_movies",
            Category::Books => "rec_books",
            Category::Music => "rec_music",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Plural accusative name used in prompts and headings
    pub fn name(self) -> &'static str {
        match self {
            Category::Movies => "фільми",
            Category::Books => "книги",
            Category::Music => "музику",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Category::Movies => "фільм",
            Category::Books => "книгу",
            Category::Music => "музичний твір",
        }
    }

    pub fn button(self) -> &'static str {
        match self {
            Category::Movies => "🎬 Фільми",
            Category::Books => "📚 Книги",
            Category::Music => "🎵 Музика",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Category::Movies => "🎬",
            Category::Books => "📚",
            Category::Music => "🎵",
        }
    }

    pub fn genres(self) -> &'static [Genre] {
        match self {
            Category::Movies => MOVIE_GENRES,
            Category::Books => BOOK_GENRES,
            Category::Music => MUSIC_GENRES,
        }
    }

    /// Genre ids are only meaningful relative to a category
    pub fn genre(self, id: &str) -> Option<&'static Genre> {
        self.genres().iter().find(|g| g.id == id)
    }
}

pub fn persona(id: &str) -> Option<&'static Persona> {
    PERSONAS.iter().find(|p| p.id == id)
}

pub fn quiz_topic(id: &str) -> Option<&'static QuizTopic> {
    QUIZ_TOPICS.iter().find(|t| t.id == id)
}

pub fn language(id: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.id == id)
}
