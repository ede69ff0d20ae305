//! Message text and keyboard layout.

use crate::bot::SHOW_SECTIONS;
use crate::bot::picker::Picked;
use crate::store::SectionRegistry;

pub const SECTION_LIST_PROMPT: &str = "Выберите раздел вопросов:";
pub const NO_QUESTIONS: &str = "В этом разделе нет вопросов.";
const BACK_TO_LIST: &str = "📋 К списку тем";
const ANOTHER: &str = "🔄 Другой";
const FIRE: &str = "🔥";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Opaque data handed back when the button is pressed.
    Callback(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

/// Rows of buttons, top to bottom.
pub type Keyboard = Vec<Vec<Button>>;

/// A rendered message: text plus buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    /// Text uses Telegram's legacy Markdown.
    pub markdown: bool,
    pub keyboard: Keyboard,
}

/// Rating thresholds for the fire badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBadges {
    pub hot: u64,
    pub very_hot: u64,
}

impl Default for RatingBadges {
    fn default() -> Self {
        Self {
            hot: 100,
            very_hot: 300,
        }
    }
}

impl RatingBadges {
    pub fn render(&self, rating: u64) -> String {
        if rating > self.very_hot {
            format!("{FIRE}{FIRE} {rating}")
        } else if rating > self.hot {
            format!("{FIRE} {rating}")
        } else {
            rating.to_string()
        }
    }
}

fn section_label(emoji: &str, title: &str) -> String {
    if emoji.is_empty() {
        title.to_string()
    } else {
        format!("{emoji} {title}")
    }
}

/// One button per section, in configuration order.
pub fn section_list(registry: &SectionRegistry) -> Screen {
    let keyboard = registry
        .iter()
        .map(|section| {
            vec![Button::callback(
                section_label(&section.emoji, &section.title),
                section.key.clone(),
            )]
        })
        .collect();

    Screen {
        text: SECTION_LIST_PROMPT.to_string(),
        markdown: false,
        keyboard,
    }
}

/// Italic section header, the question, and navigation buttons. The rating
/// button links to the page the question came from.
pub fn question_block(picked: Picked<'_>, badges: &RatingBadges) -> Screen {
    let Picked { section, entry } = picked;
    let header = section_label(&section.emoji, &strip_markdown(&section.title));
    let text = format!("_{header}_\n\n{}", escape_markdown(&entry.text));

    let keyboard = vec![
        vec![Button::callback(BACK_TO_LIST, SHOW_SECTIONS)],
        vec![
            Button::url(badges.render(entry.rating), section.url.clone()),
            Button::callback(ANOTHER, section.key.clone()),
        ],
    ];

    Screen {
        text,
        markdown: true,
        keyboard,
    }
}

/// Escape the characters legacy Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Legacy Markdown has no escapes inside an entity, so text placed inside
/// `_..._` loses its markup characters instead.
pub fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '_' | '*' | '`' | '['))
        .collect()
}
