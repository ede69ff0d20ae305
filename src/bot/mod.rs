//! Transport-independent conversation logic.
//!
//! - `picker`: draws a random question from a section
//! - `ui_builder`: renders section lists and question blocks
//!
//! [`Responder`] turns an incoming [`Event`] into an [`Action`] for whatever
//! chat transport is driving it. It only ever reads the registry.

pub mod picker;
pub mod ui_builder;

use std::sync::Arc;

use rand::Rng;
use tracing::debug;

use crate::store::SectionRegistry;

pub use picker::{Picked, pick_question};
pub use ui_builder::{Button, ButtonAction, Keyboard, RatingBadges, Screen};

/// Callback data of the "back to sections" button.
pub const SHOW_SECTIONS: &str = "show_sections";
/// Callback data that is acknowledged and otherwise ignored.
pub const NOOP: &str = "noop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The user asked for the section list (`/start`).
    Start,
    /// A button was pressed; carries its callback data.
    Callback(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post a new message.
    Send(Screen),
    /// Redraw the message the pressed button belongs to.
    Edit(Screen),
    /// Delete the message the pressed button belongs to and post a new one.
    Replace(Screen),
    /// Acknowledge the button press, optionally with a short notice.
    Ack(Option<String>),
}

#[derive(Debug, Clone)]
pub struct Responder {
    registry: Arc<SectionRegistry>,
    badges: RatingBadges,
}

impl Responder {
    pub fn new(registry: Arc<SectionRegistry>) -> Self {
        Self {
            registry,
            badges: RatingBadges::default(),
        }
    }

    pub fn with_badges(mut self, badges: RatingBadges) -> Self {
        self.badges = badges;
        self
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn respond<R: Rng + ?Sized>(&self, event: &Event, rng: &mut R) -> Action {
        match event {
            Event::Start => Action::Send(ui_builder::section_list(&self.registry)),
            Event::Callback(data) => self.on_callback(data, rng),
        }
    }

    fn on_callback<R: Rng + ?Sized>(&self, data: &str, rng: &mut R) -> Action {
        match data {
            SHOW_SECTIONS => Action::Edit(ui_builder::section_list(&self.registry)),
            NOOP => Action::Ack(None),
            key => match pick_question(&self.registry, key, rng) {
                Some(picked) => Action::Replace(ui_builder::question_block(picked, &self.badges)),
                None => {
                    debug!(key, "no questions for requested section");
                    Action::Ack(Some(ui_builder::NO_QUESTIONS.to_string()))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Entry, Section};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn responder() -> Responder {
        let mut registry = SectionRegistry::new(vec![
            Section::new("career", "Карьера", "https://example.com/career", "📈"),
            Section::new("empty", "Пусто", "https://example.com/empty", ""),
        ]);
        registry.set_entries("career", vec![Entry::new(150, "Куда ты растёшь?")]);
        Responder::new(Arc::new(registry))
    }

    #[test]
    fn test_start_sends_section_list() {
        let action = responder().respond(&Event::Start, &mut StdRng::seed_from_u64(0));
        let Action::Send(screen) = action else {
            panic!("expected a new message");
        };
        assert_eq!(screen.keyboard.len(), 2);
    }

    #[test]
    fn test_show_sections_edits_in_place() {
        let action = responder().respond(
            &Event::Callback(SHOW_SECTIONS.to_string()),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(matches!(action, Action::Edit(_)));
    }

    #[test]
    fn test_noop_only_acknowledges() {
        let action = responder().respond(
            &Event::Callback(NOOP.to_string()),
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(action, Action::Ack(None));
    }

    #[test]
    fn test_section_key_replaces_with_question() {
        let action = responder().respond(
            &Event::Callback("career".to_string()),
            &mut StdRng::seed_from_u64(0),
        );
        let Action::Replace(screen) = action else {
            panic!("expected a question");
        };
        assert!(screen.text.contains("Карьера"));
        assert!(screen.text.contains("Куда ты растёшь?"));
        assert!(screen.keyboard.iter().flatten().any(|b| b.action
            == ButtonAction::Url("https://example.com/career".to_string())));
    }

    #[test]
    fn test_custom_badges_are_used() {
        let responder = responder().with_badges(RatingBadges {
            hot: 10,
            very_hot: 100,
        });
        let action = responder.respond(
            &Event::Callback("career".to_string()),
            &mut StdRng::seed_from_u64(0),
        );
        let Action::Replace(screen) = action else {
            panic!("expected a question");
        };
        assert_eq!(screen.keyboard[1][0].text, "🔥🔥 150");
    }

    #[test]
    fn test_empty_and_unknown_sections_get_notice() {
        let responder = responder();
        let mut rng = StdRng::seed_from_u64(0);
        let expected = Action::Ack(Some(ui_builder::NO_QUESTIONS.to_string()));
        assert_eq!(
            responder.respond(&Event::Callback("empty".to_string()), &mut rng),
            expected
        );
        assert_eq!(
            responder.respond(&Event::Callback("nope".to_string()), &mut rng),
            expected
        );
    }

    #[test]
    fn test_responding_does_not_touch_registry() {
        let responder = responder();
        let before = responder.registry().clone();
        let mut rng = StdRng::seed_from_u64(3);
        for data in ["career", "career", SHOW_SECTIONS, "empty", NOOP] {
            responder.respond(&Event::Callback(data.to_string()), &mut rng);
        }
        assert_eq!(responder.registry(), &before);
    }
}
