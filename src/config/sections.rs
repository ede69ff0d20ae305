/// Static definition of one question section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDef {
    pub key: &'static str,
    pub title: &'static str,
    pub url: &'static str,
    pub emoji: &'static str,
}

const fn def(
    key: &'static str,
    title: &'static str,
    url: &'static str,
    emoji: &'static str,
) -> SectionDef {
    SectionDef {
        key,
        title,
        url,
        emoji,
    }
}

/// "500 questions for a 1:1" series, one page per topic.
pub const SECTIONS: &[SectionDef] = &[
    def(
        "udalennie",
        "Удаленные команды",
        "https://pritula.academy/tpost/9n9vnetijt-500-voprosov-dlya-1-1-udalennie-komandi",
        "🏠",
    ),
    def(
        "podderzhka",
        "Поддержка руководителя",
        "https://pritula.academy/tpost/pl3x13xrfi-500-voprosov-dlya-1-1-podderzhka-rukovod",
        "👥",
    ),
    def(
        "tseli",
        "Цели и согласованность",
        "https://pritula.academy/tpost/6smfhyiujo-500-voprosov-dlya-1-1-tseli-i-soglasovan",
        "🎯",
    ),
    def(
        "meshaet",
        "Что мешает в работе",
        "https://pritula.academy/tpost/esamuuzrsr-500-voprosov-dlya-1-1-chto-meshaet-v-rab",
        "🚧",
    ),
    def(
        "feedback",
        "Обратная связь",
        "https://pritula.academy/tpost/u900gajn92-500-voprosov-dl-1-1-obratnaya-svyaz",
        "💬",
    ),
    def(
        "priznanie",
        "Признание",
        "https://pritula.academy/tpost/hpij8tbj72-500-voprosov-dlya-1-1-priznanie",
        "🏆",
    ),
    def(
        "career",
        "Карьера и развитие",
        "https://pritula.academy/tpost/sor876011c-500-voprosov-dlya-1-1-karernii-rost-i-ra",
        "📈",
    ),
    def(
        "tools",
        "Инструменты и ресурсы",
        "https://pritula.academy/tpost/40uajzj3kh-500-voprosov-dlya-1-1-instrumenti-i-resu",
        "🛠️",
    ),
    def(
        "duties",
        "Обязанности и показатели",
        "https://pritula.academy/tpost/371n7j4kae-500-voprosov-dlya-1-1-obyazannosti-i-pok",
        "📋",
    ),
    def(
        "teamwork",
        "Работа в команде",
        "https://pritula.academy/tpost/pbu5ztsz3r-500-voprosov-dlya-1-1-rabota-v-komande-i",
        "🤝",
    ),
    def(
        "satisfaction",
        "Удовлетворенность работой",
        "https://pritula.academy/tpost/53foxs5441-500-voprosov-dlya-1-1-udovletvorennost-r",
        "😊",
    ),
    def(
        "role",
        "Ясность роли и ожидания",
        "https://pritula.academy/tpost/nm2flfz9as-500-voprosov-dlya-1-1-yasnost-roli-i-ozh",
        "🎭",
    ),
    def(
        "company_feedback",
        "Обратная связь компании",
        "https://pritula.academy/tpost/xyra5lmd8p-500-voprosov-dlya-1-1-obratnaya-svyaz-s",
        "🏢",
    ),
    def(
        "icebreakers",
        "Ледоколы",
        "https://pritula.academy/tpost/7mcpo3lc9p-500-voprosov-dlya-1-1-ledokoli",
        "🧊",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::{NOOP, SHOW_SECTIONS};
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<_> = SECTIONS.iter().map(|s| s.key).collect();
        assert_eq!(keys.len(), SECTIONS.len());
    }

    #[test]
    fn test_keys_do_not_collide_with_reserved_callbacks() {
        assert!(SECTIONS.iter().all(|s| s.key != SHOW_SECTIONS && s.key != NOOP));
    }

    #[test]
    fn test_keys_fit_callback_data() {
        // Telegram limits callback_data to 64 bytes.
        assert!(SECTIONS.iter().all(|s| !s.key.is_empty() && s.key.len() <= 64));
    }

    #[test]
    fn test_urls_parse() {
        for section in SECTIONS {
            assert!(url::Url::parse(section.url).is_ok(), "{}", section.url);
        }
    }
}
