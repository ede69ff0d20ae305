use std::fs;

use crate::extractor::{ParseError, parse_entries};
use crate::store::Entry;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("src/extractor/tests/fixtures/{name}"))
        .expect("Failed to read test fixture")
}

#[test]
fn test_extract_question_page() {
    let entries = parse_entries(&fixture("questions.html")).unwrap();

    assert_eq!(
        entries,
        vec![
            Entry::new(412, "Если бы ты мог начать любой проект, что бы это было?"),
            Entry::new(301, "Где ты мечтаешь побывать?"),
            Entry::new(153, "Что тебя удивило в последнее время?"),
            Entry::new(87, "Какой была лучшая часть твоей недели?"),
            Entry::new(9, "Какое приложение на телефоне ты открываешь чаще всего?"),
            Entry::new(0, "Какую книгу ты бы посоветовал команде?"),
        ]
    );
}

#[test]
fn test_navigation_lists_are_ignored() {
    let entries = parse_entries(&fixture("questions.html")).unwrap();
    assert!(entries.iter().all(|e| e.text != "Блог" && e.rating != 999));
}

#[test]
fn test_page_without_article_body() {
    assert_eq!(
        parse_entries(&fixture("no_article.html")),
        Err(ParseError::MissingArticleBody)
    );
}

#[test]
fn test_malformed_html() {
    let html = r#"<div itemprop="articleBody"><ul><li>5 Незакрытый тег<li>6 Второй"#;
    let entries = parse_entries(html).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], Entry::new(6, "Второй"));
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_parse_never_panics(html in ".*") {
            let _ = parse_entries(&html);
        }

        #[test]
        fn test_rating_and_text_round_trip(
            rating in 0u64..100_000,
            text in "[а-яА-Яa-zA-Z?]{1,12}( [а-яА-Яa-zA-Z?]{1,12}){0,6}",
        ) {
            let html = format!(r#"<div itemprop="articleBody"><ul><li>{rating} {text}</li></ul></div>"#);
            let entries = parse_entries(&html).unwrap();
            prop_assert_eq!(entries, vec![Entry::new(rating, text)]);
        }

        #[test]
        fn test_output_sorted_descending(ratings in proptest::collection::vec(0u64..1000, 0..40)) {
            let items: String = ratings
                .iter()
                .map(|r| format!("<li>{r} вопрос номер {r}</li>"))
                .collect();
            let html = format!(r#"<div itemprop="articleBody"><ul>{items}</ul></div>"#);
            let entries = parse_entries(&html).unwrap();
            prop_assert_eq!(entries.len(), ratings.len());
            prop_assert!(entries.windows(2).all(|w| w[0].rating >= w[1].rating));
        }
    }
}
