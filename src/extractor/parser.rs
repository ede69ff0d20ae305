use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::store::{Entry, sort_by_rating};

static ARTICLE_BODY: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[itemprop~="articleBody"]"#).unwrap());
static LIST: Lazy<Selector> = Lazy::new(|| Selector::parse("ul").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("no itemprop=\"articleBody\" block on the page")]
    MissingArticleBody,

    #[error("article body has no <ul> list")]
    MissingList,
}

/// Pull `(rating, question)` pairs out of a question page.
///
/// Only the first `<ul>` inside the article body is read. Items whose text
/// does not split into a leading token and a remainder are skipped. A token
/// that is not a non-negative integer yields rating 0.
pub fn parse_entries(html: &str) -> Result<Vec<Entry>, ParseError> {
    let document = Html::parse_document(html);

    let article = document
        .select(&ARTICLE_BODY)
        .next()
        .ok_or(ParseError::MissingArticleBody)?;
    let list = article
        .select(&LIST)
        .next()
        .ok_or(ParseError::MissingList)?;

    let mut entries: Vec<Entry> = list.select(&LIST_ITEM).filter_map(parse_item).collect();
    sort_by_rating(&mut entries);
    Ok(entries)
}

fn parse_item(item: ElementRef<'_>) -> Option<Entry> {
    let text = visible_text(item);
    let (token, question) = text.split_once(' ')?;
    if token.is_empty() || question.is_empty() {
        return None;
    }
    // Known ambiguity: "no score" and "score of zero" look the same downstream.
    let rating: u64 = token.parse().unwrap_or(0);
    Some(Entry::new(rating, question))
}

/// Text content of an element with whitespace runs collapsed to one space.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
