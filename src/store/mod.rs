//! In-memory registry of question sections.
//!
//! The registry is built from the static section table with empty entry
//! lists, filled exactly once by ingestion, and then frozen behind an `Arc`
//! for the lifetime of the process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::sections::SectionDef;

/// One scraped question with the popularity score printed next to it.
///
/// A rating of `0` is also what an unparseable score token turns into, so it
/// does not necessarily mean "nobody liked it".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(u64, String)", into = "(u64, String)")]
pub struct Entry {
    pub rating: u64,
    pub text: String,
}

impl Entry {
    pub fn new(rating: u64, text: impl Into<String>) -> Self {
        Self {
            rating,
            text: text.into(),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("question text is empty")]
pub struct EmptyQuestion;

impl TryFrom<(u64, String)> for Entry {
    type Error = EmptyQuestion;

    fn try_from((rating, text): (u64, String)) -> Result<Self, Self::Error> {
        if text.is_empty() {
            return Err(EmptyQuestion);
        }
        Ok(Self { rating, text })
    }
}

impl From<Entry> for (u64, String) {
    fn from(entry: Entry) -> Self {
        (entry.rating, entry.text)
    }
}

/// Sort entries by rating, highest first. Ties keep their relative order.
pub fn sort_by_rating(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.rating.cmp(&a.rating));
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub key: String,
    pub title: String,
    pub url: String,
    pub emoji: String,
    entries: Vec<Entry>,
}

impl Section {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            url: url.into(),
            emoji: emoji.into(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the entry list, re-establishing the rating order.
    pub fn set_entries(&mut self, mut entries: Vec<Entry>) {
        sort_by_rating(&mut entries);
        self.entries = entries;
    }
}

impl From<&SectionDef> for Section {
    fn from(def: &SectionDef) -> Self {
        Section::new(def.key, def.title, def.url, def.emoji)
    }
}

/// Fixed set of sections, iterated in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRegistry {
    sections: Vec<Section>,
}

impl SectionRegistry {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Registry with every configured section present and empty.
    pub fn from_defs(defs: &[SectionDef]) -> Self {
        Self::new(defs.iter().map(Section::from).collect())
    }

    pub fn get(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total number of questions across all sections.
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    /// Assign entries to a known section. Returns `false` for unknown keys.
    pub fn set_entries(&mut self, key: &str, entries: Vec<Entry>) -> bool {
        match self.get_mut(key) {
            Some(section) => {
                section.set_entries(entries);
                true
            }
            None => false,
        }
    }
}
