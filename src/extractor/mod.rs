pub mod parser;

#[cfg(test)]
mod tests;

pub use parser::{ParseError, parse_entries};

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::fetcher::Fetcher;
use crate::ingest::QuestionSource;
use crate::store::Entry;

/// Fetches question pages over HTTP and parses them into entries.
#[derive(Clone, Debug)]
pub struct Extractor {
    fetcher: Fetcher,
}

impl Extractor {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// Questions from `url`, best rated first.
    ///
    /// Never fails: fetch and parse errors are logged and yield an empty list.
    #[instrument(skip(self))]
    pub async fn extract(&self, url: &str) -> Vec<Entry> {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(err) => {
                error!(error = %err, "failed to fetch question page");
                return Vec::new();
            }
        };

        match parse_entries(&page.body_utf8) {
            Ok(entries) => {
                info!(
                    count = entries.len(),
                    attempts = page.attempts,
                    "parsed question page"
                );
                entries
            }
            Err(err) => {
                error!(error = %err, final_url = %page.url_final, "question block not found");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl QuestionSource for Extractor {
    async fn fetch_entries(&self, url: &str) -> Vec<Entry> {
        self.extract(url).await
    }
}
